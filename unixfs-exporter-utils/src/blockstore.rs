//! Concrete [`BlockStore`] implementations.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use cid::Cid;
use sled::Db;

use unixfs_exporter_interface::{BlockStore, ExporterError};

/// An in-memory block store, keyed by a CID's canonical byte encoding.
///
/// Used by tests and fixture construction; the exporter core never writes
/// through a [`BlockStore`], so `put` exists only for callers building fixtures.
#[derive(Default)]
pub struct MemoryBlockStore {
    blocks: RwLock<HashMap<Vec<u8>, Bytes>>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a block. Not part of the `BlockStore` trait — the exporter is
    /// read-only, but fixtures need a way to populate the store.
    pub fn put(&self, cid: &Cid, block: Bytes) {
        self.blocks.write().unwrap().insert(cid.to_bytes(), block);
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn get(&self, cid: &Cid) -> Result<Bytes, ExporterError> {
        self.blocks
            .read()
            .unwrap()
            .get(&cid.to_bytes())
            .cloned()
            .ok_or_else(|| ExporterError::not_found(Some(*cid), cid.to_string()))
    }
}

/// A `sled`-backed block store for on-disk caches.
pub struct SledBlockStore {
    db: Db,
}

impl SledBlockStore {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, ExporterError> {
        let db = sled::open(path).map_err(|e| ExporterError::block_store(e.to_string()))?;
        Ok(Self { db })
    }

    pub fn temporary() -> Result<Self, ExporterError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| ExporterError::block_store(e.to_string()))?;
        Ok(Self { db })
    }

    fn key(cid: &Cid) -> Vec<u8> {
        cid.to_bytes()
    }

    /// Insert a block. Not part of the `BlockStore` trait — see `MemoryBlockStore::put`.
    pub fn put(&self, cid: &Cid, block: Bytes) -> Result<(), ExporterError> {
        self.db
            .insert(Self::key(cid), block.as_ref())
            .map_err(|e| ExporterError::block_store(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl BlockStore for SledBlockStore {
    async fn get(&self, cid: &Cid) -> Result<Bytes, ExporterError> {
        match self.db.get(Self::key(cid)) {
            Ok(Some(data)) => Ok(Bytes::from(data.to_vec())),
            Ok(None) => Err(ExporterError::not_found(Some(*cid), cid.to_string())),
            Err(e) => Err(ExporterError::block_store(e.to_string())),
        }
    }
}
