//! The single capability the exporter needs from its caller: read a block by CID.

use async_trait::async_trait;
use bytes::Bytes;
use cid::Cid;

use crate::ExporterError;

/// A read-only, content-addressed block provider.
///
/// Implementations are expected to be cheap to clone (typically an `Arc` wrapper
/// around a handle to some store) and safe to share across concurrently-running
/// exporter streams.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Fetch the raw bytes of the block named by `cid`.
    ///
    /// Returns [`ExporterError::NotFound`] if no block is stored under `cid`.
    async fn get(&self, cid: &Cid) -> Result<Bytes, ExporterError>;
}
