//! # UnixFS Exporter Utils
//!
//! Concrete [`unixfs_exporter_interface::BlockStore`] implementations and a
//! small logging setup helper, kept separate from `unixfs-exporter-core` so
//! the core stays storage-agnostic.

pub mod blockstore;
pub mod logger;

pub use blockstore::{MemoryBlockStore, SledBlockStore};
pub use logger::init_tracing;
