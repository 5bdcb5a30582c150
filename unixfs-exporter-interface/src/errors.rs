//! Error types for the UnixFS exporter

use cid::Cid;
use thiserror::Error;

/// Error surface for path resolution, DAG traversal, and content extraction.
#[derive(Error, Debug)]
pub enum ExporterError {
    /// The caller-supplied path or CID could not be parsed.
    #[error("invalid input: {message}")]
    InputError { message: String },

    /// A block or path segment could not be found.
    #[error("not found: {path}")]
    NotFound { cid: Option<Cid>, path: String },

    /// The block's CID uses a codec this exporter does not recognize.
    #[error("unsupported codec {codec:#x} for {cid}")]
    UnsupportedCodec { cid: Cid, codec: u64 },

    /// A decoded node violates a structural invariant (bad protobuf, bad
    /// fanout, missing UnixFS `Data` field).
    #[error("structural error at {cid}: {reason}")]
    StructuralError { cid: Cid, reason: String },

    /// File content could not be reconstructed from its DAG.
    #[error("content extraction error at {cid}: {reason}")]
    ContentExtractionError { cid: Cid, reason: String },

    /// A file DAG referenced a block of an unexpected codec.
    #[error("traversal error at {cid}: unexpected codec {codec:#x} inside file DAG")]
    TraversalError { cid: Cid, codec: u64 },

    /// I/O error from a `BlockStore` implementation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error surfaced by a concrete `BlockStore` backend (e.g. `sled`).
    #[error("block store error: {message}")]
    BlockStore { message: String },

    /// CID parsing/validation error.
    #[error("CID error: {0}")]
    Cid(#[from] cid::Error),
}

impl ExporterError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::InputError {
            message: message.into(),
        }
    }

    pub fn not_found(cid: Option<Cid>, path: impl Into<String>) -> Self {
        Self::NotFound {
            cid,
            path: path.into(),
        }
    }

    pub fn structural(cid: Cid, reason: impl Into<String>) -> Self {
        Self::StructuralError {
            cid,
            reason: reason.into(),
        }
    }

    pub fn content_extraction(cid: Cid, reason: impl Into<String>) -> Self {
        Self::ContentExtractionError {
            cid,
            reason: reason.into(),
        }
    }

    pub fn block_store(message: impl Into<String>) -> Self {
        Self::BlockStore {
            message: message.into(),
        }
    }

    pub fn unsupported_codec(cid: Cid, codec: u64) -> Self {
        Self::UnsupportedCodec { cid, codec }
    }

    pub fn traversal(cid: Cid, codec: u64) -> Self {
        Self::TraversalError { cid, codec }
    }
}
