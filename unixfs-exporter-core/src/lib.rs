//! # unixfs-exporter-core
//!
//! Read-side resolution of UnixFS-on-IPLD content: given a root CID (or CID
//! plus path) and a [`BlockStore`](unixfs_exporter_interface::BlockStore),
//! walk the DAG-PB/raw/dag-cbor/identity block graph it names and produce
//! [`Exportable`] handles whose content streams lazily.
//!
//! ## Core concepts
//!
//! - **Path resolution** (`path`, `walker`): a path is a root CID plus a
//!   sequence of link-name segments, resolved one segment at a time. Each
//!   hop decodes exactly one block.
//! - **Codec dispatch** (`resolver`): dag-pb (0x70) nodes carry the UnixFS
//!   `Data` protobuf message (`unixfs`, `pb`) describing file/directory
//!   structure; raw (0x55) and identity (0x00) blocks are opaque bytes;
//!   dag-cbor (0x71) blocks are arbitrary CBOR that may embed further CID
//!   links.
//! - **File content** (`file`): large files are split across a DAG-PB tree
//!   of child blocks; `file_content` reconstructs the original byte stream
//!   from a possibly deep, unbalanced tree without recursing.
//! - **HAMT-sharded directories** (`hamt`): directories with more entries
//!   than fit comfortably in one block are sharded by a hash of the entry
//!   name; `lookup` and `enumerate` implement the shard descent reads need.
//!
//! Every block fetch goes through the caller-supplied `BlockStore`; this
//! crate has no opinion on where blocks actually live.

pub mod dag_pb;
pub mod errors;
pub mod exportable;
pub mod file;
pub mod hamt;
pub mod path;
mod pb;
pub mod resolver;
pub mod unixfs;
pub mod walker;

pub use errors::{ExporterError, Result};
pub use exportable::{
    ByteStream, DirectoryExportable, EntryStream, Exportable, ExportableType, FileExportable,
    Header, IdentityExportable, MetadataExportable, NextHop, ObjectExportable, ObjectStream,
    RawExportable, ResolveResult, SymlinkExportable,
};
pub use path::{parse, ParsedPath, PathInput};
pub use unixfs::{FsType, MTime, UnixFsNode};
pub use walker::{export, export_recursive, walk};

pub use dag_pb::{PBLink, PBNode};
pub use unixfs_exporter_interface::BlockStore;
