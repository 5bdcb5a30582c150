//! The public value the resolver produces: a typed handle to a node plus a
//! lazy content stream (§3, §9). A closed tagged union — no simulated
//! inheritance; add a variant here when the wire format grows one, not a new
//! subtype of an existing variant.

use std::pin::Pin;

use bytes::Bytes;
use cid::Cid;
use futures::Stream;
use serde_cbor::Value as CborValue;

use crate::dag_pb::PBNode;
use crate::errors::ExporterError;
use crate::unixfs::UnixFsNode;

/// A lazily-produced sequence of file byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ExporterError>> + Send>>;
/// A lazily-produced sequence of child [`Exportable`]s.
pub type EntryStream = Pin<Box<dyn Stream<Item = Result<Exportable, ExporterError>> + Send>>;
/// A lazily-produced sequence of exactly one decoded DAG-CBOR object.
pub type ObjectStream = Pin<Box<dyn Stream<Item = Result<CborValue, ExporterError>> + Send>>;

/// Fields common to every [`Exportable`] variant (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub path: String,
    pub cid: Cid,
    pub depth: usize,
    pub size: u64,
}

/// The kind tag of an [`Exportable`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportableType {
    File,
    Directory,
    Object,
    Raw,
    Identity,
    Symlink,
    Metadata,
}

pub struct FileExportable {
    pub header: Header,
    pub unix_fs: UnixFsNode,
    pub node: PBNode,
    pub content: ByteStream,
}

pub struct DirectoryExportable {
    pub header: Header,
    pub unix_fs: UnixFsNode,
    pub node: PBNode,
    pub content: EntryStream,
}

pub struct ObjectExportable {
    pub header: Header,
    pub object: CborValue,
    pub content: ObjectStream,
}

pub struct RawExportable {
    pub header: Header,
    pub content: ByteStream,
}

pub struct IdentityExportable {
    pub header: Header,
    pub content: ByteStream,
}

pub struct SymlinkExportable {
    pub header: Header,
    pub unix_fs: UnixFsNode,
    /// The symlink target, read from `U.data` (§9 open question: exposed
    /// here rather than through `content`, which is always empty).
    pub target: String,
    pub content: ByteStream,
}

pub struct MetadataExportable {
    pub header: Header,
    pub unix_fs: UnixFsNode,
    /// The raw metadata payload from `U.data` (§9 open question: exposed
    /// here rather than through `content`, which is always empty).
    pub payload: Bytes,
    pub content: ByteStream,
}

/// A resolved node plus its lazy content stream (§3).
pub enum Exportable {
    File(FileExportable),
    Directory(DirectoryExportable),
    Object(ObjectExportable),
    Raw(RawExportable),
    Identity(IdentityExportable),
    Symlink(SymlinkExportable),
    Metadata(MetadataExportable),
}

impl Exportable {
    pub fn header(&self) -> &Header {
        match self {
            Exportable::File(e) => &e.header,
            Exportable::Directory(e) => &e.header,
            Exportable::Object(e) => &e.header,
            Exportable::Raw(e) => &e.header,
            Exportable::Identity(e) => &e.header,
            Exportable::Symlink(e) => &e.header,
            Exportable::Metadata(e) => &e.header,
        }
    }

    pub fn kind(&self) -> ExportableType {
        match self {
            Exportable::File(_) => ExportableType::File,
            Exportable::Directory(_) => ExportableType::Directory,
            Exportable::Object(_) => ExportableType::Object,
            Exportable::Raw(_) => ExportableType::Raw,
            Exportable::Identity(_) => ExportableType::Identity,
            Exportable::Symlink(_) => ExportableType::Symlink,
            Exportable::Metadata(_) => ExportableType::Metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.header().name
    }

    pub fn path(&self) -> &str {
        &self.header().path
    }

    pub fn cid(&self) -> Cid {
        self.header().cid
    }

    pub fn size(&self) -> u64 {
        self.header().size
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Exportable::Directory(_))
    }
}

/// The continuation of a path walk (§3): the next block to fetch plus the
/// path state to carry into the following `resolve` call.
#[derive(Debug, Clone)]
pub struct NextHop {
    pub cid: Cid,
    pub name: String,
    pub path: String,
    pub to_resolve: Vec<String>,
}

/// One step of path resolution (§3): the entry at the current node, plus
/// the next hop to take if the path isn't fully consumed yet.
pub struct ResolveResult {
    pub entry: Exportable,
    pub next: Option<NextHop>,
}
