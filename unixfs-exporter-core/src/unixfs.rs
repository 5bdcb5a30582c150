//! Decoding of the UnixFS `Data` protobuf message embedded in a DAG-PB node's
//! `Data` field, and the derived quantities (`file_size`, `is_dir`, default
//! mode) that the resolver and content exporters depend on.

use bytes::Bytes;
use prost::Message;

use crate::pb::Data;

/// The multicodec code for DAG-PB blocks.
pub const DAG_PB_CODEC: u64 = 0x70;
/// The multicodec code for raw blocks.
pub const RAW_CODEC: u64 = 0x55;
/// The multicodec code for DAG-CBOR blocks.
pub const DAG_CBOR_CODEC: u64 = 0x71;
/// The multicodec code for identity-hashed CIDs.
pub const IDENTITY_CODEC: u64 = 0x00;

const DEFAULT_FILE_MODE: u32 = 0o644;
const DEFAULT_DIRECTORY_MODE: u32 = 0o755;

/// `Data.Type` (§3), the UnixFS node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsType {
    Raw,
    Directory,
    File,
    Metadata,
    Symlink,
    HamtShard,
}

impl FsType {
    fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(FsType::Raw),
            1 => Some(FsType::Directory),
            2 => Some(FsType::File),
            3 => Some(FsType::Metadata),
            4 => Some(FsType::Symlink),
            5 => Some(FsType::HamtShard),
            _ => None,
        }
    }
}

/// `Data.mtime` (§6): `{Seconds, FractionalNanoseconds}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MTime {
    pub seconds: i64,
    pub nanoseconds: Option<u32>,
}

/// A decoded UnixFS node (§3). Immutable once built.
#[derive(Debug, Clone)]
pub struct UnixFsNode {
    pub fs_type: FsType,
    pub data: Option<Bytes>,
    pub block_sizes: Vec<u64>,
    pub hash_type: Option<u64>,
    pub fanout: Option<u64>,
    pub mtime: Option<MTime>,
    mode: u32,
}

impl UnixFsNode {
    /// Decode the bytes of a DAG-PB node's `Data` field. Returns a plain
    /// `String` error — callers attach the CID for the typed
    /// [`unixfs_exporter_interface::ExporterError`] they raise.
    pub fn decode(bytes: &[u8]) -> Result<Self, String> {
        let message = Data::decode(bytes).map_err(|e| format!("unixfs decode error: {e}"))?;

        let fs_type = FsType::from_wire(message.r#type)
            .ok_or_else(|| format!("unknown unixfs type {}", message.r#type))?;

        if fs_type == FsType::HamtShard {
            let fanout = message.fanout.unwrap_or(0);
            if fanout < 2 || !fanout.is_power_of_two() {
                return Err(format!("hamt shard has invalid fanout {fanout}"));
            }
        }

        let mode = match message.mode {
            Some(m) if m != 0 => m & 0xfff,
            _ if matches!(fs_type, FsType::Directory | FsType::HamtShard) => {
                DEFAULT_DIRECTORY_MODE
            }
            _ => DEFAULT_FILE_MODE,
        };

        Ok(Self {
            fs_type,
            data: message.data.map(Bytes::from),
            block_sizes: message.blocksizes,
            hash_type: message.hash_type,
            fanout: message.fanout,
            mtime: message.mtime.map(|t| MTime {
                seconds: t.seconds,
                nanoseconds: t.fractional_nanoseconds,
            }),
            mode,
        })
    }

    /// `fs_type ∈ {DIRECTORY, HAMTSHARD}` (§3).
    pub fn is_dir(&self) -> bool {
        matches!(self.fs_type, FsType::Directory | FsType::HamtShard)
    }

    /// `len(data? else 0) + Σ block_sizes`, or `0` for directories (§3).
    pub fn file_size(&self) -> u64 {
        if self.is_dir() {
            return 0;
        }
        let own = self.data.as_ref().map(|d| d.len() as u64).unwrap_or(0);
        own + self.block_sizes.iter().sum::<u64>()
    }

    /// The 12-bit permission mask, defaulted per §3 when absent on the wire.
    pub fn mode(&self) -> u32 {
        self.mode
    }
}
