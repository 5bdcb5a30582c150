//! Codec dispatch and single-step path resolution (§4.2-§4.7, §4.11).
//!
//! Grounded on `py_unix_fs_exporter/resolvers.py`'s `resolve`/`resolve_dag_pb`
//! /`resolve_raw`/`resolve_dag_cbor`/`resolve_identity`, with the `name ==
//! name` bug (§9) fixed: the plain-directory link scan compares against the
//! segment being resolved (`to_resolve[0]`), not the node's own name.

use std::sync::Arc;

use bytes::Bytes;
use cid::Cid;
use futures::stream;
use serde_cbor::Value as CborValue;

use crate::dag_pb::PBNode;
use crate::errors::ExporterError;
use crate::exportable::{
    DirectoryExportable, Exportable, FileExportable, Header, IdentityExportable,
    MetadataExportable, NextHop, ObjectExportable, RawExportable, ResolveResult, SymlinkExportable,
};
use crate::file;
use crate::hamt;
use crate::unixfs::{FsType, UnixFsNode, DAG_CBOR_CODEC, DAG_PB_CODEC, IDENTITY_CODEC, RAW_CODEC};
use unixfs_exporter_interface::BlockStore;

/// Resolve one path segment (§4.2): decode the block at `cid`, dispatch by
/// its codec, and return the entry at this node plus the next hop if
/// `to_resolve` isn't empty yet.
pub async fn resolve(
    cid: Cid,
    name: String,
    path: String,
    to_resolve: Vec<String>,
    depth: usize,
    blocks: Arc<dyn BlockStore>,
) -> Result<ResolveResult, ExporterError> {
    tracing::debug!(%cid, codec = cid.codec(), remaining = to_resolve.len(), "resolving path segment");
    match cid.codec() {
        DAG_PB_CODEC => resolve_dag_pb(cid, name, path, to_resolve, depth, blocks).await,
        RAW_CODEC => resolve_raw(cid, name, path, to_resolve, depth, blocks).await,
        DAG_CBOR_CODEC => resolve_dag_cbor(cid, name, path, to_resolve, depth, blocks).await,
        IDENTITY_CODEC => resolve_identity(cid, name, path, to_resolve, depth),
        other => Err(ExporterError::unsupported_codec(cid, other)),
    }
}

async fn resolve_raw(
    cid: Cid,
    name: String,
    path: String,
    to_resolve: Vec<String>,
    depth: usize,
    blocks: Arc<dyn BlockStore>,
) -> Result<ResolveResult, ExporterError> {
    if !to_resolve.is_empty() {
        return Err(ExporterError::not_found(Some(cid), path));
    }
    let block = blocks.get(&cid).await?;
    let size = block.len() as u64;
    let header = Header {
        name,
        path,
        cid,
        depth,
        size,
    };
    let entry = Exportable::Raw(RawExportable {
        header,
        content: Box::pin(stream::once(async move { Ok(block) })),
    });
    Ok(ResolveResult { entry, next: None })
}

fn resolve_identity(
    cid: Cid,
    name: String,
    path: String,
    to_resolve: Vec<String>,
    depth: usize,
) -> Result<ResolveResult, ExporterError> {
    if !to_resolve.is_empty() {
        return Err(ExporterError::not_found(Some(cid), path));
    }
    // The "block" is the CID's own embedded digest payload (§4.6).
    let block = Bytes::copy_from_slice(cid.hash().digest());
    let size = block.len() as u64;
    let header = Header {
        name,
        path,
        cid,
        depth,
        size,
    };
    let entry = Exportable::Identity(IdentityExportable {
        header,
        content: Box::pin(stream::once(async move { Ok(block) })),
    });
    Ok(ResolveResult { entry, next: None })
}

async fn resolve_dag_cbor(
    cid: Cid,
    name: String,
    path: String,
    to_resolve: Vec<String>,
    depth: usize,
    blocks: Arc<dyn BlockStore>,
) -> Result<ResolveResult, ExporterError> {
    let block = blocks.get(&cid).await?;
    let object: CborValue = serde_cbor::from_slice(&block)
        .map_err(|e| ExporterError::structural(cid, format!("dag-cbor decode: {e}")))?;
    let size = block.len() as u64;

    let mut sub_obj = &object;
    let mut sub_path = path.clone();

    for (i, prop) in to_resolve.iter().enumerate() {
        let value = map_get(sub_obj, prop)
            .ok_or_else(|| ExporterError::not_found(Some(cid), format!("{sub_path}/{prop}")))?;
        sub_path = format!("{sub_path}/{prop}");

        if let Some(link_cid) = as_cid_link(value) {
            let header = Header {
                name,
                path,
                cid,
                depth,
                size,
            };
            let entry = Exportable::Object(ObjectExportable {
                header,
                object: object.clone(),
                content: Box::pin(stream::once({
                    let object = object.clone();
                    async move { Ok(object) }
                })),
            });
            return Ok(ResolveResult {
                entry,
                next: Some(NextHop {
                    cid: link_cid,
                    name: prop.clone(),
                    path: sub_path,
                    to_resolve: to_resolve[i + 1..].to_vec(),
                }),
            });
        }
        sub_obj = value;
    }

    let header = Header {
        name,
        path,
        cid,
        depth,
        size,
    };
    let entry = Exportable::Object(ObjectExportable {
        header,
        object: object.clone(),
        content: Box::pin(stream::once(async move { Ok(object) })),
    });
    Ok(ResolveResult { entry, next: None })
}

fn map_get<'a>(value: &'a CborValue, key: &str) -> Option<&'a CborValue> {
    match value {
        CborValue::Map(map) => map
            .iter()
            .find(|(k, _)| matches!(k, CborValue::Text(t) if t == key))
            .map(|(_, v)| v),
        _ => None,
    }
}

/// DAG-CBOR links are CBOR tag-42 byte strings carrying a leading
/// multibase-identity `0x00` byte followed by the raw CID bytes; `serde_cbor`
/// surfaces the tagged payload as a plain `Bytes` value.
fn as_cid_link(value: &CborValue) -> Option<Cid> {
    match value {
        CborValue::Bytes(bytes) if !bytes.is_empty() && bytes[0] == 0 => {
            Cid::try_from(&bytes[1..]).ok()
        }
        _ => None,
    }
}

async fn resolve_dag_pb(
    cid: Cid,
    name: String,
    path: String,
    to_resolve: Vec<String>,
    depth: usize,
    blocks: Arc<dyn BlockStore>,
) -> Result<ResolveResult, ExporterError> {
    let block = blocks.get(&cid).await?;
    let node = PBNode::decode(&block)
        .map_err(|e| ExporterError::structural(cid, format!("dag-pb decode: {e}")))?;
    let data = node
        .data
        .clone()
        .ok_or_else(|| ExporterError::structural(cid, "missing unixfs data"))?;
    let unix_fs =
        UnixFsNode::decode(&data).map_err(|e| ExporterError::structural(cid, e))?;

    let name = if name.is_empty() { cid.to_string() } else { name };
    let path = if path.is_empty() { name.clone() } else { path };

    let next = if to_resolve.is_empty() {
        None
    } else {
        let segment = to_resolve[0].clone();
        let child_cid = if unix_fs.fs_type == FsType::HamtShard {
            tracing::trace!(%cid, segment = %segment, "descending into hamt shard");
            hamt::lookup(cid, &node, &unix_fs, &segment, blocks.clone()).await?
        } else {
            node.links
                .iter()
                .find(|l| l.name.as_deref() == Some(segment.as_str()))
                .and_then(|l| l.hash)
                .ok_or_else(|| ExporterError::not_found(Some(cid), format!("{path}/{segment}")))?
        };
        Some(NextHop {
            cid: child_cid,
            name: segment.clone(),
            path: format!("{path}/{segment}"),
            to_resolve: to_resolve[1..].to_vec(),
        })
    };

    let entry = build_exportable(cid, name, path, depth, node, unix_fs, blocks)?;
    Ok(ResolveResult { entry, next })
}

/// Exportable construction for a decoded dag-pb/UnixFS node (§4.11).
fn build_exportable(
    cid: Cid,
    name: String,
    path: String,
    depth: usize,
    node: PBNode,
    unix_fs: UnixFsNode,
    blocks: Arc<dyn BlockStore>,
) -> Result<Exportable, ExporterError> {
    let size = unix_fs.file_size();
    let header = Header {
        name,
        path: path.clone(),
        cid,
        depth,
        size,
    };

    if unix_fs.is_dir() {
        let content = match unix_fs.fs_type {
            FsType::HamtShard => {
                hamt::enumerate(cid, node.clone(), unix_fs.clone(), path, depth, blocks)
            }
            _ => directory_content(cid, node.clone(), path, depth, blocks),
        };
        return Ok(Exportable::Directory(DirectoryExportable {
            header,
            unix_fs,
            node,
            content,
        }));
    }

    match unix_fs.fs_type {
        FsType::File => {
            let content = file::file_content(cid, node.clone(), unix_fs.clone(), blocks);
            Ok(Exportable::File(FileExportable {
                header,
                unix_fs,
                node,
                content,
            }))
        }
        FsType::Raw => {
            let bytes = unix_fs.data.clone().unwrap_or_default();
            Ok(Exportable::Raw(RawExportable {
                header,
                content: Box::pin(stream::once(async move { Ok(bytes) })),
            }))
        }
        FsType::Symlink => {
            let target_bytes = unix_fs.data.clone().unwrap_or_default();
            let target = String::from_utf8(target_bytes.to_vec())
                .map_err(|e| ExporterError::structural(cid, format!("symlink target: {e}")))?;
            Ok(Exportable::Symlink(SymlinkExportable {
                header,
                unix_fs,
                target,
                content: Box::pin(stream::empty()),
            }))
        }
        FsType::Metadata => {
            let payload = unix_fs.data.clone().unwrap_or_default();
            Ok(Exportable::Metadata(MetadataExportable {
                header,
                unix_fs,
                payload,
                content: Box::pin(stream::empty()),
            }))
        }
        FsType::Directory | FsType::HamtShard => unreachable!("handled by the is_dir() branch above"),
    }
}


/// DIRECTORY content exporter (§4.7): yield each child in link order.
fn directory_content(
    cid: Cid,
    node: PBNode,
    path: String,
    depth: usize,
    blocks: Arc<dyn BlockStore>,
) -> crate::exportable::EntryStream {
    Box::pin(async_stream::try_stream! {
        for link in node.links.iter() {
            let link_name = link.name.clone().unwrap_or_default();
            let child_cid = link
                .hash
                .ok_or_else(|| ExporterError::structural(cid, "directory link missing cid"))?;
            let link_path = format!("{path}/{link_name}");
            let result = resolve(
                child_cid,
                link_name,
                link_path,
                Vec::new(),
                depth + 1,
                blocks.clone(),
            )
            .await?;
            yield result.entry;
        }
    })
}
