//! Whole-path resolution and the public `export`/`export_recursive` entry
//! points (§4.1-§4.2, §4.12).
//!
//! Grounded on `py_unix_fs_exporter/exporter.py`'s `_walk_path`/`exporter`/
//! `_recurse`/`recursive_exporter`. `_walk_path`'s `starting_depth` is
//! computed once and reused unchanged across every `resolve` call in the
//! walk, even as the cid/name/path/to_resolve state advances each
//! iteration — replicated here literally rather than "fixed" to recompute
//! depth per hop, since nothing in the surrounding code depends on depth
//! increasing and the original behavior is the observable contract.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::errors::ExporterError;
use crate::exportable::{Exportable, EntryStream};
use crate::path::{self, PathInput};
use crate::resolver;
use unixfs_exporter_interface::BlockStore;

/// Walk every hop of `input`'s path, yielding the [`Exportable`] produced at
/// each one (§4.1-§4.2). The final item is the one named by the full path.
pub async fn walk(
    input: impl Into<PathInput>,
    blocks: Arc<dyn BlockStore>,
) -> Result<Vec<Exportable>, ExporterError> {
    let parsed = path::parse(input)?;
    let starting_depth = parsed.segments.len();
    tracing::debug!(
        cid = %parsed.cid,
        segments = starting_depth,
        "walking path"
    );

    let mut cid = parsed.cid;
    let mut name = parsed.cid.to_string();
    let mut path = cid.to_string();
    let mut to_resolve = parsed.segments;

    let mut entries = Vec::new();

    loop {
        let result = resolver::resolve(
            cid,
            name.clone(),
            path.clone(),
            to_resolve.clone(),
            starting_depth,
            blocks.clone(),
        )
        .await?;

        entries.push(result.entry);

        match result.next {
            Some(next) => {
                cid = next.cid;
                name = next.name;
                path = next.path;
                to_resolve = next.to_resolve;
            }
            None => break,
        }
    }

    Ok(entries)
}

/// Resolve `input` to the single [`Exportable`] named by its full path
/// (§4.1): the last hop of [`walk`].
pub async fn export(
    input: impl Into<PathInput>,
    blocks: Arc<dyn BlockStore>,
) -> Result<Exportable, ExporterError> {
    let mut entries = walk(input, blocks).await?;
    entries
        .pop()
        .ok_or_else(|| ExporterError::input("path resolved to no entry"))
}

/// Resolve `input` and, if it names a directory, recursively flatten every
/// descendant into a single stream (§4.12), directories before the children
/// nested under them, matching `recursive_exporter`'s pre-order walk.
pub async fn export_recursive(
    input: impl Into<PathInput>,
    blocks: Arc<dyn BlockStore>,
) -> Result<EntryStream, ExporterError> {
    let root = export(input, blocks.clone()).await?;
    tracing::debug!(cid = %root.cid(), kind = ?root.kind(), "starting recursive export");
    Ok(recurse(root))
}

fn recurse(entry: Exportable) -> EntryStream {
    Box::pin(async_stream::try_stream! {
        match entry {
            Exportable::Directory(mut dir) => {
                let mut content = std::mem::replace(&mut dir.content, Box::pin(stream::empty()));
                yield Exportable::Directory(dir);

                while let Some(child) = content.next().await {
                    let child = child?;
                    let mut sub = recurse(child);
                    while let Some(item) = sub.next().await {
                        yield item?;
                    }
                }
            }
            other => yield other,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use multihash_codetable::{Code, MultihashDigest};
    use prost::Message;
    use unixfs_exporter_utils::MemoryBlockStore;

    use crate::dag_pb::PBNode;
    use crate::pb::Data;
    use crate::unixfs::{DAG_PB_CODEC, RAW_CODEC};

    fn raw_cid(data: &[u8]) -> cid::Cid {
        let mh = Code::Sha2_256.digest(data);
        cid::Cid::new_v1(RAW_CODEC, mh)
    }

    fn dag_pb_cid(data: &[u8]) -> cid::Cid {
        let mh = Code::Sha2_256.digest(data);
        cid::Cid::new_v1(DAG_PB_CODEC, mh)
    }

    fn directory_data() -> Bytes {
        let message = Data {
            r#type: 1, // Directory
            data: None,
            filesize: None,
            blocksizes: Vec::new(),
            hash_type: None,
            fanout: None,
            mtime: None,
            mode: None,
        };
        let mut buf = Vec::new();
        message.encode(&mut buf).unwrap();
        Bytes::from(buf)
    }

    #[tokio::test]
    async fn export_of_a_bare_raw_cid_returns_its_bytes_with_no_further_path() {
        let store = MemoryBlockStore::new();
        let bytes = Bytes::from_static(b"hello");
        let cid = raw_cid(&bytes);
        store.put(&cid, bytes.clone());

        let entry = export(cid, Arc::new(store)).await.unwrap();
        assert_eq!(entry.size(), 5);
        assert!(!entry.is_directory());
    }

    #[tokio::test]
    async fn export_is_idempotent_between_a_cid_and_its_string_form() {
        let store = MemoryBlockStore::new();
        let bytes = Bytes::from_static(b"hello");
        let cid = raw_cid(&bytes);
        store.put(&cid, bytes.clone());
        let blocks: Arc<dyn BlockStore> = Arc::new(store);

        let by_cid = export(cid, blocks.clone()).await.unwrap();
        let by_string = export(cid.to_string(), blocks).await.unwrap();

        assert_eq!(by_cid.cid(), by_string.cid());
        assert_eq!(by_cid.kind(), by_string.kind());
        assert_eq!(by_cid.size(), by_string.size());
    }

    #[tokio::test]
    async fn export_recursive_flattens_directory_before_its_children() {
        let store = MemoryBlockStore::new();

        let file_bytes = Bytes::from_static(b"contents");
        let file_cid = raw_cid(&file_bytes);
        store.put(&file_cid, file_bytes.clone());

        let mut dir = PBNode::new();
        dir.add_link(Some("a.txt".to_string()), file_cid, file_bytes.len() as u64);
        dir.data = Some(directory_data());
        let dir_bytes = dir.encode().unwrap();
        let dir_cid = dag_pb_cid(&dir_bytes);
        store.put(&dir_cid, dir_bytes);

        let mut entries = export_recursive(dir_cid, Arc::new(store)).await.unwrap();
        let first = entries.next().await.unwrap().unwrap();
        assert!(first.is_directory());

        let second = entries.next().await.unwrap().unwrap();
        assert_eq!(second.name(), "a.txt");

        assert!(entries.next().await.is_none());
    }
}
