//! Streaming reconstruction of file content from an arbitrarily unbalanced
//! DAG-PB tree (§4.9), in bounded memory proportional to tree depth.
//!
//! Grounded on `py_unix_fs_exporter/content.py`'s `_walk_dag`: an explicit
//! LIFO stack of deferred link slices rather than recursion, so the
//! traversal state lives on the heap (one `Vec<PBLink>` per pending level)
//! instead of the call stack.

use std::sync::Arc;

use cid::Cid;

use crate::dag_pb::{PBLink, PBNode};
use crate::errors::ExporterError;
use crate::exportable::ByteStream;
use crate::unixfs::{UnixFsNode, DAG_PB_CODEC, RAW_CODEC};
use unixfs_exporter_interface::BlockStore;

/// Build the lazy byte stream for a FILE exportable (§4.9, §4.11). Validates
/// `len(block_sizes) == len(links)` at every dag-pb node visited, and that
/// the total bytes emitted equal `root_unix_fs.file_size()` once the stream
/// is driven to exhaustion (§7, §8 "Size law"). Partial consumption never
/// triggers that check (§5).
pub fn file_content(
    root_cid: Cid,
    root_node: PBNode,
    root_unix_fs: UnixFsNode,
    blocks: Arc<dyn BlockStore>,
) -> ByteStream {
    Box::pin(async_stream::try_stream! {
        if root_unix_fs.block_sizes.len() != root_node.links.len() {
            Err(ExporterError::content_extraction(
                root_cid,
                "inconsistent block sizes and dag links",
            ))?;
        }

        let expected_size = root_unix_fs.file_size();
        let mut read: u64 = 0;

        if let Some(data) = &root_unix_fs.data {
            if !data.is_empty() {
                read += data.len() as u64;
                yield data.clone();
            }
        }

        let mut stack: Vec<Vec<PBLink>> = vec![root_node.links.clone()];

        'outer: while let Some(links) = stack.pop() {
            let mut i = 0;
            while i < links.len() {
                let link = &links[i];
                let child_cid = link
                    .hash
                    .ok_or_else(|| ExporterError::structural(root_cid, "link missing cid"))?;

                match child_cid.codec() {
                    RAW_CODEC => {
                        let block = blocks.get(&child_cid).await?;
                        read += block.len() as u64;
                        yield block;
                        i += 1;
                    }
                    DAG_PB_CODEC => {
                        let block = blocks.get(&child_cid).await?;
                        let child_node = PBNode::decode(&block).map_err(|e| {
                            ExporterError::structural(child_cid, format!("dag-pb decode: {e}"))
                        })?;
                        let child_data = child_node.data.clone().ok_or_else(|| {
                            ExporterError::structural(child_cid, "missing unixfs data")
                        })?;
                        let child_unix_fs = UnixFsNode::decode(&child_data)
                            .map_err(|e| ExporterError::structural(child_cid, e))?;

                        if child_unix_fs.block_sizes.len() != child_node.links.len() {
                            Err(ExporterError::content_extraction(
                                child_cid,
                                "inconsistent block sizes and dag links",
                            ))?;
                        }

                        if let Some(data) = &child_unix_fs.data {
                            if !data.is_empty() {
                                read += data.len() as u64;
                                yield data.clone();
                            }
                        }

                        let remaining = links[i + 1..].to_vec();
                        stack.push(remaining);
                        stack.push(child_node.links.clone());
                        continue 'outer;
                    }
                    other => {
                        Err(ExporterError::traversal(child_cid, other))?;
                    }
                }
            }
        }

        if read != expected_size {
            Err(ExporterError::content_extraction(
                root_cid,
                format!("expected to read {expected_size} bytes but read {read}"),
            ))?;
        }
    })
}
