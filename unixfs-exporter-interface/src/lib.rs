//! # UnixFS Exporter Interface
//!
//! The narrow capability surface the exporter core needs from its host: a way
//! to fetch a block by [`cid::Cid`], and a typed error enum describing
//! everything that can go wrong while resolving a path or reconstructing file
//! content.
//!
//! This crate intentionally does not know about networking, pinning, or
//! mutation — see `unixfs-exporter-core` for the read path and
//! `unixfs-exporter-utils` for concrete [`BlockStore`] implementations.

pub mod blocks;
pub mod errors;

use std::future::Future;
use std::pin::Pin;

use futures::Stream;

pub use blocks::*;
pub use errors::*;

/// A boxed, pinned stream — the shape every lazy exporter output takes.
pub type AwaitIterable<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// A boxed, pinned future.
pub type Await<T> = Pin<Box<dyn Future<Output = T> + Send>>;
