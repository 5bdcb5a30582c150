//! Generated UnixFS `Data` protobuf message.
//!
//! The actual message types are produced at build time by `build.rs` from
//! `proto/unixfs.proto` via `prost-build`; this module just pulls the
//! generated code into the crate under a stable path.

include!(concat!(env!("OUT_DIR"), "/unixfs.pb.rs"));
