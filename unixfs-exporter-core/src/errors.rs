//! The exporter core raises the error surface defined by
//! `unixfs_exporter_interface`; nothing here is specific to the read path, so
//! this module only re-exports it under the path the rest of the crate uses.

pub use unixfs_exporter_interface::ExporterError;

pub type Result<T> = std::result::Result<T, ExporterError>;
