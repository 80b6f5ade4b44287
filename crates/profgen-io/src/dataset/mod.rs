//! Arrow IPC dataset directories for profile and inflow outputs.

pub mod manifest;
pub mod reader;
pub mod writer;

pub use manifest::{
    compute_sha256, source_info, DatasetKind, DatasetManifest, SourceInfo, TableInfo,
};
pub use reader::DatasetReader;
pub use writer::DatasetWriter;
