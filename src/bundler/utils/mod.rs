//! Filesystem and archive helpers shared by the pipeline steps.

pub mod archive;
pub mod fs;
