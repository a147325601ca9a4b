//! Edges of the crate: the wire envelope and the file formats the CLI reads.

pub mod csv;
pub mod json;
pub mod wire;
