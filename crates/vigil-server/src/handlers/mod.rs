pub mod exporter;
pub mod targets;

pub use exporter::*;
pub use targets::*;
