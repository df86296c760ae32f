//! Table transformations: consolidation across files and key partitioning.

mod consolidate;
mod partition;

pub use consolidate::{ColumnLayout, Consolidation, Consolidator, SOURCE_FILE_COLUMN};
pub use partition::{write_partitions, ClassificationKey};
