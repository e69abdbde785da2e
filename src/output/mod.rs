mod report;
mod summary;

pub use report::{capability_lists, write_report, DecompositionReport, SubtaskRecord};
pub use summary::{analyze_diversity, write_diversity};
