// Topic keywords, curated names and the per-cluster summary table.

pub mod labels;
pub mod names;
pub mod spelling;
pub mod summary;
