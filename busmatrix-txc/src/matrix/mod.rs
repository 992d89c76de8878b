//! the timetable grid: stable rows merged from journey patterns, journey
//! columns, frequency cells and footnote spans.
mod alignment_ops;
mod cell;
mod column_foot;
mod compaction_ops;
mod grouping;
mod row;

pub use alignment_ops::{edit_script, merge_visits, EditOp, MergeOutcome};
pub use cell::Cell;
pub use column_foot::ColumnFoot;
pub use compaction_ops::{abbreviate_columns, append_column, build_column_feet};
pub use grouping::{Grouping, GroupingId};
pub use row::{Row, RowEntry, RowId, RowList};
