use std::fmt::Display;

use chrono::Duration;

/// a frequency cell replacing a run of evenly-spaced columns: journeys
/// repeat every `interval` until the times in the column after the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// number of collapsed journey columns.
    pub colspan: usize,
    /// number of stop rows the cell spans.
    pub rowspan: usize,
    pub interval: Duration,
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let seconds = self.interval.num_seconds();
        if seconds == 3600 {
            write!(f, "then hourly until")
        } else if seconds % 3600 == 0 {
            write!(f, "then every {} hours until", seconds / 3600)
        } else {
            write!(f, "then every {} minutes until", seconds / 60)
        }
    }
}
