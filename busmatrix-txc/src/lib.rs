//! compiles TransXChange bus schedule documents into matrix timetables.
//!
//! a [`Timetable`] is built from one TransXChange XML document and holds one
//! grouping per direction of travel. each grouping is a grid of stop rows by
//! vehicle journey columns. the grid is projected onto a service date via
//! [`Timetable::set_date`], which evaluates each journey's operating profile,
//! lays out departure columns in display order, collapses frequency runs and
//! attaches footnotes.
pub mod calendar;
pub mod corrections;
pub mod matrix;
pub mod model;
pub mod parse;
mod timetable;
mod timetable_error;

pub use timetable::{Timetable, TimetableSources};
pub use timetable_error::TimetableError;
