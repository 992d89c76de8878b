use clap::Parser;

use crate::operation::Operation;

/// command line tool for rendering TransXChange bus schedules as matrix timetables
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct BusmatrixApp {
    #[command(subcommand)]
    pub op: Operation,
}
