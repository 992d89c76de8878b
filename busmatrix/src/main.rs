//! command line tool for compiling TransXChange bus schedule documents into
//! matrix timetables and printing them as plain text.
use clap::Parser;

mod app;
mod operation;
mod render;

fn main() {
    env_logger::init();
    let args = app::BusmatrixApp::parse();
    if let Err(message) = args.op.run() {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}
