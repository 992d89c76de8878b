use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use busmatrix_txc::calendar::BankHolidayCalendar;
use busmatrix_txc::corrections::Corrections;
use busmatrix_txc::model::{Stop, StopDirectory};
use busmatrix_txc::{Timetable, TimetableSources};
use chrono::NaiveDate;
use clap::{value_parser, Subcommand};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::render;

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum Operation {
    /// print service metadata and grouping structure for a document
    Summary {
        /// a TransXChange XML document
        file: PathBuf,
    },
    /// compile the matrix timetable for a date and print it
    Show {
        /// a TransXChange XML document
        file: PathBuf,
        /// the service date to project the grid onto
        #[arg(long, value_parser = value_parser!(NaiveDate))]
        date: NaiveDate,
        /// CSV stop directory with atco_code,common_name,locality columns
        #[arg(long)]
        stops: Option<PathBuf>,
        /// CSV bank holiday table with date,name columns
        #[arg(long)]
        bank_holidays: Option<PathBuf>,
        /// JSON correction table
        #[arg(long)]
        corrections: Option<PathBuf>,
    },
}

impl Operation {
    pub fn run(&self) -> Result<(), String> {
        match self {
            Operation::Summary { file } => summary(file),
            Operation::Show {
                file,
                date,
                stops,
                bank_holidays,
                corrections,
            } => show(
                file,
                *date,
                stops.as_deref(),
                bank_holidays.as_deref(),
                corrections.as_deref(),
            ),
        }
    }
}

fn summary(file: &Path) -> Result<(), String> {
    let timetable = Timetable::from_path(file, &TimetableSources::default(), None)
        .map_err(|e| e.to_string())?;
    println!("service:  {}", timetable.service_code);
    println!("mode:     {}", timetable.mode.as_deref().unwrap_or("unknown"));
    if let Some(operator) = &timetable.operator {
        println!(
            "operator: {}",
            operator.name.as_deref().unwrap_or(&operator.id)
        );
    }
    println!("route:    {}", timetable.description);
    if let Some(period) = &timetable.operating_period {
        println!("period:   {}", period.0);
    }
    println!(
        "patterns: {}, journeys: {}",
        timetable.patterns.len(),
        timetable.journeys.len()
    );
    if timetable.alignment_conflicts > 0 {
        println!("warning:  {} stop order conflicts", timetable.alignment_conflicts);
    }
    for grouping in timetable.active_groupings() {
        println!(
            "  {}: {} stops, {} journeys",
            timetable.label(grouping),
            grouping.rows.len(),
            grouping.journeys.len()
        );
    }
    Ok(())
}

fn show(
    file: &Path,
    date: NaiveDate,
    stops: Option<&Path>,
    bank_holidays: Option<&Path>,
    corrections: Option<&Path>,
) -> Result<(), String> {
    let stops = stops.map(load_stops).transpose()?;
    if let Some(stops) = &stops {
        debug!("loaded {} stop directory records", stops.len());
    }
    let bank_holidays = bank_holidays
        .map(|path| BankHolidayCalendar::from_csv_path(path).map_err(|e| e.to_string()))
        .transpose()?;
    if let Some(calendar) = &bank_holidays {
        debug!("loaded {} bank holiday dates", calendar.len());
    }
    let corrections = corrections
        .map(|path| Corrections::from_json_path(path).map_err(|e| e.to_string()))
        .transpose()?;
    let sources = TimetableSources {
        stops: stops.as_ref().map(|directory| directory as &dyn StopDirectory),
        operators: None,
        bank_holidays: bank_holidays.as_ref(),
        corrections: corrections.as_ref(),
    };
    let timetable =
        Timetable::from_path(file, &sources, Some(date)).map_err(|e| e.to_string())?;
    print!("{}", render::render(&timetable));
    Ok(())
}

fn load_stops(path: &Path) -> Result<HashMap<String, Arc<Stop>>, String> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| e.to_string())?;
    let mut stops = HashMap::new();
    for row in reader.deserialize() {
        let stop: Stop = row.map_err(|e| e.to_string())?;
        stops.insert(stop.atco_code.clone(), Arc::new(stop));
    }
    Ok(stops)
}
