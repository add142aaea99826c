// Command-line surface: turns flags into a `ReportConfig`, runs the fetch ->
// normalize -> aggregate pipeline once and prints the result.
use crate::config::{resolve_date_range, Period, ReportConfig, ViewBy};
use crate::error::{ReportError, Result};
use crate::gateway::{fetch_or_empty, CsvExportGateway};
use crate::normalizer::normalize_all;
use crate::output::{export_dashboard, render_dashboard};
use crate::reports::build_dashboard;
use crate::util::{format_int, parse_date_safe};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "renewal-report",
    about = "Renewal opportunities breakdown from CRM exports",
    after_help = "Examples:\n  renewal-report --period last-quarter\n  renewal-report --start 2024-01-01 --end 2024-06-30 --view account-manager --out-dir out"
)]
pub struct Cli {
    /// Opportunity export (Id, StageName, Type, AccountManagerId, New_Business_or_Renewal__c, CloseDate, AccountName)
    #[arg(long, default_value = "opportunities.csv")]
    pub opportunities: PathBuf,

    /// Producer export (Id, Name, FirstName, LastName)
    #[arg(long, default_value = "producers.csv")]
    pub producers: PathBuf,

    /// Predefined window, ignored when --start/--end are given
    #[arg(long, value_enum)]
    pub period: Option<Period>,

    /// Custom window start (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Custom window end (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    /// Reference date for predefined periods (defaults to today)
    #[arg(long)]
    pub today: Option<String>,

    #[arg(long, value_enum, default_value = "both")]
    pub view: ViewBy,

    /// Hide the full data tables, keep the chart summaries
    #[arg(long)]
    pub no_tables: bool,

    /// Leave out percentage columns
    #[arg(long)]
    pub no_percentages: bool,

    /// Drop marine lines from the account manager breakdown
    #[arg(long)]
    pub exclude_marine: bool,

    /// Write every table as CSV plus summary.json into this directory
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

fn parse_date_arg(value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(v) => parse_date_safe(Some(v))
            .map(Some)
            .ok_or_else(|| ReportError::InvalidDate(v.to_string())),
    }
}

impl Cli {
    pub fn to_config(&self) -> Result<ReportConfig> {
        let today = parse_date_arg(self.today.as_deref())?.unwrap_or_else(|| Local::now().date_naive());
        let (start, end) = resolve_date_range(
            self.period,
            parse_date_arg(self.start.as_deref())?,
            parse_date_arg(self.end.as_deref())?,
            today,
        )?;
        Ok(ReportConfig {
            start,
            end,
            view: self.view,
            show_tables: !self.no_tables,
            show_percentages: !self.no_percentages,
            exclude_marine: self.exclude_marine,
        })
    }
}

pub fn run(cli: &Cli) -> Result<()> {
    let config = cli.to_config()?;
    info!(start = %config.start, end = %config.end, view = ?config.view, "building renewal report");

    let gateway = CsvExportGateway::new(&cli.opportunities, &cli.producers);
    let fetched = fetch_or_empty(&gateway, config.start, config.end);
    if let Some(warning) = &fetched.warning {
        eprintln!("Warning: {}", warning);
    }

    let rows = normalize_all(&fetched.records, &fetched.producers);
    info!(rows = %format_int(rows.len()), "normalized records");

    let dashboard = build_dashboard(&rows, &config);
    println!("{}", render_dashboard(&dashboard));

    if let Some(dir) = &cli.out_dir {
        let written = export_dashboard(dir, &dashboard, &rows)?;
        println!("(Full tables exported to {}: {} files)", dir.display(), written);
    }
    Ok(())
}
