// Console rendering and file export of a finished dashboard.
//
// Rendering builds a `String` so the caller decides where it goes; exports
// write one CSV per table plus `summary.json`. A failed export is logged and
// the remaining files are still written.
use crate::aggregate::{CrossTab, Dimension, GroupStats};
use crate::config::{
    BUSINESS_TYPE_CHART_TOP_N, CORE_MIN_CLOSED, MANAGER_CHART_TOP_N, MANAGER_MIN_CLOSED,
};
use crate::error::Result;
use crate::reports::{
    breakdown_table, comparison_rows, crosstab_table, manager_workload_rows, win_rate_rows,
    workload_detail_rows, Dashboard,
};
use crate::types::{NormalizedRow, TableView};
use crate::util::{format_int, format_pct};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};
use tracing::{info, warn};

pub const NO_DATA: &str =
    "No data available for the selected date range. Please adjust your filters or check your CRM connection.";

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_view_csv(path: &Path, view: &TableView) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&view.headers)?;
    for r in &view.rows {
        wtr.write_record(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown table of derived rows, or a notice when there are none.
pub fn table_rows<T>(rows: &[T], empty_note: &str) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return format!("({})\n", empty_note);
    }
    let table = Table::new(rows.to_vec()).with(Style::markdown()).to_string();
    format!("{}\n", table)
}

pub fn table_view(view: &TableView, empty_note: &str) -> String {
    if view.is_empty() {
        return format!("({})\n", empty_note);
    }
    let mut builder = Builder::default();
    builder.push_record(view.headers.clone());
    for r in &view.rows {
        builder.push_record(r.clone());
    }
    let table = builder.build().with(Style::markdown()).to_string();
    format!("{}\n", table)
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n## {}\n", title);
}

fn breakdown(out: &mut String, groups: &[GroupStats], dims: &[Dimension], win_rate: bool) {
    out.push_str(&table_view(&breakdown_table(groups, dims, win_rate), "no data"));
}

fn crosstab_block(out: &mut String, tab: &CrossTab, empty_note: &str) {
    out.push_str(&table_view(&crosstab_table(tab), empty_note));
}

pub fn render_dashboard(dash: &Dashboard) -> String {
    let mut out = String::new();
    let cfg = &dash.config;
    let s = &dash.summary;

    let _ = writeln!(out, "# Renewal Opportunities Breakdown\n");
    let _ = writeln!(
        out,
        "Reporting period: {} to {}",
        s.start_date.format("%B %d, %Y"),
        s.end_date.format("%B %d, %Y")
    );

    if s.total_opportunities == 0 {
        let _ = writeln!(out, "\n{}", NO_DATA);
        return out;
    }

    heading(&mut out, "Renewal Opportunities Summary");
    let _ = writeln!(
        out,
        "Total: {} | Won: {} | Lost: {} | Open: {} | Unknown stage: {}",
        format_int(s.total_opportunities),
        format_int(s.won),
        format_int(s.lost),
        format_int(s.open),
        format_int(s.unknown)
    );
    let _ = writeln!(out, "Win rate: {}%", format_pct(s.win_rate));

    if let Some(by_category) = &dash.by_category {
        heading(&mut out, "Breakdown by Business Type Category");
        // Few enough categories that the full pivot doubles as the chart feed.
        breakdown(&mut out, &by_category.groups, &by_category.dimensions, false);
    }

    if let Some(by_type) = &dash.by_business_type {
        heading(
            &mut out,
            &format!("Breakdown by Specific Business Type (Top {})", BUSINESS_TYPE_CHART_TOP_N),
        );
        breakdown(
            &mut out,
            by_type.top_by_volume(BUSINESS_TYPE_CHART_TOP_N),
            &by_type.dimensions,
            false,
        );
        if cfg.show_tables {
            heading(&mut out, "Specific Business Type Breakdown");
            breakdown(&mut out, &by_type.groups, &by_type.dimensions, false);
        }
    }

    if let Some(managers) = &dash.managers {
        let scope = if cfg.exclude_marine { " (Excluding Marine Lines)" } else { "" };
        heading(
            &mut out,
            &format!("Breakdown by Account Manager (Top {} by Volume){}", MANAGER_CHART_TOP_N, scope),
        );
        breakdown(
            &mut out,
            managers.by_manager.top_by_volume(MANAGER_CHART_TOP_N),
            &managers.by_manager.dimensions,
            true,
        );

        heading(
            &mut out,
            &format!("Win Rate by Account Manager (Minimum {} Closed Opportunities)", MANAGER_MIN_CLOSED),
        );
        out.push_str(&table_rows(
            &win_rate_rows(&managers.win_rates),
            "Not enough data to calculate meaningful win rates by account manager.",
        ));

        if cfg.show_tables {
            heading(&mut out, &format!("Account Manager Breakdown{}", scope));
            breakdown(&mut out, &managers.by_manager.groups, &managers.by_manager.dimensions, true);
        }

        heading(&mut out, "Core Lines Analysis by Account Manager");
        let _ = writeln!(out, "Core lines: Auto, Flood, Homeowners, Umbrella\n");
        match &managers.core {
            None => {
                let _ = writeln!(
                    out,
                    "(No core lines data available for {} to {}.)",
                    s.start_date.format("%b %d, %Y"),
                    s.end_date.format("%b %d, %Y")
                );
            }
            Some(core) => {
                breakdown(
                    &mut out,
                    core.by_manager.top_by_volume(MANAGER_CHART_TOP_N),
                    &core.by_manager.dimensions,
                    true,
                );

                heading(
                    &mut out,
                    &format!("Core Lines Win Rate by Account Manager (Minimum {} Closed)", CORE_MIN_CLOSED),
                );
                out.push_str(&table_rows(
                    &win_rate_rows(&core.win_rates),
                    "Not enough core lines data to calculate meaningful win rates by account manager.",
                ));

                heading(&mut out, "Core Lines vs All Lines Win Rate Comparison");
                out.push_str(&table_rows(
                    &comparison_rows(&core.comparison),
                    "Not enough data for win rate comparison between all lines and core lines.",
                ));

                if cfg.show_tables {
                    heading(&mut out, "Core Lines Breakdown by Account Manager");
                    breakdown(&mut out, &core.by_manager.groups, &core.by_manager.dimensions, true);
                }

                heading(
                    &mut out,
                    &format!(
                        "Core Lines Workload Allocation by {}",
                        core.workload.granularity.label()
                    ),
                );
                let _ = writeln!(
                    out,
                    "Flood policies count as 0.5, all other core lines count as 1.0\n"
                );
                out.push_str(&table_rows(&workload_detail_rows(&core.workload), "no data"));

                heading(
                    &mut out,
                    &format!(
                        "Account Manager Workload Summary ({} - {})",
                        s.start_date.format("%b %d, %Y"),
                        s.end_date.format("%b %d, %Y")
                    ),
                );
                out.push_str(&table_rows(&manager_workload_rows(&core.workload), "no data"));
            }
        }
    }

    heading(&mut out, "Breakdown by Renewal Type");
    breakdown(
        &mut out,
        &dash.by_renewal_type.groups,
        &dash.by_renewal_type.dimensions,
        false,
    );

    if let Some(combined) = &dash.combined {
        heading(&mut out, "Combined Analysis: Business Type Category & Account Manager");
        crosstab_block(
            &mut out,
            &combined.managers_by_category,
            "Not enough data for combined category analysis.",
        );
        heading(&mut out, "Combined Analysis: Specific Business Type & Account Manager");
        crosstab_block(
            &mut out,
            &combined.managers_by_type,
            "Not enough data for combined analysis.",
        );
    }

    heading(
        &mut out,
        &format!("Win Rate by Business Type Category (Minimum {} Closed)", MANAGER_MIN_CLOSED),
    );
    out.push_str(&table_rows(
        &win_rate_rows(&dash.category_win_rates),
        "Not enough data to calculate meaningful win rates by business type category.",
    ));

    heading(&mut out, "Monthly Renewal Trends");
    out.push_str(&table_view(
        &breakdown_table(&dash.monthly_status, &[Dimension::CloseMonth], false),
        "no data",
    ));
    heading(&mut out, "Monthly Trends by Business Type Category");
    crosstab_block(&mut out, &dash.monthly_by_category, "no data");

    out
}

/// Write every full table, the normalized rows and `summary.json` into `dir`.
/// Returns the number of files written.
pub fn export_dashboard(dir: &Path, dash: &Dashboard, rows: &[NormalizedRow]) -> Result<usize> {
    std::fs::create_dir_all(dir)?;
    let mut written = 0usize;
    let mut record = |name: &str, res: Result<()>| match res {
        Ok(()) => written += 1,
        Err(e) => warn!(file = name, error = %e, "export failed"),
    };

    record("raw_data.csv", write_csv(&dir.join("raw_data.csv"), rows));
    record("summary.json", write_json(&dir.join("summary.json"), &dash.summary));

    if let Some(by_category) = &dash.by_category {
        let view = breakdown_table(&by_category.groups, &by_category.dimensions, false);
        record(
            "business_category_breakdown.csv",
            write_view_csv(&dir.join("business_category_breakdown.csv"), &view),
        );
    }
    if let Some(by_type) = &dash.by_business_type {
        let view = breakdown_table(&by_type.groups, &by_type.dimensions, false);
        record(
            "business_type_breakdown.csv",
            write_view_csv(&dir.join("business_type_breakdown.csv"), &view),
        );
    }
    if let Some(managers) = &dash.managers {
        let view = breakdown_table(&managers.by_manager.groups, &managers.by_manager.dimensions, true);
        record(
            "account_manager_breakdown.csv",
            write_view_csv(&dir.join("account_manager_breakdown.csv"), &view),
        );
        record(
            "manager_win_rates.csv",
            write_csv(&dir.join("manager_win_rates.csv"), &win_rate_rows(&managers.win_rates)),
        );
        if let Some(core) = &managers.core {
            let view = breakdown_table(&core.by_manager.groups, &core.by_manager.dimensions, true);
            record(
                "core_lines_breakdown.csv",
                write_view_csv(&dir.join("core_lines_breakdown.csv"), &view),
            );
            record(
                "core_win_rates.csv",
                write_csv(&dir.join("core_win_rates.csv"), &win_rate_rows(&core.win_rates)),
            );
            record(
                "core_vs_all_win_rates.csv",
                write_csv(&dir.join("core_vs_all_win_rates.csv"), &comparison_rows(&core.comparison)),
            );
            record(
                "workload_detail.csv",
                write_csv(&dir.join("workload_detail.csv"), &workload_detail_rows(&core.workload)),
            );
            record(
                "workload_summary.csv",
                write_csv(&dir.join("workload_summary.csv"), &manager_workload_rows(&core.workload)),
            );
        }
    }

    let view = breakdown_table(&dash.by_renewal_type.groups, &dash.by_renewal_type.dimensions, false);
    record(
        "renewal_type_breakdown.csv",
        write_view_csv(&dir.join("renewal_type_breakdown.csv"), &view),
    );
    if let Some(combined) = &dash.combined {
        record(
            "manager_by_category.csv",
            write_view_csv(
                &dir.join("manager_by_category.csv"),
                &crosstab_table(&combined.managers_by_category),
            ),
        );
        record(
            "manager_by_business_type.csv",
            write_view_csv(
                &dir.join("manager_by_business_type.csv"),
                &crosstab_table(&combined.managers_by_type),
            ),
        );
    }
    record(
        "category_win_rates.csv",
        write_csv(&dir.join("category_win_rates.csv"), &win_rate_rows(&dash.category_win_rates)),
    );
    record(
        "monthly_status.csv",
        write_view_csv(
            &dir.join("monthly_status.csv"),
            &breakdown_table(&dash.monthly_status, &[Dimension::CloseMonth], false),
        ),
    );
    record(
        "monthly_by_category.csv",
        write_view_csv(
            &dir.join("monthly_by_category.csv"),
            &crosstab_table(&dash.monthly_by_category),
        ),
    );

    info!(dir = %dir.display(), files = written, "exported report tables");
    Ok(written)
}
