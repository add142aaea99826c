use crate::aggregate::{
    aggregate, crosstab, win_rate, AggregateOptions, AggregationResult, CrossTab, Dimension,
    GroupStats,
};
use crate::classifier::is_marine_line;
use crate::config::{ReportConfig, CORE_MIN_CLOSED, CROSSTAB_TOP_N, MANAGER_MIN_CLOSED};
use crate::types::{
    ComparisonRow, CoreLine, ManagerWorkloadRow, NormalizedRow, StageCategory, SummaryStats,
    TableView, WinRateRow, WorkloadDetailRow,
};
use crate::util::{format_pct, round1};
use crate::workload::{allocate_workload, core_line_rows, WorkloadResult};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Everything one report run produces, section by section. Sections the
/// selected view hides are `None`.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub config: ReportConfig,
    pub summary: SummaryStats,
    pub by_category: Option<AggregationResult>,
    pub by_business_type: Option<AggregationResult>,
    pub managers: Option<ManagerSection>,
    pub by_renewal_type: AggregationResult,
    pub combined: Option<CombinedSection>,
    pub category_win_rates: Vec<GroupStats>,
    pub monthly_status: Vec<GroupStats>,
    pub monthly_by_category: CrossTab,
}

#[derive(Debug, Clone)]
pub struct ManagerSection {
    pub by_manager: AggregationResult,
    pub win_rates: Vec<GroupStats>,
    pub core: Option<CoreLinesSection>,
}

#[derive(Debug, Clone)]
pub struct CoreLinesSection {
    pub by_manager: AggregationResult,
    pub win_rates: Vec<GroupStats>,
    pub comparison: Vec<WinRateComparison>,
    pub workload: WorkloadResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WinRateComparison {
    pub manager: String,
    pub all_lines: f64,
    pub core_lines: f64,
    /// `core_lines - all_lines`.
    pub difference: f64,
}

#[derive(Debug, Clone)]
pub struct CombinedSection {
    pub managers_by_category: CrossTab,
    pub managers_by_type: CrossTab,
}

pub fn summarize(rows: &[NormalizedRow], start: NaiveDate, end: NaiveDate) -> SummaryStats {
    let count = |c: StageCategory| rows.iter().filter(|r| r.stage_category == c).count();
    let won = count(StageCategory::Won);
    let lost = count(StageCategory::Lost);
    SummaryStats {
        start_date: start,
        end_date: end,
        total_opportunities: rows.len(),
        won,
        lost,
        open: count(StageCategory::Open),
        unknown: count(StageCategory::Unknown),
        win_rate: win_rate(won, lost),
    }
}

/// Win rates of managers present in both pivots with enough closed
/// opportunities in each, largest core-lines advantage first.
pub fn compare_win_rates(
    all_lines: &AggregationResult,
    core_lines: &AggregationResult,
    min_closed: usize,
) -> Vec<WinRateComparison> {
    let by_name: HashMap<&str, &GroupStats> = core_lines
        .groups
        .iter()
        .filter_map(|g| g.key.first().map(|k| (k.as_str(), g)))
        .collect();

    let mut out: Vec<WinRateComparison> = all_lines
        .groups
        .iter()
        .filter(|g| g.closed() >= min_closed)
        .filter_map(|all| {
            let manager = all.key.first()?;
            let core = by_name.get(manager.as_str())?;
            if core.closed() < min_closed {
                return None;
            }
            Some(WinRateComparison {
                manager: manager.clone(),
                all_lines: all.win_rate,
                core_lines: core.win_rate,
                difference: round1(core.win_rate - all.win_rate),
            })
        })
        .collect();
    out.sort_by(|a, b| {
        b.difference
            .total_cmp(&a.difference)
            .then_with(|| a.manager.cmp(&b.manager))
    });
    out
}

pub fn build_dashboard(rows: &[NormalizedRow], config: &ReportConfig) -> Dashboard {
    let opts = AggregateOptions {
        percentages: config.show_percentages,
    };
    let view = config.view;

    let by_category = view
        .shows_categories()
        .then(|| aggregate(rows, &[Dimension::BusinessCategory], opts));

    let business_types = (view.shows_business_types() || view.shows_combined())
        .then(|| aggregate(rows, &[Dimension::BusinessType], opts));

    let managers = view.shows_managers().then(|| build_manager_section(rows, config, opts));

    let combined = if view.shows_combined() {
        match (&managers, &business_types) {
            (Some(m), Some(types)) => Some(build_combined(rows, &m.by_manager, types)),
            _ => None,
        }
    } else {
        None
    };

    let category_win_rates = aggregate(rows, &[Dimension::BusinessCategory], opts)
        .win_rate_ranking(MANAGER_MIN_CLOSED);

    let dashboard = Dashboard {
        config: config.clone(),
        summary: summarize(rows, config.start, config.end),
        by_category,
        by_business_type: business_types.filter(|_| view.shows_business_types()),
        managers,
        by_renewal_type: aggregate(rows, &[Dimension::RenewalType], opts),
        combined,
        category_win_rates,
        monthly_status: aggregate(rows, &[Dimension::CloseMonth], opts).sorted_by_key(),
        monthly_by_category: crosstab(
            rows,
            Dimension::CloseMonth,
            Dimension::BusinessCategory,
            None,
            None,
        ),
    };
    debug!(
        rows = rows.len(),
        manager_view = dashboard.managers.is_some(),
        "dashboard assembled"
    );
    dashboard
}

fn build_manager_section(
    rows: &[NormalizedRow],
    config: &ReportConfig,
    opts: AggregateOptions,
) -> ManagerSection {
    let by_manager = if config.exclude_marine {
        let kept: Vec<NormalizedRow> = rows
            .iter()
            .filter(|r| !is_marine_line(&r.business_type))
            .cloned()
            .collect();
        aggregate(&kept, &[Dimension::AccountManager], opts)
    } else {
        aggregate(rows, &[Dimension::AccountManager], opts)
    };
    let win_rates = by_manager.win_rate_ranking(MANAGER_MIN_CLOSED);

    let core_rows: Vec<NormalizedRow> = core_line_rows(rows).into_iter().cloned().collect();
    let core = if core_rows.is_empty() {
        None
    } else {
        let core_by_manager = aggregate(&core_rows, &[Dimension::AccountManager], opts);
        Some(CoreLinesSection {
            win_rates: core_by_manager.win_rate_ranking(CORE_MIN_CLOSED),
            comparison: compare_win_rates(&by_manager, &core_by_manager, CORE_MIN_CLOSED),
            by_manager: core_by_manager,
            workload: allocate_workload(&core_rows, config.start, config.end),
        })
    };

    ManagerSection {
        by_manager,
        win_rates,
        core,
    }
}

fn build_combined(
    rows: &[NormalizedRow],
    by_manager: &AggregationResult,
    by_type: &AggregationResult,
) -> CombinedSection {
    let top_managers = by_manager.top_labels(CROSSTAB_TOP_N);
    let top_types = by_type.top_labels(CROSSTAB_TOP_N);
    CombinedSection {
        managers_by_category: crosstab(
            rows,
            Dimension::AccountManager,
            Dimension::BusinessCategory,
            Some(top_managers.as_slice()),
            None,
        ),
        managers_by_type: crosstab(
            rows,
            Dimension::AccountManager,
            Dimension::BusinessType,
            Some(top_managers.as_slice()),
            Some(top_types.as_slice()),
        ),
    }
}

// ---------------------------------------------------------------------------
// Display rows
// ---------------------------------------------------------------------------

fn pct(x: f64) -> String {
    format_pct(x)
}

/// Pivot table with optional percentage and win-rate columns.
pub fn breakdown_table(groups: &[GroupStats], dims: &[Dimension], with_win_rate: bool) -> TableView {
    let with_pct = groups.iter().any(|g| g.percentages.is_some());
    let mut headers: Vec<String> = dims.iter().map(|d| d.label().to_string()).collect();
    for name in ["Won", "Lost", "Open"] {
        headers.push(name.to_string());
        if with_pct {
            headers.push(format!("{} %", name));
        }
    }
    headers.push("Total".to_string());
    if with_win_rate {
        headers.push("Win Rate %".to_string());
    }

    let mut table = TableView::new(headers);
    for g in groups {
        let mut row = g.key.clone();
        let p = g.percentages;
        row.push(g.won.to_string());
        if let Some(p) = p {
            row.push(pct(p.won));
        }
        row.push(g.lost.to_string());
        if let Some(p) = p {
            row.push(pct(p.lost));
        }
        row.push(g.open.to_string());
        if let Some(p) = p {
            row.push(pct(p.open));
        }
        row.push(g.total.to_string());
        if with_win_rate {
            row.push(pct(g.win_rate));
        }
        table.rows.push(row);
    }
    table
}

pub fn win_rate_rows(groups: &[GroupStats]) -> Vec<WinRateRow> {
    groups
        .iter()
        .map(|g| WinRateRow {
            label: g.label(),
            won: g.won,
            lost: g.lost,
            total_closed: g.closed(),
            win_rate: pct(g.win_rate),
        })
        .collect()
}

pub fn comparison_rows(comparison: &[WinRateComparison]) -> Vec<ComparisonRow> {
    comparison
        .iter()
        .map(|c| ComparisonRow {
            account_manager: c.manager.clone(),
            all_lines_win_rate: pct(c.all_lines),
            core_lines_win_rate: pct(c.core_lines),
            difference: pct(c.difference),
        })
        .collect()
}

pub fn workload_detail_rows(workload: &WorkloadResult) -> Vec<WorkloadDetailRow> {
    workload
        .buckets
        .iter()
        .map(|b| WorkloadDetailRow {
            account_manager: b.manager.clone(),
            period: b.bucket.clone(),
            homeowners: b.count(CoreLine::Homeowners),
            flood: b.count(CoreLine::Flood),
            auto: b.count(CoreLine::Auto),
            umbrella: b.count(CoreLine::Umbrella),
            total_count: b.total_count,
            weighted_total: pct(b.weighted_total),
        })
        .collect()
}

pub fn manager_workload_rows(workload: &WorkloadResult) -> Vec<ManagerWorkloadRow> {
    workload
        .managers
        .iter()
        .map(|m| ManagerWorkloadRow {
            account_manager: m.manager.clone(),
            total_policies: m.total_count,
            weighted_total: pct(m.weighted_total),
            workload_reduction: pct(m.workload_reduction),
        })
        .collect()
}

pub fn crosstab_table(tab: &CrossTab) -> TableView {
    let mut headers = vec![tab.row_dim.label().to_string()];
    headers.extend(tab.columns.iter().cloned());
    let mut table = TableView::new(headers);
    for (label, cells) in tab.rows.iter().zip(&tab.cells) {
        let mut row = vec![label.clone()];
        row.extend(cells.iter().map(|c| c.to_string()));
        table.rows.push(row);
    }
    table
}
