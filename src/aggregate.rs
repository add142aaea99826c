// Count pivots over normalized rows.
//
// Every breakdown in the report is the same operation: partition rows by one
// or more dimensions, count Won/Lost/Open per partition, derive totals,
// percentages and a win rate. Ordering is fixed here so every view ranks
// groups the same way.
use crate::types::{NormalizedRow, StageCategory};
use crate::util::percentage;
use std::collections::{BTreeMap, BTreeSet};

/// A column rows can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    StageCategory,
    RenewalType,
    BusinessType,
    BusinessCategory,
    AccountManager,
    /// `YYYY-MM` of the close date; undated rows have no value.
    CloseMonth,
}

impl Dimension {
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::StageCategory => "Status",
            Dimension::RenewalType => "Renewal Type",
            Dimension::BusinessType => "Business Type",
            Dimension::BusinessCategory => "Business Type Category",
            Dimension::AccountManager => "Account Manager",
            Dimension::CloseMonth => "Month",
        }
    }

    pub fn value_of(&self, row: &NormalizedRow) -> Option<String> {
        match self {
            Dimension::StageCategory => Some(row.stage_category.as_str().to_string()),
            Dimension::RenewalType => Some(row.renewal_type.clone()),
            Dimension::BusinessType => Some(row.business_type.clone()),
            Dimension::BusinessCategory => Some(row.business_category.as_str().to_string()),
            Dimension::AccountManager => Some(row.account_manager.clone()),
            Dimension::CloseMonth => row.close_date.map(|d| d.format("%Y-%m").to_string()),
        }
    }
}

pub type GroupKey = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentages {
    pub won: f64,
    pub lost: f64,
    pub open: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub key: GroupKey,
    pub won: usize,
    pub lost: usize,
    pub open: usize,
    pub total: usize,
    pub percentages: Option<Percentages>,
    pub win_rate: f64,
}

impl GroupStats {
    fn from_counts(key: GroupKey, won: usize, lost: usize, open: usize, with_pct: bool) -> Self {
        let total = won + lost + open;
        let percentages = with_pct.then(|| Percentages {
            won: percentage(won, total),
            lost: percentage(lost, total),
            open: percentage(open, total),
        });
        Self {
            key,
            won,
            lost,
            open,
            total,
            percentages,
            win_rate: win_rate(won, lost),
        }
    }

    /// Opportunities with a final outcome.
    pub fn closed(&self) -> usize {
        self.won + self.lost
    }

    pub fn label(&self) -> String {
        self.key.join(" / ")
    }
}

/// `won / (won + lost) * 100`, one decimal; 0 when nothing has closed.
pub fn win_rate(won: usize, lost: usize) -> f64 {
    percentage(won, won + lost)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    pub percentages: bool,
}

/// Groups ordered by volume: `total` descending, then key ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub dimensions: Vec<Dimension>,
    pub groups: Vec<GroupStats>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn get(&self, key: &[&str]) -> Option<&GroupStats> {
        self.groups
            .iter()
            .find(|g| g.key.iter().map(String::as_str).eq(key.iter().copied()))
    }

    /// The chart-feeding subset. The full table stays in `groups`.
    pub fn top_by_volume(&self, n: usize) -> &[GroupStats] {
        &self.groups[..n.min(self.groups.len())]
    }

    /// First dimension value of the top `n` groups.
    pub fn top_labels(&self, n: usize) -> Vec<String> {
        self.top_by_volume(n)
            .iter()
            .filter_map(|g| g.key.first().cloned())
            .collect()
    }

    /// Groups with at least `min_closed` closed opportunities, best win
    /// rate first, ties by key.
    pub fn win_rate_ranking(&self, min_closed: usize) -> Vec<GroupStats> {
        let mut ranked: Vec<GroupStats> = self
            .groups
            .iter()
            .filter(|g| g.closed() >= min_closed)
            .cloned()
            .collect();
        ranked.sort_by(|a, b| {
            b.win_rate
                .total_cmp(&a.win_rate)
                .then_with(|| a.key.cmp(&b.key))
        });
        ranked
    }

    /// Groups in key order, for time series.
    pub fn sorted_by_key(&self) -> Vec<GroupStats> {
        let mut groups = self.groups.clone();
        groups.sort_by(|a, b| a.key.cmp(&b.key));
        groups
    }
}

/// Pivot `rows` by `dims`.
///
/// Rows with an Unknown stage count towards no group, and rows lacking a
/// value for one of the dimensions are left out.
pub fn aggregate(
    rows: &[NormalizedRow],
    dims: &[Dimension],
    options: AggregateOptions,
) -> AggregationResult {
    #[derive(Default)]
    struct Acc {
        won: usize,
        lost: usize,
        open: usize,
    }

    let mut map: BTreeMap<GroupKey, Acc> = BTreeMap::new();
    for row in rows {
        if row.stage_category == StageCategory::Unknown {
            continue;
        }
        let Some(key) = dims
            .iter()
            .map(|d| d.value_of(row))
            .collect::<Option<GroupKey>>()
        else {
            continue;
        };
        let acc = map.entry(key).or_default();
        match row.stage_category {
            StageCategory::Won => acc.won += 1,
            StageCategory::Lost => acc.lost += 1,
            StageCategory::Open => acc.open += 1,
            StageCategory::Unknown => {}
        }
    }

    let mut groups: Vec<GroupStats> = map
        .into_iter()
        .map(|(key, acc)| GroupStats::from_counts(key, acc.won, acc.lost, acc.open, options.percentages))
        .collect();
    // BTreeMap order is key order; a stable sort keeps it for equal totals.
    groups.sort_by(|a, b| b.total.cmp(&a.total));

    AggregationResult {
        dimensions: dims.to_vec(),
        groups,
    }
}

/// Row counts for every (row value, column value) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTab {
    pub row_dim: Dimension,
    pub col_dim: Dimension,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub cells: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: &str, col: &str) -> usize {
        let r = self.rows.iter().position(|v| v == row);
        let c = self.columns.iter().position(|v| v == col);
        match (r, c) {
            (Some(r), Some(c)) => self.cells[r][c],
            _ => 0,
        }
    }
}

/// Count rows (any stage) by two dimensions, optionally restricted to the
/// given row and column values. Both axes come out sorted.
pub fn crosstab(
    rows: &[NormalizedRow],
    row_dim: Dimension,
    col_dim: Dimension,
    row_filter: Option<&[String]>,
    col_filter: Option<&[String]>,
) -> CrossTab {
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for row in rows {
        let (Some(r), Some(c)) = (row_dim.value_of(row), col_dim.value_of(row)) else {
            continue;
        };
        if row_filter.is_some_and(|f| !f.contains(&r)) || col_filter.is_some_and(|f| !f.contains(&c)) {
            continue;
        }
        *counts.entry((r, c)).or_insert(0) += 1;
    }

    let row_values: BTreeSet<&String> = counts.keys().map(|(r, _)| r).collect();
    let col_values: BTreeSet<&String> = counts.keys().map(|(_, c)| c).collect();
    let row_values: Vec<String> = row_values.into_iter().cloned().collect();
    let col_values: Vec<String> = col_values.into_iter().cloned().collect();

    let cells = row_values
        .iter()
        .map(|r| {
            col_values
                .iter()
                .map(|c| counts.get(&(r.clone(), c.clone())).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    CrossTab {
        row_dim,
        col_dim,
        rows: row_values,
        columns: col_values,
        cells,
    }
}
