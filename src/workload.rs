// Core-lines workload allocation.
//
// Only Auto, Flood, Homeowners and Umbrella renewals with a close date take
// part. Each row contributes its core line's weight, rows are bucketed by a
// granularity picked from the report window, then rolled up per
// (manager, bucket) and per manager.
use crate::classifier::core_line_weight;
use crate::types::{CoreLine, NormalizedRow};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Week,
    Month,
    Quarter,
}

impl Granularity {
    /// Chosen from `end - start` in days: up to a week -> days, up to a
    /// month -> ISO weeks, up to a year -> months, beyond -> quarters.
    pub fn for_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self::for_span_days((end - start).num_days())
    }

    pub fn for_span_days(span: i64) -> Self {
        match span {
            i64::MIN..=7 => Granularity::Day,
            8..=31 => Granularity::Week,
            32..=365 => Granularity::Month,
            _ => Granularity::Quarter,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Day => "Day",
            Granularity::Week => "Week",
            Granularity::Month => "Month",
            Granularity::Quarter => "Quarter",
        }
    }

    /// Bucket name for a date. The formats sort chronologically as strings.
    pub fn bucket_of(&self, date: NaiveDate) -> String {
        match self {
            Granularity::Day => date.format("%Y-%m-%d").to_string(),
            Granularity::Week => {
                let iso = date.iso_week();
                format!("{}-W{:02}", iso.year(), iso.week())
            }
            Granularity::Month => date.format("%Y-%m").to_string(),
            Granularity::Quarter => format!("{}Q{}", date.year(), date.month0() / 3 + 1),
        }
    }
}

/// One (manager, bucket, business type) partition.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadLine {
    pub manager: String,
    pub bucket: String,
    pub business_type: String,
    pub core_line: CoreLine,
    pub count: usize,
    pub weighted: f64,
}

/// Per-core-line counts for one manager in one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadBucket {
    pub manager: String,
    pub bucket: String,
    pub counts: BTreeMap<CoreLine, usize>,
    pub weighted: BTreeMap<CoreLine, f64>,
    pub total_count: usize,
    pub weighted_total: f64,
}

impl WorkloadBucket {
    fn new(manager: String, bucket: String) -> Self {
        Self {
            manager,
            bucket,
            counts: CoreLine::ALL.iter().map(|l| (*l, 0)).collect(),
            weighted: CoreLine::ALL.iter().map(|l| (*l, 0.0)).collect(),
            total_count: 0,
            weighted_total: 0.0,
        }
    }

    pub fn count(&self, line: CoreLine) -> usize {
        self.counts.get(&line).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagerWorkload {
    pub manager: String,
    pub total_count: usize,
    pub weighted_total: f64,
    /// Effort saved by weighting: `total_count - weighted_total`.
    pub workload_reduction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadResult {
    pub granularity: Granularity,
    /// Ordered by bucket, manager, business type.
    pub lines: Vec<WorkloadLine>,
    /// Ordered by bucket, then manager.
    pub buckets: Vec<WorkloadBucket>,
    /// Heaviest weighted workload first, ties by name.
    pub managers: Vec<ManagerWorkload>,
}

impl WorkloadResult {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn manager(&self, name: &str) -> Option<&ManagerWorkload> {
        self.managers.iter().find(|m| m.manager == name)
    }
}

/// Rows that belong to a core line and carry a close date.
pub fn core_line_rows(rows: &[NormalizedRow]) -> Vec<&NormalizedRow> {
    rows.iter()
        .filter(|r| r.close_date.is_some() && CoreLine::from_category(r.business_category).is_some())
        .collect()
}

pub fn allocate_workload(rows: &[NormalizedRow], start: NaiveDate, end: NaiveDate) -> WorkloadResult {
    let granularity = Granularity::for_range(start, end);

    // (bucket, manager, business type) so iteration is already in display order.
    let mut partitions: BTreeMap<(String, String, String), (CoreLine, usize)> = BTreeMap::new();
    for row in rows {
        let (Some(date), Some(line)) = (row.close_date, CoreLine::from_category(row.business_category))
        else {
            continue;
        };
        let key = (
            granularity.bucket_of(date),
            row.account_manager.clone(),
            row.business_type.clone(),
        );
        partitions.entry(key).or_insert((line, 0)).1 += 1;
    }

    let lines: Vec<WorkloadLine> = partitions
        .into_iter()
        .map(|((bucket, manager, business_type), (core_line, count))| WorkloadLine {
            manager,
            bucket,
            business_type,
            core_line,
            count,
            weighted: count as f64 * core_line_weight(core_line),
        })
        .collect();

    let mut by_bucket: BTreeMap<(String, String), WorkloadBucket> = BTreeMap::new();
    for line in &lines {
        let entry = by_bucket
            .entry((line.bucket.clone(), line.manager.clone()))
            .or_insert_with(|| WorkloadBucket::new(line.manager.clone(), line.bucket.clone()));
        *entry.counts.entry(line.core_line).or_insert(0) += line.count;
        *entry.weighted.entry(line.core_line).or_insert(0.0) += line.weighted;
        entry.total_count += line.count;
        entry.weighted_total += line.weighted;
    }
    let buckets: Vec<WorkloadBucket> = by_bucket.into_values().collect();

    let mut by_manager: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for b in &buckets {
        let e = by_manager.entry(b.manager.clone()).or_insert((0, 0.0));
        e.0 += b.total_count;
        e.1 += b.weighted_total;
    }
    let mut managers: Vec<ManagerWorkload> = by_manager
        .into_iter()
        .map(|(manager, (total_count, weighted_total))| ManagerWorkload {
            manager,
            total_count,
            weighted_total,
            workload_reduction: total_count as f64 - weighted_total,
        })
        .collect();
    managers.sort_by(|a, b| b.weighted_total.total_cmp(&a.weighted_total));

    WorkloadResult {
        granularity,
        lines,
        buckets,
        managers,
    }
}
