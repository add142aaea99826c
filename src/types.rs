use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// Coarse pipeline status derived from the detailed stage name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StageCategory {
    Open,
    Won,
    Lost,
    Unknown,
}

impl StageCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageCategory::Open => "Open",
            StageCategory::Won => "Won",
            StageCategory::Lost => "Lost",
            StageCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for StageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consolidated grouping of line-of-business labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BusinessCategory {
    Commercial,
    Homeowners,
    Marine,
    Flood,
    #[serde(rename = "Specialty Lines")]
    SpecialtyLines,
    Life,
    Auto,
    #[serde(rename = "CPL/Excess CPL")]
    CplExcessCpl,
    Umbrella,
    Other,
}

impl BusinessCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessCategory::Commercial => "Commercial",
            BusinessCategory::Homeowners => "Homeowners",
            BusinessCategory::Marine => "Marine",
            BusinessCategory::Flood => "Flood",
            BusinessCategory::SpecialtyLines => "Specialty Lines",
            BusinessCategory::Life => "Life",
            BusinessCategory::Auto => "Auto",
            BusinessCategory::CplExcessCpl => "CPL/Excess CPL",
            BusinessCategory::Umbrella => "Umbrella",
            BusinessCategory::Other => "Other",
        }
    }
}

impl fmt::Display for BusinessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The business categories subject to workload weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoreLine {
    Auto,
    Flood,
    Homeowners,
    Umbrella,
}

impl CoreLine {
    pub const ALL: [CoreLine; 4] = [
        CoreLine::Auto,
        CoreLine::Flood,
        CoreLine::Homeowners,
        CoreLine::Umbrella,
    ];

    pub fn from_category(category: BusinessCategory) -> Option<CoreLine> {
        match category {
            BusinessCategory::Auto => Some(CoreLine::Auto),
            BusinessCategory::Flood => Some(CoreLine::Flood),
            BusinessCategory::Homeowners => Some(CoreLine::Homeowners),
            BusinessCategory::Umbrella => Some(CoreLine::Umbrella),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoreLine::Auto => "Auto",
            CoreLine::Flood => "Flood",
            CoreLine::Homeowners => "Homeowners",
            CoreLine::Umbrella => "Umbrella",
        }
    }
}

/// One opportunity as handed over by a CRM gateway. Nothing is guaranteed
/// to be present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub id: Option<String>,
    pub stage_name: Option<String>,
    pub business_type: Option<String>,
    pub renewal_type: Option<String>,
    pub account_manager_id: Option<String>,
    pub close_date: Option<NaiveDate>,
    pub account_name: Option<String>,
}

/// A producer (account manager) record used to resolve owner ids to names.
#[derive(Debug, Clone, Deserialize)]
pub struct ProducerRow {
    #[serde(rename = "Id")]
    pub id: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "FirstName")]
    pub first_name: Option<String>,
    #[serde(rename = "LastName")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRow {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "StageName")]
    pub stage_name: String,
    #[serde(rename = "StatusCategory")]
    pub stage_category: StageCategory,
    #[serde(rename = "RenewalType")]
    pub renewal_type: String,
    #[serde(rename = "BusinessType")]
    pub business_type: String,
    #[serde(rename = "BusinessTypeCategory")]
    pub business_category: BusinessCategory,
    #[serde(rename = "AccountManager")]
    pub account_manager: String,
    #[serde(rename = "AccountName")]
    pub account_name: String,
    #[serde(rename = "CloseDate")]
    pub close_date: Option<NaiveDate>,
}

/// A rendered table whose columns are only known at runtime (toggled
/// percentage columns, cross-tabs).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct WinRateRow {
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub label: String,
    #[serde(rename = "Won")]
    #[tabled(rename = "Won")]
    pub won: usize,
    #[serde(rename = "Lost")]
    #[tabled(rename = "Lost")]
    pub lost: usize,
    #[serde(rename = "TotalClosed")]
    #[tabled(rename = "Total Closed")]
    pub total_closed: usize,
    #[serde(rename = "WinRate")]
    #[tabled(rename = "Win Rate %")]
    pub win_rate: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ComparisonRow {
    #[serde(rename = "AccountManager")]
    #[tabled(rename = "Account Manager")]
    pub account_manager: String,
    #[serde(rename = "AllLinesWinRate")]
    #[tabled(rename = "All Lines Win Rate %")]
    pub all_lines_win_rate: String,
    #[serde(rename = "CoreLinesWinRate")]
    #[tabled(rename = "Core Lines Win Rate %")]
    pub core_lines_win_rate: String,
    #[serde(rename = "Difference")]
    #[tabled(rename = "Difference (%)")]
    pub difference: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct WorkloadDetailRow {
    #[serde(rename = "AccountManager")]
    #[tabled(rename = "Account Manager")]
    pub account_manager: String,
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "Home")]
    #[tabled(rename = "Home")]
    pub homeowners: usize,
    #[serde(rename = "Flood")]
    #[tabled(rename = "Flood")]
    pub flood: usize,
    #[serde(rename = "Auto")]
    #[tabled(rename = "Auto")]
    pub auto: usize,
    #[serde(rename = "Umbrella")]
    #[tabled(rename = "Umbrella")]
    pub umbrella: usize,
    #[serde(rename = "TotalCount")]
    #[tabled(rename = "Total Count")]
    pub total_count: usize,
    #[serde(rename = "WeightedTotal")]
    #[tabled(rename = "Weighted Total")]
    pub weighted_total: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ManagerWorkloadRow {
    #[serde(rename = "AccountManager")]
    #[tabled(rename = "Account Manager")]
    pub account_manager: String,
    #[serde(rename = "TotalPolicies")]
    #[tabled(rename = "Total Policies")]
    pub total_policies: usize,
    #[serde(rename = "WeightedTotal")]
    #[tabled(rename = "Weighted Total")]
    pub weighted_total: String,
    #[serde(rename = "WorkloadReduction")]
    #[tabled(rename = "Workload Reduction")]
    pub workload_reduction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_opportunities: usize,
    pub won: usize,
    pub lost: usize,
    pub open: usize,
    pub unknown: usize,
    pub win_rate: f64,
}
