// Row builders shared by the unit tests.
use crate::classifier::business_category_of;
use crate::types::{NormalizedRow, StageCategory};
use chrono::NaiveDate;

pub fn row(stage: StageCategory, business_type: &str, manager: &str) -> NormalizedRow {
    dated(stage, business_type, manager, NaiveDate::from_ymd_opt(2024, 1, 15))
}

pub fn dated(
    stage: StageCategory,
    business_type: &str,
    manager: &str,
    close_date: Option<NaiveDate>,
) -> NormalizedRow {
    NormalizedRow {
        id: String::new(),
        stage_name: String::new(),
        stage_category: stage,
        renewal_type: "Personal Lines - Renewal".to_string(),
        business_type: business_type.to_string(),
        business_category: business_category_of(business_type),
        account_manager: manager.to_string(),
        account_name: String::new(),
        close_date,
    }
}
