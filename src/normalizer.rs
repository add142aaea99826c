// Raw CRM record -> NormalizedRow. Never fails: every missing field falls
// back to a documented default so one bad record cannot sink the report.
use crate::classifier::{business_category_of, stage_category_of};
use crate::config::{NOT_ASSIGNED, NOT_SPECIFIED};
use crate::types::{NormalizedRow, ProducerRow, RawRecord, StageCategory};
use crate::util::clean_str;
use std::collections::HashMap;

/// Resolves account-manager ids to display names.
#[derive(Debug, Clone, Default)]
pub struct ProducerDirectory {
    names: HashMap<String, String>,
}

impl ProducerDirectory {
    pub fn from_rows(rows: impl IntoIterator<Item = ProducerRow>) -> Self {
        let mut names = HashMap::new();
        for row in rows {
            let Some(id) = clean_str(row.id.as_deref()) else {
                continue;
            };
            let first = clean_str(row.first_name.as_deref());
            let last = clean_str(row.last_name.as_deref());
            let name = match (first, last) {
                (Some(f), Some(l)) => format!("{} {}", f, l),
                _ => match clean_str(row.name.as_deref()) {
                    Some(n) => n,
                    None => continue,
                },
            };
            names.insert(id, name);
        }
        Self { names }
    }

    pub fn resolve(&self, id: Option<&str>) -> Option<&str> {
        let id = id?.trim();
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

pub fn normalize(raw: &RawRecord, producers: &ProducerDirectory) -> NormalizedRow {
    let stage_name = clean_str(raw.stage_name.as_deref()).unwrap_or_default();
    let stage_category = if stage_name.is_empty() {
        StageCategory::Unknown
    } else {
        stage_category_of(&stage_name)
    };
    let business_type =
        clean_str(raw.business_type.as_deref()).unwrap_or_else(|| NOT_SPECIFIED.to_string());
    let business_category = business_category_of(&business_type);
    let account_manager = producers
        .resolve(raw.account_manager_id.as_deref())
        .unwrap_or(NOT_ASSIGNED)
        .to_string();

    NormalizedRow {
        id: clean_str(raw.id.as_deref()).unwrap_or_default(),
        stage_name,
        stage_category,
        renewal_type: clean_str(raw.renewal_type.as_deref())
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        business_type,
        business_category,
        account_manager,
        account_name: clean_str(raw.account_name.as_deref()).unwrap_or_default(),
        close_date: raw.close_date,
    }
}

pub fn normalize_all(records: &[RawRecord], producers: &ProducerDirectory) -> Vec<NormalizedRow> {
    records.iter().map(|r| normalize(r, producers)).collect()
}
