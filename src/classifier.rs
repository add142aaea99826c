// Static lookup tables for stage names, line-of-business labels and
// core-line weights. Edit the tables, not the lookups.
use crate::types::{BusinessCategory, CoreLine, StageCategory};
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const STAGE_TABLE: &[(&str, StageCategory)] = &[
    ("New", StageCategory::Open),
    ("Information Gathering", StageCategory::Open),
    ("Rating", StageCategory::Open),
    ("Proposal Generation", StageCategory::Open),
    ("Decision Pending", StageCategory::Open),
    ("Pre-Bind Review", StageCategory::Open),
    ("Quote to Bind", StageCategory::Open),
    ("Binding", StageCategory::Open),
    ("Billing", StageCategory::Open),
    ("Post-Binding", StageCategory::Open),
    ("Closed Won", StageCategory::Won),
    ("Closed Lost", StageCategory::Lost),
];

pub const BUSINESS_TYPE_TABLE: &[(&str, BusinessCategory)] = &[
    // Commercial
    ("Bond", BusinessCategory::Commercial),
    ("Builders Risk/Installation - CL", BusinessCategory::Commercial),
    ("Bumbershoot", BusinessCategory::Commercial),
    ("Business Owners", BusinessCategory::Commercial),
    ("Commercial Auto", BusinessCategory::Commercial),
    ("Commercial Package", BusinessCategory::Commercial),
    ("Commercial Property", BusinessCategory::Commercial),
    ("Commercial Umbrella", BusinessCategory::Commercial),
    ("Crime", BusinessCategory::Commercial),
    ("Cyber & Privacy Liability", BusinessCategory::Commercial),
    ("Directors & Officers", BusinessCategory::Commercial),
    ("Dwelling Fire CL", BusinessCategory::Commercial),
    ("Errors and Omissions", BusinessCategory::Commercial),
    ("Flood - CL", BusinessCategory::Commercial),
    ("General Liability", BusinessCategory::Commercial),
    ("Inland Marine CL", BusinessCategory::Commercial),
    ("Marine Package", BusinessCategory::Commercial),
    ("Surety", BusinessCategory::Commercial),
    ("Workers Compensation", BusinessCategory::Commercial),
    ("Employment Practices Liability", BusinessCategory::Commercial),
    ("Liquor Liability", BusinessCategory::Commercial),
    ("Wind Only - CL", BusinessCategory::Commercial),
    // Homeowners
    ("Builders Risk/Installation - PL", BusinessCategory::Homeowners),
    ("Dwelling Fire - PL", BusinessCategory::Homeowners),
    ("Homeowners", BusinessCategory::Homeowners),
    ("Mobile Homeowners", BusinessCategory::Homeowners),
    ("Wind Only - PL", BusinessCategory::Homeowners),
    // Marine
    ("Charter Watercraft", BusinessCategory::Marine),
    ("Watercraft", BusinessCategory::Marine),
    ("Yacht", BusinessCategory::Marine),
    // Flood
    ("Flood - PL", BusinessCategory::Flood),
    // Specialty Lines
    ("Golf Cart", BusinessCategory::SpecialtyLines),
    ("Inland Marine PL", BusinessCategory::SpecialtyLines),
    ("Motorcycle/ATV", BusinessCategory::SpecialtyLines),
    ("Motorhome", BusinessCategory::SpecialtyLines),
    ("Recreational Vehicle", BusinessCategory::SpecialtyLines),
    ("Travel Trailer", BusinessCategory::SpecialtyLines),
    // Life
    ("Life", BusinessCategory::Life),
    // Auto
    ("Personal Auto", BusinessCategory::Auto),
    // CPL/Excess CPL
    ("Personal Liability", BusinessCategory::CplExcessCpl),
    // Umbrella
    ("Umbrella", BusinessCategory::Umbrella),
];

/// Effort multiplier per core line. Flood renewals take half the work.
pub const CORE_LINE_WEIGHTS: &[(CoreLine, f64)] = &[
    (CoreLine::Auto, 1.0),
    (CoreLine::Flood, 0.5),
    (CoreLine::Homeowners, 1.0),
    (CoreLine::Umbrella, 1.0),
];

static STAGES: Lazy<HashMap<&'static str, StageCategory>> =
    Lazy::new(|| STAGE_TABLE.iter().copied().collect());

static BUSINESS_TYPES: Lazy<HashMap<&'static str, BusinessCategory>> =
    Lazy::new(|| BUSINESS_TYPE_TABLE.iter().copied().collect());

pub fn stage_category_of(stage_name: &str) -> StageCategory {
    STAGES
        .get(stage_name)
        .copied()
        .unwrap_or(StageCategory::Unknown)
}

pub fn business_category_of(business_type: &str) -> BusinessCategory {
    BUSINESS_TYPES
        .get(business_type)
        .copied()
        .unwrap_or(BusinessCategory::Other)
}

pub fn core_line_weight(line: CoreLine) -> f64 {
    CORE_LINE_WEIGHTS
        .iter()
        .find(|(l, _)| *l == line)
        .map(|(_, w)| *w)
        .unwrap_or(1.0)
}

/// Marine exclusion used by the manager view: any label mentioning marine.
pub fn is_marine_line(business_type: &str) -> bool {
    business_type.to_lowercase().contains("marine")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_stage_classifies_as_listed() {
        for (name, expected) in STAGE_TABLE {
            assert_eq!(stage_category_of(name), *expected, "stage {name}");
        }
        assert_eq!(stage_category_of("Closed Won"), StageCategory::Won);
        assert_eq!(stage_category_of("Closed Lost"), StageCategory::Lost);
        assert_eq!(stage_category_of("Quote to Bind"), StageCategory::Open);
    }

    #[test]
    fn unknown_stages_fall_through() {
        for name in ["", "closed won", "Closed", "Cancelled", " New"] {
            assert_eq!(stage_category_of(name), StageCategory::Unknown, "stage {name:?}");
        }
    }

    #[test]
    fn every_table_business_type_classifies_as_listed() {
        for (label, expected) in BUSINESS_TYPE_TABLE {
            assert_eq!(business_category_of(label), *expected, "type {label}");
        }
        assert_eq!(
            business_category_of("Employment Practices Liability"),
            BusinessCategory::Commercial
        );
        assert_eq!(business_category_of("Personal Auto"), BusinessCategory::Auto);
        assert_eq!(business_category_of("Flood - PL"), BusinessCategory::Flood);
    }

    #[test]
    fn unmapped_business_types_are_other() {
        for label in ["Auto", "Flood", "Not Specified", "Pet Insurance", ""] {
            assert_eq!(business_category_of(label), BusinessCategory::Other, "type {label:?}");
        }
    }

    #[test]
    fn business_table_has_no_duplicates() {
        assert_eq!(BUSINESS_TYPES.len(), BUSINESS_TYPE_TABLE.len());
        assert_eq!(STAGES.len(), STAGE_TABLE.len());
    }

    #[test]
    fn flood_weighs_half() {
        assert_eq!(core_line_weight(CoreLine::Flood), 0.5);
        for line in [CoreLine::Auto, CoreLine::Homeowners, CoreLine::Umbrella] {
            assert_eq!(core_line_weight(line), 1.0);
        }
    }

    #[test]
    fn marine_match_is_case_insensitive() {
        assert!(is_marine_line("Inland Marine CL"));
        assert!(is_marine_line("marine package"));
        assert!(!is_marine_line("Yacht"));
    }
}
