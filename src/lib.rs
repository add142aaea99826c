//! Renewal opportunities reporting: classify CRM renewal records by stage,
//! line of business and account manager, then build count pivots, win
//! rates and weighted core-lines workload over a date range.
pub mod aggregate;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod normalizer;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
pub mod workload;

#[cfg(test)]
mod test_support;
