use chrono::NaiveDate;
use renewal_report::config::ReportConfig;
use renewal_report::gateway::{fetch_or_empty, CsvExportGateway};
use renewal_report::normalizer::normalize_all;
use renewal_report::output::{export_dashboard, render_dashboard, NO_DATA};
use renewal_report::reports::build_dashboard;
use renewal_report::types::{BusinessCategory, StageCategory};
use renewal_report::workload::Granularity;
use std::path::{Path, PathBuf};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

const PRODUCERS: &str = "Id,Name,FirstName,LastName\n\
P1,jdoe,Jane,Doe\n\
P2,Sam Roe,,\n";

const OPPORTUNITIES: &str = "Id,StageName,Type,AccountManagerId,New_Business_or_Renewal__c,CloseDate,AccountName\n\
1,Closed Won,Personal Auto,P1,Personal Lines - Renewal,2024-01-05,Acme\n\
2,Closed Lost,Flood - PL,P1,Personal Lines - Renewal,2024-01-06,Acme\n\
3,New,Personal Auto,P1,Personal Lines - Renewal,2024-01-07,Acme\n\
4,Closed Won,Bond,P2,Commercial Lines - Renewal,2024-02-10,Beta\n\
5,Withdrawn,Yacht,P2,Personal Lines - Renewal,2024-02-11,Gamma\n\
6,Closed Won,Homeowners,P9,Personal Lines - Renewal,2024-03-01,Delta\n\
7,Closed Won,Personal Auto,P1,New Business,2024-01-05,Eps\n\
8,Closed Won,Personal Auto,P1,Personal Lines - Renewal,2023-12-31,Zeta\n";

#[test]
fn csv_exports_flow_through_to_dashboard() {
    renewal_report::logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let opps = write(dir.path(), "opps.csv", OPPORTUNITIES);
    let producers = write(dir.path(), "producers.csv", PRODUCERS);

    let config = ReportConfig::new(d(2024, 1, 1), d(2024, 3, 31));
    let gateway = CsvExportGateway::new(opps, producers);
    let fetched = fetch_or_empty(&gateway, config.start, config.end);
    assert!(fetched.warning.is_none());
    assert_eq!(fetched.records.len(), 6);

    let rows = normalize_all(&fetched.records, &fetched.producers);
    let delta = rows.iter().find(|r| r.id == "6").unwrap();
    assert_eq!(delta.account_manager, "Not Assigned");
    let gamma = rows.iter().find(|r| r.id == "5").unwrap();
    assert_eq!(gamma.stage_category, StageCategory::Unknown);
    assert_eq!(gamma.business_category, BusinessCategory::Marine);

    let dash = build_dashboard(&rows, &config);
    assert_eq!(dash.summary.total_opportunities, 6);
    assert_eq!((dash.summary.won, dash.summary.lost, dash.summary.open), (3, 1, 1));

    let managers = dash.managers.as_ref().unwrap();
    let jane = managers.by_manager.get(&["Jane Doe"]).unwrap();
    assert_eq!((jane.won, jane.lost, jane.open, jane.total), (1, 1, 1, 3));
    assert_eq!(jane.win_rate, 50.0);
    // Sam Roe's only Unknown-stage row does not count towards the pivot.
    assert_eq!(managers.by_manager.get(&["Sam Roe"]).unwrap().total, 1);

    let core = managers.core.as_ref().unwrap();
    assert_eq!(core.workload.granularity, Granularity::Month);
    let jane_load = core.workload.manager("Jane Doe").unwrap();
    assert_eq!(jane_load.total_count, 3);
    assert_eq!(jane_load.weighted_total, 2.5);
    assert_eq!(jane_load.workload_reduction, 0.5);
    let unassigned = core.workload.manager("Not Assigned").unwrap();
    assert_eq!(unassigned.weighted_total, 1.0);

    let text = render_dashboard(&dash);
    assert!(text.contains("Jane Doe"));
    assert!(text.contains("Core Lines Workload Allocation by Month"));

    let out = dir.path().join("out");
    let written = export_dashboard(&out, &dash, &rows).unwrap();
    assert!(written > 10);
    let detail = std::fs::read_to_string(out.join("workload_detail.csv")).unwrap();
    assert!(detail.starts_with("AccountManager,Period,Home,Flood,Auto,Umbrella,TotalCount,WeightedTotal"));
}

#[test]
fn gateway_failure_yields_no_data_report() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = CsvExportGateway::new(dir.path().join("absent.csv"), dir.path().join("absent2.csv"));
    let config = ReportConfig::new(d(2024, 1, 1), d(2024, 1, 31));

    let fetched = fetch_or_empty(&gateway, config.start, config.end);
    assert!(fetched.warning.is_some());

    let rows = normalize_all(&fetched.records, &fetched.producers);
    let dash = build_dashboard(&rows, &config);
    assert!(dash.by_renewal_type.is_empty());
    assert!(dash.managers.as_ref().unwrap().by_manager.is_empty());
    assert!(render_dashboard(&dash).contains(NO_DATA));
}
