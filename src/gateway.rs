// CRM access. The report only needs two queries: the producer directory and
// the renewal opportunities closing inside a window. `CsvExportGateway`
// answers both from CRM export files.
use crate::config::RENEWAL_TYPES;
use crate::error::GatewayError;
use crate::normalizer::ProducerDirectory;
use crate::types::{ProducerRow, RawRecord};
use crate::util::{clean_str, parse_date_safe};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub trait CrmGateway {
    fn fetch_producers(&self) -> Result<ProducerDirectory, GatewayError>;

    /// Renewal opportunities whose close date lies in `[start, end]`.
    fn fetch_renewal_opportunities(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawRecord>, GatewayError>;
}

/// What a report run gets from the CRM.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
    pub records: Vec<RawRecord>,
    pub producers: ProducerDirectory,
    /// Set when either query failed and the run continues on partial data.
    pub warning: Option<String>,
}

/// Run both queries. A failed opportunity fetch yields an empty result plus a
/// warning; a failed producer fetch only loses name resolution, so every
/// owner then reads as "Not Assigned".
pub fn fetch_or_empty(gateway: &dyn CrmGateway, start: NaiveDate, end: NaiveDate) -> Fetched {
    let records = match gateway.fetch_renewal_opportunities(start, end) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "CRM fetch failed, continuing with no data");
            return Fetched {
                warning: Some(format!("Error fetching CRM data: {}", e)),
                ..Fetched::default()
            };
        }
    };

    let (producers, warning) = match gateway.fetch_producers() {
        Ok(producers) => (producers, None),
        Err(e) => {
            warn!(error = %e, "producer fetch failed, account managers left unresolved");
            (
                ProducerDirectory::default(),
                Some(format!("Error fetching account managers: {}", e)),
            )
        }
    };

    info!(
        records = records.len(),
        producers = producers.len(),
        "fetched renewal opportunities"
    );
    Fetched {
        records,
        producers,
        warning,
    }
}

#[derive(Debug, Deserialize)]
struct ExportRow {
    #[serde(rename = "Id")]
    id: Option<String>,
    #[serde(rename = "StageName")]
    stage_name: Option<String>,
    #[serde(rename = "Type")]
    business_type: Option<String>,
    #[serde(rename = "AccountManagerId")]
    account_manager_id: Option<String>,
    #[serde(rename = "New_Business_or_Renewal__c")]
    renewal_type: Option<String>,
    #[serde(rename = "CloseDate")]
    close_date: Option<String>,
    #[serde(rename = "AccountName")]
    account_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub matched_rows: usize,
    pub parse_errors: usize,
    pub not_renewal: usize,
    pub out_of_range: usize,
}

#[derive(Debug, Clone)]
pub struct CsvExportGateway {
    opportunities: PathBuf,
    producers: PathBuf,
}

impl CsvExportGateway {
    pub fn new(opportunities: impl Into<PathBuf>, producers: impl Into<PathBuf>) -> Self {
        Self {
            opportunities: opportunities.into(),
            producers: producers.into(),
        }
    }

    /// Read the opportunity export, keeping only renewals closing in the window.
    pub fn load(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(Vec<RawRecord>, LoadReport), GatewayError> {
        let mut rdr = open_export(&self.opportunities)?;
        let mut report = LoadReport::default();
        let mut records = Vec::new();

        for result in rdr.deserialize::<ExportRow>() {
            report.total_rows += 1;
            let row = match result {
                Ok(r) => r,
                Err(e) => {
                    debug!(row = report.total_rows, error = %e, "skipping malformed export row");
                    report.parse_errors += 1;
                    continue;
                }
            };

            let renewal_type = clean_str(row.renewal_type.as_deref());
            if !renewal_type
                .as_deref()
                .is_some_and(|t| RENEWAL_TYPES.contains(&t))
            {
                report.not_renewal += 1;
                continue;
            }

            // Same semantics as a `CloseDate >= start AND CloseDate <= end`
            // filter: undated rows never match.
            let close_date = match parse_date_safe(row.close_date.as_deref()) {
                Some(d) if d >= start && d <= end => d,
                _ => {
                    report.out_of_range += 1;
                    continue;
                }
            };

            records.push(RawRecord {
                id: row.id,
                stage_name: row.stage_name,
                business_type: row.business_type,
                renewal_type,
                account_manager_id: row.account_manager_id,
                close_date: Some(close_date),
                account_name: row.account_name,
            });
        }

        report.matched_rows = records.len();
        if report.parse_errors > 0 {
            warn!(
                skipped = report.parse_errors,
                "some opportunity rows could not be parsed"
            );
        }
        Ok((records, report))
    }
}

impl CrmGateway for CsvExportGateway {
    fn fetch_producers(&self) -> Result<ProducerDirectory, GatewayError> {
        let mut rdr = open_export(&self.producers)?;
        let mut rows = Vec::new();
        for result in rdr.deserialize::<ProducerRow>() {
            match result {
                Ok(row) => rows.push(row),
                Err(e) => warn!(error = %e, "skipping malformed producer row"),
            }
        }
        Ok(ProducerDirectory::from_rows(rows))
    }

    fn fetch_renewal_opportunities(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawRecord>, GatewayError> {
        let (records, report) = self.load(start, end)?;
        debug!(
            total = report.total_rows,
            matched = report.matched_rows,
            parse_errors = report.parse_errors,
            not_renewal = report.not_renewal,
            out_of_range = report.out_of_range,
            "opportunity export scanned"
        );
        Ok(records)
    }
}

fn open_export(path: &Path) -> Result<csv::Reader<std::fs::File>, GatewayError> {
    if !path.exists() {
        return Err(GatewayError::MissingExport(path.display().to_string()));
    }
    Ok(ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_path(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "Id,StageName,Type,AccountManagerId,New_Business_or_Renewal__c,CloseDate,AccountName\n";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn keeps_only_renewals_in_window() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}\
             1,Closed Won,Personal Auto,P1,Personal Lines - Renewal,2024-01-10,Acme\n\
             2,New,Homeowners,P1,New Business,2024-01-11,Beta\n\
             3,Closed Lost,Yacht,P2,Commercial Lines - Renewal,2023-12-31,Gamma\n\
             4,Rating,Umbrella,,Commercial Lines - Renewal,,Delta\n\
             5,Binding,Flood - PL,P2,Personal Lines - Renewal,2024-01-31,Eps\n"
        );
        let opps = write_file(&dir, "opps.csv", &body);
        let gw = CsvExportGateway::new(opps, dir.path().join("unused.csv"));

        let (records, report) = gw.load(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        let ids: Vec<_> = records.iter().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec!["1", "5"]);
        assert_eq!(report.total_rows, 5);
        assert_eq!(report.not_renewal, 1);
        assert_eq!(report.out_of_range, 2);
        assert_eq!(report.matched_rows, 2);
    }

    #[test]
    fn missing_export_fails_and_fetch_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let gw = CsvExportGateway::new(dir.path().join("nope.csv"), dir.path().join("nope2.csv"));
        assert!(matches!(
            gw.fetch_renewal_opportunities(d(2024, 1, 1), d(2024, 1, 31)),
            Err(GatewayError::MissingExport(_))
        ));

        let fetched = fetch_or_empty(&gw, d(2024, 1, 1), d(2024, 1, 31));
        assert!(fetched.records.is_empty());
        assert!(fetched.producers.is_empty());
        assert!(fetched.warning.is_some());
    }

    #[test]
    fn missing_producers_keep_opportunities() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!("{HEADER}1,Closed Won,Personal Auto,P1,Personal Lines - Renewal,2024-01-10,Acme\n");
        let opps = write_file(&dir, "opps.csv", &body);
        let gw = CsvExportGateway::new(opps, dir.path().join("no_producers.csv"));

        let fetched = fetch_or_empty(&gw, d(2024, 1, 1), d(2024, 1, 31));
        assert_eq!(fetched.records.len(), 1);
        assert!(fetched.producers.is_empty());
        assert!(fetched.warning.as_deref().is_some_and(|w| w.contains("account managers")));

        let rows = crate::normalizer::normalize_all(&fetched.records, &fetched.producers);
        assert_eq!(rows[0].account_manager, "Not Assigned");
    }

    #[test]
    fn malformed_rows_are_counted_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut body = HEADER.as_bytes().to_vec();
        body.extend_from_slice(b"1,Closed Won,Personal Auto,P1,Personal Lines - Renewal,2024-01-10,Acme\n");
        body.extend_from_slice(b"2,Closed Lost,Homeowners,P1,Personal Lines - Renewal,2024-01-11,\xff\xfe\n");
        body.extend_from_slice(b"3,New,Umbrella,P2,Commercial Lines - Renewal,2024-01-12,Gamma\n");
        let path = dir.path().join("opps.csv");
        std::fs::write(&path, body).unwrap();
        let gw = CsvExportGateway::new(path, dir.path().join("unused.csv"));

        let (records, report) = gw.load(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        let ids: Vec<_> = records.iter().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.parse_errors, 1);
        assert_eq!(report.matched_rows, 2);
    }

    #[test]
    fn producers_resolve_from_export() {
        let dir = tempfile::tempdir().unwrap();
        let producers = write_file(
            &dir,
            "producers.csv",
            "Id,Name,FirstName,LastName\nP1,jdoe,Jane,Doe\nP2,Sam Roe,,\n",
        );
        let gw = CsvExportGateway::new(dir.path().join("opps.csv"), producers);
        let dir = gw.fetch_producers().unwrap();
        assert_eq!(dir.resolve(Some("P1")), Some("Jane Doe"));
        assert_eq!(dir.resolve(Some("P2")), Some("Sam Roe"));
    }
}
