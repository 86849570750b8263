//! Readers for the scraper's export (CSV or JSON), candidate profiles and known-URL lists.
//!
//! Both formats are lenient: numbers, booleans and dates that do not parse become absent rather
//! than failing the row. CSV rows without a `job_url` are skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::lenient::{parse_amount, parse_bool, parse_date, parse_timestamp};
use crate::models::posting::{KnownUrl, Posting};
use crate::models::profile::CandidateProfile;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported file format '{0}' (expected .csv or .json)")]
    UnsupportedFormat(String),
}

/// Columns mapped onto [`Posting`] fields. Anything else lands in `extra`.
const POSTING_COLUMNS: [&str; 17] = [
    "job_url",
    "job_url_direct",
    "title",
    "company",
    "location",
    "description",
    "site",
    "job_type",
    "date_posted",
    "date_pulled",
    "interval",
    "min_amount",
    "max_amount",
    "currency",
    "is_remote",
    "emails",
    "searched_title",
];

fn open(path: &Path) -> Result<File, IngestError> {
    File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

pub fn read_postings(path: &Path) -> Result<Vec<Posting>, IngestError> {
    let file = open(path)?;
    let postings = match extension(path).as_str() {
        "csv" => parse_postings_csv(file)?,
        "json" => serde_json::from_reader(file)?,
        other => return Err(IngestError::UnsupportedFormat(other.to_string())),
    };
    info!("Read {} postings from {}", postings.len(), path.display());
    Ok(postings)
}

pub fn read_profile(path: &Path) -> Result<CandidateProfile, IngestError> {
    Ok(serde_json::from_reader(open(path)?)?)
}

pub fn read_known_urls(path: &Path) -> Result<Vec<KnownUrl>, IngestError> {
    let file = open(path)?;
    match extension(path).as_str() {
        "csv" => parse_known_urls_csv(file),
        "json" => Ok(serde_json::from_reader(file)?),
        other => Err(IngestError::UnsupportedFormat(other.to_string())),
    }
}

pub fn parse_postings_csv<R: Read>(reader: R) -> Result<Vec<Posting>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut postings = Vec::new();

    for (idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row: HashMap<&str, &str> = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, value)| !value.is_empty())
            .collect();

        match posting_from_row(&row) {
            Some(posting) => postings.push(posting),
            None => warn!("Skipping CSV row {}: no job_url", idx + 1),
        }
    }

    Ok(postings)
}

fn posting_from_row(row: &HashMap<&str, &str>) -> Option<Posting> {
    let text = |key: &str| row.get(key).map(|v| v.to_string());

    let url = text("job_url")?;
    let mut posting = Posting::new(url, text("title").unwrap_or_default());
    posting.job_url_direct = text("job_url_direct");
    posting.employer = text("company").unwrap_or_default();
    posting.location = text("location");
    posting.description = text("description").unwrap_or_default();
    posting.site = text("site");
    posting.job_type = text("job_type");
    posting.date_posted = row.get("date_posted").and_then(|v| parse_date(v));
    posting.date_pulled = row.get("date_pulled").and_then(|v| parse_timestamp(v));
    posting.interval = text("interval");
    posting.min_amount = row.get("min_amount").and_then(|v| parse_amount(v));
    posting.max_amount = row.get("max_amount").and_then(|v| parse_amount(v));
    posting.currency = text("currency");
    posting.is_remote = row.get("is_remote").and_then(|v| parse_bool(v));
    posting.emails = text("emails");
    posting.searched_title = text("searched_title");

    for (key, value) in row {
        if !POSTING_COLUMNS.contains(key) && !key.is_empty() {
            posting
                .extra
                .insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    Some(posting)
}

fn parse_known_urls_csv<R: Read>(reader: R) -> Result<Vec<KnownUrl>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut known = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let row: HashMap<&str, &str> = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, value)| !value.is_empty())
            .collect();

        let Some(url) = row.get("url").or_else(|| row.get("job_url")) else {
            continue;
        };
        let seen_at = row
            .get("seen_at")
            .or_else(|| row.get("date_pulled"))
            .and_then(|v| parse_timestamp(v));
        known.push(KnownUrl {
            url: url.to_string(),
            seen_at,
        });
    }

    Ok(known)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    const SCRAPER_CSV: &str = "\
site,job_url,title,company,location,date_posted,interval,min_amount,max_amount,currency,is_remote,description,company_logo
indeed,https://www.indeed.com/viewjob?jk=1,Data Engineer,Acme,Remote,2024-05-01,yearly,\"90,000\",120000.0,USD,True,Build pipelines,logo.png
linkedin,https://www.linkedin.com/jobs/view/2,Analyst,Globex,NYC,not a date,,,n/a,,maybe,Crunch numbers,
glassdoor,,Ghost Job,Nowhere,,,,,,,,No url here,
";

    #[test]
    fn test_csv_maps_known_columns_and_keeps_extras() {
        let postings = parse_postings_csv(SCRAPER_CSV.as_bytes()).unwrap();
        assert_eq!(postings.len(), 2);

        let first = &postings[0];
        assert_eq!(first.url, "https://www.indeed.com/viewjob?jk=1");
        assert_eq!(first.employer, "Acme");
        assert_eq!(first.site.as_deref(), Some("indeed"));
        assert_eq!(first.date_posted, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(first.min_amount, Some(90000.0));
        assert_eq!(first.max_amount, Some(120000.0));
        assert_eq!(first.is_remote, Some(true));
        assert_eq!(
            first.extra.get("company_logo"),
            Some(&Value::String("logo.png".to_string()))
        );
    }

    #[test]
    fn test_csv_unparseable_values_become_absent() {
        let postings = parse_postings_csv(SCRAPER_CSV.as_bytes()).unwrap();
        let second = &postings[1];
        assert!(second.date_posted.is_none());
        assert!(second.interval.is_none());
        assert!(second.min_amount.is_none());
        assert!(second.max_amount.is_none());
        assert!(second.is_remote.is_none());
        assert!(second.extra.is_empty());
    }

    #[test]
    fn test_read_postings_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"job_url": "https://x.com/1", "title": "Engineer", "company": "Acme"}}]"#
        )
        .unwrap();

        let postings = read_postings(file.path()).unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].employer, "Acme");
    }

    #[test]
    fn test_json_bad_field_values_keep_the_posting() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
                {{"job_url": "https://x.com/1", "title": "A", "max_amount": "n/a", "is_remote": "maybe"}},
                {{"job_url": "https://x.com/2", "title": "B", "date_posted": "2024-05-01T00:00:00"}},
                {{"job_url": "https://x.com/3", "title": "C", "min_amount": 90000, "max_amount": "$120,000",
                  "date_pulled": "not a timestamp", "is_remote": true}}
            ]"#
        )
        .unwrap();

        let postings = read_postings(file.path()).unwrap();
        assert_eq!(postings.len(), 3);
        assert!(postings[0].max_amount.is_none());
        assert!(postings[0].is_remote.is_none());
        assert_eq!(postings[1].date_posted, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(postings[2].min_amount, Some(90000.0));
        assert_eq!(postings[2].max_amount, Some(120000.0));
        assert!(postings[2].date_pulled.is_none());
        assert_eq!(postings[2].is_remote, Some(true));
    }

    #[test]
    fn test_read_postings_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        assert!(matches!(
            read_postings(file.path()),
            Err(IngestError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn test_read_known_urls_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "job_url,date_pulled").unwrap();
        writeln!(file, "https://x.com/1,2024-05-01 08:30:00").unwrap();
        writeln!(file, "https://x.com/2,").unwrap();
        file.flush().unwrap();

        let known = read_known_urls(file.path()).unwrap();
        assert_eq!(known.len(), 2);
        assert!(known[0].seen_at.is_some());
        assert!(known[1].seen_at.is_none());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_profile(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
