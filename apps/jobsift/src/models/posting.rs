use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::lenient;
use crate::text::normalize_whitespace;

/// One scraped job listing. Field names follow the job-board scraper export so rows can be
/// read straight from its CSV/JSON output. Dates, amounts and the remote flag that do not
/// parse are read as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    #[serde(rename = "job_url")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url_direct: Option<String>,
    pub title: String,
    #[serde(rename = "company", default)]
    pub employer: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize_date")]
    pub date_posted: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::deserialize_timestamp")]
    pub date_pulled: Option<DateTime<Utc>>,
    /// Pay period as reported by the board ("yearly", "hourly", ...).
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize_amount")]
    pub min_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::deserialize_amount")]
    pub max_amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize_bool")]
    pub is_remote: Option<bool>,
    #[serde(default)]
    pub emails: Option<String>,
    #[serde(default)]
    pub searched_title: Option<String>,
    /// Scraped columns the pipeline does not use. Emptied by column projection.
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Posting {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            job_url_direct: None,
            title: title.into(),
            employer: String::new(),
            location: None,
            description: String::new(),
            site: None,
            job_type: None,
            date_posted: None,
            date_pulled: None,
            interval: None,
            min_amount: None,
            max_amount: None,
            currency: None,
            is_remote: None,
            emails: None,
            searched_title: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn canonical_url(&self) -> String {
        canonical_url(&self.url)
    }

    pub fn normalized_description(&self) -> String {
        normalize_whitespace(&self.description)
    }

    /// True when any compensation figure was stated.
    pub fn has_compensation(&self) -> bool {
        self.min_amount.is_some() || self.max_amount.is_some()
    }

    /// Title, employer and description joined for near-duplicate detection.
    pub fn dedup_text(&self) -> String {
        format!("{} {} {}", self.title, self.employer, self.description)
    }

    /// Single-paragraph description of the posting used as prompt context.
    pub fn prompt_context(&self) -> String {
        let mut text = format!(
            "Title: {}\nCompany: {}\nLocation: {}\nDescription: {}\n",
            self.title,
            self.employer,
            self.location.as_deref().unwrap_or("N/A"),
            self.description
        );
        if let Some(interval) = self.interval.as_deref().filter(|i| !i.is_empty()) {
            text.push_str(&format!(
                "Pays between {} and {} on a(n) {} basis.",
                format_amount(self.min_amount),
                format_amount(self.max_amount),
                interval
            ));
        }
        normalize_whitespace(&text)
    }
}

fn format_amount(amount: Option<f64>) -> String {
    amount
        .map(|a| format!("{a:.0}"))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Canonical form of a posting URL: lower-cased scheme and host, no fragment, no trailing
/// slash on the path. The query string is kept because several boards key postings by it.
/// Unparseable input falls back to its trimmed text.
pub fn canonical_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };

    url.set_fragment(None);
    let path = url.path().trim_end_matches('/').to_string();
    if !path.is_empty() {
        url.set_path(&path);
    }
    url.to_string()
}

/// A previously processed posting URL and when it was last seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownUrl {
    pub url: String,
    #[serde(default, deserialize_with = "lenient::deserialize_timestamp")]
    pub seen_at: Option<DateTime<Utc>>,
}

/// Canonical URLs the caller already knows about. Postings in this set are excluded up front.
#[derive(Debug, Clone, Default)]
pub struct KnownUrls {
    urls: HashSet<String>,
}

impl KnownUrls {
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            urls: urls
                .into_iter()
                .map(|u| canonical_url(u.as_ref()))
                .collect(),
        }
    }

    /// Keeps entries seen within `window_days` of `now`. Entries without a timestamp are kept.
    pub fn within_window(entries: &[KnownUrl], now: DateTime<Utc>, window_days: i64) -> Self {
        let cutoff = now - Duration::days(window_days);
        Self::from_urls(
            entries
                .iter()
                .filter(|e| e.seen_at.map_or(true, |seen| seen >= cutoff))
                .map(|e| e.url.as_str()),
        )
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(&canonical_url(url))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
