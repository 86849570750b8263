//! Writes pipeline results as CSV (one flat row per assessed posting) or JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::pipeline::{PipelineOutcome, ScoredPosting};

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    job_url: &'a str,
    title: &'a str,
    company: &'a str,
    location: Option<&'a str>,
    site: Option<&'a str>,
    date_posted: Option<NaiveDate>,
    min_amount: Option<f64>,
    max_amount: Option<f64>,
    currency: Option<&'a str>,
    interval: Option<&'a str>,
    is_remote: Option<bool>,
    desire_score: u32,
    experience_score: u32,
    meets_requirements_score: u32,
    meets_experience_score: u32,
    overall_score: u32,
    status: &'static str,
    guidance: &'a str,
    short_summary: Option<&'a str>,
    hard_requirements: Option<&'a str>,
}

impl<'a> From<&'a ScoredPosting> for ExportRow<'a> {
    fn from(scored: &'a ScoredPosting) -> Self {
        let p = &scored.posting;
        Self {
            job_url: &p.url,
            title: &p.title,
            company: &p.employer,
            location: p.location.as_deref(),
            site: p.site.as_deref(),
            date_posted: p.date_posted,
            min_amount: p.min_amount,
            max_amount: p.max_amount,
            currency: p.currency.as_deref(),
            interval: p.interval.as_deref(),
            is_remote: p.is_remote,
            desire_score: scored.scores.desire_score,
            experience_score: scored.scores.experience_score,
            meets_requirements_score: scored.scores.meets_requirements_score,
            meets_experience_score: scored.scores.meets_experience_score,
            overall_score: scored.scores.overall_score,
            status: scored.status.as_str(),
            guidance: &scored.guidance,
            short_summary: scored.short_summary.as_deref(),
            hard_requirements: scored.hard_requirements.as_deref(),
        }
    }
}

pub fn write_csv<W: Write>(writer: W, postings: &[ScoredPosting]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for scored in postings {
        csv_writer.serialize(ExportRow::from(scored))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(writer: W, outcome: &PipelineOutcome) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, outcome)
}

/// Writes the outcome to `path`, picking the format from its extension.
pub fn write_outcome(path: &Path, outcome: &PipelineOutcome) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if extension != "csv" && extension != "json" {
        bail!("Unsupported output format '{extension}' (expected .csv or .json)");
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let writer = BufWriter::new(file);

    if extension == "csv" {
        write_csv(writer, &outcome.postings).context("Failed to write CSV export")?;
    } else {
        write_json(writer, outcome).context("Failed to write JSON export")?;
    }

    info!(
        "Wrote {} postings to {}",
        outcome.postings.len(),
        path.display()
    );
    Ok(())
}
