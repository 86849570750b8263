use serde::{Deserialize, Serialize};

use crate::text::normalize_whitespace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemotePreference {
    #[default]
    Any,
    RemoteOnly,
    OnSite,
}

impl RemotePreference {
    pub fn describe(&self) -> &'static str {
        match self {
            RemotePreference::Any => "no preference between remote and on-site work",
            RemotePreference::RemoteOnly => "fully remote roles only",
            RemotePreference::OnSite => "on-site roles",
        }
    }
}

/// The candidate's resume, preferences and hard constraints. Read-only for a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub resume: String,
    /// Ordered, most preferred first.
    #[serde(default)]
    pub preferred_titles: Vec<String>,
    #[serde(default)]
    pub skill_terms: Vec<String>,
    /// Any of these in a title disqualifies the posting.
    #[serde(default)]
    pub stop_terms: Vec<String>,
    /// When non-empty, a title must contain at least one of these.
    #[serde(default)]
    pub go_terms: Vec<String>,
    #[serde(default)]
    pub min_salary: Option<f64>,
    #[serde(default)]
    pub remote_preference: RemotePreference,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub distance_miles: Option<u32>,
}

impl CandidateProfile {
    pub fn normalized_resume(&self) -> String {
        normalize_whitespace(&self.resume)
    }
}
