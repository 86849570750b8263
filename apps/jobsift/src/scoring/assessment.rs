use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::llm_client::{StructuredOutput, StructuredSchema};

pub const FALLBACK_REASON: &str = "Unable to evaluate due to an error";
pub const FALLBACK_GUIDANCE: &str =
    "Unable to generate guidance due to an error in processing this job.";

/// Sixteen yes/no facts about a (posting, candidate) pair, four per rubric category, plus the
/// guidance the reasoning service wrote. Every field is required when deserialising.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    // Desire fit
    pub title_matches_preferred: bool,
    pub has_desired_skills: bool,
    pub free_from_stop_words: bool,
    pub logical_career_step: bool,

    // Experience-level fit
    pub within_experience_range: bool,
    pub seniority_matches: bool,
    pub responsibilities_align: bool,
    pub level_appropriate: bool,

    // Requirements fit
    pub has_required_technical_skills: bool,
    pub has_required_domain_skills: bool,
    pub meets_education_requirements: bool,
    pub has_industry_experience: bool,

    // Experience-requirements fit
    pub meets_years_required: bool,
    pub has_similar_role_history: bool,
    pub shows_skill_growth: bool,
    pub has_similar_environment: bool,

    pub desire_reason: String,
    pub requirements_reason: String,
    pub guidance_text: String,
}

pub(crate) const FACT_FIELDS: [&str; 16] = [
    "title_matches_preferred",
    "has_desired_skills",
    "free_from_stop_words",
    "logical_career_step",
    "within_experience_range",
    "seniority_matches",
    "responsibilities_align",
    "level_appropriate",
    "has_required_technical_skills",
    "has_required_domain_skills",
    "meets_education_requirements",
    "has_industry_experience",
    "meets_years_required",
    "has_similar_role_history",
    "shows_skill_growth",
    "has_similar_environment",
];

const TEXT_FIELDS: [&str; 3] = ["desire_reason", "requirements_reason", "guidance_text"];

impl Assessment {
    /// Every fact set to `value`, with empty guidance. Handy for tests and synthetic scoring.
    pub fn uniform(value: bool) -> Self {
        Self {
            title_matches_preferred: value,
            has_desired_skills: value,
            free_from_stop_words: value,
            logical_career_step: value,
            within_experience_range: value,
            seniority_matches: value,
            responsibilities_align: value,
            level_appropriate: value,
            has_required_technical_skills: value,
            has_required_domain_skills: value,
            meets_education_requirements: value,
            has_industry_experience: value,
            meets_years_required: value,
            has_similar_role_history: value,
            shows_skill_growth: value,
            has_similar_environment: value,
            desire_reason: String::new(),
            requirements_reason: String::new(),
            guidance_text: String::new(),
        }
    }

    pub fn desire_facts(&self) -> [bool; 4] {
        [
            self.title_matches_preferred,
            self.has_desired_skills,
            self.free_from_stop_words,
            self.logical_career_step,
        ]
    }

    pub fn experience_facts(&self) -> [bool; 4] {
        [
            self.within_experience_range,
            self.seniority_matches,
            self.responsibilities_align,
            self.level_appropriate,
        ]
    }

    pub fn requirements_facts(&self) -> [bool; 4] {
        [
            self.has_required_technical_skills,
            self.has_required_domain_skills,
            self.meets_education_requirements,
            self.has_industry_experience,
        ]
    }

    pub fn experience_requirements_facts(&self) -> [bool; 4] {
        [
            self.meets_years_required,
            self.has_similar_role_history,
            self.shows_skill_growth,
            self.has_similar_environment,
        ]
    }
}

impl StructuredOutput for Assessment {
    fn schema() -> StructuredSchema {
        let mut properties = Map::new();
        for field in FACT_FIELDS {
            properties.insert(field.to_string(), json!({"type": "boolean"}));
        }
        for field in TEXT_FIELDS {
            properties.insert(field.to_string(), json!({"type": "string"}));
        }
        let required: Vec<Value> = FACT_FIELDS
            .iter()
            .chain(TEXT_FIELDS.iter())
            .map(|f| Value::from(*f))
            .collect();

        StructuredSchema {
            name: "job_assessment",
            description: "Yes/no answers about how well a job fits a candidate, with guidance",
            schema: json!({
                "type": "object",
                "properties": properties,
                "required": required,
                "additionalProperties": false,
            }),
        }
    }

    fn fallback() -> Self {
        Self {
            desire_reason: FALLBACK_REASON.to_string(),
            requirements_reason: FALLBACK_REASON.to_string(),
            guidance_text: FALLBACK_GUIDANCE.to_string(),
            ..Self::uniform(false)
        }
    }
}
