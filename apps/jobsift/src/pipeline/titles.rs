use tracing::{info, warn};

use crate::llm_client::ReasoningGateway;
use crate::models::profile::CandidateProfile;
use crate::pipeline::prompts::{title_suggestion_prompt, TITLE_SUGGESTION_SYSTEM};

pub const SUGGESTED_TITLE_COUNT: usize = 3;

/// Search titles for the scraper. The profile's own preferred titles win; otherwise the
/// reasoning service proposes up to three. Empty when it cannot answer.
pub async fn suggest_titles(gateway: &ReasoningGateway, profile: &CandidateProfile) -> Vec<String> {
    if !profile.preferred_titles.is_empty() {
        return profile.preferred_titles.clone();
    }

    info!("No preferred titles on the profile, asking for suggestions");
    let prompt = title_suggestion_prompt(profile);
    match gateway.complete(TITLE_SUGGESTION_SYSTEM, &prompt).await {
        Some(answer) => parse_title_list(&answer),
        None => {
            warn!("Title suggestion failed, continuing with no titles");
            Vec::new()
        }
    }
}

/// Splits a comma-separated answer into at most three distinct titles.
pub fn parse_title_list(answer: &str) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    for raw in answer.split([',', '\n']) {
        let title = raw
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '*' || c == '-')
            .trim();
        if title.is_empty() || titles.iter().any(|t| t.eq_ignore_ascii_case(title)) {
            continue;
        }
        titles.push(title.to_string());
        if titles.len() == SUGGESTED_TITLE_COUNT {
            break;
        }
    }
    titles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::scripted::ScriptedProvider;
    use crate::llm_client::RetryPolicy;
    use std::sync::Arc;

    #[test]
    fn test_parse_title_list_trims_and_caps() {
        assert_eq!(
            parse_title_list("\"CNC Programmer\", Machinist, cnc programmer, Manufacturing Engineer, QA"),
            vec!["CNC Programmer", "Machinist", "Manufacturing Engineer"]
        );
        assert!(parse_title_list("  ,  ").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_preferred_titles_skip_the_call() {
        let provider = Arc::new(ScriptedProvider::new());
        let gateway = ReasoningGateway::new(provider.clone(), RetryPolicy::default());
        let profile = CandidateProfile {
            preferred_titles: vec!["Data Engineer".to_string()],
            ..Default::default()
        };
        assert_eq!(suggest_titles(&gateway, &profile).await, vec!["Data Engineer"]);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggestions_come_from_the_reasoning_service() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_text(Ok("Data Engineer, Analytics Engineer, ETL Developer".to_string()));
        let gateway = ReasoningGateway::new(provider.clone(), RetryPolicy::default());

        let titles = suggest_titles(&gateway, &CandidateProfile::default()).await;
        assert_eq!(titles, vec!["Data Engineer", "Analytics Engineer", "ETL Developer"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_suggestion_is_empty() {
        let provider = Arc::new(ScriptedProvider::new());
        let gateway = ReasoningGateway::new(provider.clone(), RetryPolicy::default());
        assert!(suggest_titles(&gateway, &CandidateProfile::default())
            .await
            .is_empty());
        assert_eq!(provider.calls(), 3);
    }
}
