use crate::models::profile::CandidateProfile;

pub const SHORT_SUMMARY_QUESTION: &str = "Provide a short summary of the job. \
    If the job is fully remote, start with the sentence \"Fully remote! \", otherwise skip this step. \
    Then, after a newline, include a single sentence related to the compensation. \
    Start this sentence with the words \"Pay for this role is \" OR simply state \"Pay was not specified. \" \
    Next have a newline, then a single sentence with the minimum number of years experience. \
    Include the type of experience being looked for. \
    Next have a newline, followed by key job responsibilities (no more than 3 sentences). \
    Finally, have a newline and follow with job benefits (no more than 3 sentences)";

pub const HARD_REQUIREMENTS_QUESTION: &str = "Summarize the hard requirements, things the \
    candidate \"must have\" from the description. \
    Start the list with the number of years experience, if specified. \
    Limit this list to 4 bullet points of no more than 1 sentence each";

pub const TITLE_SUGGESTION_SYSTEM: &str = "You are an expert in searching job listings. \
    You take all the information given to you and come up with a list of 3 most relevant job titles. \
    You do not have to use the job titles provided by the candidate, but take them into consideration. \
    Only list the titles in a comma-separated list, no other information is needed. \
    IMPORTANT: ONLY INCLUDE THE JOB TITLES IN A COMMA SEPARATED LIST. \
    DO NOT INCLUDE ANY OTHER INFORMATION.";

pub fn title_suggestion_prompt(profile: &CandidateProfile) -> String {
    let mut message = String::from("Below is information that the candidate has provided.\n");
    message.push_str(&format!(
        "Provided Job Titles: {}\n",
        profile.preferred_titles.join(", ")
    ));
    message.push_str(&format!(
        "Desired verbiage in job description: {}\n",
        profile.skill_terms.join(", ")
    ));
    if !profile.stop_terms.is_empty() {
        message.push_str(&format!(
            "Candidate does not want jobs that have titles with these words: {}\n",
            profile.stop_terms.join(", ")
        ));
    }
    let resume = profile.normalized_resume();
    if !resume.trim().is_empty() {
        message.push_str(
            "In the <resume> tag below is the candidate resume, give extra weight to this information.",
        );
        message.push_str(&format!("\n<resume>\n{resume}\n</resume>\n"));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_prompt_mentions_stop_terms_only_when_present() {
        let mut profile = CandidateProfile {
            preferred_titles: vec!["Machinist".to_string()],
            ..Default::default()
        };
        assert!(!title_suggestion_prompt(&profile).contains("does not want"));

        profile.stop_terms = vec!["Manager".to_string()];
        profile.resume = "CNC\nprogramming".to_string();
        let prompt = title_suggestion_prompt(&profile);
        assert!(prompt.contains("titles with these words: Manager"));
        assert!(prompt.contains("<resume>\nCNC programming\n</resume>"));
    }
}
