use crate::models::posting::Posting;
use crate::models::profile::CandidateProfile;
use crate::text::normalize_whitespace;

pub const EVALUATION_SYSTEM: &str = "You are a job evaluation assistant. \
    Analyze jobs and resumes carefully, providing YES/NO answers to each question. \
    Be decisive and clear in your assessments.";

pub const RATING_SYSTEM: &str = "You are a helpful assistant, proficient in giving ratings on \
    how well a candidate matches a job posting. You think critically and consider not only the \
    content of the information given to you, but also the implications and intent of the \
    information.";

fn joined(items: &[String]) -> String {
    if items.is_empty() {
        "(none given)".to_string()
    } else {
        items.join(", ")
    }
}

/// One question per assessment field, keyed by the field name the answer must use.
pub fn evaluation_questions(
    posting: &Posting,
    profile: &CandidateProfile,
) -> Vec<(&'static str, String)> {
    let titles = joined(&profile.preferred_titles);
    let skills = joined(&profile.skill_terms);
    let stops = joined(&profile.stop_terms);

    vec![
        (
            "title_matches_preferred",
            format!(
                "Is the job title '{}' similar to any of these preferred titles: {titles}?",
                posting.title
            ),
        ),
        (
            "has_desired_skills",
            format!(
                "Does the job description prominently mention multiple of these desired \
                 skills: {skills}?"
            ),
        ),
        (
            "free_from_stop_words",
            format!("Is the job description free from these unwanted terms: {stops}?"),
        ),
        (
            "logical_career_step",
            "Based on the resume, does this job represent a logical next step in the \
             candidate's career progression?"
                .to_string(),
        ),
        (
            "within_experience_range",
            "Comparing the job description's required years of experience to the resume, is \
             the candidate within 2 years of the requirement (either direction)?"
                .to_string(),
        ),
        (
            "seniority_matches",
            format!(
                "Looking at the skills {skills} from the candidate's preferences, does the \
                 role's seniority level match the candidate's expertise with these skills?"
            ),
        ),
        (
            "responsibilities_align",
            "Are the role's responsibilities aligned with the candidate's current experience \
             level shown in their resume?"
                .to_string(),
        ),
        (
            "level_appropriate",
            format!(
                "Given the candidate's preferred job titles ({titles}), would this role's level \
                 be appropriate?"
            ),
        ),
        (
            "has_required_technical_skills",
            "Does the candidate's resume show experience with the technical skills required in \
             the job description?"
                .to_string(),
        ),
        (
            "has_required_domain_skills",
            format!(
                "Looking at the preferred skills ({skills}), does the candidate demonstrate \
                 proficiency in these areas?"
            ),
        ),
        (
            "meets_education_requirements",
            "Does the candidate meet the educational requirements mentioned in the job \
             description?"
                .to_string(),
        ),
        (
            "has_industry_experience",
            format!(
                "Given the candidate's target roles ({titles}), does their industry experience \
                 align with this position?"
            ),
        ),
        (
            "meets_years_required",
            "Based on the resume, does the candidate meet the minimum years of experience \
             specified in the job description?"
                .to_string(),
        ),
        (
            "has_similar_role_history",
            format!("Has the candidate performed roles similar to {titles} before?"),
        ),
        (
            "shows_skill_growth",
            format!(
                "Looking at the preferred skills ({skills}), does the candidate's experience \
                 show growth and increasing expertise in these areas?"
            ),
        ),
        (
            "has_similar_environment",
            "Does the candidate's work history demonstrate success in similar company \
             environments?"
                .to_string(),
        ),
    ]
}

pub fn evaluation_prompt(posting: &Posting, profile: &CandidateProfile) -> String {
    let questions = evaluation_questions(posting, profile)
        .into_iter()
        .map(|(field, question)| format!("{field}: {question}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Evaluate this job opportunity for the candidate by answering YES or NO to each question.\n\
         Be direct and definitive in your assessment.\n\n\
         Job Details:\n\
         Title: {title}\n\
         Description: {description}\n\n\
         Candidate Information:\n\
         Resume: {resume}\n\
         Work preference: {remote}\n\n\
         Please answer each of the following questions with YES or NO, and then provide guidance text:\n\n\
         {questions}\n\n\
         Also provide guidance text for the candidate with these components:\n\
         1. desire_reason: A single sentence explaining why they would like or dislike this job based on their preferences\n\
         2. requirements_reason: A single sentence explaining why they would be a good or poor fit based on requirements\n\
         3. guidance_text: A complete guidance message following this EXACT format:\n\
         'You may <like, be lukewarm on, or dislike> this job because of the following reasons: <desire_reason>. \
         The hiring manager may think you would be a <good, reasonable, or bad> fit for this job because of \
         <requirements_reason>. Overall, I think <synthesis of the match assessment>.'\n\n\
         Answer with structured output matching EXACTLY the expected format.\n\
         Each assessment answer must be true for YES and false for NO.\n\
         Guidance fields must be complete sentences.",
        title = posting.title,
        description = posting.normalized_description(),
        resume = profile.normalized_resume(),
        remote = profile.remote_preference.describe(),
    )
}

pub fn rating_block_prompt(posting: &Posting, profile: &CandidateProfile) -> String {
    format!(
        "<resume>{resume}</resume>\n\
         <job_title>{title}</job_title>\n\
         <job_description>{description}</job_description>\n\
         Given the user resume (resume tag), job title (job_title tag) and job description \
         (job_description tag), make the following ratings:\n\n\
         1) How the candidate would rate this job on a scale from 1 to 100 in terms of how well it \
         matches their experience and the type of job they desire.\n\
         2) How the candidate would rate this job on a scale from 1 to 100 as a match for their \
         experience level (they aren't underqualified or overqualified).\n\
         3) How a hiring manager for this job would rate the candidate on a scale from 1 to 100 on how \
         well the candidate meets the skill requirements for this job.\n\
         4) How a hiring manager for this job would rate the candidate on a scale from 1 to 100 on how \
         well the candidate meets the experience requirements for this job.\n\
         5) Consider the results from steps 1 through 4 then give a final assessment from 1 to 100, \
         where 1 is very little chance of this being a good match for the candidate and hiring manager, \
         and 100 being a perfect match where the candidate will have a great chance to succeed in \
         this role.\n\n\
         For experience level, look for cues in the job description that list years of experience, \
         then compare that to the level of experience you believe the candidate to have (make an \
         assessment based on years in directly applicable fields of work).\n\n\
         Start your answer immediately with a bulleted list and then give an explanation for why you \
         chose those ratings. In the explanation only use plain text paragraphs without formatting. \
         Example output is below (where NN is a 2 digit number):\n\n\
         - Candidate desire match: NN\n\
         - Candidate experience match: NN\n\
         - Hiring manager skill match: NN\n\
         - Hiring manager experience match: NN\n\
         - Final overall match assessment: NN\n\
         - Explanation of ratings: <Your explanation about why you chose those ratings, in paragraph form>",
        resume = profile.normalized_resume(),
        title = posting.title,
        description = normalize_whitespace(&posting.description),
    )
}
