//! AI rewriting of a single resume section.
//!
//! Each section has its own prompt template and completion budget. The
//! handler validates the request, fills the template, and returns the
//! cleaned-up completion.

use std::str::FromStr;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::extractors::AppJson;
use crate::llm_client::prompts::PLAIN_TEXT_SYSTEM;
use crate::llm_client::{strip_json_fences, LlmError};
use crate::state::AppState;

pub mod prompts;

use prompts::{
    EDUCATION_PROMPT_TEMPLATE, EXPERIENCE_PROMPT_TEMPLATE, PROJECTS_PROMPT_TEMPLATE,
    SKILLS_PROMPT_TEMPLATE, SUGGEST_SYSTEM, SUMMARY_PROMPT_TEMPLATE,
};

/// Longest section body accepted for rewriting, in characters.
pub const MAX_SUGGEST_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
}

impl Section {
    fn template(self) -> &'static str {
        match self {
            Section::Summary => SUMMARY_PROMPT_TEMPLATE,
            Section::Experience => EXPERIENCE_PROMPT_TEMPLATE,
            Section::Education => EDUCATION_PROMPT_TEMPLATE,
            Section::Skills => SKILLS_PROMPT_TEMPLATE,
            Section::Projects => PROJECTS_PROMPT_TEMPLATE,
        }
    }

    pub fn max_tokens(self) -> u32 {
        match self {
            Section::Summary => 200,
            Section::Experience => 450,
            Section::Education => 200,
            Section::Skills => 150,
            Section::Projects => 350,
        }
    }
}

impl FromStr for Section {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(Section::Summary),
            "experience" => Ok(Section::Experience),
            "education" => Ok(Section::Education),
            "skills" => Ok(Section::Skills),
            "projects" => Ok(Section::Projects),
            other => Err(AppError::Validation(format!(
                "Unknown section '{other}'; expected summary, experience, education, skills, or projects"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub section: Option<String>,
    pub content: Option<String>,
    pub job_title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub section: Section,
    pub suggestion: String,
}

pub fn build_prompt(section: Section, content: &str, job_title: Option<&str>) -> String {
    let job_context = match job_title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!("The candidate is targeting a {title} role."),
        None => String::new(),
    };
    // Filled in one pass so user text is never re-scanned for placeholders.
    let template = section.template();
    let (head, tail) = template.split_once("{content}").unwrap_or((template, ""));
    format!("{}{content}{tail}", head.replace("{job_context}", &job_context))
}

/// Drops code fences and quotes the model sometimes wraps its answer in.
pub fn clean_suggestion(raw: &str) -> String {
    let text = strip_json_fences(raw).trim();
    let text = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    text.trim().to_string()
}

/// POST /ai_suggest (also POST /api/ai/suggest)
pub async fn handle_suggest(
    State(state): State<AppState>,
    AppJson(request): AppJson<SuggestRequest>,
) -> Result<Json<SuggestResponse>, AppError> {
    let section: Section = request
        .section
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("section is required".to_string()))?
        .parse()?;

    let content = request.content.as_deref().map(str::trim).unwrap_or_default();
    if content.is_empty() {
        return Err(AppError::Validation(
            "Please enter some content before requesting AI suggestions".to_string(),
        ));
    }
    if content.chars().count() > MAX_SUGGEST_CHARS {
        return Err(AppError::Validation(format!(
            "Content too long; limit it to {MAX_SUGGEST_CHARS} characters"
        )));
    }

    let llm = state.llm()?;
    let prompt = build_prompt(section, content, request.job_title.as_deref());
    let system = format!("{SUGGEST_SYSTEM} {PLAIN_TEXT_SYSTEM}");

    let raw = llm
        .complete(&system, &prompt, section.max_tokens())
        .await
        .map_err(|e| match e {
            LlmError::EmptyContent => AppError::Llm("No suggestion received from AI".to_string()),
            other => AppError::Llm(format!("Suggestion for {section:?} failed: {other}")),
        })?;

    let suggestion = clean_suggestion(&raw);
    if suggestion.is_empty() {
        return Err(AppError::Llm("No suggestion received from AI".to_string()));
    }

    info!(
        "AI suggestion for {:?} via {} ({} -> {} chars)",
        section,
        llm.model(),
        content.len(),
        suggestion.len()
    );
    Ok(Json(SuggestResponse {
        section,
        suggestion,
    }))
}
