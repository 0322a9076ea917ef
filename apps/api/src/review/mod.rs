//! Resume review: sends the resume text to the LLM, parses the structured
//! report it returns, and keeps the report in the session for export.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extractors::AppJson;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{complete_json, CompletionBackend, LlmError};
use crate::models::report::ReviewReport;
use crate::models::resume::strip_bullet;
use crate::session::cookie::session_id;
use crate::session::load_or_new;
use crate::state::AppState;

pub mod prompts;

use prompts::{REVIEW_PROMPT_TEMPLATE, REVIEW_SYSTEM};

const REVIEW_MAX_TOKENS: u32 = 1500;

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub resume_text: Option<String>,
    #[serde(default)]
    pub use_draft: bool,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub report: ReviewReport,
}

/// Models sometimes answer a list field with a single string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_items(self) -> Vec<String> {
        let items = match self {
            OneOrMany::One(s) => s.lines().map(str::to_string).collect(),
            OneOrMany::Many(v) => v,
        };
        items
            .into_iter()
            .map(|s| strip_bullet(&s).to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// A score sent as a number, or as text such as `"85"`, `"85%"` or `"85/100"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Score {
    Number(f64),
    Text(String),
}

impl Score {
    fn value(self) -> f64 {
        match self {
            Score::Number(n) => n,
            Score::Text(text) => text
                .split('/')
                .next()
                .map(|s| s.trim().trim_end_matches('%').trim())
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.0),
        }
    }
}

/// The report as the model returns it, before clamping and timestamping.
/// Every field may be missing or `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawReport {
    overall_score: Option<Score>,
    ats_compatibility: Option<String>,
    keyword_usage: Option<String>,
    strengths: Option<OneOrMany>,
    weaknesses: Option<OneOrMany>,
    missing_sections: Option<OneOrMany>,
    improvements: Option<OneOrMany>,
}

fn items(list: Option<OneOrMany>) -> Vec<String> {
    list.map(OneOrMany::into_items).unwrap_or_default()
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

impl RawReport {
    fn into_report(self, created_at: DateTime<Utc>) -> ReviewReport {
        let raw_score = self.overall_score.map(Score::value).unwrap_or(0.0);
        let score = if raw_score.is_finite() {
            raw_score.round().clamp(0.0, 100.0) as u8
        } else {
            0
        };
        ReviewReport {
            overall_score: score,
            ats_compatibility: trimmed(self.ats_compatibility),
            keyword_usage: trimmed(self.keyword_usage),
            strengths: items(self.strengths),
            weaknesses: items(self.weaknesses),
            missing_sections: items(self.missing_sections),
            improvements: items(self.improvements),
            created_at,
        }
    }
}

/// Rejects blank text and text longer than `max_chars`; returns the trimmed text.
pub fn validate_review_text(text: &str, max_chars: usize) -> Result<&str, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation(
            "Please paste your resume text before requesting a review".to_string(),
        ));
    }
    let chars = text.chars().count();
    if chars > max_chars {
        return Err(AppError::Validation(format!(
            "Resume text is {chars} characters; the limit is {max_chars}"
        )));
    }
    Ok(text)
}

/// Runs one review completion and parses the report.
pub async fn review_text(
    llm: &dyn CompletionBackend,
    text: &str,
) -> Result<ReviewReport, AppError> {
    let prompt = REVIEW_PROMPT_TEMPLATE.replace("{resume_text}", text);
    let system = format!("{REVIEW_SYSTEM} {JSON_ONLY_SYSTEM}");

    let raw: RawReport = complete_json(llm, &system, &prompt, REVIEW_MAX_TOKENS)
        .await
        .map_err(|e| match e {
            LlmError::Parse(parse) => {
                warn!("Review response was not valid report JSON: {parse}");
                AppError::Llm("The AI returned a malformed review".to_string())
            }
            LlmError::EmptyContent => AppError::Llm("No review received from AI".to_string()),
            other => AppError::Llm(format!("Review failed: {other}")),
        })?;

    let report = raw.into_report(Utc::now());
    info!(
        "Review via {} scored {} ({} improvements)",
        llm.model(),
        report.overall_score,
        report.improvements.len()
    );
    Ok(report)
}

/// Validates, reviews, and stores the report in the caller's session.
pub async fn review_and_store(
    state: &AppState,
    jar: CookieJar,
    text: &str,
) -> Result<(CookieJar, ReviewReport), AppError> {
    let text = validate_review_text(text, state.config.max_review_chars)?;
    let report = review_text(state.llm()?, text).await?;

    let (jar, id) = session_id(jar);
    let mut record = load_or_new(state.sessions.as_ref(), id).await?;
    record.report = Some(report.clone());
    state.sessions.save(&mut record).await?;
    Ok((jar, report))
}

/// POST /api/review
///
/// `use_draft` reviews the session's saved draft instead of `resume_text`.
pub async fn handle_review(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(request): AppJson<ReviewRequest>,
) -> Result<(CookieJar, Json<ReviewResponse>), AppError> {
    let text = if request.use_draft {
        let (_, id) = session_id(jar.clone());
        state
            .sessions
            .load(id)
            .await?
            .and_then(|record| record.draft)
            .map(|draft| draft.to_plain_text())
            .ok_or_else(|| AppError::NotFound("No saved resume in this session".to_string()))?
    } else {
        request.resume_text.unwrap_or_default()
    };

    let (jar, report) = review_and_store(&state, jar, &text).await?;
    Ok((jar, Json(ReviewResponse { report })))
}
