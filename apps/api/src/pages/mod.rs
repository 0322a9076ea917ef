//! Server-rendered HTML pages.
//!
//! Templates are compiled in with `include_str!` and filled with plain
//! `{placeholder}` replacement. Anything user-supplied goes through
//! [`html_escape`] first.

use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::warn;

use crate::errors::AppError;
use crate::models::report::ReviewReport;
use crate::models::resume::TemplateKind;
use crate::review::review_and_store;
use crate::state::AppState;

const LAYOUT: &str = include_str!("../../templates/layout.html");
const INDEX: &str = include_str!("../../templates/index.html");
const TEMPLATE_CHOOSER: &str = include_str!("../../templates/template_chooser.html");
const BUILDER: &str = include_str!("../../templates/builder.html");
const REVIEWER: &str = include_str!("../../templates/reviewer.html");

/// Builder sections that get a textarea and an AI suggest button.
const SECTION_INPUTS: &[(&str, &str)] = &[
    ("summary", "Professional summary"),
    ("experience", "Work experience"),
    ("education", "Education"),
    ("projects", "Projects"),
    ("skills", "Skills (comma separated)"),
];

pub fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(
        LAYOUT
            .replace("{title}", &html_escape(title))
            .replace("{body}", body),
    )
}

/// GET /
pub async fn handle_home() -> Html<String> {
    page("Home", INDEX)
}

/// GET /templates
pub async fn handle_template_chooser() -> Html<String> {
    let cards: String = TemplateKind::ALL
        .iter()
        .map(|t| {
            format!(
                "  <div class=\"card\">\n    <h2>{}</h2>\n    <p>{}</p>\n    <a href=\"/builder?template={}\">Use this template</a>\n  </div>\n",
                t.label(),
                t.description(),
                t.slug()
            )
        })
        .collect();
    page("Templates", &TEMPLATE_CHOOSER.replace("{cards}", &cards))
}

#[derive(Debug, Deserialize)]
pub struct BuilderQuery {
    pub template: Option<String>,
}

/// GET /builder?template=
///
/// Unknown selectors fall back to the default template.
pub async fn handle_builder(Query(query): Query<BuilderQuery>) -> Html<String> {
    let selected = query
        .template
        .as_deref()
        .and_then(|t| t.parse::<TemplateKind>().ok())
        .unwrap_or_default();
    page("Builder", &render_builder(selected))
}

fn render_builder(selected: TemplateKind) -> String {
    let options: String = TemplateKind::ALL
        .iter()
        .map(|t| {
            let marker = if *t == selected { " selected" } else { "" };
            format!(
                "    <option value=\"{}\"{marker}>{}</option>\n",
                t.slug(),
                t.label()
            )
        })
        .collect();
    let sections: String = SECTION_INPUTS
        .iter()
        .map(|(id, label)| {
            format!(
                "  <label for=\"{id}\">{label}</label>\n  <textarea id=\"{id}\" name=\"{id}\"></textarea>\n  <button type=\"button\" onclick=\"getAISuggestion('{id}')\">AI Suggest</button>\n"
            )
        })
        .collect();
    BUILDER
        .replace("{template_options}", &options)
        .replace("{section_inputs}", &sections)
}

/// GET /reviewer
pub async fn handle_reviewer_form() -> Html<String> {
    page("Reviewer", &render_reviewer("", ""))
}

#[derive(Debug, Deserialize)]
pub struct ReviewerForm {
    pub resume_text: Option<String>,
}

/// POST /reviewer
///
/// Failures are rendered into the page with the matching status, never as JSON.
pub async fn handle_reviewer_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Result<Form<ReviewerForm>, FormRejection>,
) -> Response {
    let (text, outcome) = match form {
        Ok(Form(form)) => {
            let text = form.resume_text.unwrap_or_default();
            let outcome = review_and_store(&state, jar, &text).await;
            (text, outcome)
        }
        Err(rejection) => (String::new(), Err(AppError::Validation(rejection.body_text()))),
    };
    match outcome {
        Ok((jar, report)) => {
            let html = page("Reviewer", &render_reviewer(&text, &render_report(&report)));
            (jar, html).into_response()
        }
        Err(err) => {
            let status = err.status();
            let (_, message) = err.public_parts();
            if status.is_client_error() {
                warn!("Reviewer form rejected: {message}");
            }
            let annotation = format!(
                "<div class=\"error\" role=\"alert\">{}</div>",
                html_escape(&message)
            );
            let html = page("Reviewer", &render_reviewer(&text, &annotation));
            (status_or_500(status), html).into_response()
        }
    }
}

fn status_or_500(status: StatusCode) -> StatusCode {
    if status.is_client_error() || status.is_server_error() {
        status
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn render_reviewer(resume_text: &str, feedback: &str) -> String {
    let (head, tail) = REVIEWER.split_once("{resume_text}").unwrap_or((REVIEWER, ""));
    format!(
        "{head}{}{}",
        html_escape(resume_text),
        tail.replace("{feedback}", feedback)
    )
}

fn render_report(report: &ReviewReport) -> String {
    let mut html = format!(
        "<section id=\"feedback\">\n<h2>Review</h2>\n<div class=\"score\">{}/100</div>\n\
         <h3>ATS Compatibility</h3>\n<p>{}</p>\n<h3>Keyword Usage</h3>\n<p>{}</p>\n",
        report.overall_score,
        html_escape(&report.ats_compatibility),
        html_escape(&report.keyword_usage),
    );
    for (label, items) in report.list_sections() {
        if items.is_empty() {
            continue;
        }
        html.push_str(&format!("<h3>{label}</h3>\n<ul>\n"));
        for item in items {
            html.push_str(&format!("  <li>{}</li>\n", html_escape(item)));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("<a href=\"/api/export/report\">Download this report as PDF</a>\n</section>");
    html
}
