//! Resume draft: the one record a session persists.
//!
//! Input arrives loosely shaped (form textareas, older clients, hand-written
//! JSON), so `DraftInput` accepts strings or lists and a handful of field
//! synonyms. `DraftInput::normalize` turns it into the canonical
//! `ResumeDraft`, which is what gets stored and returned. Normalizing an
//! already-normalized draft yields the same draft.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::AppError;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
    #[error("name is required")]
    MissingName,

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
}

impl From<DraftError> for AppError {
    fn from(e: DraftError) -> Self {
        AppError::Validation(e.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Template selector
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    Modern,
    Classic,
    Minimal,
    Compact,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Modern,
        TemplateKind::Classic,
        TemplateKind::Minimal,
        TemplateKind::Compact,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            TemplateKind::Modern => "modern",
            TemplateKind::Classic => "classic",
            TemplateKind::Minimal => "minimal",
            TemplateKind::Compact => "compact",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemplateKind::Modern => "Modern",
            TemplateKind::Classic => "Classic",
            TemplateKind::Minimal => "Minimal",
            TemplateKind::Compact => "Compact",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TemplateKind::Modern => "Clean sans-serif layout with a blue accent.",
            TemplateKind::Classic => "Traditional serif layout, safe for conservative industries.",
            TemplateKind::Minimal => "Monochrome and spacious, nothing but the content.",
            TemplateKind::Compact => "Tighter spacing to fit a long history on fewer pages.",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TemplateKind {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        TemplateKind::ALL
            .into_iter()
            .find(|t| t.slug() == wanted)
            .ok_or_else(|| DraftError::UnknownTemplate(s.trim().to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical (stored) shape
// ────────────────────────────────────────────────────────────────────────────

/// One item in the experience, education, or projects list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeEntry {
    pub title: String,
    pub organization: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub link: String,
    pub description: String,
    pub highlights: Vec<String>,
}

impl ResumeEntry {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.organization.is_empty()
            && self.location.is_empty()
            && self.start_date.is_empty()
            && self.end_date.is_empty()
            && self.link.is_empty()
            && self.description.is_empty()
            && self.highlights.is_empty()
    }

    /// "Jan 2020 - Present", "2019", or empty.
    pub fn date_range(&self) -> String {
        match (self.start_date.is_empty(), self.end_date.is_empty()) {
            (false, false) => format!("{} - {}", self.start_date, self.end_date),
            (false, true) => self.start_date.clone(),
            (true, false) => self.end_date.clone(),
            (true, true) => String::new(),
        }
    }

    /// Title and organization joined the way a resume line reads them.
    pub fn heading(&self) -> String {
        match (self.title.is_empty(), self.organization.is_empty()) {
            (false, false) => format!("{}, {}", self.title, self.organization),
            (false, true) => self.title.clone(),
            (true, false) => self.organization.clone(),
            (true, true) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeDraft {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub links: Vec<String>,
    pub summary: String,
    pub experience: Vec<ResumeEntry>,
    pub education: Vec<ResumeEntry>,
    pub projects: Vec<ResumeEntry>,
    pub skills: String,
    pub template: TemplateKind,
}

impl ResumeDraft {
    /// Rules enforced before a draft is stored or exported.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.name.is_empty() {
            return Err(DraftError::MissingName);
        }
        if !self.email.is_empty() && !EMAIL_RE.is_match(&self.email) {
            return Err(DraftError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }

    pub fn skill_list(&self) -> Vec<&str> {
        self.skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Email, phone, and location joined with separators, skipping blanks.
    pub fn contact_line(&self) -> String {
        [&self.email, &self.phone, &self.location]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("  |  ")
    }

    /// `Jane_Q_Doe_Resume.pdf`, safe for a Content-Disposition header.
    pub fn download_filename(&self) -> String {
        let stem: String = self
            .name
            .split_whitespace()
            .map(|part| {
                part.chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                    .collect::<String>()
            })
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        if stem.is_empty() {
            "Resume.pdf".to_string()
        } else {
            format!("{stem}_Resume.pdf")
        }
    }

    /// Plain-text rendition, used when the reviewer is asked to look at the stored draft.
    pub fn to_plain_text(&self) -> String {
        let mut out = Vec::new();
        out.push(self.name.clone());
        if !self.title.is_empty() {
            out.push(self.title.clone());
        }
        let contact = self.contact_line();
        if !contact.is_empty() {
            out.push(contact);
        }
        out.extend(self.links.iter().cloned());

        if !self.summary.is_empty() {
            out.push(String::new());
            out.push("SUMMARY".to_string());
            out.push(self.summary.clone());
        }
        for (heading, entries) in [
            ("EXPERIENCE", &self.experience),
            ("EDUCATION", &self.education),
            ("PROJECTS", &self.projects),
        ] {
            if entries.is_empty() {
                continue;
            }
            out.push(String::new());
            out.push(heading.to_string());
            for entry in entries {
                let line = [entry.heading(), entry.date_range(), entry.location.clone()]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" | ");
                if !line.is_empty() {
                    out.push(line);
                }
                if !entry.description.is_empty() {
                    out.push(entry.description.clone());
                }
                out.extend(entry.highlights.iter().map(|h| format!("- {h}")));
            }
        }
        if !self.skills.is_empty() {
            out.push(String::new());
            out.push("SKILLS".to_string());
            out.push(self.skills.clone());
        }
        out.join("\n").trim().to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Loose input shape
// ────────────────────────────────────────────────────────────────────────────

/// Either a single string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntriesInput {
    /// A whole textarea; one entry per blank-line-separated paragraph.
    Text(String),
    List(Vec<EntryInput>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntryInput {
    Text(String),
    Fields(EntryFields),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EntryFields {
    #[serde(alias = "role", alias = "position", alias = "degree", alias = "name")]
    pub title: Option<String>,
    #[serde(alias = "company", alias = "institution", alias = "school", alias = "employer")]
    pub organization: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "start")]
    pub start_date: Option<String>,
    #[serde(alias = "end")]
    pub end_date: Option<String>,
    #[serde(alias = "url")]
    pub link: Option<String>,
    #[serde(alias = "details")]
    pub description: Option<String>,
    #[serde(alias = "bullets")]
    pub highlights: Option<TextOrList>,
}

/// Request body for saving or exporting a draft.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DraftInput {
    pub name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub links: Option<TextOrList>,
    pub summary: Option<String>,
    pub experience: Option<EntriesInput>,
    pub education: Option<EntriesInput>,
    pub projects: Option<EntriesInput>,
    pub skills: Option<TextOrList>,
    pub template: Option<String>,
}

impl DraftInput {
    pub fn normalize(self) -> Result<ResumeDraft, DraftError> {
        let template = match self.template.as_deref().map(str::trim) {
            None | Some("") => TemplateKind::default(),
            Some(raw) => raw.parse()?,
        };

        Ok(ResumeDraft {
            name: clean(self.name),
            title: clean(self.title),
            email: clean(self.email),
            phone: clean(self.phone),
            location: clean(self.location),
            links: normalize_links(self.links),
            summary: clean(self.summary),
            experience: normalize_entries(self.experience),
            education: normalize_entries(self.education),
            projects: normalize_entries(self.projects),
            skills: normalize_skills(self.skills),
            template,
        })
    }
}

fn clean(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn normalize_links(links: Option<TextOrList>) -> Vec<String> {
    let raw: Vec<String> = match links {
        None => Vec::new(),
        Some(TextOrList::Text(text)) => text
            .split(|c: char| c.is_whitespace() || c == ',')
            .map(str::to_string)
            .collect(),
        Some(TextOrList::List(list)) => list,
    };
    let mut out: Vec<String> = Vec::new();
    for link in raw {
        let link = link.trim();
        if !link.is_empty() && !out.iter().any(|l| l == link) {
            out.push(link.to_string());
        }
    }
    out
}

fn normalize_skills(skills: Option<TextOrList>) -> String {
    let raw: Vec<String> = match skills {
        None => Vec::new(),
        Some(TextOrList::Text(text)) => vec![text],
        Some(TextOrList::List(list)) => list,
    };
    let mut out: Vec<String> = Vec::new();
    for chunk in &raw {
        for skill in chunk.split([',', '\n']) {
            let skill = skill.trim();
            if skill.is_empty() {
                continue;
            }
            if !out.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
                out.push(skill.to_string());
            }
        }
    }
    out.join(", ")
}

fn normalize_highlights(highlights: Option<TextOrList>) -> Vec<String> {
    let raw: Vec<String> = match highlights {
        None => Vec::new(),
        Some(TextOrList::Text(text)) => text.lines().map(str::to_string).collect(),
        Some(TextOrList::List(list)) => list,
    };
    raw.iter()
        .map(|h| strip_bullet(h))
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}

/// Removes leading list markers and surrounding whitespace; stable under repetition.
pub fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(|c: char| matches!(c, '-' | '*' | '•') || c.is_whitespace())
        .trim_end()
}

fn normalize_entries(entries: Option<EntriesInput>) -> Vec<ResumeEntry> {
    let items: Vec<EntryInput> = match entries {
        None => Vec::new(),
        Some(EntriesInput::List(list)) => list,
        Some(EntriesInput::Text(text)) => split_paragraphs(&text)
            .into_iter()
            .map(EntryInput::Text)
            .collect(),
    };
    items
        .into_iter()
        .map(|item| match item {
            EntryInput::Text(text) => ResumeEntry {
                description: text.trim().to_string(),
                ..ResumeEntry::default()
            },
            EntryInput::Fields(fields) => ResumeEntry {
                title: clean(fields.title),
                organization: clean(fields.organization),
                location: clean(fields.location),
                start_date: clean(fields.start_date),
                end_date: clean(fields.end_date),
                link: clean(fields.link),
                description: clean(fields.description),
                highlights: normalize_highlights(fields.highlights),
            },
        })
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Splits a textarea into paragraphs separated by one or more blank lines.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
}
