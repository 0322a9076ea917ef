use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured feedback produced by the reviewer, kept in the session so it can be exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    /// 0 to 100, clamped on the way in.
    pub overall_score: u8,
    pub ats_compatibility: String,
    pub keyword_usage: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub missing_sections: Vec<String>,
    pub improvements: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ReviewReport {
    /// Labeled list sections in the order they are displayed and exported.
    pub fn list_sections(&self) -> [(&'static str, &[String]); 4] {
        [
            ("Strengths", self.strengths.as_slice()),
            ("Weaknesses", self.weaknesses.as_slice()),
            ("Missing Sections", self.missing_sections.as_slice()),
            ("Suggested Improvements", self.improvements.as_slice()),
        ]
    }
}
