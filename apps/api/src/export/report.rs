use crate::export::pdf::{render_blocks, Block, RenderedPdf};
use crate::export::style::PdfStyle;
use crate::export::ExportError;
use crate::models::report::ReviewReport;

pub const REPORT_FILENAME: &str = "Resume_Analysis_Report.pdf";

pub fn plan_report(report: &ReviewReport) -> Vec<Block> {
    let mut blocks = vec![
        Block::Title("Resume Analysis Report".into()),
        Block::Subtitle(format!(
            "Generated {}",
            report.created_at.format("%B %-d, %Y at %H:%M UTC")
        )),
        Block::SectionHeading("Overall Score".into()),
        Block::Paragraph(format!("{}/100", report.overall_score)),
    ];

    if !report.ats_compatibility.is_empty() {
        blocks.push(Block::SectionHeading("ATS Compatibility".into()));
        blocks.push(Block::Paragraph(report.ats_compatibility.clone()));
    }
    if !report.keyword_usage.is_empty() {
        blocks.push(Block::SectionHeading("Keyword Usage".into()));
        blocks.push(Block::Paragraph(report.keyword_usage.clone()));
    }

    for (heading, items) in report.list_sections() {
        if items.is_empty() {
            continue;
        }
        blocks.push(Block::SectionHeading(heading.to_string()));
        blocks.extend(items.iter().cloned().map(Block::Bullet));
    }

    blocks
}

/// CPU-bound; call from `spawn_blocking`.
pub fn render_report_pdf(report: &ReviewReport) -> Result<RenderedPdf, ExportError> {
    render_blocks(&plan_report(report), &PdfStyle::report(), "Resume Analysis Report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn report() -> ReviewReport {
        ReviewReport {
            overall_score: 72,
            ats_compatibility: "Single column layout parses cleanly.".into(),
            keyword_usage: String::new(),
            strengths: vec!["Quantified impact".into()],
            weaknesses: vec![],
            missing_sections: vec!["Projects".into()],
            improvements: vec!["Add a summary".into(), "Lead with metrics".into()],
            created_at: Utc.with_ymd_and_hms(2026, 3, 4, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_plan_skips_empty_parts() {
        let blocks = plan_report(&report());
        assert!(blocks.contains(&Block::SectionHeading("ATS Compatibility".into())));
        assert!(!blocks.contains(&Block::SectionHeading("Keyword Usage".into())));
        assert!(!blocks.contains(&Block::SectionHeading("Weaknesses".into())));
        assert!(blocks.contains(&Block::Bullet("Lead with metrics".into())));
    }

    #[test]
    fn test_plan_includes_score_and_date() {
        let blocks = plan_report(&report());
        assert!(blocks.contains(&Block::Paragraph("72/100".into())));
        assert_eq!(
            blocks[1],
            Block::Subtitle("Generated March 4, 2026 at 09:30 UTC".into())
        );
    }

    #[test]
    fn test_render_report_pdf() {
        let pdf = render_report_pdf(&report()).unwrap();
        assert!(pdf.bytes.starts_with(b"%PDF"));
    }
}
