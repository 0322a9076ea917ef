//! Resume draft → PDF. The header always renders; every other section only
//! when it has content.

use crate::export::pdf::{render_blocks, Block, RenderedPdf};
use crate::export::style::PdfStyle;
use crate::export::ExportError;
use crate::models::resume::{ResumeDraft, ResumeEntry};

pub fn plan_resume(draft: &ResumeDraft) -> Vec<Block> {
    let mut blocks = vec![Block::Title(draft.name.clone())];

    if !draft.title.is_empty() {
        blocks.push(Block::Subtitle(draft.title.clone()));
    }
    let contact = draft.contact_line();
    if !contact.is_empty() {
        blocks.push(Block::HeaderLine(contact));
    }
    if !draft.links.is_empty() {
        blocks.push(Block::HeaderLine(draft.links.join("  |  ")));
    }

    if !draft.summary.is_empty() {
        blocks.push(Block::SectionHeading("Professional Summary".into()));
        blocks.push(Block::Paragraph(draft.summary.clone()));
    }

    push_entries(&mut blocks, "Work Experience", &draft.experience);
    push_entries(&mut blocks, "Education", &draft.education);
    push_entries(&mut blocks, "Projects", &draft.projects);

    let skills = draft.skill_list();
    if !skills.is_empty() {
        blocks.push(Block::SectionHeading("Skills".into()));
        blocks.push(Block::Paragraph(skills.join("  |  ")));
    }

    blocks
}

fn push_entries(blocks: &mut Vec<Block>, heading: &str, entries: &[ResumeEntry]) {
    if entries.is_empty() {
        return;
    }
    blocks.push(Block::SectionHeading(heading.to_string()));

    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            blocks.push(Block::Gap(2.0));
        }

        let heading = entry.heading();
        let dates = entry.date_range();
        if !heading.is_empty() || !dates.is_empty() {
            blocks.push(Block::EntryHeading {
                text: heading,
                dates,
            });
        }

        let meta: Vec<&str> = [entry.location.as_str(), entry.link.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        if !meta.is_empty() {
            blocks.push(Block::Meta(meta.join("  |  ")));
        }

        if !entry.description.is_empty() {
            blocks.push(Block::Paragraph(entry.description.clone()));
        }
        blocks.extend(entry.highlights.iter().cloned().map(Block::Bullet));
    }
}

/// Renders a validated draft. CPU-bound; call from `spawn_blocking`.
pub fn render_resume_pdf(draft: &ResumeDraft) -> Result<RenderedPdf, ExportError> {
    let style = PdfStyle::for_template(draft.template);
    let title = format!("{} - Resume", draft.name);
    render_blocks(&plan_resume(draft), &style, &title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::DraftInput;
    use serde_json::json;

    fn draft(value: serde_json::Value) -> ResumeDraft {
        serde_json::from_value::<DraftInput>(value)
            .unwrap()
            .normalize()
            .unwrap()
    }

    fn headings(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::SectionHeading(h) => Some(h.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_name_only_draft_has_no_sections() {
        let blocks = plan_resume(&draft(json!({"name": "Grace Hopper"})));
        assert_eq!(blocks, vec![Block::Title("Grace Hopper".into())]);
    }

    #[test]
    fn test_sections_render_in_fixed_order_when_present() {
        let blocks = plan_resume(&draft(json!({
            "name": "Grace",
            "skills": "COBOL",
            "projects": [{"name": "A-0"}],
            "summary": "Pioneer.",
            "experience": [{"role": "Engineer"}],
        })));
        assert_eq!(
            headings(&blocks),
            vec!["Professional Summary", "Work Experience", "Projects", "Skills"]
        );
    }

    #[test]
    fn test_entry_blocks_carry_dates_meta_and_bullets() {
        let blocks = plan_resume(&draft(json!({
            "name": "Grace",
            "experience": [{
                "role": "Engineer", "company": "Navy", "location": "Arlington",
                "start": "1943", "end": "1986",
                "bullets": ["Built A-0", "Popularized debugging"]
            }],
        })));
        assert!(blocks.contains(&Block::EntryHeading {
            text: "Engineer, Navy".into(),
            dates: "1943 - 1986".into(),
        }));
        assert!(blocks.contains(&Block::Meta("Arlington".into())));
        assert!(blocks.contains(&Block::Bullet("Popularized debugging".into())));
    }

    #[test]
    fn test_contact_and_links_render_in_header() {
        let blocks = plan_resume(&draft(json!({
            "name": "Grace",
            "title": "Rear Admiral",
            "email": "g@navy.mil",
            "phone": "555",
            "links": ["https://a.dev", "https://b.dev"],
        })));
        assert_eq!(blocks[1], Block::Subtitle("Rear Admiral".into()));
        assert_eq!(blocks[2], Block::HeaderLine("g@navy.mil  |  555".into()));
        assert_eq!(blocks[3], Block::HeaderLine("https://a.dev  |  https://b.dev".into()));
    }

    #[test]
    fn test_render_every_template() {
        for template in ["modern", "classic", "minimal", "compact"] {
            let d = draft(json!({
                "name": "Grace Hopper",
                "summary": "Computer scientist \u{2014} \u{201C}Amazing Grace\u{201D}.",
                "experience": "Engineer at the Navy\n\nProfessor at Vassar",
                "skills": "COBOL, Compilers",
                "template": template,
            }));
            let pdf = render_resume_pdf(&d).unwrap();
            assert!(pdf.bytes.starts_with(b"%PDF"), "template {template}");
        }
    }
}
