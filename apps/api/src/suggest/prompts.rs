// Prompt templates for per-section rewriting.
// Replace `{content}` and `{job_context}` before sending.

pub const SUGGEST_SYSTEM: &str = "You are an expert resume writer and career coach. \
    You rewrite individual resume sections so they are concise, results-oriented, \
    and keyword-optimized for applicant tracking systems.";

pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Rewrite this professional summary for a resume.
{job_context}
Rules:
- 2 to 4 sentences, third person implied (no "I", no name)
- Lead with years of experience and core specialty if the input states them
- Mention the strongest measurable result from the input, if any
- Use keywords a recruiter for this role would search for

SUMMARY:
{content}"#;

pub const EXPERIENCE_PROMPT_TEMPLATE: &str = r#"Rewrite this work experience section for a resume.
{job_context}
Rules:
- Keep every employer, title, and date exactly as given
- One bullet per line, each starting with "- " and a strong past-tense action verb
- Put the outcome first where possible and keep any numbers from the input
- At most 5 bullets per role, each under 25 words

EXPERIENCE:
{content}"#;

pub const EDUCATION_PROMPT_TEMPLATE: &str = r#"Rewrite this education section for a resume.
{job_context}
Rules:
- One line per qualification: degree, institution, year
- Keep honors, GPA, or relevant coursework only if present in the input
- Drop filler words; no bullets longer than one line

EDUCATION:
{content}"#;

pub const SKILLS_PROMPT_TEMPLATE: &str = r#"Rewrite this skills list for a resume.
{job_context}
Rules:
- Return a single comma-separated list, no categories, no trailing period
- Use the canonical spelling of each technology (e.g. "PostgreSQL", "JavaScript")
- Remove duplicates and soft skills that cannot be verified
- Order from most to least relevant for the target role

SKILLS:
{content}"#;

pub const PROJECTS_PROMPT_TEMPLATE: &str = r#"Rewrite this projects section for a resume.
{job_context}
Rules:
- Keep every project name and link exactly as given
- One bullet per line starting with "- ", describing what was built, with which technologies, and the result
- Keep any numbers from the input; at most 3 bullets per project

PROJECTS:
{content}"#;
