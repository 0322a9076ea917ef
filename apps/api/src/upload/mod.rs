// Resume upload: accepts PDF / DOC / DOCX under a size cap and returns the extracted text.

pub mod extract;
pub mod handlers;
