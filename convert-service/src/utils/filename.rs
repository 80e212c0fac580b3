//! Naming rules for stored media.
//!
//! The stored PDF keeps the client's file name (minus any directory
//! components) and the DOCX is always `<stem>.docx` next to it in `docx/`.

/// Strips any client-side directory components (`/` or `\`) and surrounding
/// whitespace. Returns `None` when nothing usable is left.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// Case-insensitive check for the literal `.pdf` suffix.
pub fn has_pdf_extension(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(".pdf")
}

/// Replaces the final extension with `.docx`, keeping the stem's case.
/// Leading dots never start an extension, so a name that is only dots plus
/// `pdf` is kept whole: `.pdf` maps to `.pdf.docx` and `..pdf` to
/// `..pdf.docx`.
pub fn docx_file_name(pdf_file_name: &str) -> String {
    let stem = match pdf_file_name.rfind('.') {
        Some(dot) if !pdf_file_name[..dot].chars().all(|c| c == '.') => &pdf_file_name[..dot],
        _ => pdf_file_name,
    };
    format!("{}.docx", stem)
}
