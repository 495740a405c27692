//! PDF → plain text via `pdf-extract`.

use crate::errors::AppError;

/// Extracts text from an uploaded PDF page by page. Pages with no visible text
/// are dropped and the rest joined with a blank line. A PDF that yields no
/// text is an input error.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, AppError> {
    if bytes.is_empty() {
        return Err(AppError::Input("Uploaded resume file is empty.".to_string()));
    }

    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| AppError::Input(format!("Could not read the PDF: {e}")))?;

    let text = join_pages(&pages);
    if text.is_empty() {
        return Err(AppError::Input(
            "Could not extract text from the PDF.".to_string(),
        ));
    }
    Ok(text)
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
