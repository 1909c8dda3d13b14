use crate::error::{text_extraction_error, CalResult, Error};
use lopdf::Document;
use tracing::{debug, warn};

/// The only content type supported for automatic processing
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Check whether a declared content type is supported for automatic processing
pub fn is_supported_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    media_type == PDF_CONTENT_TYPE
}

/// Extract the plain-text content of an uploaded document.
///
/// Only PDF is supported; any other declared type is rejected before
/// extraction runs. Text is pulled per page in page order and concatenated
/// with newline separators. There is no OCR: a scanned document with no
/// embedded text layer yields empty or garbage text, which downstream
/// stages must tolerate.
pub fn extract_document_text(bytes: &[u8], content_type: &str) -> CalResult<String> {
    if !is_supported_content_type(content_type) {
        return Err(Error::UnsupportedDocument(format!(
            "Automatic processing supports PDF only, got '{}'",
            content_type
        )));
    }

    let doc = Document::load_mem(bytes)
        .map_err(|e| text_extraction_error(&format!("Failed to parse PDF document: {}", e)))?;

    let pages = doc.get_pages();
    debug!("Extracting text from {} page(s)", pages.len());

    let mut page_texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => page_texts.push(text),
            Err(e) => {
                // A single unreadable page does not fail the document
                warn!("Failed to extract text from page {}: {}", page_number, e);
            }
        }
    }

    Ok(page_texts.join("\n").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_content_types() {
        assert!(is_supported_content_type("application/pdf"));
        assert!(is_supported_content_type("Application/PDF"));
        assert!(is_supported_content_type("application/pdf; charset=binary"));
        assert!(!is_supported_content_type("application/msword"));
        assert!(!is_supported_content_type("text/plain"));
        assert!(!is_supported_content_type(""));
    }

    #[test]
    fn corrupt_document_is_an_extraction_failure() {
        let result = extract_document_text(b"not a pdf at all", PDF_CONTENT_TYPE);
        assert!(matches!(result, Err(Error::TextExtraction(_))));
    }

    #[test]
    fn non_pdf_is_rejected_before_parsing() {
        let result = extract_document_text(b"%PDF-1.5 ...", "image/png");
        assert!(matches!(result, Err(Error::UnsupportedDocument(_))));
    }
}
