//! PDF document parser using pdf-extract
//!
//! Extracts the text of every page, concatenated in page order.

use crate::{DocumentParser, FileType, ParsedDocument, ParserError, Result};

/// PDF document parser
pub struct PdfParser;

impl PdfParser {
    /// Extract text from PDF bytes
    fn extract_text(&self, bytes: &[u8]) -> Result<(String, Option<u32>)> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ParserError::PdfError(e.to_string()))?;

        let page_count = estimate_page_count(&text);
        Ok((text, page_count))
    }
}

/// Rough page count from the form feeds pdf-extract places between pages
fn estimate_page_count(text: &str) -> Option<u32> {
    let breaks = text.matches('\x0C').count() as u32;
    if breaks > 0 {
        Some(breaks + 1)
    } else {
        None
    }
}

impl DocumentParser for PdfParser {
    fn parse_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<ParsedDocument> {
        let (text, page_count) = self.extract_text(bytes)?;

        let mut doc = ParsedDocument::new(file_name, FileType::Pdf).with_content(text);
        doc.page_count = page_count;

        Ok(doc)
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::Pdf]
    }
}
