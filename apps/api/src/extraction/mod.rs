//! Text extraction — turns an uploaded PDF into one flat string.
//!
//! Pages are read in document order and appended without any separator or
//! page marker. All PDF parsing is delegated to `pdf-extract`.

use thiserror::Error;

#[cfg(test)]
pub(crate) mod fixtures;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no document payload was supplied")]
    MissingInput,

    #[error("PDF could not be parsed: {0}")]
    Malformed(String),
}

/// Output of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

/// Converts document bytes into plain text.
///
/// Synchronous on purpose: callers run it on the blocking pool.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, payload: Option<&[u8]>) -> Result<ExtractedText, ExtractError>;
}

/// Production extractor backed by `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, payload: Option<&[u8]>) -> Result<ExtractedText, ExtractError> {
        let bytes = payload.ok_or(ExtractError::MissingInput)?;

        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| ExtractError::Malformed(e.to_string()))?;

        Ok(ExtractedText {
            page_count: pages.len(),
            text: concat_pages(pages),
        })
    }
}

/// Order-preserving, unannotated concatenation of per-page text.
pub fn concat_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages.into_iter().fold(String::new(), |mut acc, page| {
        acc.push_str(page.as_ref());
        acc
    })
}
