//! kgraph Parser - Text extraction from documents and web pages
//!
//! Supports obtaining raw text from:
//! - PDF documents
//! - Plain text files (txt, md, conllu)
//! - Web pages (paragraph text only)
//!
//! Each document parser implements the `DocumentParser` trait and produces
//! a `ParsedDocument`. The `TextSourceAdapter` ties document parsing and web
//! fetching together behind a single `fetch` operation.

use std::path::Path;

use kg_core::{FetchConfig, RawText};
use thiserror::Error;

pub mod pdf;
pub mod web;

pub use pdf::PdfParser;
pub use web::WebFetcher;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while obtaining text
#[derive(Error, Debug)]
pub enum ParserError {
    /// File format is not supported
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// IO error while reading the file
    #[error("IO error reading file {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// PDF parsing error
    #[error("PDF parsing error: {0}")]
    PdfError(String),

    /// Encoding error
    #[error("Text encoding error: {0}")]
    EncodingError(String),

    /// HTML could not be processed
    #[error("HTML parsing error: {0}")]
    HtmlError(String),

    /// Web page could not be fetched
    #[error("Failed to fetch URL content: {message}")]
    FetchError { url: String, message: String },
}

pub type Result<T> = std::result::Result<T, ParserError>;

// ============================================================================
// Parsed Document Types
// ============================================================================

/// A parsed document with extracted content
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Original file name
    pub file_name: String,

    /// Detected file type
    pub file_type: FileType,

    /// Extracted text content
    pub content: String,

    /// Number of pages (if known)
    pub page_count: Option<u32>,
}

impl ParsedDocument {
    /// Create a new parsed document
    pub fn new(file_name: impl Into<String>, file_type: FileType) -> Self {
        Self {
            file_name: file_name.into(),
            file_type,
            content: String::new(),
            page_count: None,
        }
    }

    /// Set content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Get total word count (approximate)
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Supported file types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    PlainText,
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" | "md" | "conllu" => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a file name or path
    pub fn from_name(name: &str) -> Self {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::PlainText => write!(f, "text"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// Parser Trait
// ============================================================================

/// Trait for document parsers
pub trait DocumentParser: Send + Sync {
    /// Parse a document from its uploaded bytes
    fn parse_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<ParsedDocument>;

    /// Get supported file types
    fn supported_types(&self) -> &[FileType];

    /// Check if this parser can handle a file type
    fn can_parse(&self, file_type: FileType) -> bool {
        self.supported_types().contains(&file_type)
    }
}

/// Plain text parser
pub struct PlainTextParser;

impl DocumentParser for PlainTextParser {
    fn parse_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<ParsedDocument> {
        let content = std::str::from_utf8(bytes)
            .map_err(|e| ParserError::EncodingError(format!("{file_name}: {e}")))?;

        Ok(ParsedDocument::new(file_name, FileType::PlainText).with_content(content))
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::PlainText]
    }
}

// ============================================================================
// Parser Registry
// ============================================================================

/// Registry of available parsers
pub struct ParserRegistry {
    parsers: Vec<Box<dyn DocumentParser>>,
}

impl ParserRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Create a registry with the PDF and plain text parsers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PdfParser);
        registry.register(PlainTextParser);
        registry
    }

    /// Register a parser
    pub fn register<P: DocumentParser + 'static>(&mut self, parser: P) {
        self.parsers.push(Box::new(parser));
    }

    /// Find a parser for a file type
    pub fn find_parser(&self, file_type: FileType) -> Option<&dyn DocumentParser> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(file_type))
            .map(|p| p.as_ref())
    }

    /// Parse uploaded bytes using the parser matching the file name
    pub fn parse_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<ParsedDocument> {
        let file_type = FileType::from_name(file_name);

        if file_type == FileType::Unknown {
            return Err(ParserError::UnsupportedFormat(
                Path::new(file_name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("none")
                    .to_string(),
            ));
        }

        let parser = self
            .find_parser(file_type)
            .ok_or_else(|| ParserError::UnsupportedFormat(file_type.to_string()))?;

        parser.parse_bytes(file_name, bytes)
    }

}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Text Source Adapter
// ============================================================================

/// Where raw text comes from
#[derive(Debug, Clone)]
pub enum TextSource {
    /// An uploaded document identified by its name and content
    Document { name: String, bytes: Vec<u8> },
    /// A web page
    Url(String),
}

impl TextSource {
    /// Build a document source from a file on disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::Document { name, bytes })
    }
}

/// Obtains raw text from documents or URLs
pub struct TextSourceAdapter {
    registry: ParserRegistry,
    fetcher: WebFetcher,
}

impl TextSourceAdapter {
    /// Create an adapter with the default parsers
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            registry: ParserRegistry::with_defaults(),
            fetcher: WebFetcher::new(config)?,
        })
    }

    /// Fetch raw text from a source.
    ///
    /// Documents with an unrecognised extension yield empty text rather than
    /// an error. Fetch failures are returned to the caller, which decides
    /// whether to surface them.
    pub async fn fetch(&self, source: &TextSource) -> Result<RawText> {
        match source {
            TextSource::Document { name, bytes } => {
                if FileType::from_name(name) == FileType::Unknown {
                    tracing::debug!(file = %name, "Unrecognised file extension, no text extracted");
                    return Ok(RawText::empty());
                }

                let doc = self.registry.parse_bytes(name, bytes)?;
                tracing::debug!(
                    file = %name,
                    file_type = %doc.file_type,
                    pages = ?doc.page_count,
                    words = doc.word_count(),
                    "Document parsed"
                );
                Ok(RawText::from(doc.content))
            }
            TextSource::Url(url) => self.fetcher.fetch(url).await,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
