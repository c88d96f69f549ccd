//! kgraph Core - Data model, traits, and shared types
//!
//! This crate defines the core abstractions used throughout kgraph:
//! - Text and parse models (raw text, tokens, sentences)
//! - Extracted relations (subject, relation, object triplets)
//! - Common error types
//! - The sentence parser trait implemented by NLP backends
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, FetchConfig, LoggingConfig, OutputFormat, ParserBackend,
    ParserConfig, RenderConfig,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for kgraph operations
#[derive(Error, Debug)]
pub enum KgError {
    #[error("Sentence parser error: {0}")]
    SentenceParser(String),

    #[error("Invalid CoNLL-U at line {line}: {message}")]
    InvalidConllu { line: usize, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

pub type Result<T> = std::result::Result<T, KgError>;

// ============================================================================
// Raw Text
// ============================================================================

/// Text obtained from a source (document, plain-text file, web page)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawText(String);

impl RawText {
    /// Empty text, used when a source yields nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Only the zero-length string counts as empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for RawText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for RawText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl std::fmt::Display for RawText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Parse Models
// ============================================================================

/// Universal part-of-speech categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PosTag {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    /// Other, or any label the parser emits that is not a universal tag
    X,
}

impl PosTag {
    /// Get the upper-case label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adj => "ADJ",
            Self::Adp => "ADP",
            Self::Adv => "ADV",
            Self::Aux => "AUX",
            Self::Cconj => "CCONJ",
            Self::Det => "DET",
            Self::Intj => "INTJ",
            Self::Noun => "NOUN",
            Self::Num => "NUM",
            Self::Part => "PART",
            Self::Pron => "PRON",
            Self::Propn => "PROPN",
            Self::Punct => "PUNCT",
            Self::Sconj => "SCONJ",
            Self::Sym => "SYM",
            Self::Verb => "VERB",
            Self::X => "X",
        }
    }

    /// Parse a tag label, mapping anything unrecognised to `X`
    pub fn from_label(label: &str) -> Self {
        match label.to_uppercase().as_str() {
            "ADJ" => Self::Adj,
            "ADP" => Self::Adp,
            "ADV" => Self::Adv,
            "AUX" => Self::Aux,
            "CCONJ" | "CONJ" => Self::Cconj,
            "DET" => Self::Det,
            "INTJ" => Self::Intj,
            "NOUN" => Self::Noun,
            "NUM" => Self::Num,
            "PART" => Self::Part,
            "PRON" => Self::Pron,
            "PROPN" => Self::Propn,
            "PUNCT" => Self::Punct,
            "SCONJ" => Self::Sconj,
            "SYM" => Self::Sym,
            "VERB" => Self::Verb,
            _ => Self::X,
        }
    }
}

impl std::fmt::Display for PosTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed token: surface text, POS tag, and dependency label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface form as it appears in the text
    pub text: String,

    /// Part-of-speech category
    pub pos: PosTag,

    /// Dependency relation to the syntactic head (e.g. "nsubj", "obj")
    pub dep: String,
}

impl Token {
    /// Create a new token
    pub fn new(text: impl Into<String>, pos: PosTag, dep: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos,
            dep: dep.into(),
        }
    }
}

/// An ordered sequence of tokens, as split by the sentence parser
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    tokens: Vec<Token>,
}

impl Sentence {
    /// Create a sentence from tokens in parser order
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token texts joined by single spaces
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromIterator<Token> for Sentence {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Extracted Relations
// ============================================================================

/// A (subject, relation, object) triplet extracted from one sentence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triplet {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Triplet {
    /// Create a new triplet
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

impl std::fmt::Display for Triplet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:?}, {:?}, {:?})",
            self.subject, self.relation, self.object
        )
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for dependency parsers that split text into annotated sentences
#[async_trait::async_trait]
pub trait SentenceParser: Send + Sync {
    /// Split text into sentences of POS-tagged, dependency-labelled tokens
    async fn parse(&self, text: &str) -> Result<Vec<Sentence>>;

    /// Get parser name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct WhitespaceParser;

    #[async_trait::async_trait]
    impl SentenceParser for WhitespaceParser {
        async fn parse(&self, text: &str) -> Result<Vec<Sentence>> {
            Ok(text
                .split('.')
                .map(|s| {
                    s.split_whitespace()
                        .map(|w| Token::new(w, PosTag::X, "dep"))
                        .collect::<Sentence>()
                })
                .filter(|s| !s.is_empty())
                .collect())
        }

        fn name(&self) -> &str {
            "whitespace"
        }
    }

    #[test]
    fn test_pos_tag_from_label() {
        assert_eq!(PosTag::from_label("VERB"), PosTag::Verb);
        assert_eq!(PosTag::from_label("propn"), PosTag::Propn);
        assert_eq!(PosTag::from_label("CONJ"), PosTag::Cconj);
        assert_eq!(PosTag::from_label("VB"), PosTag::X);
        assert_eq!(PosTag::Verb.to_string(), "VERB");
    }

    #[test]
    fn test_pos_tag_serde_uses_labels() {
        let json = serde_json::to_string(&PosTag::Propn).unwrap();
        assert_eq!(json, "\"PROPN\"");
        let tag: PosTag = serde_json::from_str("\"VERB\"").unwrap();
        assert_eq!(tag, PosTag::Verb);
    }

    #[test]
    fn test_raw_text_emptiness() {
        assert!(RawText::empty().is_empty());
        assert!(!RawText::from(" ").is_empty());
        assert_eq!(RawText::from("a b  c").len(), 6);
    }

    #[test]
    fn test_sentence_text() {
        let sentence = Sentence::new(vec![
            Token::new("Alice", PosTag::Propn, "nsubj"),
            Token::new("wrote", PosTag::Verb, "ROOT"),
        ]);
        assert_eq!(sentence.len(), 2);
        assert_eq!(sentence.text(), "Alice wrote");
    }

    #[test]
    fn test_triplet_display_as_tuple() {
        let triplet = Triplet::new("Alice", "wrote", "letter");
        assert_eq!(triplet.to_string(), r#"("Alice", "wrote", "letter")"#);
    }

    #[test]
    fn test_sentence_parser_trait_object() {
        let parser: Box<dyn SentenceParser> = Box::new(WhitespaceParser);
        let sentences = tokio_test::block_on(parser.parse("One two. Three.")).unwrap();
        assert_eq!(parser.name(), "whitespace");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1].tokens()[0].text, "Three");
    }
}
