//! CoNLL-U reader
//!
//! Reads the tab-separated format produced by Universal Dependencies parsers
//! into sentences. Only FORM, UPOS and DEPREL are kept.

use async_trait::async_trait;
use kg_core::{KgError, PosTag, Result, Sentence, SentenceParser, Token};

const FIELD_COUNT: usize = 10;
const FORM: usize = 1;
const UPOS: usize = 3;
const DEPREL: usize = 7;

/// Parse CoNLL-U text into sentences
pub fn parse_conllu(input: &str) -> Result<Vec<Sentence>> {
    let mut sentences = Vec::new();
    let mut tokens = Vec::new();

    for (index, line) in input.lines().enumerate() {
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() {
            flush(&mut tokens, &mut sentences);
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < FIELD_COUNT {
            return Err(KgError::InvalidConllu {
                line: index + 1,
                message: format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
            });
        }

        // Multi-word ranges ("3-4") and empty nodes ("5.1") are not surface tokens
        let id = fields[0];
        if id.contains('-') || id.contains('.') {
            continue;
        }

        tokens.push(Token::new(
            fields[FORM],
            PosTag::from_label(fields[UPOS]),
            fields[DEPREL],
        ));
    }
    flush(&mut tokens, &mut sentences);

    Ok(sentences)
}

fn flush(tokens: &mut Vec<Token>, sentences: &mut Vec<Sentence>) {
    if !tokens.is_empty() {
        sentences.push(Sentence::new(std::mem::take(tokens)));
    }
}

/// Sentence parser for text that is already CoNLL-U
pub struct ConlluParser;

#[async_trait]
impl SentenceParser for ConlluParser {
    async fn parse(&self, text: &str) -> Result<Vec<Sentence>> {
        parse_conllu(text)
    }

    fn name(&self) -> &str {
        "conllu"
    }
}
