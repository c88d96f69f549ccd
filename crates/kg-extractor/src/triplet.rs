//! Triplet extraction
//!
//! Reduces each parsed sentence to at most one (subject, relation, object)
//! triplet with a shallow, label-driven heuristic. The parse tree itself is
//! never walked: a single forward pass keeps the last token matching each
//! role, so subject, verb and object need not share a clause or a head.

use kg_core::{PosTag, Sentence, Token, Triplet};

/// Any dependency label containing this fills the subject slot
/// (nsubj, nsubj:pass, csubj, nsubjpass, ...)
const SUBJECT_MARKER: &str = "subj";

/// Any dependency label containing this fills the object slot
/// (obj, dobj, iobj, pobj, ...)
const OBJECT_MARKER: &str = "obj";

/// Last-match-wins subject/verb/object extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct TripletExtractor;

impl TripletExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract triplets from sentences, keeping sentence order.
    ///
    /// Sentences lacking a subject, a verb or an object contribute nothing.
    pub fn extract(&self, sentences: &[Sentence]) -> Vec<Triplet> {
        let triplets: Vec<Triplet> = sentences
            .iter()
            .filter_map(|s| self.extract_sentence(s))
            .collect();

        tracing::debug!(
            sentences = sentences.len(),
            triplets = triplets.len(),
            "Triplet extraction finished"
        );
        triplets
    }

    /// Extract the triplet for a single sentence, if it has all three roles
    pub fn extract_sentence(&self, sentence: &Sentence) -> Option<Triplet> {
        let mut slots = Slots::default();
        for token in sentence.tokens() {
            slots.observe(token);
        }
        slots.into_triplet()
    }
}

/// The three role slots, reset for every sentence
#[derive(Default)]
struct Slots<'a> {
    subject: &'a str,
    relation: &'a str,
    object: &'a str,
}

impl<'a> Slots<'a> {
    /// One token may fill several slots
    fn observe(&mut self, token: &'a Token) {
        if token.dep.contains(SUBJECT_MARKER) {
            self.subject = token.text.as_str();
        }
        if token.pos == PosTag::Verb {
            self.relation = token.text.as_str();
        }
        if token.dep.contains(OBJECT_MARKER) {
            self.object = token.text.as_str();
        }
    }

    fn into_triplet(self) -> Option<Triplet> {
        if self.subject.is_empty() || self.relation.is_empty() || self.object.is_empty() {
            return None;
        }
        Some(Triplet::new(self.subject, self.relation, self.object))
    }
}
