//! kgraph Extractor - Sentence parsing and triplet extraction
//!
//! Turns raw text into dependency-parsed sentences through a pluggable
//! `SentenceParser` backend, then reduces each sentence to at most one
//! (subject, relation, object) triplet.

use kg_core::{ParserBackend, ParserConfig, Result, SentenceParser};

pub mod conllu;
pub mod triplet;
pub mod udpipe;

pub use conllu::{parse_conllu, ConlluParser};
pub use triplet::TripletExtractor;
pub use udpipe::UdpipeParser;

/// Build the sentence parser selected by configuration
pub fn build_parser(config: &ParserConfig) -> Result<Box<dyn SentenceParser>> {
    let parser: Box<dyn SentenceParser> = match config.backend {
        ParserBackend::Udpipe => Box::new(UdpipeParser::from_config(config)?),
        ParserBackend::Conllu => Box::new(ConlluParser),
    };

    tracing::debug!(parser = parser.name(), "Sentence parser ready");
    Ok(parser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_parser_by_backend() {
        let mut config = ParserConfig::default();
        assert_eq!(build_parser(&config).unwrap().name(), "udpipe");

        config.backend = ParserBackend::Conllu;
        assert_eq!(build_parser(&config).unwrap().name(), "conllu");
    }
}
