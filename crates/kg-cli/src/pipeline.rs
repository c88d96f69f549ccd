//! Extraction pipeline
//!
//! Text source -> sentence parser -> triplet extractor -> graph renderer.
//! Every run starts from scratch; nothing is kept between runs.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use kg_core::{RawText, RenderConfig, SentenceParser, Triplet};
use kg_extractor::TripletExtractor;
use kg_graph::KnowledgeGraph;
use kg_parser::{TextSource, TextSourceAdapter};

/// Per-run output settings
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Where the rendered graph is written
    pub output: PathBuf,

    /// Rendering settings, including the output format
    pub render: RenderConfig,

    /// Print the extracted text before extraction
    pub show_text: bool,

    /// Print the triplets after the graph is written
    pub show_triplets: bool,
}

pub struct Pipeline<'p> {
    adapter: TextSourceAdapter,
    parser: &'p dyn SentenceParser,
    extractor: TripletExtractor,
}

impl<'p> Pipeline<'p> {
    pub fn new(adapter: TextSourceAdapter, parser: &'p dyn SentenceParser) -> Self {
        Self {
            adapter,
            parser,
            extractor: TripletExtractor::new(),
        }
    }

    /// Obtain text from a source.
    ///
    /// Failures are reported to the user and replaced by empty text, which
    /// stops the run without extracting anything. Only a failed write to
    /// `out` is returned as an error.
    pub async fn load_text(
        &self,
        source: &TextSource,
        out: &mut impl Write,
    ) -> std::io::Result<RawText> {
        match self.adapter.fetch(source).await {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(error = %e, "Text source failed");
                writeln!(out, "Error: {e}")?;
                Ok(RawText::empty())
            }
        }
    }

    /// Parse text and extract triplets; empty text never reaches the parser
    pub async fn extract(&self, text: &RawText) -> kg_core::Result<Vec<Triplet>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let sentences = self.parser.parse(text.as_str()).await?;
        tracing::debug!(
            parser = self.parser.name(),
            chars = text.len(),
            sentences = sentences.len(),
            "Text parsed"
        );
        Ok(self.extractor.extract(&sentences))
    }

    /// Extract triplets and write the graph, reporting progress to `out`
    pub async fn generate(
        &self,
        text: &RawText,
        options: &RunOptions,
        out: &mut impl Write,
    ) -> anyhow::Result<Vec<Triplet>> {
        let triplets = self.extract(text).await?;

        if triplets.is_empty() {
            writeln!(out, "No triplets found.")?;
            return Ok(triplets);
        }

        writeln!(out, "Extracted {} triplets.", triplets.len())?;

        let graph = KnowledgeGraph::from_triplets(&triplets);
        let rendered = kg_graph::render(&graph, &options.render)?;
        std::fs::write(&options.output, rendered)
            .with_context(|| format!("Failed to write graph to {}", options.output.display()))?;

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            path = %options.output.display(),
            "Knowledge graph written"
        );
        writeln!(out, "Graph written to {}", options.output.display())?;

        Ok(triplets)
    }

    /// One full non-interactive run
    pub async fn run(
        &self,
        source: &TextSource,
        options: &RunOptions,
        out: &mut impl Write,
    ) -> anyhow::Result<Vec<Triplet>> {
        let text = self.load_text(source, out).await?;
        if text.is_empty() {
            return Ok(Vec::new());
        }

        if options.show_text {
            print_text(&text, out)?;
        }

        let triplets = self.generate(&text, options, out).await?;
        if options.show_triplets && !triplets.is_empty() {
            print_triplets(&triplets, out)?;
        }

        Ok(triplets)
    }
}

pub fn print_text(text: &RawText, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "--- Extracted Text ---")?;
    writeln!(out, "{text}")?;
    writeln!(out, "----------------------")
}

pub fn print_triplets(triplets: &[Triplet], out: &mut impl Write) -> std::io::Result<()> {
    for triplet in triplets {
        writeln!(out, "{triplet}")?;
    }
    Ok(())
}
