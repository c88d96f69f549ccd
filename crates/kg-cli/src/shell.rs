//! Interactive prompt loop
//!
//! Walks the user through choosing an input, reviewing the extracted text,
//! generating the graph, and optionally listing the triplets. Each pass is
//! a fresh run; the loop ends on `q` or end of input.

use std::io::{BufRead, Write};
use std::path::Path;

use kg_parser::TextSource;

use crate::pipeline::{print_text, print_triplets, Pipeline, RunOptions};

const MENU: &str = "\nChoose input method: [1] Upload File  [2] Enter URL  [q] Quit";

pub struct Shell<'a, 'p, R, W> {
    pipeline: &'a Pipeline<'p>,
    options: &'a RunOptions,
    input: R,
    out: W,
}

impl<'a, 'p, R: BufRead, W: Write> Shell<'a, 'p, R, W> {
    pub fn new(pipeline: &'a Pipeline<'p>, options: &'a RunOptions, input: R, out: W) -> Self {
        Self {
            pipeline,
            options,
            input,
            out,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "Knowledge Graph Generator")?;
        writeln!(
            self.out,
            "Load a .txt or .pdf file or enter a URL to generate a knowledge graph."
        )?;

        loop {
            let Some(choice) = self.prompt(MENU)? else {
                break;
            };

            let source = match choice.as_str() {
                "1" | "file" => match self.prompt("Path to .txt or .pdf file")? {
                    Some(path) if !path.is_empty() => {
                        match TextSource::from_path(Path::new(&path)) {
                            Ok(source) => source,
                            Err(e) => {
                                writeln!(self.out, "Error: {e}")?;
                                continue;
                            }
                        }
                    }
                    Some(_) => continue,
                    None => break,
                },
                "2" | "url" => match self.prompt("Paste URL here")? {
                    Some(url) if !url.is_empty() => TextSource::Url(url),
                    Some(_) => continue,
                    None => break,
                },
                "q" | "quit" | "exit" => break,
                other => {
                    writeln!(self.out, "Unknown choice: {other}")?;
                    continue;
                }
            };

            if !self.run_once(&source).await? {
                break;
            }
        }

        Ok(())
    }

    /// One pass over a source; false when input ended mid-pass
    async fn run_once(&mut self, source: &TextSource) -> anyhow::Result<bool> {
        let text = self.pipeline.load_text(source, &mut self.out).await?;
        if text.is_empty() {
            return Ok(true);
        }
        print_text(&text, &mut self.out)?;

        let Some(generate) = self.prompt("Generate Knowledge Graph? [y/N]")? else {
            return Ok(false);
        };
        if !is_yes(&generate) {
            return Ok(true);
        }

        let triplets = match self.pipeline.generate(&text, self.options, &mut self.out).await {
            Ok(triplets) => triplets,
            Err(e) => {
                tracing::warn!(error = %e, "Graph generation failed");
                writeln!(self.out, "Error: {e:#}")?;
                return Ok(true);
            }
        };
        if triplets.is_empty() {
            return Ok(true);
        }

        let Some(show) = self.prompt("Show Triplets? [y/N]")? else {
            return Ok(false);
        };
        if is_yes(&show) {
            print_triplets(&triplets, &mut self.out)?;
        }

        Ok(true)
    }

    /// Print a prompt and read one trimmed line; None at end of input
    fn prompt(&mut self, message: &str) -> anyhow::Result<Option<String>> {
        write!(self.out, "{message}\n> ")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::{options, pipeline, TWO_SENTENCES};
    use kg_core::OutputFormat;
    use std::io::Cursor;

    async fn session(script: &str, opts: &RunOptions) -> String {
        let pipeline = pipeline();
        let mut out = Vec::new();
        Shell::new(&pipeline, opts, Cursor::new(script.to_string()), &mut out)
            .run()
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn conllu_file(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("story.conllu");
        std::fs::write(&path, TWO_SENTENCES).unwrap();
        path.display().to_string()
    }

    #[tokio::test]
    async fn test_full_session() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(&dir, OutputFormat::Svg);
        let script = format!("1\n{}\ny\ny\nq\n", conllu_file(&dir));

        let printed = session(&script, &opts).await;

        assert!(printed.contains("--- Extracted Text ---"));
        assert!(printed.contains("Extracted 2 triplets."));
        assert!(printed.contains(r#"("Bob", "read", "it")"#));
        assert!(opts.output.exists());
    }

    #[tokio::test]
    async fn test_declining_generation_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(&dir, OutputFormat::Svg);
        let script = format!("1\n{}\nn\nq\n", conllu_file(&dir));

        let printed = session(&script, &opts).await;

        assert!(printed.contains("--- Extracted Text ---"));
        assert!(!printed.contains("Extracted 2 triplets."));
        assert!(!opts.output.exists());
    }

    #[tokio::test]
    async fn test_hidden_triplets() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(&dir, OutputFormat::Json);
        let script = format!("file\n{}\nyes\nno\n", conllu_file(&dir));

        let printed = session(&script, &opts).await;

        assert!(printed.contains("Extracted 2 triplets."));
        assert!(!printed.contains(r#"("Alice", "wrote", "letter")"#));
    }

    #[tokio::test]
    async fn test_missing_file_and_bad_url_keep_the_loop_going() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(&dir, OutputFormat::Svg);
        let script = "1\n/nonexistent/story.txt\n2\nnot a url\nmaybe\nq\n";

        let printed = session(script, &opts).await;

        assert!(printed.contains("Error: IO error reading file"));
        assert!(printed.contains("Error: Failed to fetch URL content:"));
        assert!(printed.contains("Unknown choice: maybe"));
    }

    #[tokio::test]
    async fn test_end_of_input_exits() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(&dir, OutputFormat::Svg);
        let printed = session("", &opts).await;
        assert!(printed.starts_with("Knowledge Graph Generator"));
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("Y"));
        assert!(is_yes("yes"));
        assert!(!is_yes(""));
        assert!(!is_yes("nope"));
    }
}
