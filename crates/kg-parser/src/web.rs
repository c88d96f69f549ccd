//! Web page fetching
//!
//! Downloads a page and keeps only the text of its paragraph elements.

use std::time::Duration;

use kg_core::{FetchConfig, RawText};
use reqwest::Client;
use scraper::{Html, Selector};

use crate::{ParserError, Result};

/// HTTP fetcher that reduces a page to its paragraph text
pub struct WebFetcher {
    client: Client,
}

impl WebFetcher {
    /// Create a fetcher from config
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(|e| ParserError::FetchError {
            url: String::new(),
            message: format!("Failed to build HTTP client: {e}"),
        })?;

        Ok(Self { client })
    }

    /// Fetch a page and return the text of its `<p>` elements
    pub async fn fetch(&self, url: &str) -> Result<RawText> {
        let fetch_error = |message: String| ParserError::FetchError {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // The body is still scanned; error pages can carry paragraphs
            tracing::warn!(%url, %status, "Page returned a non-success status");
        }

        let body = response
            .text()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let text = paragraph_text(&body)?;
        tracing::debug!(%url, bytes = body.len(), chars = text.len(), "Page fetched");

        Ok(RawText::from(text))
    }
}

/// Text content of every paragraph element in document order, joined by single spaces
pub fn paragraph_text(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("p").map_err(|e| ParserError::HtmlError(e.to_string()))?;

    Ok(document
        .select(&selector)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer a single request on a local port with a canned HTML response
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/page")
    }

    fn local_fetcher() -> WebFetcher {
        WebFetcher {
            client: Client::builder().no_proxy().build().unwrap(),
        }
    }

    #[test]
    fn test_paragraph_text_joins_in_order() {
        let html = r#"
            <html><head><title>Ignored</title></head>
            <body>
              <h1>Heading</h1>
              <p>Alice wrote a letter.</p>
              <div>Not a paragraph</div>
              <p>Bob read <b>the</b> letter.</p>
            </body></html>
        "#;

        assert_eq!(
            paragraph_text(html).unwrap(),
            "Alice wrote a letter. Bob read the letter."
        );
    }

    #[test]
    fn test_paragraph_text_without_paragraphs() {
        assert_eq!(paragraph_text("<div>nothing</div>").unwrap(), "");
    }

    #[test]
    fn test_paragraph_text_keeps_empty_paragraphs() {
        assert_eq!(paragraph_text("<p>a</p><p></p><p>b</p>").unwrap(), "a  b");
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_fetch_error() {
        let fetcher = WebFetcher::new(&FetchConfig::default()).unwrap();
        let result = fetcher.fetch("not a url").await;

        match result {
            Err(ParserError::FetchError { url, message }) => {
                assert_eq!(url, "not a url");
                assert!(!message.is_empty());
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
    }

    #[test]
    fn test_fetch_error_message_is_user_facing() {
        let err = ParserError::FetchError {
            url: "http://example.invalid".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch URL content: connection refused"
        );
    }

    #[tokio::test]
    async fn test_fetch_reads_paragraphs() {
        let url = serve_once(
            "200 OK",
            "<html><body><p>Alice wrote.</p><p>Bob read.</p></body></html>",
        )
        .await;
        let text = local_fetcher().fetch(&url).await.unwrap();
        assert_eq!(text.as_str(), "Alice wrote. Bob read.");
    }

    #[tokio::test]
    async fn test_error_status_body_is_still_scanned() {
        let url = serve_once(
            "404 Not Found",
            "<html><body><h1>404</h1><p>The page was moved.</p></body></html>",
        )
        .await;
        let text = local_fetcher().fetch(&url).await.unwrap();
        assert_eq!(text.as_str(), "The page was moved.");
    }
}
