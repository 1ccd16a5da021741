//! # Puzzle Source
//!
//! The fetch collaborator of the refresh pipeline. [`PuzzleSource`] is the
//! seam the cache depends on; [`NytPuzzleSource`] is the production
//! implementation that downloads the puzzle page and lifts the embedded
//! `window.gameData = {...};` script out of the game container.
//!
//! ## Extraction steps:
//! 1. Locate the element whose id is `js-hook-pz-moment__game`.
//! 2. Take the first `<script type="text/javascript">` after it.
//! 3. Strip the `window.gameData =` assignment and the trailing `;`.
//! 4. Parse what remains as a JSON object.

use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::error::PuzzleError;
use super::model::RawPuzzle;
use crate::retrieve::ky_http::{ApiClient, ApiClientOptions};
use crate::utils::timing::timed_async;

/// Where the puzzle is published.
pub const DEFAULT_SOURCE_URL: &str = "https://www.nytimes.com/puzzles/letter-boxed";

/// Characters of an error page kept in the fetch error.
const ERROR_BODY_LIMIT: usize = 200;

static GAME_DIV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<div\b[^>]*\bid\s*=\s*["']js-hook-pz-moment__game["'][^>]*>"#)
        .expect("game div pattern is valid")
});

static SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("script pattern is valid")
});

static JS_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\btype\s*=\s*["']text/javascript["']"#).expect("type pattern is valid")
});

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*window\.gameData\s*=\s*").expect("assignment pattern is valid")
});

/// # Puzzle Source
///
/// Produces the raw payload of the current puzzle.
///
/// Implementations must be cheap to share: the refresher holds one instance
/// for the lifetime of the process and calls it from whichever task needs a
/// refresh.
pub trait PuzzleSource: Send + Sync + 'static {
    /// Fetches the current puzzle payload.
    fn fetch_puzzle(&self) -> impl Future<Output = Result<RawPuzzle, PuzzleError>> + Send;
}

/// Pulls the `window.gameData` object out of a puzzle page.
///
/// # Errors
/// [`PuzzleError::Fetch`] when the game container, its script, or valid JSON
/// cannot be found.
pub fn extract_game_data(html: &str) -> Result<RawPuzzle, PuzzleError> {
    let div = GAME_DIV
        .find(html)
        .ok_or_else(|| PuzzleError::Fetch("Could not find game div".to_string()))?;
    let inside = &html[div.end()..];

    let script = SCRIPT
        .captures_iter(inside)
        .find(|caps| caps.get(1).is_some_and(|attrs| JS_TYPE.is_match(attrs.as_str())))
        .and_then(|caps| caps.get(2))
        .ok_or_else(|| {
            PuzzleError::Fetch("Could not find script element in game div".to_string())
        })?;

    let body = ASSIGNMENT.replace(script.as_str().trim(), "");
    let json = body.trim_end().trim_end_matches(';').trim_end();

    let map: Map<String, Value> = serde_json::from_str(json)
        .map_err(|e| PuzzleError::Fetch(format!("Could not parse game data: {}", e)))?;
    Ok(RawPuzzle(map))
}

/// # NYT Puzzle Source
///
/// Scrapes the published puzzle page.
pub struct NytPuzzleSource {
    client: ApiClient,
}

impl NytPuzzleSource {
    /// Builds a source for `url` (typically [`DEFAULT_SOURCE_URL`]).
    ///
    /// # Errors
    /// [`PuzzleError::Fetch`] if `url` is not absolute or the client cannot be built.
    pub fn new(url: &str, options: ApiClientOptions) -> Result<Self, PuzzleError> {
        let client = ApiClient::new(url, options).map_err(|e| PuzzleError::Fetch(format!("{:#}", e)))?;
        Ok(Self { client })
    }

    async fn scrape(&self) -> Result<RawPuzzle, PuzzleError> {
        let url = self.client.base_url().as_str().to_string();
        let response = self
            .client
            .get_text("")
            .await
            .map_err(|e| PuzzleError::Fetch(format!("{:#}", e)))?;

        if !response.success {
            warn!(status = response.status, url = %url, "Puzzle page request failed");
            let detail: String = response
                .error_body
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .chars()
                .take(ERROR_BODY_LIMIT)
                .collect();
            return Err(PuzzleError::Fetch(if detail.is_empty() {
                format!("HTTP {} from {}", response.status, url)
            } else {
                format!("HTTP {} from {}: {}", response.status, url, detail)
            }));
        }

        let html = response.body.unwrap_or_default();
        debug!(bytes = html.len(), url = %url, "Puzzle page downloaded");
        extract_game_data(&html)
    }
}

impl PuzzleSource for NytPuzzleSource {
    async fn fetch_puzzle(&self) -> Result<RawPuzzle, PuzzleError> {
        timed_async("scrape_data", self.scrape()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    const PAGE: &str = r#"<html><head><script type="text/javascript">window.other = {};</script></head>
<body>
<div class="pz-game" id="js-hook-pz-moment__game">
  <div class="loading"></div>
  <script type="text/javascript">window.gameData = {"id":42,"ourSolution":["FACT","TRIM"],"printDate":"2024-01-15","sides":["FAC","TRI","M"],"date":"2024-01-15","dictionary":["FACT","TRIM"],"expiration":1705381200,"editor":"Sam; Ezersky"};</script>
</div>
</body></html>"#;

    /// Serves `body` once with `status_line` on a random local port.
    fn serve_once(status_line: &'static str, body: String) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{}/puzzles/letter-boxed", port);

        let handle = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "{}\r\nContent-Length: {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n",
                    status_line,
                    body.len()
                );
                stream.write_all(response.as_bytes()).unwrap();
                stream.write_all(body.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
        });

        (url, handle)
    }

    #[test]
    fn extracts_game_data_from_the_game_div() {
        let raw = extract_game_data(PAGE).unwrap();
        assert_eq!(raw.get("id"), Some(&serde_json::json!(42)));
        // Semicolons inside string values survive.
        assert_eq!(raw.get("editor"), Some(&serde_json::json!("Sam; Ezersky")));
    }

    #[test]
    fn missing_game_div_is_a_fetch_error() {
        let err = extract_game_data("<html><body>nothing</body></html>").unwrap_err();
        assert_eq!(err, PuzzleError::Fetch("Could not find game div".to_string()));
    }

    #[test]
    fn missing_script_is_a_fetch_error() {
        let html = r#"<div id="js-hook-pz-moment__game"><script src="x.js"></script></div>"#;
        let err = extract_game_data(html).unwrap_err();
        assert_eq!(
            err,
            PuzzleError::Fetch("Could not find script element in game div".to_string())
        );
    }

    #[test]
    fn invalid_json_is_a_fetch_error() {
        let html = r#"<div id="js-hook-pz-moment__game"><script type="text/javascript">window.gameData = {broken;</script></div>"#;
        let err = extract_game_data(html).unwrap_err();
        assert_eq!(err.kind(), "FetchError");
    }

    #[tokio::test]
    async fn fetches_and_extracts_over_http() {
        let (url, handle) = serve_once("HTTP/1.1 200 OK", PAGE.to_string());
        let source = NytPuzzleSource::new(&url, ApiClientOptions::default()).unwrap();

        let raw = source.fetch_puzzle().await.unwrap();
        handle.join().unwrap();

        assert_eq!(raw.get("printDate"), Some(&serde_json::json!("2024-01-15")));
    }

    #[tokio::test]
    async fn http_error_status_is_a_fetch_error() {
        let (url, handle) = serve_once("HTTP/1.1 404 Not Found", "gone".to_string());
        let options = ApiClientOptions {
            max_retries: 0,
            ..ApiClientOptions::default()
        };
        let source = NytPuzzleSource::new(&url, options).unwrap();

        let err = source.fetch_puzzle().await.unwrap_err();
        handle.join().unwrap();

        assert!(matches!(err, PuzzleError::Fetch(msg) if msg.starts_with("HTTP 404")));
    }

    #[tokio::test]
    async fn error_page_text_is_kept_in_the_fetch_error() {
        let (url, handle) = serve_once("HTTP/1.1 403 Forbidden", "  Access denied by edge  ".to_string());
        let options = ApiClientOptions {
            max_retries: 0,
            ..ApiClientOptions::default()
        };
        let source = NytPuzzleSource::new(&url, options).unwrap();

        let err = source.fetch_puzzle().await.unwrap_err();
        handle.join().unwrap();

        assert_eq!(
            err,
            PuzzleError::Fetch(format!("HTTP 403 from {}: Access denied by edge", url))
        );
    }
}
