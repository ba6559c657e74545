//! Article analysis collaborator.
//!
//! Fetches a URL with a bounded timeout, strips the HTML down to its text
//! content, and counts words and characters. Any fetch problem (connection
//! failure, timeout, non-2xx status) is an [`AnalyzerError`]; the worker
//! records those as a failed job rather than retrying.

use scraper::Html;
use std::time::Duration;

use crate::models::job::AnalysisReport;

/// Error type for article fetch/analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("failed to fetch article: {0}")]
    Http(#[from] reqwest::Error),

    #[error("article server returned HTTP {0}")]
    BadStatus(reqwest::StatusCode),
}

/// HTTP client wrapper that performs the analysis.
pub struct ArticleAnalyzer {
    http: reqwest::Client,
}

impl ArticleAnalyzer {
    /// Create an analyzer whose requests are bounded by `timeout`. A fetch
    /// exceeding the timeout fails like any other fetch error.
    pub fn new(timeout: Duration) -> Result<Self, AnalyzerError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("article-analyzer/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { http })
    }

    /// Fetch `url` and analyze its text content.
    pub async fn analyze(&self, url: &str) -> Result<AnalysisReport, AnalyzerError> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzerError::BadStatus(status));
        }

        let html = response.text().await?;
        Ok(analyze_text(&html))
    }
}

/// Extract the text content of an HTML document and count it.
fn analyze_text(html: &str) -> AnalysisReport {
    let document = Html::parse_document(html);
    let text: String = document.root_element().text().collect();

    AnalysisReport {
        word_count: text.split_whitespace().count() as u64,
        character_count: text.chars().count() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_simple_document() {
        let report = analyze_text("<html><body><p>hello wonderful world</p></body></html>");
        assert_eq!(report.word_count, 3);
        assert_eq!(report.character_count, 21);
    }

    #[test]
    fn test_strips_markup_across_elements() {
        let html = r#"
        <html><body>
            <h1>Title</h1>
            <p>First <b>bold</b> paragraph.</p>
            <p>Second paragraph.</p>
        </body></html>
        "#;
        let report = analyze_text(html);
        // Title / First / bold / paragraph. / Second / paragraph.
        assert_eq!(report.word_count, 6);
    }

    #[test]
    fn test_empty_document() {
        let report = analyze_text("<html><body></body></html>");
        assert_eq!(report.word_count, 0);
    }

    #[test]
    fn test_plain_text_body() {
        // Non-HTML responses still parse; the whole body counts as text.
        let report = analyze_text("just some plain words");
        assert_eq!(report.word_count, 4);
        assert_eq!(report.character_count, 21);
    }

    #[test]
    fn test_character_count_is_chars_not_bytes() {
        let report = analyze_text("<p>héllo wörld</p>");
        assert_eq!(report.word_count, 2);
        assert_eq!(report.character_count, 11);
    }
}
