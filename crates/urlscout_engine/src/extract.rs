use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}")
        .expect("valid email pattern")
});

/// Pulls the fields of a result record out of page text.
pub trait PageExtractor: Send + Sync {
    /// Document title, `None` when missing or blank.
    fn title(&self, html: &str) -> Option<String>;

    /// First email address in document order.
    fn first_email(&self, html: &str) -> Option<String>;
}

/// Default extractor:
/// - `<title>` text with inner whitespace collapsed
/// - first address-shaped token anywhere in the raw page, which also covers
///   `mailto:` links and addresses in attributes
#[derive(Debug, Default)]
pub struct ScraperExtractor;

impl PageExtractor for ScraperExtractor {
    fn title(&self, html: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        let title_sel = Selector::parse("title").ok()?;
        doc.select(&title_sel)
            .next()
            .map(|t| collapse_whitespace(&t.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    }

    fn first_email(&self, html: &str) -> Option<String> {
        EMAIL.find(html).map(|m| m.as_str().to_string())
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
