//! HTML title extraction

use scraper::{Html, Selector};
use thiserror::Error;

/// Reasons no title could be extracted; never fatal to a scrape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("Could not find title in html")]
    NotFound,

    #[error("Title element is empty")]
    Empty,
}

/// Extracts the text of the first `<title>` element from an HTML document
///
/// The body is decoded lossily as UTF-8 and parsed with an HTML5 parser, so
/// malformed markup still yields whatever title the parser recovers.
///
/// # Example
///
/// ```
/// use pulse_scraper::fetch::extract_title;
///
/// let html = b"<html><head><title> Example Domain </title></head></html>";
/// assert_eq!(extract_title(html).unwrap(), "Example Domain");
/// ```
pub fn extract_title(html: &[u8]) -> Result<String, TitleError> {
    let text = String::from_utf8_lossy(html);
    let document = Html::parse_document(&text);

    let title_selector = Selector::parse("title").map_err(|_| TitleError::NotFound)?;

    let element = document
        .select(&title_selector)
        .next()
        .ok_or(TitleError::NotFound)?;

    let title = element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        return Err(TitleError::Empty);
    }

    Ok(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let html = br#"<html><head><title>Test Page</title></head><body></body></html>"#;
        assert_eq!(extract_title(html).unwrap(), "Test Page");
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let html = b"<html><head><title>\n  Test\n   Page  </title></head></html>";
        assert_eq!(extract_title(html).unwrap(), "Test Page");
    }

    #[test]
    fn test_no_title() {
        let html = br#"<html><head></head><body></body></html>"#;
        assert_eq!(extract_title(html), Err(TitleError::NotFound));
    }

    #[test]
    fn test_empty_title() {
        let html = br#"<html><head><title>   </title></head></html>"#;
        assert_eq!(extract_title(html), Err(TitleError::Empty));
    }

    #[test]
    fn test_first_title_wins() {
        let html = br#"<html><head><title>One</title><title>Two</title></head></html>"#;
        assert_eq!(extract_title(html).unwrap(), "One");
    }

    #[test]
    fn test_malformed_markup() {
        let html = b"<title>Unclosed <b>bold</title><div><p>";
        assert_eq!(extract_title(html).unwrap(), "Unclosed <b>bold");
    }

    #[test]
    fn test_invalid_utf8() {
        let mut html = b"<title>Caf".to_vec();
        html.push(0xff);
        html.extend_from_slice(b"</title>");
        let title = extract_title(&html).unwrap();
        assert!(title.starts_with("Caf"));
    }

    #[test]
    fn test_not_html() {
        assert_eq!(extract_title(b"{\"json\": true}"), Err(TitleError::NotFound));
    }
}
