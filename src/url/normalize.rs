use crate::UrlError;
use url::Url;

/// Validates a submitted URL and returns the text that should be fetched
///
/// Only surrounding whitespace and the fragment are removed. The path is kept
/// exactly as submitted: servers are free to answer `/docs` and `/docs/`
/// differently, so slash cleanup is reserved for [`normalize_url`].
///
/// # Examples
///
/// ```
/// use pulse_scraper::url::target_url;
///
/// let url = target_url(" http://example.com/docs/#intro ").unwrap();
/// assert_eq!(url, "http://example.com/docs/");
/// ```
pub fn target_url(url_str: &str) -> Result<String, UrlError> {
    let (_, trimmed) = parse_http(url_str)?;
    let without_fragment = trimmed.split_once('#').map_or(trimmed, |(url, _)| url);
    Ok(without_fragment.to_string())
}

/// Normalizes a submitted URL so that equivalent spellings share one task key
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject if empty
/// 2. Parse the URL; reject if malformed
/// 3. Accept only http and https (scheme and host are lowercased by the parser)
/// 4. Remove the fragment (it is never sent to the server)
/// 5. Normalize the path:
///    - Collapse repeated slashes
///    - Remove trailing slashes
/// 6. Drop the bare root slash when there is no query, so that
///    `http://example.com/` and `http://example.com` are the same task
///
/// Query strings are kept verbatim: they select different content.
///
/// # Examples
///
/// ```
/// use pulse_scraper::url::normalize_url;
///
/// let url = normalize_url("HTTP://Example.COM/news/").unwrap();
/// assert_eq!(url, "http://example.com/news");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, UrlError> {
    let (mut url, _) = parse_http(url_str)?;

    url.set_fragment(None);

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    let mut normalized = String::from(url);
    if normalized_path == "/" && !normalized.contains('?') {
        normalized.pop();
    }

    Ok(normalized)
}

/// Parses an http(s) URL with a host, returning it with the trimmed input
fn parse_http(url_str: &str) -> Result<(Url, &str), UrlError> {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok((url, trimmed))
}

/// Collapses repeated slashes and strips trailing slashes; the root stays "/"
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}
