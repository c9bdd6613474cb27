use crate::UrlError;
use url::Url;

/// Normalizes a URL for frontier identity
///
/// Everything from the first `#` onward is removed; the fragment never changes
/// which document a URL names. Query strings are left alone: whether a URL with
/// arguments may be crawled is a policy decision, not a normalization one.
///
/// The function is idempotent.
///
/// # Examples
///
/// ```
/// use site_spider::url::normalize;
///
/// assert_eq!(normalize("http://example.com/a/#top"), "http://example.com/a/");
/// assert_eq!(normalize("http://example.com/a/?x=1"), "http://example.com/a/?x=1");
/// ```
pub fn normalize(url: &str) -> &str {
    trim_after(url, '#')
}

/// Truncates a string at the first occurrence of `sep`, dropping `sep` too
///
/// ```
/// use site_spider::url::trim_after;
///
/// assert_eq!(trim_after("ab-cd-ef", '-'), "ab");
/// assert_eq!(trim_after("abcdef", '-'), "abcdef");
/// ```
pub fn trim_after(value: &str, sep: char) -> &str {
    match value.find(sep) {
        Some(idx) => &value[..idx],
        None => value,
    }
}

/// Returns true if the URL carries query arguments
pub fn has_arguments(url: &str) -> bool {
    url.contains('?')
}

/// Validates a seed URL and returns it normalized
///
/// Seeds must be absolute `http` or `https` URLs.
pub fn validate_seed(seed: &str) -> Result<String, UrlError> {
    let trimmed = seed.trim();
    let parsed = Url::parse(trimmed).map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS seeds are supported, got: {}",
            parsed.scheme()
        )));
    }

    Ok(normalize(trimmed).to_string())
}
