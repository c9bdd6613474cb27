//! Restriction patterns and the default restriction for a seed

use crate::url::normalize::trim_after;
use crate::SpiderError;
use regex::Regex;
use std::fmt;

/// Length of the `https://` prefix; a path slash at or before this index is part of the scheme
const SCHEME_PREFIX_LEN: usize = "https://".len();

/// A compiled restriction pattern
///
/// Candidate URLs are searched with the pattern, unanchored unless the pattern
/// anchors itself (the default restriction starts with `^`). The source text is
/// kept for display only.
#[derive(Debug, Clone)]
pub struct Restriction {
    regex: Regex,
}

impl Restriction {
    /// Compiles a restriction pattern
    ///
    /// # Errors
    ///
    /// Returns `SpiderError::InvalidRestrictionPattern` if the text is not a
    /// valid regular expression.
    pub fn compile(pattern: &str) -> Result<Self, SpiderError> {
        let regex = Regex::new(pattern).map_err(|source| SpiderError::InvalidRestrictionPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// Returns true if the URL matches the restriction
    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    /// The pattern text, for display
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes the default restriction for a seed URL
///
/// The default limits the crawl to the seed's directory:
///
/// 1. Drop the fragment and then the query string
/// 2. Drop any filename, keeping the path up to and including the last `/`
///    (unless that slash belongs to the `scheme://` prefix)
/// 3. Escape regex metacharacters
/// 4. Anchor at the start with `^`
///
/// # Examples
///
/// ```
/// use site_spider::url::default_restriction;
///
/// assert_eq!(
///     default_restriction("http://example.com/a/page.html?x=1#top"),
///     r"^http://example\.com/a/"
/// );
/// ```
pub fn default_restriction(seed: &str) -> String {
    let mut allowed = trim_after(seed.trim(), '#');
    allowed = trim_after(allowed, '?');

    if let Some(div) = allowed.rfind('/') {
        if div > SCHEME_PREFIX_LEN {
            allowed = &allowed[..div + 1];
        }
    }

    format!("^{}", regex::escape(allowed))
}
