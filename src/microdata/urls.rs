//! URL and token helpers

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static ABSOLUTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z\d+\-.]*:").expect("valid regex"));

/// Whether `value` starts with a URL scheme
pub fn is_absolute_url(value: &str) -> bool {
    // Windows drive paths (`C:\`) look like a scheme
    ABSOLUTE_URL.is_match(value) && !value.get(1..3).is_some_and(|s| s == ":\\")
}

/// Resolve `value` to an absolute URL, falling back to `base` for relative values.
///
/// Returns an empty string when neither works.
pub fn try_resolve(value: &str, base: &str) -> String {
    if let Ok(url) = Url::parse(value) {
        return url.into();
    }
    if base.is_empty() {
        return String::new();
    }
    Url::parse(base)
        .and_then(|base| base.join(value))
        .map(String::from)
        .unwrap_or_default()
}

/// Whitespace-separated tokens with duplicates removed, first occurrence wins
pub fn split_unique(value: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in value.split_whitespace() {
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_absolute_url() {
        assert!(is_absolute_url("http://schema.org/Person"));
        assert!(is_absolute_url("urn:isbn:0-330-34032-8"));
        assert!(is_absolute_url("mailto:jan@example.com"));
        assert!(!is_absolute_url("./relative"));
        assert!(!is_absolute_url("#frag"));
        assert!(!is_absolute_url("Person"));
        assert!(!is_absolute_url("c:\\windows"));
    }

    #[test]
    fn test_try_resolve() {
        assert_eq!(
            try_resolve("./audio", "http://www.example.com"),
            "http://www.example.com/audio"
        );
        assert_eq!(
            try_resolve("http://www.absolute.com/a", "http://www.example.com"),
            "http://www.absolute.com/a"
        );
        assert_eq!(try_resolve("./audio", ""), "");
        assert_eq!(try_resolve("./audio", "invalid url"), "");
        assert_eq!(
            try_resolve("./base/", "http://www.example.com/"),
            "http://www.example.com/base/"
        );
    }

    #[test]
    fn test_split_unique() {
        assert_eq!(split_unique("  name  name "), vec!["name"]);
        assert_eq!(
            split_unique(" http://schema.org/Person  http://schema.org/PostalAddress  "),
            vec!["http://schema.org/Person", "http://schema.org/PostalAddress"]
        );
        assert!(split_unique("   ").is_empty());
    }
}
