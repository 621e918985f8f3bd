//! Base-URL request resolver.

use crate::domain::ports::RequestUrlResolver;

/// Resolves image paths against a fixed base URL.
///
/// Paths that already carry an `http://` or `https://` scheme are used as-is.
#[derive(Debug, Clone)]
pub struct BaseUrlResolver {
    base_url: String,
}

impl BaseUrlResolver {
    /// Creates a resolver for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }
}

impl RequestUrlResolver for BaseUrlResolver {
    fn request_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("https://api.example.com", "/avatar", "https://api.example.com/avatar" ; "leading_slash")]
    #[test_case("https://api.example.com/", "avatar", "https://api.example.com/avatar" ; "trailing_slash_base")]
    #[test_case("https://api.example.com/v1/", "/users/1/avatar", "https://api.example.com/v1/users/1/avatar" ; "nested")]
    #[test_case("https://api.example.com", "https://cdn.example.com/a.png", "https://cdn.example.com/a.png" ; "absolute_path")]
    fn test_request_url(base: &str, path: &str, expected: &str) {
        assert_eq!(BaseUrlResolver::new(base).request_url(path), expected);
    }
}
