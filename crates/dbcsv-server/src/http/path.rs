//! Path pattern matching.

use regex::Regex;

use super::request::PathParams;

/// A compiled path pattern for matching URLs.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// Compiled regex for matching.
    regex: Regex,
    /// Parameter names in order.
    param_names: Vec<String>,
}

impl PathPattern {
    /// Parses a path pattern string.
    ///
    /// Pattern syntax:
    /// - `/query/ping` - Literal path
    /// - `/query/fetchone/{cursor_id}` - Path with parameter
    ///
    /// # Panics
    ///
    /// Never in practice: literal segments are escaped and parameters
    /// expand to a fixed group.
    pub fn new(pattern: &str) -> Self {
        let mut param_names = Vec::new();
        let mut regex_str = String::from("^");

        for part in pattern.split('/').filter(|s| !s.is_empty()) {
            regex_str.push('/');

            if let Some(param) = part.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                param_names.push(param.to_string());
                regex_str.push_str("([^/]+)");
            } else {
                regex_str.push_str(&regex::escape(part));
            }
        }

        regex_str.push_str("/?$");

        let regex = Regex::new(&regex_str).expect("Invalid path pattern regex");

        Self {
            regex,
            param_names,
        }
    }

    /// Attempts to match a path against this pattern.
    ///
    /// Returns extracted parameters if the path matches.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;

        let mut params = PathParams::new();

        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = caps.get(i + 1) {
                params.insert(name.clone(), value.as_str().to_string());
            }
        }

        Some(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_path() {
        let pattern = PathPattern::new("/query/ping");
        assert!(pattern.match_path("/query/ping").is_some());
        assert!(pattern.match_path("/query/ping/").is_some());
        assert!(pattern.match_path("/query/pong").is_none());
    }

    #[test]
    fn test_root() {
        let pattern = PathPattern::new("/");
        assert!(pattern.match_path("/").is_some());
        assert!(pattern.match_path("/query").is_none());
    }

    #[test]
    fn test_single_param() {
        let pattern = PathPattern::new("/query/fetchone/{cursor_id}");
        let params = pattern
            .match_path("/query/fetchone/0f8fad5b-d9cb-469f-a165-70867728950e")
            .unwrap();
        assert_eq!(
            params.get("cursor_id"),
            Some("0f8fad5b-d9cb-469f-a165-70867728950e")
        );
        assert!(pattern.match_path("/query/fetchone/").is_none());
        assert!(pattern.match_path("/query/fetchone/a/b").is_none());
    }
}
