//! Path pattern matching.

use regex::Regex;
use std::collections::HashMap;

use crate::error::{Result, RouterError};

/// A segment in a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Literal text, matched exactly.
    Literal(String),
    /// A parameter (e.g., `{id}`), matching one or more non-`/` characters.
    Param(String),
}

/// A compiled path pattern for matching URLs.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The original pattern string.
    pattern: String,
    /// Parsed segments.
    segments: Vec<PathSegment>,
    /// Compiled regex for matching.
    regex: Regex,
    /// Parameter names in order.
    param_names: Vec<String>,
}

impl PathPattern {
    /// Compiles a path pattern string.
    ///
    /// Pattern syntax:
    /// - `/users` - Literal path
    /// - `/users/{id}` - Path with parameter
    /// - `/files/{name}.{ext}` - Parameters need not span a whole segment
    ///
    /// A trailing `/` is ignored, except for the root pattern `/`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] for an unterminated or nested
    /// `{`, a stray `}`, an empty parameter name or a repeated one.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_router::PathPattern;
    ///
    /// let pattern = PathPattern::compile("/posts/{id}/comments/{comment_id}").unwrap();
    /// let params = pattern.match_path("/posts/123/comments/456").unwrap();
    /// assert_eq!(params, vec!["123", "456"]);
    /// ```
    pub fn compile(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let template = trim_trailing_slash(pattern);
        let mut segments = Vec::new();
        let mut param_names: Vec<String> = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(invalid("nested '{'")),
                            _ => name.push(c),
                        }
                    }

                    if !closed {
                        return Err(invalid("unterminated '{'"));
                    }
                    if name.is_empty() {
                        return Err(invalid("empty parameter name"));
                    }
                    if param_names.contains(&name) {
                        return Err(invalid(&format!("duplicate parameter '{name}'")));
                    }

                    if !literal.is_empty() {
                        segments.push(PathSegment::Literal(std::mem::take(&mut literal)));
                    }
                    param_names.push(name.clone());
                    segments.push(PathSegment::Param(name));
                }
                '}' => return Err(invalid("unmatched '}'")),
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(PathSegment::Literal(literal));
        }

        let mut regex_str = String::from("^");
        for segment in &segments {
            match segment {
                PathSegment::Literal(s) => regex_str.push_str(&regex::escape(s)),
                PathSegment::Param(_) => regex_str.push_str("([^/]+)"),
            }
        }
        regex_str.push('$');

        let regex = Regex::new(&regex_str).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            regex,
            param_names,
        })
    }

    /// Attempts to match a normalized path against this pattern.
    ///
    /// Returns the parameter values in declaration order if the path matches.
    pub fn match_path(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(path)?;

        (1..=self.param_names.len())
            .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
            .collect()
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the parameter names.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns the parsed segments.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Generates a path from parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use oxide_router::PathPattern;
    ///
    /// let pattern = PathPattern::compile("/posts/{id}").unwrap();
    /// let params: HashMap<String, String> =
    ///     [("id".to_string(), "123".to_string())]
    ///     .into_iter()
    ///     .collect();
    /// let path = pattern.reverse(&params).unwrap();
    /// assert_eq!(path, "/posts/123");
    /// ```
    pub fn reverse(&self, params: &HashMap<String, String>) -> Option<String> {
        let mut path = String::new();

        for segment in &self.segments {
            match segment {
                PathSegment::Literal(s) => path.push_str(s),
                PathSegment::Param(name) => path.push_str(params.get(name)?),
            }
        }

        if path.is_empty() {
            path.push('/');
        }

        Some(path)
    }
}

/// Normalizes a request URI path for matching.
///
/// The query string is dropped and trailing slashes are trimmed, so `/test`,
/// `/test/` and `/test?page=2` all normalize to `/test`. The root path stays
/// `/`.
///
/// ```
/// use oxide_router::normalize_path;
///
/// assert_eq!(normalize_path("/test/?var=1"), "/test");
/// assert_eq!(normalize_path("/"), "/");
/// ```
pub fn normalize_path(uri: &str) -> &str {
    let path = uri.split('?').next().unwrap_or_default();
    trim_trailing_slash(path)
}

fn trim_trailing_slash(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}
