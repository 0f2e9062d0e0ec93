//! Route matching logic.
//!
//! # Responsibilities
//! - Match the request path against an anchored regular expression
//! - Match the request method against a route's method set
//! - Detect method overlap between two routes sharing a pattern
//!
//! # Design Decisions
//! - Patterns are full-path grammars: compiled as `^(?:pattern)$`, never prefixes
//! - Method tokens are compared exactly after upper-casing at registration

use axum::http::Method;
use regex::Regex;

/// A compiled, anchored path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    /// Compile `pattern`, anchoring it at both ends.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written in the route definition.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// The set of methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSet(Vec<Method>);

impl MethodSet {
    /// Parse method tokens, upper-casing them and dropping repeats.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, String> {
        let mut methods: Vec<Method> = Vec::with_capacity(tokens.len());
        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                return Err("empty method token".to_string());
            }
            let method = Method::from_bytes(token.to_ascii_uppercase().as_bytes())
                .map_err(|_| format!("invalid method token `{}`", token))?;
            if !methods.contains(&method) {
                methods.push(method);
            }
        }
        if methods.is_empty() {
            return Err("methods must not be empty".to_string());
        }
        Ok(Self(methods))
    }

    pub fn contains(&self, method: &Method) -> bool {
        self.0.contains(method)
    }

    /// First method of `self` that `other` also accepts.
    pub fn first_shared(&self, other: &MethodSet) -> Option<&Method> {
        self.0.iter().find(|m| other.contains(m))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.0.iter()
    }
}
