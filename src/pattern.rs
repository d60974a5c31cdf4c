//! Asset file name patterns
//!
//! A pattern wrapped in slashes (`/tool-.*\.zip/`) is a regular expression
//! used as-is; anything else is matched literally against the whole name.

use regex::Regex;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Literal(String),
    Regex(String),
}

impl Pattern {
    pub fn parse(input: &str) -> Self {
        match input
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(inner) => Pattern::Regex(inner.to_string()),
            None => Pattern::Literal(input.to_string()),
        }
    }

    /// Build the regex used to test asset names.
    ///
    /// Literals are escaped and anchored at both ends; regex patterns keep
    /// whatever anchors they carry.
    pub fn compile(&self) -> Result<Regex, regex::Error> {
        match self {
            Pattern::Literal(name) => Regex::new(&format!("^{}$", regex::escape(name))),
            Pattern::Regex(expr) => Regex::new(expr),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(name) => write!(f, "{}", name),
            Pattern::Regex(expr) => write!(f, "/{}/", expr),
        }
    }
}
