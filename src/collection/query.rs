//! Key patterns
//!
//! Case-insensitive regular expressions matched against raw keys.

use regex::bytes::{Regex, RegexBuilder};

use crate::error::Result;

/// A compiled key filter
#[derive(Debug, Clone)]
pub struct KeyPattern {
    regex: Regex,
}

impl KeyPattern {
    /// Compile `pattern`; with `exact` the whole key must match
    pub fn new(pattern: &str, exact: bool) -> Result<Self> {
        let source = if exact {
            format!("^(?:{})$", pattern)
        } else {
            pattern.to_string()
        };

        let regex = RegexBuilder::new(&source).case_insensitive(true).build()?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, key: &[u8]) -> bool {
        self.regex.is_match(key)
    }

    /// The expression as compiled, including any anchors
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
