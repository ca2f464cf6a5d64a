//! Structured marker blocks embedded in docstrings.
//!
//! A docstring may end with a YAML fragment introduced by a `---` line:
//!
//! ```text
//! List the users of an account.
//!
//! ---
//! api: accounts
//! type: UserList
//! hidden_method: false
//! ```
//!
//! The fragment is parsed into a mapping and kept verbatim. A missing marker, invalid
//! YAML or a document that is not a mapping all produce an empty block.

use crate::docstring::trim_docstring;
use log::debug;
use serde_yaml::{Mapping, Value};

/// Key hiding the owning method from documentation
pub const HIDDEN_METHOD_KEY: &str = "hidden_method";
/// Key overriding the documented response type
pub const RESPONSE_TYPE_KEY: &str = "type";
/// Key grouping endpoints under a top-level API
pub const API_KEY: &str = "api";

/// Whether a (stripped) docstring line opens a structured block
pub fn is_block_start(line: &str) -> bool {
    line.starts_with("---")
}

/// A parsed structured block. Empty when the docstring carries none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerBlock {
    mapping: Mapping,
}

impl MarkerBlock {
    /// Locate and parse the block of a docstring
    pub fn parse(docstring: Option<&str>) -> Self {
        let Some(source) = docstring.and_then(extract_block) else {
            return Self::default();
        };

        match serde_yaml::from_str::<Value>(&source) {
            Ok(Value::Mapping(mapping)) => Self { mapping },
            Ok(Value::Null) => Self::default(),
            Ok(other) => {
                debug!("Ignoring structured block that is not a mapping: {:?}", other);
                Self::default()
            }
            Err(e) => {
                debug!("Ignoring malformed structured block: {}", e);
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.mapping.get(key)
    }

    pub fn is_hidden_method(&self) -> bool {
        self.get(HIDDEN_METHOD_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn response_type(&self) -> Option<&str> {
        self.get(RESPONSE_TYPE_KEY).and_then(Value::as_str)
    }

    pub fn api(&self) -> Option<&str> {
        self.get(API_KEY).and_then(Value::as_str)
    }

    pub fn into_mapping(self) -> Mapping {
        self.mapping
    }
}

/// Text of the block: every line from the `---` marker on, dedented
fn extract_block(docstring: &str) -> Option<String> {
    let trimmed = trim_docstring(docstring);
    let lines: Vec<&str> = trimmed.split('\n').collect();
    let start = lines.iter().position(|line| is_block_start(line.trim()))?;
    Some(dedent(&lines[start..]))
}

fn dedent(lines: &[&str]) -> String {
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}
