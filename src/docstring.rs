//! Docstring annotation parsing.
//!
//! Handler docstrings carry three things: a one-line summary, a free-text notes body,
//! and inline parameter definitions of the form
//!
//! ```text
//! name -- Description of the parameter [required][dataType=int][paramType=form]
//! ```
//!
//! Tags may appear in any order and are removed from the description. The notes body
//! ends at the first parameter line (or at the structured marker block, see
//! [`crate::marker_block`]); anything after it is not part of the notes.

use crate::marker_block;
use crate::operation::ParamLocation;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Separator between a parameter name and its description
pub const PARAM_SEPARATOR: &str = " -- ";

/// Marker substituted for blank lines in the notes body
pub const LINE_BREAK: &str = "<br/>";

static DATA_TYPE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[dataType=([^\]]*)\]").expect("dataType tag regex should be valid"));

const FORM_TAG: &str = "[paramType=form]";
const BODY_TAG: &str = "[paramType=body]";
const REQUIRED_TAG: &str = "[required]";

/// A parameter declared on a single docstring line.
///
/// Only the fields the line actually tags are set; merging relies on the distinction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineParam {
    pub name: String,
    pub description: String,
    pub location: Option<ParamLocation>,
    pub required: Option<bool>,
    pub data_type: Option<String>,
}

/// Result of parsing one docstring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocstring {
    pub summary: String,
    pub notes: String,
    pub parameters: Vec<InlineParam>,
}

/// Parse a raw docstring into its summary, notes body and inline parameters
pub fn parse(raw: &str) -> ParsedDocstring {
    ParsedDocstring {
        summary: summary(raw),
        notes: strip_params(raw),
        parameters: inline_params(raw),
    }
}

/// Normalize a docstring block: expand tabs, drop surrounding blank lines and remove
/// the indentation shared by every line after the first.
pub fn trim_docstring(docstring: &str) -> String {
    if docstring.trim().is_empty() {
        return String::new();
    }

    let expanded = docstring.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().collect();

    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut trimmed = Vec::with_capacity(lines.len());
    trimmed.push(lines[0].trim());
    for line in &lines[1..] {
        let dedented = line.get(indent..).unwrap_or_else(|| line.trim_start());
        trimmed.push(dedented.trim_end());
    }

    trimmed.join("\n").trim().to_string()
}

/// First line of the normalized docstring
pub fn summary(docstring: &str) -> String {
    trim_docstring(docstring)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Whether a line declares an inline parameter
pub fn is_param_line(line: &str) -> bool {
    line.contains(PARAM_SEPARATOR)
}

/// Notes body of a docstring: everything before the first parameter line (or the
/// start of the structured block), blank lines turned into [`LINE_BREAK`] and all
/// lines joined with spaces.
pub fn strip_params(docstring: &str) -> String {
    let trimmed = trim_docstring(docstring);
    if trimmed.is_empty() {
        return String::new();
    }
    let mut lines: Vec<&str> = trimmed.split('\n').collect();

    let cut_off = lines.iter().position(|line| {
        let line = line.trim();
        is_param_line(line) || marker_block::is_block_start(line)
    });
    if let Some(index) = cut_off {
        lines.truncate(index);
    }

    lines
        .into_iter()
        .map(|line| if line.is_empty() { LINE_BREAK } else { line })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Notes of an operation: the class description followed by the method docstring,
/// with parameter definitions stripped.
pub fn notes(class_docs: Option<&str>, method_docs: Option<&str>) -> String {
    let mut docstring = class_docs.map(trim_docstring).unwrap_or_default();
    if let Some(method_docs) = method_docs {
        docstring.push('\n');
        docstring.push_str(&trim_docstring(method_docs));
    }
    strip_params(&docstring)
}

/// Extract every inline parameter declared in the text, top to bottom
pub fn inline_params(text: &str) -> Vec<InlineParam> {
    text.split('\n').filter_map(parse_param_line).collect()
}

/// Parse a single `name -- description [tags]` line
pub fn parse_param_line(line: &str) -> Option<InlineParam> {
    let (name, description) = line.split_once(PARAM_SEPARATOR)?;
    let name = name.trim();
    if name.is_empty() {
        debug!("Ignoring parameter line without a name: {:?}", line);
        return None;
    }

    let mut description = description.to_string();

    let location = if description.contains(FORM_TAG) {
        description = description.replace(FORM_TAG, "");
        Some(ParamLocation::Form)
    } else if description.contains(BODY_TAG) {
        description = description.replace(BODY_TAG, "");
        Some(ParamLocation::Body)
    } else {
        None
    };

    let required = if description.contains(REQUIRED_TAG) {
        description = description.replace(REQUIRED_TAG, "");
        Some(true)
    } else {
        None
    };

    let data_type = DATA_TYPE_TAG
        .captures(&description)
        .map(|caps| caps[1].to_string());
    if data_type.is_some() {
        description = DATA_TYPE_TAG.replace_all(&description, "").into_owned();
    }

    Some(InlineParam {
        name: name.to_string(),
        description: description.trim().to_string(),
        location,
        required,
        data_type,
    })
}

/// Display name derived from a handler type name: trailing `View` / `ViewSet`
/// removed, CamelCase split into words.
pub fn view_name(type_name: &str) -> String {
    let name = remove_trailing(type_name, "View");
    let name = remove_trailing(name, "ViewSet");
    camelcase_to_spaces(name)
}

/// Normalized class-level description of a handler
pub fn view_description(docstring: Option<&str>) -> String {
    docstring.map(trim_docstring).unwrap_or_default()
}

/// First sentence of the first line of a class docstring
pub fn short_description(docstring: Option<&str>) -> String {
    let description = view_description(docstring);
    let first_line = description.split('\n').next().unwrap_or_default();
    first_line.split('.').next().unwrap_or_default().to_string()
}

fn remove_trailing<'a>(content: &'a str, trailing: &str) -> &'a str {
    match content.strip_suffix(trailing) {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => content,
    }
}

fn camelcase_to_spaces(content: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    let mut out = String::with_capacity(content.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let after_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
            let before_non_upper = chars
                .get(i + 1)
                .is_some_and(|next| !next.is_ascii_uppercase());
            if after_lower || before_non_upper {
                out.push(' ');
            }
        }
        out.push(c);
    }

    out.trim().to_string()
}
