//! Command file format
//!
//! Each command is stored as a small markdown file: a two-line header between
//! `---` fences, a blank line, then the action text.
//!
//! ```text
//! ---
//! description: Verify framework test
//! aliases: ["ready now", "check it"]
//! ---
//!
//! ./verify_test.sh
//! ```
//!
//! The agent that consumes these files matches user input against the
//! `aliases` array, so the array encoding has to stay byte-compatible with
//! what that agent already reads. Everything in here is pure string work;
//! the filesystem side lives in [`crate::store`].

use crate::error::{Result, StoreError};

/// Description written when the user leaves it blank
pub const DEFAULT_DESCRIPTION: &str = "Custom command";

/// A validated command ready to be written
///
/// Only [`CommandDefinition::from_input`] builds one, so `phrases` is never
/// empty and the primary phrase always yields a non-empty id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    /// Primary phrase first, then aliases in the order given
    pub(crate) phrases: Vec<String>,
    pub(crate) description: String,
    pub(crate) action: String,
}

impl CommandDefinition {
    /// Build a definition from the four raw form fields
    ///
    /// `aliases_csv` is a comma separated list; blank entries are dropped.
    pub fn from_input(
        phrase: &str,
        action: &str,
        description: &str,
        aliases_csv: &str,
    ) -> Result<Self> {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return Err(StoreError::missing("phrase"));
        }
        let action = action.trim();
        if action.is_empty() {
            return Err(StoreError::missing("action"));
        }
        if derive_id(phrase).is_empty() {
            return Err(StoreError::Validation {
                field: "phrase",
                message: format!("phrase '{}' must contain at least one letter or digit", phrase),
            });
        }

        let description = description.trim();
        let description = if description.is_empty() {
            DEFAULT_DESCRIPTION.to_string()
        } else {
            description.to_string()
        };

        let mut phrases = vec![phrase.to_string()];
        phrases.extend(split_aliases(aliases_csv));

        Ok(Self {
            phrases,
            description,
            action: action.to_string(),
        })
    }

    pub fn primary_phrase(&self) -> &str {
        self.phrases.first().map_or("", String::as_str)
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Storage id, derived from the primary phrase
    pub fn id(&self) -> String {
        derive_id(self.primary_phrase())
    }

    /// Render the full file contents
    pub fn render(&self) -> String {
        format!(
            "---\ndescription: {}\naliases: {}\n---\n\n{}\n",
            fold_line_breaks(&self.description),
            encode_phrases(&self.phrases),
            self.action
        )
    }
}

/// Derive the storage id for a phrase
///
/// Lower-cases, drops apostrophes, turns spaces into hyphens and keeps only
/// ASCII letters, digits and hyphens. Distinct phrases can map to one id
/// ("Check It!" and "check-it" both become `check-it`).
pub fn derive_id(phrase: &str) -> String {
    phrase
        .to_lowercase()
        .replace('\'', "")
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// Split a comma separated alias list, trimming and dropping blanks
pub fn split_aliases(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect()
}

/// Phrase shown for a record whose aliases can't be recovered
pub fn fallback_phrase(id: &str) -> String {
    id.replace('-', " ")
}

/// Encode phrases as a JSON array: `", "` separators, non-ASCII as `\uXXXX`
pub fn encode_phrases(phrases: &[String]) -> String {
    let items: Vec<String> = phrases.iter().map(|p| encode_string(p.as_str())).collect();
    format!("[{}]", items.join(", "))
}

fn encode_string(s: &str) -> String {
    let json = serde_json::Value::String(s.to_string()).to_string();
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

// The header is line oriented, so a multi-line description would spill into
// the fences.
fn fold_line_breaks(s: &str) -> String {
    if !s.contains(['\n', '\r']) {
        return s.to_string();
    }
    s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Parsing
// ============================================================================

/// State of one header field after a tolerant parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderField<T> {
    /// No line for this field
    Absent,
    /// A line was there but its value couldn't be used
    Malformed,
    Present(T),
}

impl<T> HeaderField<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            HeaderField::Present(v) => Some(v),
            _ => None,
        }
    }
}

/// Header fields recovered from a command file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHeader {
    pub description: HeaderField<String>,
    pub aliases: HeaderField<Vec<String>>,
}

impl ParsedHeader {
    pub fn description_or_default(&self) -> &str {
        self.description
            .present()
            .map(String::as_str)
            .unwrap_or(DEFAULT_DESCRIPTION)
    }

    /// Primary phrase, falling back to the id with hyphens as spaces
    pub fn primary_phrase_or(&self, id: &str) -> String {
        match self.aliases.present().and_then(|a| a.first()) {
            Some(first) => first.clone(),
            None => fallback_phrase(id),
        }
    }

    /// Phrases after the primary one
    pub fn extra_aliases(&self) -> Vec<String> {
        self.aliases
            .present()
            .map(|a| a.iter().skip(1).cloned().collect())
            .unwrap_or_default()
    }
}

/// Scan a command file for its `description:` and `aliases:` lines
///
/// Never fails. Later lines override earlier ones; an `aliases:` line that
/// isn't a non-empty JSON array of strings is ignored, leaving whatever an
/// earlier line produced.
pub fn parse_header(content: &str) -> ParsedHeader {
    let mut description = HeaderField::Absent;
    let mut aliases = HeaderField::Absent;

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("description:") {
            description = HeaderField::Present(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("aliases:") {
            match parse_phrases(rest) {
                Some(phrases) => aliases = HeaderField::Present(phrases),
                None if aliases == HeaderField::Absent => aliases = HeaderField::Malformed,
                None => {}
            }
        }
    }

    ParsedHeader {
        description,
        aliases,
    }
}

fn parse_phrases(raw: &str) -> Option<Vec<String>> {
    serde_json::from_str::<Vec<String>>(raw.trim())
        .ok()
        .filter(|phrases| !phrases.is_empty())
}
