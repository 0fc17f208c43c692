// SPDX-License-Identifier: GPL-3.0-or-later

//! Parser for the standardized os-release file.
//!
//! The file is a sequence of shell-compatible `KEY=value` assignments
//! (see the freedesktop os-release spec), so values may be quoted with
//! single or double quotes, contain backslash escapes, and span line
//! breaks inside quotes. Anything that is not an assignment (comments,
//! stray words) is ignored.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::{AttrMap, read_text};

/// Codename patterns seen inside `VERSION` values: a parenthesized
/// group `(Core)` (rhel, centos, fedora) or a comma-separated trailing
/// clause `, Trusty Tahr` (Ubuntu).
static CODENAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\(\D+\))|,(\s+)?\D+").unwrap());

/// Load and parse an os-release file.
///
/// A missing or unreadable file yields an empty mapping.
pub fn load(path: &Path) -> Result<AttrMap> {
    match read_text(path)? {
        Some(content) => Ok(parse_content(&content)),
        None => Ok(AttrMap::new()),
    }
}

/// Parse os-release content into an attribute mapping.
///
/// Keys are lower-cased and later assignments overwrite earlier ones.
/// A `VERSION` assignment additionally stores a synthetic `codename`
/// key: the extracted codename when one of the known patterns matches,
/// otherwise an explicit empty string. The explicit empty is
/// intentional and observable through the raw mapping only; field
/// resolution treats empty values as "no answer".
pub fn parse_content(content: &str) -> AttrMap {
    let mut props = AttrMap::new();
    for token in shell_split(content) {
        // Tokens without '=' are commands or stray words, not allowed
        // in os-release; skip them.
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        props.insert(key.to_lowercase(), value.to_string());
        if key == "VERSION" {
            let codename = match CODENAME_PATTERN.find(value) {
                Some(m) => m
                    .as_str()
                    .trim_matches(['(', ')'])
                    .trim_matches(',')
                    .trim()
                    .to_string(),
                None => String::new(),
            };
            props.insert("codename".to_string(), codename);
        }
    }
    props
}

#[derive(PartialEq)]
enum QuoteState {
    Normal,
    Single,
    Double,
}

/// Split text into words using POSIX shell semantics.
///
/// Handles single quotes (no escapes inside), double quotes (backslash
/// escapes `\` `"` `$` `` ` `` and line continuations), backslash
/// escapes outside quotes, `#` comments, and quoted values spanning
/// line breaks. Unterminated quotes are tolerated: whatever has been
/// accumulated becomes the final token, since parsing must never fail
/// on malformed input.
fn shell_split(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut token = String::new();
    let mut has_token = false;
    let mut state = QuoteState::Normal;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            QuoteState::Normal => match c {
                '\'' => {
                    state = QuoteState::Single;
                    has_token = true;
                }
                '"' => {
                    state = QuoteState::Double;
                    has_token = true;
                }
                '\\' => match chars.next() {
                    // Escaped newline is a line continuation.
                    Some('\n') => {}
                    Some(next) => {
                        token.push(next);
                        has_token = true;
                    }
                    None => {}
                },
                '#' => {
                    // Comment runs to end of line and terminates the
                    // current word, matching shell lexing.
                    while chars.peek().is_some_and(|&n| n != '\n') {
                        chars.next();
                    }
                }
                c if c.is_whitespace() => {
                    if has_token {
                        tokens.push(std::mem::take(&mut token));
                        has_token = false;
                    }
                }
                c => {
                    token.push(c);
                    has_token = true;
                }
            },
            QuoteState::Single => match c {
                '\'' => state = QuoteState::Normal,
                c => token.push(c),
            },
            QuoteState::Double => match c {
                '"' => state = QuoteState::Normal,
                '\\' => match chars.next() {
                    Some(next @ ('"' | '\\' | '$' | '`')) => token.push(next),
                    Some('\n') => {}
                    Some(next) => {
                        // The backslash stays literal before anything
                        // else, as in the shell.
                        token.push('\\');
                        token.push(next);
                    }
                    None => token.push('\\'),
                },
                c => token.push(c),
            },
        }
    }

    if has_token {
        tokens.push(token);
    }
    tokens
}
