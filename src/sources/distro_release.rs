// SPDX-License-Identifier: GPL-3.0-or-later

//! Parser and locator for legacy distro release files.
//!
//! Before os-release existed, distributions shipped a free-form
//! single-line `/etc/<name>-release` file, typically
//! `<name> release <version> (<codename>)`. The variable-length name
//! makes left-to-right parsing ambiguous, so the line is matched
//! reversed: the fixed version/codename suffix then sits at the start
//! and the remainder is the name.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::{AttrMap, read_first_line};

/// Content pattern, applied to the reversed first line. Groups:
/// reversed codename (optional), reversed version, reversed name.
/// `esaeler` and `STL` are "release" and "LTS" reversed.
static CONTENT_REVERSED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^)]*\)(.*)\()? *(?:STL )?([\d.+\-a-z]*\d) *(?:esaeler *)?(.+)").unwrap()
});

/// File name pattern a release file must match; the captured prefix
/// becomes the distro id.
static BASENAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)[-_](release|version)$").unwrap());

/// Base names never considered during discovery. They either belong to
/// other sources (os-release, lsb-release) or carry no distro identity
/// of their own.
const IGNORED_BASENAMES: &[&str] = &[
    "debian_version",
    "lsb-release",
    "oem-release",
    "os-release",
    "system-release",
];

/// Well-known release file names probed when the configuration
/// directory itself cannot be listed (e.g. a locked-down /etc).
const FALLBACK_BASENAMES: &[&str] = &[
    "SuSE-release",
    "arch-release",
    "base-release",
    "centos-release",
    "fedora-release",
    "gentoo-release",
    "mageia-release",
    "mandrake-release",
    "mandriva-release",
    "mandrivalinux-release",
    "manjaro-release",
    "oracle-release",
    "redhat-release",
    "sl-release",
    "slackware-version",
];

fn reversed(s: &str) -> String {
    s.chars().rev().collect()
}

/// Parse one release file line via the right-to-left grammar.
///
/// `name`, `version_id` and `codename` appear in the mapping only when
/// actually captured. A non-empty line the grammar rejects falls back
/// to a bare `name` holding the whole trimmed line; an empty line
/// yields an empty mapping.
pub fn parse_release_line(line: &str) -> AttrMap {
    let line = line.trim();
    let mut info = AttrMap::new();
    if let Some(caps) = CONTENT_REVERSED_PATTERN.captures(&reversed(line)) {
        if let Some(m) = caps.get(3) {
            info.insert("name".to_string(), reversed(m.as_str()));
        }
        if let Some(m) = caps.get(2) {
            info.insert("version_id".to_string(), reversed(m.as_str()));
        }
        if let Some(m) = caps.get(1) {
            info.insert("codename".to_string(), reversed(m.as_str()));
        }
    } else if !line.is_empty() {
        info.insert("name".to_string(), line.to_string());
    }
    info
}

/// Parse a caller-specified release file.
///
/// An explicit override is always trusted: the file is parsed even
/// when its name does not match the expected pattern, and the `id` is
/// derived from the name only when it does match. A missing file
/// yields whatever the basename alone provides.
pub fn from_explicit_file(path: &Path) -> Result<AttrMap> {
    let mut info = match read_first_line(path)? {
        Some(line) => parse_release_line(&line),
        None => AttrMap::new(),
    };
    if let Some(id) = id_from_basename(path) {
        info.insert("id".to_string(), id);
    }
    Ok(info)
}

/// Search a configuration directory for the legacy release file.
///
/// Entries are sorted for determinism on systems shipping several
/// competing files (CentOS also carries a redhat-release). The first
/// sorted candidate matching the basename pattern whose first line
/// parses to a `name` wins; its pattern prefix becomes the `id`.
/// Returns the winning path alongside the mapping, or `(None, empty)`
/// when nothing qualifies.
pub fn discover(conf_dir: &Path) -> Result<(Option<PathBuf>, AttrMap)> {
    let mut basenames = match fs::read_dir(conf_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>(),
        // The directory may be unlisted while the files inside are
        // still readable; probe the well-known names.
        Err(_) => FALLBACK_BASENAMES.iter().map(|s| s.to_string()).collect(),
    };
    basenames.sort();

    for basename in &basenames {
        if IGNORED_BASENAMES.contains(&basename.as_str()) {
            continue;
        }
        let Some(caps) = BASENAME_PATTERN.captures(basename) else {
            continue;
        };
        let path = conf_dir.join(basename);
        let Some(line) = read_first_line(&path)? else {
            continue;
        };
        let mut info = parse_release_line(&line);
        if info.contains_key("name") {
            info.insert("id".to_string(), caps[1].to_string());
            return Ok((Some(path), info));
        }
    }
    Ok((None, AttrMap::new()))
}

fn id_from_basename(path: &Path) -> Option<String> {
    let basename = path.file_name()?.to_str()?;
    let caps = BASENAME_PATTERN.captures(basename)?;
    Some(caps[1].to_string())
}
