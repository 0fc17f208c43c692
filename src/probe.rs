// SPDX-License-Identifier: GPL-3.0-or-later

//! The distribution probe: one read of all data sources, merged
//! field-by-field into a single view.
//!
//! A [`Distribution`] gathers the three attribute mappings exactly
//! once at construction and is immutable afterwards. Every accessor is
//! a pure projection over the stored mappings, so a probe can be
//! shared read-only across threads and queried any number of times.
//! There is deliberately no process-wide default instance; callers
//! construct a probe and pass it along.
//!
//! Field resolution walks a fixed priority chain per field: os-release
//! first, then lsb_release, then the legacy release file. No accessor
//! ever fails; the worst case is an empty string.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use serde::Serialize;

use crate::normalize;
use crate::sources::{AttrMap, distro_release, lsb_release, os_release};

const OS_RELEASE_BASENAME: &str = "os-release";

/// Leading numeric triple of a version string: major, optional minor,
/// optional build number.
static VERSION_PARTS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.?(\d+)?\.?(\d+)?").unwrap());

/// Controls which data sources a [`Distribution`] probe reads.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Whether to invoke the external `lsb_release` command.
    pub include_lsb: bool,
    /// Explicit os-release file to use instead of the default
    /// `<conf_dir>/os-release`.
    pub os_release_file: Option<PathBuf>,
    /// Explicit legacy release file to use instead of searching the
    /// configuration directory.
    pub distro_release_file: Option<PathBuf>,
    /// Configuration directory to probe. Defaults to `$UNIXCONFDIR`
    /// or `/etc`.
    pub conf_dir: Option<PathBuf>,
    /// Deadline for the lsb_release subprocess; expiry counts as
    /// "command unavailable".
    pub lsb_timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        ProbeOptions {
            include_lsb: true,
            os_release_file: None,
            distro_release_file: None,
            conf_dir: None,
            lsb_timeout: Duration::from_secs(5),
        }
    }
}

fn default_conf_dir() -> PathBuf {
    env::var_os("UNIXCONFDIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/etc"))
}

/// Identity of one Linux distribution, assembled from up to three
/// sources.
#[derive(Debug)]
pub struct Distribution {
    os_release_file: PathBuf,
    distro_release_file: Option<PathBuf>,
    os_release_info: AttrMap,
    lsb_release_info: AttrMap,
    distro_release_info: AttrMap,
}

/// Version split into its first three dot-separated numeric
/// components. Missing components are empty strings, never absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionParts {
    pub major: String,
    pub minor: String,
    pub build_number: String,
}

/// The stable machine-readable result shape. All keys are always
/// present; unknown fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistroInfo {
    pub id: String,
    pub version: String,
    pub version_parts: VersionParts,
    pub like: String,
    pub codename: String,
}

impl Distribution {
    /// Probe the current system with default options.
    pub fn current() -> Result<Distribution> {
        Distribution::probe(ProbeOptions::default())
    }

    /// Probe the sources selected by `options`.
    ///
    /// All I/O happens here, exactly once. Missing files and a missing
    /// lsb_release command degrade to empty mappings; the hard errors
    /// are non-UTF-8 content and an lsb_release that exists but fails.
    pub fn probe(options: ProbeOptions) -> Result<Distribution> {
        let conf_dir = options.conf_dir.unwrap_or_else(default_conf_dir);

        let os_release_file = options
            .os_release_file
            .unwrap_or_else(|| conf_dir.join(OS_RELEASE_BASENAME));
        let os_release_info = os_release::load(&os_release_file)?;

        let lsb_release_info = if options.include_lsb {
            lsb_release::load(options.lsb_timeout)?
        } else {
            AttrMap::new()
        };

        let (distro_release_file, distro_release_info) = match options.distro_release_file {
            Some(path) => {
                let info = distro_release::from_explicit_file(&path)?;
                (Some(path), info)
            }
            None => distro_release::discover(&conf_dir)?,
        };

        Ok(Distribution {
            os_release_file,
            distro_release_file,
            os_release_info,
            lsb_release_info,
            distro_release_info,
        })
    }

    /// The os-release file path this probe read (whether or not it
    /// existed).
    pub fn os_release_file(&self) -> &Path {
        &self.os_release_file
    }

    /// The legacy release file actually used, if any.
    pub fn distro_release_file(&self) -> Option<&Path> {
        self.distro_release_file.as_deref()
    }

    /// Canonical machine-readable distro ID, or an empty string.
    pub fn id(&self) -> String {
        let id = self.os_release_attr("id");
        if !id.is_empty() {
            return normalize::os_release_id(id);
        }
        let id = self.lsb_release_attr("distributor_id");
        if !id.is_empty() {
            return normalize::lsb_id(id);
        }
        let id = self.distro_release_attr("id");
        if !id.is_empty() {
            return normalize::distro_file_id(id);
        }
        String::new()
    }

    /// Human-readable distribution name.
    ///
    /// With `pretty`, prefers the sources' own decorated name and
    /// falls back to the legacy name with the pretty version appended.
    pub fn name(&self, pretty: bool) -> String {
        if pretty {
            let mut name = first_non_empty(&[
                self.os_release_attr("pretty_name"),
                self.lsb_release_attr("description"),
            ]);
            if name.is_empty() {
                name = self.distro_release_attr("name").to_string();
                let version = self.version(true, false);
                if !version.is_empty() {
                    name = format!("{name} {version}");
                }
            }
            name
        } else {
            first_non_empty(&[
                self.os_release_attr("name"),
                self.lsb_release_attr("distributor_id"),
                self.distro_release_attr("name"),
            ])
        }
    }

    /// Distribution version string.
    ///
    /// Candidates are examined in priority order; the last two are
    /// versions re-parsed out of the os-release pretty name and the
    /// lsb description. With `best=false` the first non-empty
    /// candidate wins. With `best=true` a later candidate replaces the
    /// best-so-far only when it has strictly more dots, so precision
    /// beats priority but a tie does not. With `pretty`, the codename
    /// is appended in parentheses when both version and codename are
    /// non-empty.
    pub fn version(&self, pretty: bool, best: bool) -> String {
        let candidates = [
            self.os_release_attr("version_id").to_string(),
            self.lsb_release_attr("release").to_string(),
            self.distro_release_attr("version_id").to_string(),
            version_from_release_line(self.os_release_attr("pretty_name")),
            version_from_release_line(self.lsb_release_attr("description")),
        ];
        let mut version = String::new();
        if best {
            for v in &candidates {
                if v.matches('.').count() > version.matches('.').count() || version.is_empty() {
                    version = v.clone();
                }
            }
        } else {
            for v in &candidates {
                if !v.is_empty() {
                    version = v.clone();
                    break;
                }
            }
        }
        if pretty && !version.is_empty() {
            let codename = self.codename();
            if !codename.is_empty() {
                version = format!("{version} ({codename})");
            }
        }
        version
    }

    /// Version split into (major, minor, build_number) strings.
    pub fn version_parts(&self, best: bool) -> VersionParts {
        let version = self.version(false, best);
        if !version.is_empty()
            && let Some(caps) = VERSION_PARTS_PATTERN.captures(&version)
        {
            let group = |i| {
                caps.get(i)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            };
            return VersionParts {
                major: group(1),
                minor: group(2),
                build_number: group(3),
            };
        }
        VersionParts {
            major: String::new(),
            minor: String::new(),
            build_number: String::new(),
        }
    }

    pub fn major_version(&self, best: bool) -> String {
        self.version_parts(best).major
    }

    pub fn minor_version(&self, best: bool) -> String {
        self.version_parts(best).minor
    }

    pub fn build_number(&self, best: bool) -> String {
        self.version_parts(best).build_number
    }

    /// Space-separated IDs of distributions this one is like
    /// (os-release `ID_LIKE`).
    pub fn like(&self) -> String {
        self.os_release_attr("id_like").to_string()
    }

    /// Release codename, or an empty string when no source knows one.
    pub fn codename(&self) -> String {
        first_non_empty(&[
            self.os_release_attr("codename"),
            self.lsb_release_attr("codename"),
            self.distro_release_attr("codename"),
        ])
    }

    /// `(name-or-id, version, codename)` triple, compatible with the
    /// classic `platform.linux_distribution` shape.
    pub fn distribution(&self, full_name: bool) -> (String, String, String) {
        let name = if full_name {
            self.name(false)
        } else {
            self.id()
        };
        (name, self.version(false, false), self.codename())
    }

    /// Assemble the full machine-readable result.
    pub fn info(&self, pretty: bool, best: bool) -> DistroInfo {
        DistroInfo {
            id: self.id(),
            version: self.version(pretty, best),
            version_parts: self.version_parts(best),
            like: self.like(),
            codename: self.codename(),
        }
    }

    /// Raw os-release mapping.
    pub fn os_release_info(&self) -> &AttrMap {
        &self.os_release_info
    }

    /// Raw lsb_release mapping.
    pub fn lsb_release_info(&self) -> &AttrMap {
        &self.lsb_release_info
    }

    /// Raw legacy release file mapping.
    pub fn distro_release_info(&self) -> &AttrMap {
        &self.distro_release_info
    }

    /// Single attribute from the os-release source, empty when absent.
    pub fn os_release_attr(&self, attribute: &str) -> &str {
        attr(&self.os_release_info, attribute)
    }

    /// Single attribute from the lsb_release source, empty when absent.
    pub fn lsb_release_attr(&self, attribute: &str) -> &str {
        attr(&self.lsb_release_info, attribute)
    }

    /// Single attribute from the legacy release file source, empty
    /// when absent.
    pub fn distro_release_attr(&self, attribute: &str) -> &str {
        attr(&self.distro_release_info, attribute)
    }
}

fn attr<'a>(map: &'a AttrMap, attribute: &str) -> &'a str {
    map.get(attribute).map(String::as_str).unwrap_or("")
}

fn first_non_empty(candidates: &[&str]) -> String {
    candidates
        .iter()
        .find(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_default()
}

/// Re-run the legacy release line grammar over free-form text (pretty
/// names, lsb descriptions) to mine a version out of it.
fn version_from_release_line(text: &str) -> String {
    distro_release::parse_release_line(text)
        .remove("version_id")
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Build a probe from literal source content, bypassing I/O.
    fn probe_from(os_release: &str, lsb: &str, distro_line: &str, distro_basename: &str) -> Distribution {
        let mut distro_release_info = distro_release::parse_release_line(distro_line);
        if !distro_basename.is_empty() {
            // Mimic the locator: the id comes from the file name.
            let id = distro_basename
                .trim_end_matches("-release")
                .trim_end_matches("-version");
            distro_release_info.insert("id".to_string(), id.to_string());
        }
        Distribution {
            os_release_file: PathBuf::from("os-release"),
            distro_release_file: None,
            os_release_info: os_release::parse_content(os_release),
            lsb_release_info: lsb_release::parse_content(lsb),
            distro_release_info,
        }
    }

    const UBUNTU14_OS_RELEASE: &str = r#"NAME="Ubuntu"
VERSION="14.04.3 LTS, Trusty Tahr"
ID=ubuntu
ID_LIKE=debian
PRETTY_NAME="Ubuntu 14.04.3 LTS"
VERSION_ID="14.04"
"#;

    #[test]
    fn ubuntu_from_os_release_only() {
        let dist = probe_from(UBUNTU14_OS_RELEASE, "", "", "");
        assert_eq!(dist.id(), "ubuntu");
        assert_eq!(dist.name(false), "Ubuntu");
        assert_eq!(dist.name(true), "Ubuntu 14.04.3 LTS");
        assert_eq!(dist.version(false, false), "14.04");
        assert_eq!(dist.version(true, false), "14.04 (Trusty Tahr)");
        assert_eq!(dist.like(), "debian");
        assert_eq!(dist.codename(), "Trusty Tahr");
    }

    #[test]
    fn centos_from_distro_release_only() {
        let dist = probe_from(
            "",
            "",
            "CentOS Linux release 7.1.1503 (Core)",
            "centos-release",
        );
        assert_eq!(dist.id(), "centos");
        assert_eq!(dist.name(false), "CentOS Linux");
        assert_eq!(dist.version(false, false), "7.1.1503");
        assert_eq!(dist.codename(), "Core");
        assert_eq!(dist.name(true), "CentOS Linux 7.1.1503 (Core)");
    }

    #[test]
    fn redhat_file_id_normalized_to_rhel() {
        let dist = probe_from(
            "",
            "",
            "Red Hat Enterprise Linux Server release 7.0 (Maipo)",
            "redhat-release",
        );
        assert_eq!(dist.id(), "rhel");
    }

    #[test]
    fn lsb_distributor_id_normalized() {
        let lsb = "Distributor ID:\tRedHatEnterpriseServer\nRelease:\t7.0\n";
        let dist = probe_from("", lsb, "", "");
        assert_eq!(dist.id(), "rhel");
        // Non-pretty name falls back to the raw distributor id.
        assert_eq!(dist.name(false), "RedHatEnterpriseServer");
    }

    #[test]
    fn os_release_outranks_other_sources() {
        let lsb = "Distributor ID:\tWrong\nRelease:\t99\nCodename:\twrong\n";
        let dist = probe_from(
            UBUNTU14_OS_RELEASE,
            lsb,
            "Other Distro release 1.2 (nope)",
            "other-release",
        );
        assert_eq!(dist.id(), "ubuntu");
        assert_eq!(dist.name(false), "Ubuntu");
        assert_eq!(dist.version(false, false), "14.04");
        assert_eq!(dist.codename(), "Trusty Tahr");
    }

    #[test]
    fn best_version_more_dots_wins() {
        // os-release says 7, the release file knows 7.1.1503.
        let os = "ID=centos\nVERSION_ID=\"7\"\n";
        let dist = probe_from(os, "", "CentOS Linux release 7.1.1503 (Core)", "centos-release");
        assert_eq!(dist.version(false, false), "7");
        assert_eq!(dist.version(false, true), "7.1.1503");
    }

    #[test]
    fn best_version_tie_keeps_first_new_maximum() {
        let os = "VERSION_ID=\"7.1\"\nPRETTY_NAME=\"X 7.2\"\n";
        let dist = probe_from(os, "", "", "");
        // 7.2 (mined from the pretty name) only ties the dot count of
        // 7.1; a candidate must be strictly more precise to replace.
        assert_eq!(dist.version(false, true), "7.1");
    }

    #[test]
    fn best_version_later_new_maximum_wins() {
        let os = "VERSION_ID=\"7.1\"\nPRETTY_NAME=\"X 7.2.3\"\n";
        let dist = probe_from(os, "", "", "");
        assert_eq!(dist.version(false, true), "7.2.3");
    }

    #[test]
    fn version_mined_from_lsb_description() {
        let lsb = "Description:\tOracle Linux Server release 7.5\n";
        let dist = probe_from("", lsb, "", "");
        assert_eq!(dist.version(false, false), "7.5");
    }

    #[test]
    fn version_parts_triple() {
        let dist = probe_from("", "", "CentOS Linux release 7.1.1503 (Core)", "centos-release");
        assert_eq!(
            dist.version_parts(false),
            VersionParts {
                major: "7".to_string(),
                minor: "1".to_string(),
                build_number: "1503".to_string(),
            }
        );
        assert_eq!(dist.major_version(false), "7");
        assert_eq!(dist.minor_version(false), "1");
        assert_eq!(dist.build_number(false), "1503");
    }

    #[test]
    fn version_parts_major_only() {
        let dist = probe_from("ID=debian\nVERSION_ID=\"7\"\n", "", "", "");
        assert_eq!(
            dist.version_parts(false),
            VersionParts {
                major: "7".to_string(),
                minor: String::new(),
                build_number: String::new(),
            }
        );
    }

    #[test]
    fn empty_sources_empty_everything() {
        let dist = probe_from("", "", "", "");
        assert_eq!(dist.id(), "");
        assert_eq!(dist.name(false), "");
        assert_eq!(dist.name(true), "");
        assert_eq!(dist.version(false, false), "");
        assert_eq!(dist.version(true, true), "");
        assert_eq!(dist.like(), "");
        assert_eq!(dist.codename(), "");
        let parts = dist.version_parts(false);
        assert_eq!(parts.major, "");
        assert_eq!(parts.minor, "");
        assert_eq!(parts.build_number, "");
    }

    #[test]
    fn info_keys_always_present() {
        let dist = probe_from("", "", "", "");
        let value = serde_json::to_value(dist.info(false, false)).unwrap();
        assert_eq!(value["id"], "");
        assert_eq!(value["version"], "");
        assert_eq!(value["version_parts"]["major"], "");
        assert_eq!(value["version_parts"]["minor"], "");
        assert_eq!(value["version_parts"]["build_number"], "");
        assert_eq!(value["like"], "");
        assert_eq!(value["codename"], "");
    }

    #[test]
    fn codename_falls_through_empty_os_release() {
        // os-release VERSION without a codename pattern stores an
        // explicit empty codename; resolution skips empty values, so
        // the lsb codename still surfaces.
        let os = "ID=ubuntu\nVERSION=\"14.04\"\n";
        let lsb = "Codename:\ttrusty\n";
        let dist = probe_from(os, lsb, "", "");
        assert_eq!(dist.os_release_attr("codename"), "");
        assert_eq!(dist.codename(), "trusty");
    }

    #[test]
    fn distribution_triple() {
        let dist = probe_from(UBUNTU14_OS_RELEASE, "", "", "");
        assert_eq!(
            dist.distribution(true),
            (
                "Ubuntu".to_string(),
                "14.04".to_string(),
                "Trusty Tahr".to_string()
            )
        );
        assert_eq!(
            dist.distribution(false),
            (
                "ubuntu".to_string(),
                "14.04".to_string(),
                "Trusty Tahr".to_string()
            )
        );
    }

    #[test]
    fn probe_with_nonexistent_paths_is_empty_not_error() {
        let dist = Distribution::probe(ProbeOptions {
            include_lsb: false,
            os_release_file: Some(PathBuf::from("/nonexistent/os-release")),
            distro_release_file: Some(PathBuf::from("/nonexistent/nothing.here")),
            conf_dir: None,
            lsb_timeout: Duration::from_secs(1),
        })
        .unwrap();
        assert_eq!(dist.id(), "");
        assert_eq!(dist.name(false), "");
        assert!(dist.os_release_info().is_empty());
        assert!(dist.lsb_release_info().is_empty());
        assert!(dist.distro_release_info().is_empty());
    }

    #[test]
    fn probe_reads_fixture_tree() {
        let etc = tempfile::tempdir().unwrap();
        fs::write(etc.path().join("os-release"), UBUNTU14_OS_RELEASE).unwrap();
        fs::write(
            etc.path().join("centos-release"),
            "CentOS Linux release 7.1.1503 (Core)\n",
        )
        .unwrap();
        let dist = Distribution::probe(ProbeOptions {
            include_lsb: false,
            conf_dir: Some(etc.path().to_path_buf()),
            ..ProbeOptions::default()
        })
        .unwrap();
        assert_eq!(dist.id(), "ubuntu");
        assert_eq!(
            dist.distro_release_file().unwrap(),
            etc.path().join("centos-release")
        );
        assert_eq!(dist.distro_release_attr("id"), "centos");
        assert_eq!(dist.version(false, true), "7.1.1503");
    }

    #[test]
    fn accessors_are_pure_projections() {
        let dist = probe_from(UBUNTU14_OS_RELEASE, "", "", "");
        assert_eq!(dist.id(), dist.id());
        assert_eq!(dist.info(true, true), dist.info(true, true));
    }
}
