// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Result;

use crate::probe::Distribution;

/// Render the machine-readable result as pretty-printed JSON.
///
/// The field set and nesting of [`crate::probe::DistroInfo`] is the
/// documented stable shape; every key is emitted even when empty.
pub fn render(dist: &Distribution, best: bool) -> Result<String> {
    let info = dist.info(false, best);
    Ok(serde_json::to_string_pretty(&info)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{Distribution, ProbeOptions};
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    fn fixture_probe(os_release: &str) -> Distribution {
        let etc = tempfile::tempdir().unwrap();
        fs::write(etc.path().join("os-release"), os_release).unwrap();
        Distribution::probe(ProbeOptions {
            include_lsb: false,
            conf_dir: Some(etc.path().to_path_buf()),
            os_release_file: None,
            distro_release_file: Some(PathBuf::from("/nonexistent/none.here")),
            lsb_timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn json_structure() {
        let dist = fixture_probe(
            "ID=centos\nNAME=\"CentOS Linux\"\nVERSION=\"7 (Core)\"\nVERSION_ID=\"7\"\nID_LIKE=\"rhel fedora\"\n",
        );
        let rendered = render(&dist, false).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["id"], "centos");
        assert_eq!(parsed["version"], "7");
        assert_eq!(parsed["version_parts"]["major"], "7");
        assert_eq!(parsed["version_parts"]["minor"], "");
        assert_eq!(parsed["version_parts"]["build_number"], "");
        assert_eq!(parsed["like"], "rhel fedora");
        assert_eq!(parsed["codename"], "Core");
    }

    #[test]
    fn json_empty_probe_keeps_all_keys() {
        let dist = fixture_probe("");
        let rendered = render(&dist, false).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        for key in ["id", "version", "like", "codename"] {
            assert_eq!(parsed[key], "", "missing or non-empty key {key}");
        }
        assert!(parsed["version_parts"].is_object());
    }
}
