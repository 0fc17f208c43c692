// SPDX-License-Identifier: GPL-3.0-or-later

//! Normalization of raw vendor-reported distro IDs.
//!
//! Each data source uses its own vocabulary for the same distribution
//! (lsb_release says "RedHatEnterpriseServer", the release file is
//! named redhat-release, os-release says "rhel"). Three fixed tables
//! map each vocabulary onto one canonical, stable, lower-case ID.

/// os-release `ID` values are already mostly canonical.
const NORMALIZED_OS_ID: &[(&str, &str)] = &[];

/// lsb_release `Distributor ID` values.
const NORMALIZED_LSB_ID: &[(&str, &str)] = &[
    ("enterpriseenterprise", "oracle"),
    ("redhatenterpriseserver", "rhel"),
    ("redhatenterpriseworkstation", "rhel"),
];

/// IDs derived from release file names.
const NORMALIZED_DISTRO_ID: &[(&str, &str)] = &[("redhat", "rhel")];

fn normalize(raw: &str, table: &[(&str, &str)]) -> String {
    let key = raw.to_lowercase().replace(' ', "_");
    table
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| to.to_string())
        .unwrap_or(key)
}

/// Normalize an ID from the os-release `ID` field.
pub fn os_release_id(raw: &str) -> String {
    normalize(raw, NORMALIZED_OS_ID)
}

/// Normalize an ID from the lsb_release `Distributor ID` field.
pub fn lsb_id(raw: &str) -> String {
    normalize(raw, NORMALIZED_LSB_ID)
}

/// Normalize an ID derived from a release file name.
pub fn distro_file_id(raw: &str) -> String {
    normalize(raw, NORMALIZED_DISTRO_ID)
}
