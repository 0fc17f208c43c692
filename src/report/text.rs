// SPDX-License-Identifier: GPL-3.0-or-later

use comfy_table::{ContentArrangement, Table};

use crate::probe::Distribution;
use crate::sources::AttrMap;

/// Render the human-readable three-line summary.
pub fn render(dist: &Distribution, best: bool) -> String {
    format!(
        "Name: {}\nVersion: {}\nCodename: {}\n",
        dist.name(true),
        dist.version(true, best),
        dist.codename()
    )
}

/// Render the raw attribute mappings of all three sources as a table,
/// for inspecting what each source actually reported.
pub fn render_sources(dist: &Distribution) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Source", "Key", "Value"]);

    add_source_rows(&mut table, "os-release", dist.os_release_info());
    add_source_rows(&mut table, "lsb_release", dist.lsb_release_info());
    add_source_rows(&mut table, "distro-release", dist.distro_release_info());

    table.to_string()
}

fn add_source_rows(table: &mut Table, source: &str, attrs: &AttrMap) {
    let mut keys: Vec<&String> = attrs.keys().collect();
    keys.sort();
    for key in keys {
        table.add_row(vec![source, key.as_str(), attrs[key].as_str()]);
    }
}
