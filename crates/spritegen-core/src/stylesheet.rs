use crate::model::{ImageEntry, Package};
use std::collections::HashSet;
use std::fmt::Write;
use tracing::warn;

/// Turns a file name into a selector-safe token: dots, whitespace and
/// underscores become `-`.
pub fn normalize_file_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c == '.' || c == '_' || c.is_whitespace() {
                '-'
            } else {
                c
            }
        })
        .collect()
}

/// CSS offset that moves the sheet so `v` lands at the origin (`0px` stays unsigned).
fn offset(v: u32) -> String {
    if v == 0 {
        "0px".into()
    } else {
        format!("-{}px", v)
    }
}

/// Class name (without the leading `.`) for `entry` inside `package`.
pub fn selector(package: &Package, entry: &ImageEntry) -> String {
    format!(
        "{}{}",
        package.namespace,
        normalize_file_name(&entry.file_name)
    )
}

/// Selectors shared by more than one image of `package`, in first-collision order.
/// `a_b.png` and `a.b.png` both normalize to `a-b-png`, for instance.
pub fn duplicate_selectors(package: &Package) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for entry in &package.images {
        let sel = selector(package, entry);
        if !seen.insert(sel.clone()) && !dups.contains(&sel) {
            dups.push(sel);
        }
    }
    dups
}

/// Renders one rule block per image, in package order.
pub fn to_css(package: &Package, sheet_name: &str) -> String {
    for sel in duplicate_selectors(package) {
        warn!(
            dir = %package.directory.display(),
            selector = %sel,
            "several images share a selector; later rules override earlier ones"
        );
    }
    let mut out = String::new();
    for entry in &package.images {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            ".{} {{\n\tbackground-image: url(\"{}\");\n\tbackground-repeat: no-repeat;\n\tbackground-position: {} {};\n\twidth: {}px;\n\theight: {}px;\n}}\n\n",
            selector(package, entry),
            sheet_name,
            offset(entry.position.left),
            offset(entry.position.top),
            entry.width(),
            entry.height(),
        );
    }
    out
}
