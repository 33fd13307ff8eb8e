//! Filename extension classification.

use crate::indicators::IndicatorSet;

/// The final dotted suffix of the filename's last path component, including
/// the dot, exactly as written. Leading dots do not start an extension, so
/// `.bashrc` has none; `archive.tar.gz` yields `.gz`; `noext` yields `""`.
pub fn extension_of(filename: &str) -> &str {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem_start = name.len() - name.trim_start_matches('.').len();
    match name[stem_start..].rfind('.') {
        Some(dot) => &name[stem_start + dot..],
        None => "",
    }
}

/// Lowercased `extension_of`.
pub fn normalized_extension(filename: &str) -> String {
    extension_of(filename).to_lowercase()
}

/// Whether the filename's extension is a known-bad extension.
pub fn is_bad_extension(filename: &str, indicators: &IndicatorSet) -> bool {
    indicators.contains_extension(&normalized_extension(filename))
}
