//! Single-key rewrites of the site config file.
//!
//! This is a textual patch, not a structured TOML edit: the new value is
//! always written as a quoted string and the rest of the document is left
//! byte-for-byte as it was.

use std::path::Path;

use regex::Regex;

/// Replace `key = …` with `key = "value"`, or append it if absent.
///
/// Every line matching `key\s*=\s*(.*)` is rewritten.
#[must_use]
pub fn replace_config_key(document: &str, key: &str, value: &str) -> String {
    let pattern = Regex::new(&format!(r"{}\s*=\s*(.*)", regex::escape(key)))
        .expect("escaped key is a valid pattern");
    let entry = format!("{key} = \"{value}\"");

    if pattern.is_match(document) {
        pattern
            .replace_all(document, regex::NoExpand(&entry))
            .into_owned()
    } else {
        let mut out = String::with_capacity(document.len() + entry.len() + 1);
        out.push_str(document);
        if !document.is_empty() && !document.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&entry);
        out
    }
}

/// Apply [`replace_config_key`] to a file on disk.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read or written.
pub async fn rewrite_config_key(path: &Path, key: &str, value: &str) -> std::io::Result<()> {
    let document = tokio::fs::read_to_string(path).await?;
    let patched = replace_config_key(&document, key, value);
    tokio::fs::write(path, patched).await?;
    tracing::debug!(path = %path.display(), key, value, "Rewrote config key");
    Ok(())
}
