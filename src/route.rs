//! Maps document locations to logical URL paths.
//!
//! Both the post index and the sitemap address documents by the path they are
//! served from rather than the file they come from: `about.md` is served from
//! `/about`, and `sponsor/index.md` from the directory-style `/sponsor/`.

use std::path::{Component, Path};

const MARKDOWN_EXTENSION: &str = ".md";
const INDEX_STEM: &str = "index";

/// Converts a document path relative to the content root into its logical URL
/// path. Path components are joined with `/` regardless of platform.
pub fn post_path(relative: &Path) -> String {
    let segments: Vec<_> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect();
    route(&segments.join("/"))
}

/// Converts the `/`-separated relative path a host engine reports for a
/// rendered page into its output URL path. The `.md` extension is optional.
pub fn page_path(relative: &str) -> String {
    route(relative)
}

fn route(relative: &str) -> String {
    let relative = relative
        .trim()
        .trim_start_matches("./")
        .trim_start_matches('/');
    let stem = relative
        .strip_suffix(MARKDOWN_EXTENSION)
        .unwrap_or(relative);

    // A trailing `index` segment addresses its directory.
    let stem = match stem.rsplit_once('/') {
        Some((parent, INDEX_STEM)) => &stem[..parent.len() + 1],
        None if stem == INDEX_STEM => "",
        _ => stem,
    };

    format!("/{}", stem.trim())
}
