//! Splitting a secret path into navigable breadcrumb entries.

use super::BreadcrumbEntry;

/// Route for a directory listing.
pub const LIST_DIRECTORY_ROUTE: &str = "list-directory";
/// Route for a single secret.
pub const SECRET_DETAILS_ROUTE: &str = "secret.details";

/// Produces the breadcrumb entries for a secret path.
pub trait PathSegmenter: Send + Sync {
    fn segments_for_path(&self, path: &str) -> Vec<BreadcrumbEntry>;
}

/// Segmenter for KV paths. Ancestors link to their directory listing; the
/// last segment links to the secret, or to its listing when the path is a
/// directory (trailing `/`). Empty segments are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct KvPathSegmenter;

impl PathSegmenter for KvPathSegmenter {
    fn segments_for_path(&self, path: &str) -> Vec<BreadcrumbEntry> {
        let is_directory = path.ends_with('/');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        segments
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let prefix = segments[..=idx].join("/");
                let is_last = idx + 1 == segments.len();
                if is_last && !is_directory {
                    BreadcrumbEntry::link(*name, SECRET_DETAILS_ROUTE).with_model(prefix)
                } else {
                    BreadcrumbEntry::link(*name, LIST_DIRECTORY_ROUTE).with_model(format!("{}/", prefix))
                }
            })
            .collect()
    }
}
