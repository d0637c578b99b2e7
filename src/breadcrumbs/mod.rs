//! Breadcrumb trail for the version diff view.
//!
//! The trail is always `secrets > {backend} > {path segments...} > version diff`.
//! Segmentation of the path is delegated to a [`PathSegmenter`].

pub mod segments;

pub use segments::{KvPathSegmenter, PathSegmenter, LIST_DIRECTORY_ROUTE, SECRET_DETAILS_ROUTE};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Label of the root entry, linking out to the secrets engine list.
pub const SECRETS_ROOT_LABEL: &str = "secrets";
/// Label of the final, non-navigable entry.
pub const VERSION_DIFF_LABEL: &str = "version diff";

/// One entry of a breadcrumb trail. Entries without a route are plain labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbEntry {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// The route lives outside the KV engine.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub link_external: bool,
}

impl BreadcrumbEntry {
    /// A plain, non-navigable label.
    pub fn label(label: impl Into<String>) -> Self {
        Self { label: label.into(), route: None, model: None, link_external: false }
    }

    pub fn link(label: impl Into<String>, route: impl Into<String>) -> Self {
        Self { label: label.into(), route: Some(route.into()), model: None, link_external: false }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn external(mut self) -> Self {
        self.link_external = true;
        self
    }

    pub fn is_navigable(&self) -> bool {
        self.route.is_some()
    }
}

/// The secret a diff view was resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSecret {
    pub backend: String,
    pub path: String,
}

impl ResolvedSecret {
    pub fn new(backend: impl Into<String>, path: impl Into<String>) -> Self {
        Self { backend: backend.into(), path: path.into() }
    }
}

/// Assembles the diff view trail. Stateless.
#[derive(Clone)]
pub struct BreadcrumbBuilder {
    segmenter: Arc<dyn PathSegmenter>,
}

impl BreadcrumbBuilder {
    pub fn new(segmenter: Arc<dyn PathSegmenter>) -> Self {
        Self { segmenter }
    }

    pub fn build(&self, resolved: &ResolvedSecret) -> Vec<BreadcrumbEntry> {
        let mut trail = vec![
            BreadcrumbEntry::link(SECRETS_ROOT_LABEL, "secrets").external(),
            BreadcrumbEntry::link(resolved.backend.as_str(), "list"),
        ];
        trail.extend(self.segmenter.segments_for_path(&resolved.path));
        trail.push(BreadcrumbEntry::label(VERSION_DIFF_LABEL));
        trail
    }
}

impl Default for BreadcrumbBuilder {
    fn default() -> Self {
        Self::new(Arc::new(KvPathSegmenter))
    }
}

/// The version diff view. The trail is computed once, on entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDiffRoute {
    resolved: ResolvedSecret,
    breadcrumbs: Vec<BreadcrumbEntry>,
}

impl VersionDiffRoute {
    pub fn enter(builder: &BreadcrumbBuilder, resolved: ResolvedSecret) -> Self {
        let breadcrumbs = builder.build(&resolved);
        Self { resolved, breadcrumbs }
    }

    pub fn breadcrumbs(&self) -> &[BreadcrumbEntry] {
        &self.breadcrumbs
    }

    pub fn resolved(&self) -> &ResolvedSecret {
        &self.resolved
    }
}
