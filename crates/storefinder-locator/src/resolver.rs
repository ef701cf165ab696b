//! Two-attempt resolution of `/store-finder/{*path}`.
//!
//! The path is ambiguous between a product drill-down
//! (`category/product/variation/item`) and a free-form legacy path. The
//! structured reading is tried first; a not-found moves to the opaque
//! reading, where the whole path is one category argument. A not-found there
//! is final.

use crate::error::LocatorError;
use crate::pipeline::{Locator, Outcome};
use crate::query::{PathSlugs, RawParams};

const MAX_SEGMENTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveState {
    StructuredAttempt { path: String },
    OpaqueFallback { path: String },
}

impl ResolveState {
    /// Initial state for a raw path; the trailing slash is dropped.
    #[must_use]
    pub fn start(path: &str) -> Self {
        Self::StructuredAttempt {
            path: path.trim_end_matches('/').to_string(),
        }
    }

    /// Slugs to dispatch in this state, or `None` when the state has nothing
    /// to dispatch and counts as not-found outright.
    #[must_use]
    pub fn slugs(&self) -> Option<PathSlugs> {
        match self {
            Self::StructuredAttempt { path } => {
                let segments: Vec<&str> = if path.is_empty() {
                    Vec::new()
                } else {
                    path.split('/').take(MAX_SEGMENTS).collect()
                };
                (!segments.is_empty()).then(|| PathSlugs::from_segments(&segments))
            }
            Self::OpaqueFallback { path } => Some(PathSlugs::opaque(path)),
        }
    }

    /// Transition taken on a not-found outcome. `None` means the not-found
    /// is final.
    #[must_use]
    pub fn on_not_found(self) -> Option<Self> {
        match self {
            Self::StructuredAttempt { path } => Some(Self::OpaqueFallback { path }),
            Self::OpaqueFallback { .. } => None,
        }
    }
}

/// Resolves `path` against `locator`.
///
/// # Errors
///
/// Returns the final attempt's [`LocatorError`]; non-not-found errors end
/// resolution immediately.
pub async fn resolve(
    locator: &Locator,
    raw: &RawParams,
    path: &str,
    interactive: bool,
) -> Result<Outcome, LocatorError> {
    let mut state = ResolveState::start(path);
    loop {
        let result = match state.slugs() {
            Some(slugs) => locator.handle(raw, slugs, interactive).await,
            None => Err(LocatorError::NotFound(format!("no store finder path '{path}'"))),
        };

        match result {
            Err(e) if e.is_not_found() => match state.on_not_found() {
                Some(next) => {
                    tracing::debug!(path, error = %e, "structured path not found, trying opaque path");
                    state = next;
                }
                None => return Err(e),
            },
            other => return other,
        }
    }
}
