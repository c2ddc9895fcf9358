//! Application directory for populating a selector.
//!
//! The source may list the same display name under several ids. The
//! selector shows each name once: the first-seen entry for a name wins and
//! the rest are dropped. Names compare exactly (case-sensitive) for
//! deduplication, but sort case-insensitively so that `alpha` and `Beta`
//! interleave the way a person expects. Empty names sort first.
//!
//! [`list_apis`] answers the per-application API listing.

use crate::domain::{ApiSummary, Application, ApplicationId};
use crate::error::{Error, Result};
use crate::source::SupplyChainSource;
use std::cmp::Ordering;
use std::collections::HashSet;

/// List applications for a selector.
///
/// A failing source is not fatal: the failure is logged and an empty list
/// comes back, so navigation simply has no selector options.
pub async fn list_applications(source: &dyn SupplyChainSource) -> Vec<Application> {
    match source.list_applications().await {
        Ok(apps) => dedupe_and_sort(apps),
        Err(e) => {
            tracing::warn!(error = %e, "Application directory unavailable");
            Vec::new()
        }
    }
}

/// Deduplicate by exact name (first seen wins) and sort for display.
pub fn dedupe_and_sort(apps: Vec<Application>) -> Vec<Application> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Application> = apps
        .into_iter()
        .filter(|app| seen.insert(app.name.clone()))
        .collect();

    // Stable sort keeps first-seen order for names that compare equal.
    unique.sort_by(|a, b| compare_names(&a.name, &b.name));
    unique
}

/// APIs exposed by one application, sorted by name.
///
/// An unknown id has no APIs rather than failing.
///
/// # Errors
///
/// Returns the source error for any failure other than an unknown id.
pub async fn list_apis(
    source: &dyn SupplyChainSource,
    id: &ApplicationId,
) -> Result<Vec<ApiSummary>> {
    let snapshot = match source.fetch_supply_chain(id).await {
        Ok(snapshot) => snapshot,
        Err(Error::NotFound(_)) => {
            tracing::debug!(app_id = %id, "No such application, no APIs");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut apis: Vec<ApiSummary> = snapshot
        .main_details
        .and_then(|details| details.api())
        .into_iter()
        .collect();
    apis.sort_by(|a, b| a.api_name.cmp(&b.api_name));
    Ok(apis)
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
