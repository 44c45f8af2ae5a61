use serde::Serialize;

use crate::repository::ProductReader;

use super::ServiceResult;

/// Notice shown instead of the dashboard when sync is disabled.
pub const STORE_UNAVAILABLE_NOTICE: &str =
    "Catalog Sync: Requires the product store to be available.";

/// Data rendered by the admin index page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IndexView {
    pub store_available: bool,
    pub notice: Option<&'static str>,
    pub catalog_url: String,
    pub sync_interval_secs: u64,
    pub product_count: usize,
}

/// Core business logic for rendering the index page.
///
/// `repo` is `None` when the product store could not be opened; the page then
/// only carries the unavailability notice.
pub fn show_index<R>(
    repo: Option<&R>,
    catalog_url: &str,
    sync_interval_secs: u64,
) -> ServiceResult<IndexView>
where
    R: ProductReader,
{
    let Some(repo) = repo else {
        return Ok(IndexView {
            store_available: false,
            notice: Some(STORE_UNAVAILABLE_NOTICE),
            catalog_url: catalog_url.to_string(),
            sync_interval_secs,
            product_count: 0,
        });
    };

    let product_count = repo.count_products().map_err(|e| {
        log::error!("Failed to count products: {e}");
        e
    })?;

    Ok(IndexView {
        store_available: true,
        notice: None,
        catalog_url: catalog_url.to_string(),
        sync_interval_secs,
        product_count,
    })
}
