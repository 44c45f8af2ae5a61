use crate::domain::catalog::SkuSet;
use crate::domain::task::SyncTask;
use crate::domain::types::ProductSku;
use crate::queue::TaskQueue;
use crate::repository::{ProductReader, ProductWriter};
use crate::services::{ServiceResult, TaskOutcome};

/// Enqueue a [`SyncTask::DeleteProduct`] for every stored product whose SKU is
/// absent from `current`.
///
/// An empty `current` set never deletes anything, so a failed or empty fetch
/// cannot wipe the store. Returns the number of deletions enqueued.
pub fn scan_for_deletions<R, Q>(current: &SkuSet, repo: &R, queue: &Q) -> ServiceResult<usize>
where
    R: ProductReader,
    Q: TaskQueue,
{
    if current.is_empty() {
        log::debug!("Deletion scan skipped: no SKUs in the current fetch");
        return Ok(0);
    }

    let stored = repo.list_skus().map_err(|e| {
        log::error!("Failed to list stored SKUs: {e}");
        e
    })?;

    let missing = current.missing_from(stored);
    for sku in &missing {
        queue.enqueue(SyncTask::DeleteProduct(sku.as_str().to_string()))?;
    }

    Ok(missing.len())
}

/// Permanently remove the product stored under `sku`.
pub fn delete_product<R>(sku: &str, repo: &R) -> ServiceResult<TaskOutcome>
where
    R: ProductReader + ProductWriter,
{
    let sku = match ProductSku::new(sku) {
        Ok(sku) => sku,
        Err(_) => return Ok(TaskOutcome::Skipped("empty sku")),
    };

    let product = match repo.get_product_by_sku(&sku)? {
        Some(product) => product,
        None => return Ok(TaskOutcome::Skipped("product not found")),
    };

    repo.delete_product(product.id).map_err(|e| {
        log::error!("Failed to delete product {sku}: {e}");
        e
    })?;

    Ok(TaskOutcome::Deleted(product.id))
}
