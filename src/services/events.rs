//! On-demand sync events raised from the admin API.

use crate::domain::catalog::RemoteProductRecord;
use crate::domain::task::SyncTask;
use crate::domain::types::ProductSku;
use crate::queue::TaskQueue;
use crate::services::ServiceResult;

/// Start a full import now.
pub fn request_import<Q: TaskQueue>(queue: &Q) -> ServiceResult<()> {
    queue.enqueue(SyncTask::StartImport)?;
    Ok(())
}

/// Run the retry path of an import now.
pub fn request_restart<Q: TaskQueue>(queue: &Q) -> ServiceResult<()> {
    queue.enqueue(SyncTask::RemoteRestart)?;
    Ok(())
}

/// Upsert a single product.
pub fn request_product_import<Q: TaskQueue>(
    record: RemoteProductRecord,
    queue: &Q,
) -> ServiceResult<()> {
    ProductSku::new(record.sku.as_str())?;
    queue.enqueue(SyncTask::ImportProduct(record))?;
    Ok(())
}

/// Delete a single product by SKU.
pub fn request_product_deletion<Q: TaskQueue>(sku: &str, queue: &Q) -> ServiceResult<()> {
    let sku = ProductSku::new(sku)?;
    queue.enqueue(SyncTask::DeleteProduct(sku.into_inner()))?;
    Ok(())
}
