use crate::domain::catalog::RemoteProductRecord;
use crate::domain::product::{NewProduct, ProductFields};
use crate::domain::types::{
    AttachmentId, CatalogVisibility, ImageUrl, ProductName, ProductSku, PublicationStatus,
    RegularPrice, StockQuantity, StockStatus,
};
use crate::repository::{ProductReader, ProductWriter, RepositoryError};
use crate::services::images::ImageImporter;
use crate::services::{ServiceResult, SyncSettings, TaskOutcome};

/// Map a remote record onto the locally stored product attributes.
pub fn map_fields(
    record: &RemoteProductRecord,
    settings: &SyncSettings,
) -> ServiceResult<ProductFields> {
    Ok(ProductFields {
        name: ProductName::new(record.name.as_str())?,
        description: record.description.clone(),
        regular_price: RegularPrice::parse(&record.price)?,
        stock_status: StockStatus::InStock,
        manage_stock: true,
        stock_quantity: StockQuantity::new(record.in_stock)?,
        status: PublicationStatus::Publish,
        catalog_visibility: CatalogVisibility::Visible,
        category_id: settings.category_id,
    })
}

/// Create or update the product described by `record`.
///
/// The SKU is only written on creation. A picture is imported only for
/// products without an image, after the product row exists; import failures
/// leave the image unset and do not fail the upsert.
pub async fn upsert_product<R, I>(
    record: &RemoteProductRecord,
    repo: &R,
    images: &I,
    settings: &SyncSettings,
) -> ServiceResult<TaskOutcome>
where
    R: ProductReader + ProductWriter,
    I: ImageImporter + ?Sized,
{
    let sku = ProductSku::new(record.sku.as_str())?;
    let fields = map_fields(record, settings)?;

    let existing = repo.get_product_by_sku(&sku).map_err(|e| {
        log::error!("Failed to look up product {sku}: {e}");
        e
    })?;

    match existing {
        Some(product) => {
            let image_id = if product.has_image() {
                None
            } else {
                attach_image(record, &sku, images).await
            };
            repo.update_product(product.id, &fields, image_id)
                .map_err(|e| {
                    log::error!("Failed to update product {sku}: {e}");
                    e
                })?;
            Ok(TaskOutcome::Updated(product.id))
        }
        None => create_product(record, sku, fields, repo, images).await,
    }
}

/// Create the product without an image first, then attach the picture.
///
/// A concurrent task may create the same SKU between the lookup and the
/// insert; the unique violation is then handled as an update that leaves the
/// image to the task that won.
async fn create_product<R, I>(
    record: &RemoteProductRecord,
    sku: ProductSku,
    fields: ProductFields,
    repo: &R,
    images: &I,
) -> ServiceResult<TaskOutcome>
where
    R: ProductReader + ProductWriter,
    I: ImageImporter + ?Sized,
{
    let new_product = NewProduct {
        sku: sku.clone(),
        fields,
        image_id: None,
    };

    let created = match repo.create_product(&new_product) {
        Ok(created) => created,
        Err(RepositoryError::ConstraintViolation(reason)) => {
            log::debug!("Product {sku} was created concurrently ({reason})");
            return update_concurrently_created(&new_product, repo);
        }
        Err(e) => {
            log::error!("Failed to create product {sku}: {e}");
            return Err(e.into());
        }
    };

    if let Some(image_id) = attach_image(record, &sku, images).await {
        repo.update_product(created.id, &new_product.fields, Some(image_id))
            .map_err(|e| {
                log::error!("Failed to set image of product {sku}: {e}");
                e
            })?;
    }
    Ok(TaskOutcome::Created(created.id))
}

fn update_concurrently_created<R>(product: &NewProduct, repo: &R) -> ServiceResult<TaskOutcome>
where
    R: ProductReader + ProductWriter,
{
    let sku = &product.sku;
    let existing = repo
        .get_product_by_sku(sku)
        .map_err(|e| {
            log::error!("Failed to look up product {sku}: {e}");
            e
        })?
        .ok_or_else(|| {
            log::error!("Product {sku} vanished after a conflicting insert");
            RepositoryError::NotFound
        })?;

    repo.update_product(existing.id, &product.fields, None)
        .map_err(|e| {
            log::error!("Failed to update product {sku}: {e}");
            e
        })?;
    Ok(TaskOutcome::Updated(existing.id))
}

async fn attach_image<I>(
    record: &RemoteProductRecord,
    sku: &ProductSku,
    images: &I,
) -> Option<AttachmentId>
where
    I: ImageImporter + ?Sized,
{
    let picture = record.picture.as_deref()?;
    let url = match ImageUrl::new(picture) {
        Ok(url) => url,
        Err(e) => {
            log::debug!("Skipping image of {sku}: {e}");
            return None;
        }
    };

    match images.import_image(&url, sku).await {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("Failed to import image of {sku} from {url}: {e}");
            None
        }
    }
}
