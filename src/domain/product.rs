use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    AttachmentId, CatalogVisibility, CategoryId, ProductId, ProductName, ProductSku,
    PublicationStatus, RegularPrice, StockQuantity, StockStatus,
};

/// A product held in the local store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Reconciliation key; never changes after creation.
    pub sku: ProductSku,
    pub fields: ProductFields,
    pub image_id: Option<AttachmentId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Whether an image is already attached.
    pub fn has_image(&self) -> bool {
        self.image_id.is_some()
    }
}

/// Attributes overwritten on every sync of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductFields {
    pub name: ProductName,
    pub description: String,
    pub regular_price: RegularPrice,
    pub stock_status: StockStatus,
    pub manage_stock: bool,
    pub stock_quantity: StockQuantity,
    pub status: PublicationStatus,
    pub catalog_visibility: CatalogVisibility,
    pub category_id: CategoryId,
}

/// Information required to create a new [`Product`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub sku: ProductSku,
    pub fields: ProductFields,
    pub image_id: Option<AttachmentId>,
}
