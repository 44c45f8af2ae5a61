use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, ProductFields,
};
use crate::domain::types::{
    AttachmentId, CatalogVisibility, CategoryId, ProductId, ProductName, ProductSku,
    PublicationStatus, RegularPrice, StockQuantity, StockStatus, TypeConstraintError,
};

/// Diesel model representing the `products` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub regular_price: String,
    pub stock_status: String,
    pub manage_stock: bool,
    pub stock_quantity: i32,
    pub status: String,
    pub catalog_visibility: String,
    pub category_id: i32,
    pub image_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Product`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub regular_price: String,
    pub stock_status: String,
    pub manage_stock: bool,
    pub stock_quantity: i32,
    pub status: String,
    pub catalog_visibility: String,
    pub category_id: i32,
    pub image_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changeset applied on every sync. `image_id: None` leaves the column as is.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct ProductChanges {
    pub name: String,
    pub description: String,
    pub regular_price: String,
    pub stock_status: String,
    pub manage_stock: bool,
    pub stock_quantity: i32,
    pub status: String,
    pub catalog_visibility: String,
    pub category_id: i32,
    pub image_id: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Product> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from(product: Product) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(product.id)?,
            sku: ProductSku::new(product.sku)?,
            fields: ProductFields {
                name: ProductName::new(product.name)?,
                description: product.description,
                regular_price: RegularPrice::try_from(product.regular_price)?,
                stock_status: StockStatus::try_from(product.stock_status)?,
                manage_stock: product.manage_stock,
                stock_quantity: StockQuantity::new(product.stock_quantity)?,
                status: PublicationStatus::try_from(product.status)?,
                catalog_visibility: CatalogVisibility::try_from(product.catalog_visibility)?,
                category_id: CategoryId::new(product.category_id)?,
            },
            image_id: product.image_id.map(AttachmentId::new).transpose()?,
            created_at: product.created_at,
            updated_at: product.updated_at,
        })
    }
}

impl NewProduct {
    pub fn from_domain(product: DomainNewProduct, now: NaiveDateTime) -> Self {
        let fields = product.fields;
        Self {
            sku: product.sku.into_inner(),
            name: fields.name.into_inner(),
            description: fields.description,
            regular_price: fields.regular_price.into_inner(),
            stock_status: fields.stock_status.into(),
            manage_stock: fields.manage_stock,
            stock_quantity: fields.stock_quantity.get(),
            status: fields.status.into(),
            catalog_visibility: fields.catalog_visibility.into(),
            category_id: fields.category_id.get(),
            image_id: product.image_id.map(AttachmentId::get),
            created_at: now,
            updated_at: now,
        }
    }
}

impl ProductChanges {
    pub fn from_domain(
        fields: &ProductFields,
        image_id: Option<AttachmentId>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            name: fields.name.as_str().to_string(),
            description: fields.description.clone(),
            regular_price: fields.regular_price.as_str().to_string(),
            stock_status: fields.stock_status.into(),
            manage_stock: fields.manage_stock,
            stock_quantity: fields.stock_quantity.get(),
            status: fields.status.into(),
            catalog_visibility: fields.catalog_visibility.into(),
            category_id: fields.category_id.get(),
            image_id: image_id.map(AttachmentId::get),
            updated_at: now,
        }
    }
}
