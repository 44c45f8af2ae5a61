use crate::db::{DbConnection, DbPool};
use crate::domain::attachment::NewAttachment;
use crate::domain::product::{NewProduct, Product, ProductFields};
use crate::domain::types::{AttachmentId, ProductId, ProductSku};

pub mod attachment;
pub mod errors;
pub mod product;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be shared between the admin server and queue workers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations for product entities.
pub trait ProductReader {
    /// Retrieve a product by its SKU.
    fn get_product_by_sku(&self, sku: &ProductSku) -> RepositoryResult<Option<Product>>;
    /// List the SKUs of every stored product.
    fn list_skus(&self) -> RepositoryResult<Vec<ProductSku>>;
    /// Number of stored products.
    fn count_products(&self) -> RepositoryResult<usize>;
}

/// Write operations for product entities.
pub trait ProductWriter {
    /// Persist a new product and return it.
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
    /// Overwrite the synced fields of a product. The image is only set when
    /// `image_id` is provided; an existing image is never cleared.
    fn update_product(
        &self,
        id: ProductId,
        fields: &ProductFields,
        image_id: Option<AttachmentId>,
    ) -> RepositoryResult<usize>;
    /// Permanently remove a product.
    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize>;
}

/// Write operations for media attachments.
pub trait AttachmentWriter {
    /// Register a stored file and return the new attachment identifier.
    fn create_attachment(&self, attachment: &NewAttachment) -> RepositoryResult<AttachmentId>;
}
