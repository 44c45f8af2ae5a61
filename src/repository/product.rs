use chrono::Utc;
use diesel::prelude::*;

use crate::domain::product::{NewProduct, Product, ProductFields};
use crate::domain::types::{AttachmentId, ProductId, ProductSku};
use crate::models::product::{
    NewProduct as DbNewProduct, Product as DbProduct, ProductChanges as DbProductChanges,
};
use crate::repository::{DieselRepository, ProductReader, ProductWriter, RepositoryResult};

impl ProductReader for DieselRepository {
    fn get_product_by_sku(&self, sku: &ProductSku) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let product = products::table
            .filter(products::sku.eq(sku.as_str()))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        let product = product.map(TryInto::try_into).transpose()?;
        Ok(product)
    }

    fn list_skus(&self) -> RepositoryResult<Vec<ProductSku>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let skus = products::table
            .select(products::sku)
            .order(products::id.asc())
            .load::<String>(&mut conn)?
            .into_iter()
            .map(ProductSku::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(skus)
    }

    fn count_products(&self) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let total = products::table.count().get_result::<i64>(&mut conn)?;
        Ok(total as usize)
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let db_product = DbNewProduct::from_domain(product.clone(), Utc::now().naive_utc());

        let created: DbProduct = diesel::insert_into(products::table)
            .values(&db_product)
            .returning(DbProduct::as_returning())
            .get_result(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_product(
        &self,
        id: ProductId,
        fields: &ProductFields,
        image_id: Option<AttachmentId>,
    ) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let changes = DbProductChanges::from_domain(fields, image_id, Utc::now().naive_utc());

        let affected = diesel::update(products::table.filter(products::id.eq(id.get())))
            .set(&changes)
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let affected =
            diesel::delete(products::table.filter(products::id.eq(id.get()))).execute(&mut conn)?;

        Ok(affected)
    }
}
