//! Records published by the remote catalog.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::types::ProductSku;

/// One product as published by the remote catalog.
///
/// Values are kept raw; they are validated when the record is upserted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteProductRecord {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price with a currency prefix, e.g. `"$12.50"`.
    pub price: String,
    pub in_stock: i32,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Top-level response wrapper of the catalog endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEnvelope {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub data: Vec<RemoteProductRecord>,
}

/// SKUs seen in the current fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkuSet(BTreeSet<String>);

impl SkuSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a SKU. Blank values are ignored.
    pub fn insert(&mut self, sku: &str) {
        let sku = sku.trim();
        if !sku.is_empty() {
            self.0.insert(sku.to_string());
        }
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.0.contains(sku)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the stored SKUs that are absent from this set, in input order.
    pub fn missing_from(&self, stored: Vec<ProductSku>) -> Vec<ProductSku> {
        stored
            .into_iter()
            .filter(|sku| !self.contains(sku.as_str()))
            .collect()
    }
}

impl<'a> FromIterator<&'a str> for SkuSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut set = Self::new();
        for sku in iter {
            set.insert(sku);
        }
        set
    }
}
