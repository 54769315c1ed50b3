//! Cache types for API responses.

use super::types::{
    Collection, CollectionDetail, Location, Paginated, PaymentMethod, Product, ProductQuery,
    ProductSort,
};

/// Cache key for catalog and reference data.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Products(ProductQuery),
    Related(String),
    Collections,
    Collection {
        handle: String,
        page: u32,
        sort: ProductSort,
    },
    Provinces,
    Districts(String),
    Wards(String),
    PaymentMethods,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Paginated<Product>),
    ProductList(Vec<Product>),
    Collections(Vec<Collection>),
    Collection(Box<CollectionDetail>),
    Locations(Vec<Location>),
    PaymentMethods(Vec<PaymentMethod>),
}
