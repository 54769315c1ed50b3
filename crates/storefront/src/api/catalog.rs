//! Products and collections.

use reqwest::Method;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::types::{Collection, CollectionDetail, Paginated, Product, ProductQuery, ProductSort};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Get a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown handle, or another error if
    /// the request fails.
    #[instrument(skip(self))]
    pub async fn get_product(&self, handle: &str) -> Result<Product, ApiError> {
        let key = CacheKey::Product(handle.to_string());
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .send(self.request(Method::GET, &["products", handle], None))
            .await?;

        self.cache(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Get a page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<Paginated<Product>, ApiError> {
        let key = CacheKey::Products(query.clone());
        if let Some(CacheValue::Products(page)) = self.cached(&key).await {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let builder = self.request(Method::GET, &["products"], None).query(&[
            ("page", query.page.to_string()),
            ("limit", query.per_page.to_string()),
            ("sort", query.sort.as_str().to_string()),
        ]);
        let builder = match &query.q {
            Some(q) => builder.query(&[("q", q)]),
            None => builder,
        };
        let builder = match &query.collection {
            Some(collection) => builder.query(&[("collection", collection)]),
            None => builder,
        };

        let page: Paginated<Product> = self.send(builder).await?;

        self.cache(key, CacheValue::Products(page.clone())).await;
        Ok(page)
    }

    /// Get products related to the given one.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_related_products(&self, handle: &str) -> Result<Vec<Product>, ApiError> {
        let key = CacheKey::Related(handle.to_string());
        if let Some(CacheValue::ProductList(products)) = self.cached(&key).await {
            return Ok(products);
        }

        let products: Vec<Product> = self
            .send(self.request(Method::GET, &["products", handle, "related"], None))
            .await?;

        self.cache(key, CacheValue::ProductList(products.clone()))
            .await;
        Ok(products)
    }

    /// List all collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_collections(&self) -> Result<Vec<Collection>, ApiError> {
        if let Some(CacheValue::Collections(collections)) =
            self.cached(&CacheKey::Collections).await
        {
            debug!("Cache hit for collections");
            return Ok(collections);
        }

        let collections: Vec<Collection> = self
            .send(self.request(Method::GET, &["collections"], None))
            .await?;

        self.cache(
            CacheKey::Collections,
            CacheValue::Collections(collections.clone()),
        )
        .await;
        Ok(collections)
    }

    /// Get a collection with one page of its products.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown handle, or another error if
    /// the request fails.
    #[instrument(skip(self))]
    pub async fn get_collection(
        &self,
        handle: &str,
        page: u32,
        sort: ProductSort,
    ) -> Result<CollectionDetail, ApiError> {
        let key = CacheKey::Collection {
            handle: handle.to_string(),
            page,
            sort,
        };
        if let Some(CacheValue::Collection(detail)) = self.cached(&key).await {
            debug!("Cache hit for collection");
            return Ok(*detail);
        }

        let builder = self
            .request(Method::GET, &["collections", handle], None)
            .query(&[("page", page.to_string()), ("sort", sort.as_str().to_string())]);
        let detail: CollectionDetail = self.send(builder).await?;

        self.cache(key, CacheValue::Collection(Box::new(detail.clone())))
            .await;
        Ok(detail)
    }
}
