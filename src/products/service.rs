// Product service - joins products with their categories

use std::collections::HashMap;
use std::sync::Arc;

use crate::categories::{CategoryRepository, CategorySummary};
use crate::error::ApiError;
use crate::pagination::PageWindow;
use crate::products::{
    repository::INVALID_CATEGORY, CreateProductRequest, ListedProduct, NewProduct,
    ProductListQuery, ProductPage, ProductPatch, ProductRepository, ProductResponse,
    UpdateProductRequest,
};
use crate::validation::normalize_price;

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            products,
            categories,
        }
    }

    /// Create a product in an existing category
    ///
    /// # Errors
    /// - `Validation` if a field is missing, the name is taken or the category does not exist
    pub async fn create(&self, request: CreateProductRequest) -> Result<ProductResponse, ApiError> {
        let (Some(name), Some(price), Some(category_id)) =
            (request.name, request.price, request.category_id)
        else {
            return Err(ApiError::validation("name, price and categoryId are required"));
        };

        let category = self
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| ApiError::validation(INVALID_CATEGORY))?;

        let product = self
            .products
            .create(NewProduct {
                name,
                price: normalize_price(price),
                category_id,
            })
            .await?;

        tracing::info!("Created product {} in category {}", product.id, category.id);
        Ok(ProductResponse::new(product, Some(CategorySummary::from(&category))))
    }

    /// One page of products, optionally restricted to a category
    pub async fn list(&self, query: ProductListQuery) -> Result<ProductPage, ApiError> {
        let category_id = parse_category_filter(query.category_id.as_deref())?;
        let window = PageWindow::from_query(query.page.as_deref(), query.size.as_deref());

        let (products, total) = self.products.page(category_id, window).await?;

        let mut ids: Vec<i32> = products.iter().map(|p| p.category_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let names: HashMap<i32, CategorySummary> = self
            .categories
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|category| (category.id, CategorySummary::from(category)))
            .collect();
        let pagination = window.with_total(total);

        tracing::debug!(
            "Listing page {} of {} ({} products)",
            pagination.page,
            pagination.total_pages,
            products.len()
        );

        Ok(ProductPage {
            page: pagination.page,
            total: pagination.total_pages,
            products: products
                .into_iter()
                .map(|product| {
                    let category = names.get(&product.category_id).cloned();
                    ListedProduct::new(product, category)
                })
                .collect(),
        })
    }

    /// Apply a partial update to a product
    ///
    /// # Errors
    /// - `ProductNotFound` if no product has this id
    /// - `Validation` if the resulting category does not exist or the name is taken
    pub async fn update(
        &self,
        id: i32,
        request: UpdateProductRequest,
    ) -> Result<ProductResponse, ApiError> {
        let mut patch = ProductPatch::from(request);
        patch.price = patch.price.map(normalize_price);

        let product = self
            .products
            .update(id, patch)
            .await?
            .ok_or(ApiError::ProductNotFound)?;

        let category = self.categories.find_by_id(product.category_id).await?;

        tracing::info!("Updated product {}", product.id);
        Ok(ProductResponse::new(
            product,
            category.as_ref().map(CategorySummary::from),
        ))
    }

    pub async fn delete(&self, id: i32) -> Result<(), ApiError> {
        if !self.products.delete(id).await? {
            return Err(ApiError::ProductNotFound);
        }

        tracing::info!("Deleted product {}", id);
        Ok(())
    }
}

/// Empty means no filter; anything else must be an integer id
fn parse_category_filter(raw: Option<&str>) -> Result<Option<i32>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ApiError::validation(format!("categoryId '{}' is not a number", value))),
    }
}
