use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::categories::CategorySummary;
use crate::validation::validate_price;

/// Domain model representing a product in the database
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values needed to insert a product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub category_id: i32,
}

/// Field-level changes for an update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<i32>,
}

impl ProductPatch {
    /// Applies the patch on top of a stored product
    pub fn apply(self, product: &Product) -> NewProduct {
        NewProduct {
            name: self.name.unwrap_or_else(|| product.name.clone()),
            price: self.price.unwrap_or(product.price),
            category_id: self.category_id.unwrap_or(product.category_id),
        }
    }
}

/// Request DTO for creating a product
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(required, length(min = 1, message = "Name is required"))]
    #[schema(example = "Espresso")]
    pub name: Option<String>,
    #[validate(required, custom = "validate_price")]
    #[schema(value_type = Option<String>, example = "2.50")]
    pub price: Option<Decimal>,
    #[validate(required)]
    #[schema(example = 1)]
    pub category_id: Option<i32>,
}

/// Request DTO for updating a product
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(custom = "validate_price")]
    #[schema(value_type = Option<String>, example = "2.75")]
    pub price: Option<Decimal>,
    pub category_id: Option<i32>,
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(request: UpdateProductRequest) -> Self {
        Self {
            name: request.name,
            price: request.price,
            category_id: request.category_id,
        }
    }
}

/// Raw listing query; values are interpreted by the pagination rules
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Page number, 1-based
    pub page: Option<String>,
    /// Products per page
    pub size: Option<String>,
    /// Only list products in this category
    pub category_id: Option<String>,
}

/// Response DTO for a product with its category resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    #[schema(value_type = String, example = "2.50")]
    pub price: Decimal,
    pub category_id: i32,
    /// Null when the category has since been deleted
    pub category: Option<CategorySummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    pub fn new(product: Product, category: Option<CategorySummary>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            category_id: product.category_id,
            category,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// `{product}` response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductEnvelope {
    pub product: ProductResponse,
}

/// Product as listed: the resolved category stands in for `categoryId`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListedProduct {
    pub id: i32,
    pub name: String,
    #[schema(value_type = String, example = "2.50")]
    pub price: Decimal,
    /// Null when the category has since been deleted
    pub category: Option<CategorySummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListedProduct {
    pub fn new(product: Product, category: Option<CategorySummary>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            category,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// One page of the product listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductPage {
    pub page: i64,
    /// Number of pages
    pub total: i64,
    pub products: Vec<ListedProduct>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product() -> Product {
        Product {
            id: 3,
            name: "Espresso".to_string(),
            price: dec!(2.50),
            category_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let merged = ProductPatch {
            price: Some(dec!(3.00)),
            ..Default::default()
        }
        .apply(&product());

        assert_eq!(merged.name, "Espresso");
        assert_eq!(merged.price, dec!(3.00));
        assert_eq!(merged.category_id, 1);
    }

    #[test]
    fn test_response_wire_format() {
        let response = ProductResponse::new(
            product(),
            Some(CategorySummary {
                id: 1,
                name: "Coffee".to_string(),
            }),
        );
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["price"], "2.50");
        assert_eq!(json["categoryId"], 1);
        assert_eq!(json["category"], serde_json::json!({"id": 1, "name": "Coffee"}));
        assert!(json.get("createdAt").is_some());

        let orphan = serde_json::to_value(ProductResponse::new(product(), None)).unwrap();
        assert!(orphan["category"].is_null());
    }

    #[test]
    fn test_listed_product_drops_category_id() {
        let listed = ListedProduct::new(
            product(),
            Some(CategorySummary {
                id: 1,
                name: "Coffee".to_string(),
            }),
        );
        let json = serde_json::to_value(&listed).unwrap();

        assert!(json.get("categoryId").is_none());
        assert_eq!(json["category"]["id"], 1);
        assert_eq!(json["price"], "2.50");
    }

    #[test]
    fn test_page_wire_format() {
        let page = ProductPage {
            page: 2,
            total: 3,
            products: vec![],
        };
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json, serde_json::json!({"page": 2, "total": 3, "products": []}));
    }

    #[test]
    fn test_create_request_accepts_numeric_or_string_price() {
        let numeric: CreateProductRequest =
            serde_json::from_str(r#"{"name": "Tea", "price": 1.5, "categoryId": 2}"#).unwrap();
        let text: CreateProductRequest =
            serde_json::from_str(r#"{"name": "Tea", "price": "1.5", "categoryId": 2}"#).unwrap();

        assert_eq!(numeric.price, Some(dec!(1.5)));
        assert_eq!(text.price, Some(dec!(1.5)));
        assert!(numeric.validate().is_ok());
    }

    #[test]
    fn test_create_request_requires_every_field() {
        let missing_price: CreateProductRequest =
            serde_json::from_str(r#"{"name": "Tea", "categoryId": 2}"#).unwrap();
        assert!(missing_price.validate().is_err());

        let missing_category: CreateProductRequest =
            serde_json::from_str(r#"{"name": "Tea", "price": "1"}"#).unwrap();
        assert!(missing_category.validate().is_err());
    }

    #[test]
    fn test_update_request_rejects_empty_name_and_negative_price() {
        let empty_name: UpdateProductRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(empty_name.validate().is_err());

        let negative: UpdateProductRequest = serde_json::from_str(r#"{"price": "-1"}"#).unwrap();
        assert!(negative.validate().is_err());

        let empty: UpdateProductRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.validate().is_ok());
    }
}
