use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Domain model representing a category in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Beverages")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating or renaming a category
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryRequest {
    #[validate(required, length(min = 1, message = "Name is required"))]
    #[schema(example = "Beverages")]
    pub name: Option<String>,
}

/// `{category}` response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryEnvelope {
    pub category: Category,
}

/// `{categories}` response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoriesEnvelope {
    pub categories: Vec<Category>,
}

/// Category as embedded in product responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategorySummary {
    pub id: i32,
    pub name: String,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}
