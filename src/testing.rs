// In-memory repositories for tests
// They enforce the same uniqueness rules the database constraints do.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::{
    models::{NewUser, User},
    repository::UserRepository,
};
use crate::categories::{Category, CategoryRepository};
use crate::error::ApiError;
use crate::pagination::PageWindow;
use crate::products::{NewProduct, Product, ProductPatch, ProductRepository, INVALID_CATEGORY};

struct Table<T> {
    rows: Vec<T>,
    last_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

fn duplicate(column: &str) -> ApiError {
    ApiError::validation(format!("duplicate key value violates unique constraint on {}", column))
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, ApiError> {
        let mut table = self.table.write().await;
        if table.rows.iter().any(|u| u.username == user.username) {
            return Err(duplicate("users.username"));
        }

        let now = Utc::now();
        let user = User {
            id: table.next_id(),
            name: user.name,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|u| u.username == username).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    table: RwLock<Table<Category>>,
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, name: &str) -> Result<Category, ApiError> {
        let mut table = self.table.write().await;
        if table.rows.iter().any(|c| c.name == name) {
            return Err(duplicate("categories.name"));
        }

        let now = Utc::now();
        let category = Category {
            id: table.next_id(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        table.rows.push(category.clone());
        Ok(category)
    }

    async fn list(&self) -> Result<Vec<Category>, ApiError> {
        Ok(self.table.read().await.rows.clone())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, ApiError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Category>, ApiError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i32, name: &str) -> Result<Option<Category>, ApiError> {
        let mut table = self.table.write().await;
        if table.rows.iter().any(|c| c.name == name && c.id != id) {
            return Err(duplicate("categories.name"));
        }

        Ok(table.rows.iter_mut().find(|c| c.id == id).map(|category| {
            category.name = name.to_string();
            category.updated_at = Utc::now();
            category.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|c| c.id != id);
        Ok(table.rows.len() < before)
    }
}

pub struct InMemoryProductRepository {
    table: RwLock<Table<Product>>,
    categories: Arc<InMemoryCategoryRepository>,
}

impl InMemoryProductRepository {
    pub fn new(categories: Arc<InMemoryCategoryRepository>) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            categories,
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: NewProduct) -> Result<Product, ApiError> {
        let mut table = self.table.write().await;
        if table.rows.iter().any(|p| p.name == product.name) {
            return Err(duplicate("products.name"));
        }

        let now = Utc::now();
        let product = Product {
            id: table.next_id(),
            name: product.name,
            price: product.price,
            category_id: product.category_id,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(product.clone());
        Ok(product)
    }

    async fn page(
        &self,
        category_id: Option<i32>,
        window: PageWindow,
    ) -> Result<(Vec<Product>, i64), ApiError> {
        let table = self.table.read().await;
        let matching: Vec<&Product> = table
            .rows
            .iter()
            .filter(|p| category_id.map_or(true, |id| p.category_id == id))
            .collect();

        let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
        let size = usize::try_from(window.size).unwrap_or(usize::MAX);
        let rows = matching
            .iter()
            .skip(offset)
            .take(size)
            .map(|p| (*p).clone())
            .collect();

        Ok((rows, matching.len() as i64))
    }

    async fn update(&self, id: i32, patch: ProductPatch) -> Result<Option<Product>, ApiError> {
        let mut table = self.table.write().await;
        let Some(current) = table.rows.iter().find(|p| p.id == id).cloned() else {
            return Ok(None);
        };

        let merged = patch.apply(&current);
        if self.categories.find_by_id(merged.category_id).await?.is_none() {
            return Err(ApiError::validation(INVALID_CATEGORY));
        }
        if table.rows.iter().any(|p| p.name == merged.name && p.id != id) {
            return Err(duplicate("products.name"));
        }

        let Some(product) = table.rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.name = merged.name;
        product.price = merged.price;
        product.category_id = merged.category_id;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|p| p.id != id);
        Ok(table.rows.len() < before)
    }
}
