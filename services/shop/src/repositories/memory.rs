//! In-process repositories
//!
//! Used by the test suites and for running the service without PostgreSQL.
//! Each store sits behind a `tokio::sync::RwLock`, so stock changes are
//! atomic just like the conditional UPDATEs of the PostgreSQL repository.

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::RwLock;

use super::{SweetRepository, UserRepository};
use crate::models::{NewUser, Sweet, SweetFilter, SweetRequest, User};

#[derive(Debug)]
struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Sweet repository holding rows in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySweetRepository {
    table: Arc<RwLock<Table<Sweet>>>,
}

impl InMemorySweetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SweetRepository for InMemorySweetRepository {
    async fn find_all(&self) -> DatabaseResult<Vec<Sweet>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Sweet>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn search(&self, filter: &SweetFilter) -> DatabaseResult<Vec<Sweet>> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .filter(|sweet| filter.matches(sweet))
            .cloned()
            .collect())
    }

    async fn insert(&self, sweet: &SweetRequest) -> DatabaseResult<Sweet> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let stored = Sweet {
            id: table.allocate_id(),
            name: sweet.name.clone(),
            category: sweet.category.clone(),
            price: sweet.price,
            quantity: sweet.quantity,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, sweet: &SweetRequest) -> DatabaseResult<Option<Sweet>> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|stored| {
            stored.name = sweet.name.clone();
            stored.category = sweet.category.clone();
            stored.price = sweet.price;
            stored.quantity = sweet.quantity;
            stored.updated_at = Utc::now();
            stored.clone()
        }))
    }

    async fn delete(&self, id: i64) -> DatabaseResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn decrement_stock(&self, id: i64) -> DatabaseResult<Option<Sweet>> {
        let mut table = self.table.write().await;
        Ok(table
            .rows
            .get_mut(&id)
            .filter(|stored| stored.quantity > 0)
            .map(|stored| {
                stored.quantity -= 1;
                stored.updated_at = Utc::now();
                stored.clone()
            }))
    }

    async fn increment_stock(&self, id: i64, amount: i32) -> DatabaseResult<Option<Sweet>> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).and_then(|stored| {
            stored.quantity = stored.quantity.checked_add(amount)?;
            stored.updated_at = Utc::now();
            Some(stored.clone())
        }))
    }
}

/// User repository holding rows in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<Table<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn exists_by_username(&self, username: &str) -> DatabaseResult<bool> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .any(|user| user.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> DatabaseResult<bool> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .any(|user| user.email == email))
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut table = self.table.write().await;

        let duplicate = table
            .rows
            .values()
            .any(|user| user.username == new_user.username || user.email == new_user.email);
        if duplicate {
            return Err(DatabaseError::Duplicate(format!(
                "user {} already exists",
                new_user.username
            )));
        }

        let user = User {
            id: table.allocate_id(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            roles: new_user.roles.clone(),
            created_at: Utc::now(),
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }
}
