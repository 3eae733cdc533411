//! Repositories for database operations
//!
//! Services talk to storage through the [`SweetRepository`] and
//! [`UserRepository`] traits. PostgreSQL implementations live in
//! [`sweet`] and [`user`]; [`memory`] keeps everything in process.

use async_trait::async_trait;
use common::error::DatabaseResult;

use crate::models::{NewUser, Sweet, SweetFilter, SweetRequest, User};

pub mod memory;
pub mod sweet;
pub mod user;

pub use memory::{InMemorySweetRepository, InMemoryUserRepository};
pub use sweet::PgSweetRepository;
pub use user::PgUserRepository;

/// Storage port for the sweet catalog
#[async_trait]
pub trait SweetRepository: Send + Sync {
    /// All sweets ordered by id
    async fn find_all(&self) -> DatabaseResult<Vec<Sweet>>;

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Sweet>>;

    /// Sweets matching every supplied filter, ordered by id
    async fn search(&self, filter: &SweetFilter) -> DatabaseResult<Vec<Sweet>>;

    async fn insert(&self, sweet: &SweetRequest) -> DatabaseResult<Sweet>;

    /// Overwrite all fields. Returns `None` when the id does not exist.
    async fn update(&self, id: i64, sweet: &SweetRequest) -> DatabaseResult<Option<Sweet>>;

    /// Returns `false` when the id does not exist.
    async fn delete(&self, id: i64) -> DatabaseResult<bool>;

    /// Atomically take one unit out of stock.
    ///
    /// Returns `None` when the sweet is missing or its quantity is already
    /// zero; the stored quantity is never driven below zero.
    async fn decrement_stock(&self, id: i64) -> DatabaseResult<Option<Sweet>>;

    /// Atomically add `amount` units.
    ///
    /// Returns `None` when the sweet is missing or the new quantity would
    /// not fit in an `i32`; the stored quantity is then left untouched.
    async fn increment_stock(&self, id: i64, amount: i32) -> DatabaseResult<Option<Sweet>>;
}

/// Storage port for registered users
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn exists_by_username(&self, username: &str) -> DatabaseResult<bool>;

    async fn exists_by_email(&self, email: &str) -> DatabaseResult<bool>;

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;

    /// Persist a new user. Unique violations surface as `DatabaseError::Duplicate`.
    async fn insert(&self, user: &NewUser) -> DatabaseResult<User>;
}
