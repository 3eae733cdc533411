//! Catalog service: CRUD, search, purchase and restock

use std::sync::Arc;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{Sweet, SweetFilter, SweetRequest},
    repositories::SweetRepository,
    validation::validate_sweet_request,
};

/// Sweet catalog service
#[derive(Clone)]
pub struct SweetService {
    repository: Arc<dyn SweetRepository>,
}

impl SweetService {
    pub fn new(repository: Arc<dyn SweetRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_all(&self) -> ApiResult<Vec<Sweet>> {
        Ok(self.repository.find_all().await?)
    }

    /// Sweets matching every supplied filter; no filters lists everything
    pub async fn search(&self, filter: &SweetFilter) -> ApiResult<Vec<Sweet>> {
        if filter.is_empty() {
            return self.list_all().await;
        }

        Ok(self.repository.search(filter).await?)
    }

    pub async fn get_by_id(&self, id: i64) -> ApiResult<Sweet> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::sweet_not_found(id))
    }

    pub async fn create(&self, request: SweetRequest) -> ApiResult<Sweet> {
        let request = validate_sweet_request(request)?;
        let sweet = self.repository.insert(&request).await?;

        info!("Created sweet {} ({})", sweet.id, sweet.name);
        Ok(sweet)
    }

    pub async fn update(&self, id: i64, request: SweetRequest) -> ApiResult<Sweet> {
        let request = validate_sweet_request(request)?;
        let sweet = self
            .repository
            .update(id, &request)
            .await?
            .ok_or_else(|| ApiError::sweet_not_found(id))?;

        info!("Updated sweet {}", id);
        Ok(sweet)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ApiError::sweet_not_found(id));
        }

        info!("Deleted sweet {}", id);
        Ok(())
    }

    /// Sell one unit. Fails with `Conflict` when the sweet is out of stock.
    pub async fn purchase(&self, id: i64) -> ApiResult<Sweet> {
        let sweet = self.get_by_id(id).await?;
        if sweet.quantity <= 0 {
            return Err(out_of_stock());
        }

        // The conditional decrement also covers a concurrent buyer taking
        // the last unit (or deleting the sweet) after the read above.
        if let Some(sweet) = self.repository.decrement_stock(id).await? {
            info!("Purchased sweet {}, {} left", id, sweet.quantity);
            return Ok(sweet);
        }

        match self.repository.find_by_id(id).await? {
            Some(_) => Err(out_of_stock()),
            None => Err(ApiError::sweet_not_found(id)),
        }
    }

    /// Add `amount` units. The caller validates that `amount` is positive.
    pub async fn restock(&self, id: i64, amount: i32) -> ApiResult<Sweet> {
        if amount <= 0 {
            return Err(ApiError::Validation(
                "Quantity must be a positive number".to_string(),
            ));
        }

        let sweet = self.get_by_id(id).await?;
        if sweet.quantity.checked_add(amount).is_none() {
            return Err(stock_overflow());
        }

        // The guarded increment also refuses a concurrent restock that
        // pushed the quantity close to the limit after the read above.
        if let Some(sweet) = self.repository.increment_stock(id, amount).await? {
            info!("Restocked sweet {} by {}, now {}", id, amount, sweet.quantity);
            return Ok(sweet);
        }

        match self.repository.find_by_id(id).await? {
            Some(_) => Err(stock_overflow()),
            None => Err(ApiError::sweet_not_found(id)),
        }
    }
}

fn out_of_stock() -> ApiError {
    ApiError::Conflict("Sweet is out of stock".to_string())
}

fn stock_overflow() -> ApiError {
    ApiError::Validation("Restock would exceed the maximum stock level".to_string())
}
