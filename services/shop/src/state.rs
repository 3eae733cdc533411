//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    jwt::JwtService,
    repositories::{SweetRepository, UserRepository},
    services::{AuthService, SweetService},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sweet_service: SweetService,
    pub auth_service: AuthService,
    pub jwt_service: JwtService,
}

impl AppState {
    /// Wire services on top of the given repositories
    pub fn new(
        sweets: Arc<dyn SweetRepository>,
        users: Arc<dyn UserRepository>,
        jwt_service: JwtService,
    ) -> Self {
        Self {
            sweet_service: SweetService::new(sweets),
            auth_service: AuthService::new(users, jwt_service.clone()),
            jwt_service,
        }
    }
}
