//! Shop models for storage records and API payloads

pub mod sweet;
pub mod user;

// Re-export for convenience
pub use sweet::{RestockRequest, SearchQuery, Sweet, SweetFilter, SweetRequest};
pub use user::{AuthResponse, LoginRequest, NewUser, RegisterRequest, Role, User};
