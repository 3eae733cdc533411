//! Domain services

pub mod auth;
pub mod sweet;

pub use auth::AuthService;
pub use sweet::SweetService;
