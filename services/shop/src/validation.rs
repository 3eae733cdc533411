//! Input validation utilities
//!
//! Every check returns the message of the first violated constraint.
//! The `validate_*_request` helpers wrap those messages in
//! [`ApiError::Validation`] and hand back a normalised payload.

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

use crate::{
    error::{ApiError, ApiResult},
    models::{RegisterRequest, SweetRequest},
};

/// Largest price a `NUMERIC(10, 2)` column holds
const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > 50 {
        return Err("Username must be at most 50 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err(
            "Username can only contain letters, numbers, dots, dashes and underscores".to_string(),
        );
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

fn validate_required(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }

    if value.len() > 255 {
        return Err(format!("{} must be at most 255 characters long", field));
    }

    Ok(())
}

/// Validate price
pub fn validate_price(price: Decimal) -> Result<(), String> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err("Price must be positive".to_string());
    }

    if price.round_dp(2) > MAX_PRICE {
        return Err(format!("Price must be at most {}", MAX_PRICE));
    }

    Ok(())
}

/// Validate stock quantity
pub fn validate_quantity(quantity: i32) -> Result<(), String> {
    if quantity < 0 {
        return Err("Quantity cannot be negative".to_string());
    }

    Ok(())
}

/// Validate a catalog create/update payload.
///
/// Name and category come back trimmed and the price rounded to cents.
pub fn validate_sweet_request(request: SweetRequest) -> ApiResult<SweetRequest> {
    validate_required(&request.name, "Name")
        .and_then(|_| validate_required(&request.category, "Category"))
        .and_then(|_| validate_price(request.price))
        .and_then(|_| validate_quantity(request.quantity))
        .map_err(ApiError::Validation)?;

    Ok(SweetRequest {
        name: request.name.trim().to_string(),
        category: request.category.trim().to_string(),
        price: request.price.round_dp(2),
        quantity: request.quantity,
    })
}

/// Validate a restock amount, which must be present and positive
pub fn validate_restock_amount(amount: Option<i64>) -> ApiResult<i32> {
    match amount {
        Some(amount) if amount > 0 => i32::try_from(amount)
            .map_err(|_| ApiError::Validation("Quantity is too large".to_string())),
        _ => Err(ApiError::Validation(
            "Quantity must be a positive number".to_string(),
        )),
    }
}

/// Validate a registration payload
pub fn validate_register_request(request: RegisterRequest) -> ApiResult<RegisterRequest> {
    let request = RegisterRequest {
        username: request.username.trim().to_string(),
        email: request.email.trim().to_string(),
        password: request.password,
    };

    validate_username(&request.username)
        .and_then(|_| validate_email(&request.email))
        .and_then(|_| validate_password(&request.password))
        .map_err(ApiError::Validation)?;

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweet(name: &str, category: &str, price: Decimal, quantity: i32) -> SweetRequest {
        SweetRequest {
            name: name.to_string(),
            category: category.to_string(),
            price,
            quantity,
        }
    }

    #[test]
    fn test_valid_username() {
        assert!(validate_username("sweet_tooth").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_valid_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert_eq!(validate_email(""), Err("Email is required".to_string()));
        assert_eq!(validate_email("user@"), Err("Invalid email format".to_string()));
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_sweet_request_is_normalised() {
        let request = validate_sweet_request(sweet(
            "  Chocolate Bar ",
            "Chocolate",
            Decimal::new(5999, 3),
            10,
        ))
        .unwrap();

        assert_eq!(request.name, "Chocolate Bar");
        assert_eq!(request.price, Decimal::new(600, 2));
    }

    #[test]
    fn test_sweet_request_reports_first_violation() {
        let err = validate_sweet_request(sweet(" ", "", Decimal::NEGATIVE_ONE, -1)).unwrap_err();
        assert_eq!(err.to_string(), "Name is required");

        let err = validate_sweet_request(sweet("Fudge", "", Decimal::ONE, 1)).unwrap_err();
        assert_eq!(err.to_string(), "Category is required");

        let err = validate_sweet_request(sweet("Fudge", "Toffee", Decimal::NEGATIVE_ONE, 1))
            .unwrap_err();
        assert_eq!(err.to_string(), "Price must be positive");

        let err = validate_sweet_request(sweet("Fudge", "Toffee", Decimal::ONE, -1)).unwrap_err();
        assert_eq!(err.to_string(), "Quantity cannot be negative");
    }

    #[test]
    fn test_zero_price_and_quantity_are_allowed() {
        assert!(validate_sweet_request(sweet("Sample", "Free", Decimal::ZERO, 0)).is_ok());
    }

    #[test]
    fn test_price_upper_bound() {
        assert!(validate_price(MAX_PRICE).is_ok());
        assert!(validate_price(MAX_PRICE + Decimal::new(1, 2)).is_err());
    }

    #[test]
    fn test_restock_amount() {
        assert_eq!(validate_restock_amount(Some(15)).unwrap(), 15);
        assert!(matches!(validate_restock_amount(None), Err(ApiError::Validation(_))));
        assert!(matches!(validate_restock_amount(Some(0)), Err(ApiError::Validation(_))));
        assert!(matches!(validate_restock_amount(Some(-4)), Err(ApiError::Validation(_))));
        assert!(matches!(
            validate_restock_amount(Some(i64::from(i32::MAX) + 1)),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_register_request_is_trimmed() {
        let request = validate_register_request(RegisterRequest {
            username: " alice ".to_string(),
            email: "alice@example.com ".to_string(),
            password: "secret1".to_string(),
        })
        .unwrap();

        assert_eq!(request.username, "alice");
        assert_eq!(request.email, "alice@example.com");
    }
}
