//! Authentication service: registration, login and admin bootstrap

use std::sync::{Arc, OnceLock};
use tracing::{error, info, warn};

use crate::{
    config::AdminBootstrap,
    error::{ApiError, ApiResult},
    jwt::JwtService,
    models::{AuthResponse, LoginRequest, NewUser, RegisterRequest, Role, User},
    password::{hash_password, verify_password},
    repositories::UserRepository,
    validation::validate_register_request,
};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    repository: Arc<dyn UserRepository>,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(repository: Arc<dyn UserRepository>, jwt_service: JwtService) -> Self {
        Self {
            repository,
            jwt_service,
        }
    }

    /// Register a new USER account and sign it in
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<AuthResponse> {
        let request = validate_register_request(request)?;

        if self.repository.exists_by_username(&request.username).await? {
            return Err(ApiError::Conflict("Username already exists".to_string()));
        }
        if self.repository.exists_by_email(&request.email).await? {
            return Err(ApiError::Conflict("Email already exists".to_string()));
        }

        let user = self
            .create_user(request.username, request.email, &request.password, vec![Role::User])
            .await?;

        info!("Registered user {}", user.username);
        self.respond(&user)
    }

    /// Verify credentials and issue a token
    pub async fn login(&self, request: LoginRequest) -> ApiResult<AuthResponse> {
        let user = self
            .authenticate(request.username.trim(), &request.password)
            .await?
            .ok_or_else(|| {
                warn!("Failed login for {}", request.username);
                ApiError::Unauthorized("Invalid username or password".to_string())
            })?;

        info!("User {} logged in", user.username);
        self.respond(&user)
    }

    /// Create the configured administrator if it does not exist yet.
    ///
    /// Fails when the username already belongs to an account without the
    /// ADMIN role.
    pub async fn ensure_admin(&self, admin: &AdminBootstrap) -> ApiResult<()> {
        if let Some(existing) = self.repository.find_by_username(&admin.username).await? {
            if !existing.is_admin() {
                warn!(
                    "Bootstrap admin username {} belongs to a non-admin account",
                    admin.username
                );
                return Err(ApiError::Conflict(format!(
                    "Username {} is taken by a non-admin account",
                    admin.username
                )));
            }

            info!("Admin account {} already present", admin.username);
            return Ok(());
        }

        let request = validate_register_request(RegisterRequest {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password: admin.password.clone(),
        })?;

        self.create_user(
            request.username,
            request.email,
            &request.password,
            vec![Role::User, Role::Admin],
        )
        .await?;

        info!("Created admin account {}", admin.username);
        Ok(())
    }

    /// Look up the user and check the password; `None` on any mismatch
    async fn authenticate(&self, username: &str, password: &str) -> ApiResult<Option<User>> {
        let Some(user) = self.repository.find_by_username(username).await? else {
            // Unknown usernames still pay for one argon2 verification
            let _ = verify_password(password, dummy_password_hash());
            return Ok(None);
        };

        let valid = verify_password(password, &user.password_hash).map_err(|e| {
            error!("Stored password hash for {} is unreadable: {}", username, e);
            ApiError::InternalServerError
        })?;

        Ok(valid.then_some(user))
    }

    async fn create_user(
        &self,
        username: String,
        email: String,
        password: &str,
        roles: Vec<Role>,
    ) -> ApiResult<User> {
        let password_hash = hash_password(password).map_err(|e| {
            error!("{}", e);
            ApiError::InternalServerError
        })?;

        let user = self
            .repository
            .insert(&NewUser {
                username,
                email,
                password_hash,
                roles,
            })
            .await?;

        Ok(user)
    }

    fn respond(&self, user: &User) -> ApiResult<AuthResponse> {
        let token = self.jwt_service.issue(user).map_err(|e| {
            error!("Failed to issue token: {}", e);
            ApiError::InternalServerError
        })?;

        Ok(AuthResponse::new(token, user))
    }
}

/// Hash verified for unknown usernames
fn dummy_password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password("no-such-user-password").unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{jwt::JwtConfig, repositories::InMemoryUserRepository};

    const SECRET: &str = "test-secret-with-at-least-32-bytes!!";

    fn setup() -> (AuthService, InMemoryUserRepository, JwtService) {
        let repository = InMemoryUserRepository::new();
        let jwt_service = JwtService::new(JwtConfig::with_secret(SECRET, 3600)).unwrap();
        let service = AuthService::new(Arc::new(repository.clone()), jwt_service.clone());
        (service, repository, jwt_service)
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let (service, repository, jwt_service) = setup();

        let response = service.register(register_request()).await.unwrap();
        assert_eq!(response.username, "testuser");
        assert_eq!(response.email, "test@example.com");
        assert!(!response.is_admin);

        let claims = jwt_service.verify(&response.token).unwrap();
        assert_eq!(claims.sub, "testuser");
        assert_eq!(claims.roles(), vec![Role::User]);

        let stored = repository.find_by_username("testuser").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "password123");
        assert_eq!(stored.roles, vec![Role::User]);
    }

    #[tokio::test]
    async fn test_register_username_exists() {
        let (service, repository, _) = setup();
        service.register(register_request()).await.unwrap();

        let mut second = register_request();
        second.email = "other@example.com".to_string();

        match service.register(second).await {
            Err(ApiError::Conflict(message)) => assert_eq!(message, "Username already exists"),
            other => panic!("expected conflict, got {:?}", other),
        }
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_register_email_exists() {
        let (service, repository, _) = setup();
        service.register(register_request()).await.unwrap();

        let mut second = register_request();
        second.username = "otheruser".to_string();

        match service.register(second).await {
            Err(ApiError::Conflict(message)) => assert_eq!(message, "Email already exists"),
            other => panic!("expected conflict, got {:?}", other),
        }
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let (service, repository, _) = setup();
        let mut request = register_request();
        request.password = "123".to_string();

        assert!(matches!(
            service.register(request).await,
            Err(ApiError::Validation(_))
        ));
        assert!(repository.is_empty().await);
    }

    #[tokio::test]
    async fn test_login_success() {
        let (service, _, jwt_service) = setup();
        service.register(register_request()).await.unwrap();

        let response = service
            .login(LoginRequest {
                username: "testuser".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.username, "testuser");
        assert!(jwt_service.verify(&response.token).is_ok());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let (service, _, _) = setup();
        service.register(register_request()).await.unwrap();

        let wrong_password = service
            .login(LoginRequest {
                username: "testuser".to_string(),
                password: "wrong-password".to_string(),
            })
            .await;
        assert!(matches!(wrong_password, Err(ApiError::Unauthorized(_))));

        let unknown_user = service
            .login(LoginRequest {
                username: "nobody".to_string(),
                password: "password123".to_string(),
            })
            .await;
        assert!(matches!(unknown_user, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let (service, repository, _) = setup();
        let admin = AdminBootstrap {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "admin-password".to_string(),
        };

        service.ensure_admin(&admin).await.unwrap();
        service.ensure_admin(&admin).await.unwrap();
        assert_eq!(repository.len().await, 1);

        let response = service
            .login(LoginRequest {
                username: "admin".to_string(),
                password: "admin-password".to_string(),
            })
            .await
            .unwrap();
        assert!(response.is_admin);
    }

    #[tokio::test]
    async fn test_ensure_admin_refuses_a_taken_username() {
        let (service, repository, _) = setup();
        service
            .register(RegisterRequest {
                username: "admin".to_string(),
                email: "squatter@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        let admin = AdminBootstrap {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "admin-password".to_string(),
        };
        assert!(matches!(
            service.ensure_admin(&admin).await,
            Err(ApiError::Conflict(_))
        ));

        let stored = repository.find_by_username("admin").await.unwrap().unwrap();
        assert!(!stored.is_admin());
        assert_eq!(repository.len().await, 1);
    }

    #[test]
    fn test_dummy_hash_rejects_every_password() {
        let hash = dummy_password_hash();
        assert!(hash.starts_with("$argon2"));
        assert!(!verify_password("password123", hash).unwrap());
        assert!(!verify_password("", hash).unwrap());
    }
}
