use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    LoginRequestDto, LoginResponseDto, MeResponseDto, RegisterRequestDto, RegisterResponseDto,
};
use crate::features::auth::jwt::JwtService;
use crate::features::auth::model::{AuthenticatedUser, User, UserRole, USER_COLUMNS};
use crate::features::auth::password::{hash_password, verify_password};

/// Service for account operations (register, login, me)
pub struct AuthService {
    pool: PgPool,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtService>) -> Self {
        Self { pool, jwt }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find user by email: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Fetch a user by id
    pub async fn find_by_id(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find user by id: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Register a new account
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<RegisterResponseDto> {
        let role: UserRole = dto
            .role
            .parse()
            .map_err(|_| AppError::Validation("Invalid role".to_string()))?;

        if self.find_by_email(&dto.email).await?.is_some() {
            return Err(AppError::BadRequest("User already exists".to_string()));
        }

        let password_hash = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(&dto.name)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
        .map_err(|e| {
            // Lost a race against a concurrent registration with the same email
            if e.is_unique_violation() {
                AppError::BadRequest("User already exists".to_string())
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                e
            }
        })?;

        tracing::info!("User registered: id={}, role={}", user.id, user.role);

        Ok(RegisterResponseDto {
            message: "User registered".to_string(),
            user: user.into(),
        })
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<LoginResponseDto> {
        let user = self
            .find_by_email(&dto.email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !verify_password(&dto.password, &user.password_hash)? {
            tracing::debug!("Password mismatch for user {}", user.id);
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = self.jwt.issue(&user)?;

        Ok(LoginResponseDto {
            token,
            role: user.role,
            expires_in: self.jwt.expires_in(),
        })
    }

    /// Resolve the account behind a verified token
    pub async fn get_current_user(&self, user: &AuthenticatedUser) -> Result<MeResponseDto> {
        let user = self.find_by_id(user.id).await?;
        Ok(MeResponseDto { user: user.into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{create_worker_user, test_config};

    fn service(pool: PgPool) -> AuthService {
        AuthService::new(pool, Arc::new(JwtService::new(test_config().jwt)))
    }

    fn register_dto(email: &str, password: &str, role: &str) -> RegisterRequestDto {
        RegisterRequestDto {
            email: email.to_string(),
            password: password.to_string(),
            name: Some("Dina".to_string()),
            role: role.to_string(),
        }
    }

    fn login_dto(email: &str, password: &str) -> LoginRequestDto {
        LoginRequestDto {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_registration_is_rejected(pool: PgPool) -> anyhow::Result<()> {
        let auth = service(pool);

        let registered = auth
            .register(register_dto("dina@example.com", "secret1", "worker"))
            .await?;
        assert_eq!(registered.user.role, UserRole::Worker);

        let again = auth
            .register(register_dto("dina@example.com", "other", "user"))
            .await;
        assert!(matches!(again, Err(AppError::BadRequest(ref m)) if m == "User already exists"));
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_invalid_role_is_validation_error(pool: PgPool) -> anyhow::Result<()> {
        let auth = service(pool);

        let result = auth
            .register(register_dto("dina@example.com", "secret1", "superuser"))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_login_failures(pool: PgPool) -> anyhow::Result<()> {
        let auth = service(pool);
        auth.register(register_dto("dina@example.com", "secret1", "user"))
            .await?;

        let wrong_password = auth.login(login_dto("dina@example.com", "secret2")).await;
        assert!(matches!(wrong_password, Err(AppError::Unauthorized(_))));

        let unknown = auth.login(login_dto("nobody@example.com", "secret1")).await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_login_token_carries_identity(pool: PgPool) -> anyhow::Result<()> {
        let auth = service(pool);
        let registered = auth
            .register(register_dto("admin@example.com", "secret1", "admin"))
            .await?;

        let login = auth
            .login(login_dto("admin@example.com", "secret1"))
            .await?;
        assert_eq!(login.role, UserRole::Admin);
        assert_eq!(login.expires_in, 3600);

        let identity = JwtService::new(test_config().jwt).validate_token(&login.token)?;
        assert_eq!(identity.id, registered.user.id);
        assert_eq!(identity.email, "admin@example.com");
        assert_eq!(identity.role, UserRole::Admin);

        let me = auth.get_current_user(&identity).await?;
        assert_eq!(me.user.id, registered.user.id);
        assert_eq!(me.user.name.as_deref(), Some("Dina"));
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_current_user_for_deleted_account(pool: PgPool) -> anyhow::Result<()> {
        let auth = service(pool);

        let result = auth.get_current_user(&create_worker_user()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        Ok(())
    }
}
