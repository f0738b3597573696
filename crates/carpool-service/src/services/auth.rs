//! Authentication service
//!
//! Handles registration, login, and token refresh.

use carpool_common::auth::validate_password_strength;
use carpool_common::AppError;
use carpool_core::entities::{User, UserKind, Vehicle};
use carpool_core::DomainError;
use tracing::{info, instrument, warn};

use crate::dto::{
    AuthResponse, CurrentUserResponse, LoginRequest, RefreshTokenRequest, RegisterRequest,
    UserTypeRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

fn required_field(value: Option<&String>, message: &str) -> ServiceResult<String> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ServiceError::validation(message)),
    }
}

/// Build the user variant from the registration form
fn user_kind(request: &RegisterRequest) -> ServiceResult<UserKind> {
    match request.user_type {
        UserTypeRequest::Student => Ok(UserKind::Student {
            student_number: required_field(
                request.student_number.as_ref(),
                "Student number is required for students",
            )?,
        }),
        UserTypeRequest::Academician => Ok(UserKind::Academician {
            title: required_field(request.title.as_ref(), "Title is required for academicians")?,
            department: request
                .department
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        }),
    }
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new student or academician, with their vehicle if they drive
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse> {
        validate_password_strength(&request.password)?;
        let kind = user_kind(&request)?;

        let email = request.email.trim().to_lowercase();
        if self.ctx.user_repo().email_exists(&email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }

        let password_hash = self.ctx.password_service().hash(&request.password)?;

        let user = User::new(
            self.ctx.generate_id(),
            request.first_name.trim().to_string(),
            request.last_name.trim().to_string(),
            email,
            request.phone_number.trim().to_string(),
            kind,
        );
        self.ctx.user_repo().create(&user, &password_hash).await?;

        if let (true, Some(vehicle)) = (request.is_driver, request.vehicle.as_ref()) {
            let vehicle = Vehicle::new(
                self.ctx.generate_id(),
                user.id,
                vehicle.plate_number.trim().to_uppercase(),
                vehicle.model.trim().to_string(),
                vehicle.color.trim().to_string(),
            );
            self.ctx.vehicle_repo().create(&vehicle).await?;
        }

        info!(user_id = %user.id, user_type = user.kind.as_str(), "User registered successfully");

        self.issue_tokens(&user)
    }

    /// Login with email and password
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        let user = self
            .ctx
            .user_repo()
            .find_by_email(request.email.trim())
            .await?
            .ok_or_else(|| {
                warn!("Login failed: user not found");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user.id, "Login failed: no password hash");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        if let Err(e) = self
            .ctx
            .password_service()
            .verify_or_error(&request.password, &password_hash)
        {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(e.into());
        }

        info!(user_id = %user.id, "User logged in successfully");

        self.issue_tokens(&user)
    }

    /// Exchange a refresh token for a new token pair
    #[instrument(skip(self, request))]
    pub async fn refresh_tokens(&self, request: RefreshTokenRequest) -> ServiceResult<AuthResponse> {
        let user_id = self
            .ctx
            .jwt_service()
            .decode_token(&request.refresh_token)?
            .user_id()?;

        // A token for a deleted account is no longer valid
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidToken))?;

        let pair = self.ctx.jwt_service().refresh_tokens(&request.refresh_token)?;

        info!(user_id = %user.id, "Tokens refreshed successfully");

        Ok(AuthResponse::new(
            pair.access_token,
            pair.refresh_token,
            pair.expires_in,
            CurrentUserResponse::from(&user),
        ))
    }

    fn issue_tokens(&self, user: &User) -> ServiceResult<AuthResponse> {
        let pair = self.ctx.jwt_service().generate_token_pair(user.id)?;

        Ok(AuthResponse::new(
            pair.access_token,
            pair.refresh_token,
            pair.expires_in,
            CurrentUserResponse::from(user),
        ))
    }
}
