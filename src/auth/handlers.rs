use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::extractor::AuthenticatedUser;
use crate::auth::password::MAX_PASSWORD_BYTES;
use crate::db::{Account, Role};
use crate::error::AppError;
use crate::AppState;

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "username must be between 1 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

impl RegisterRequest {
    fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        if self.password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::ValidationError(format!(
                "password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        Ok(())
    }
}

/// Form fields of the OAuth2 password grant.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role: Role,
}

/// Public view of an account. Never includes the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            role: account.role,
            created_at: account.created_at,
        }
    }
}

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received registration request for username: {}", req.username);
    req.check()?;

    match state.auth.register(&req.username, &req.email, &req.password).await {
        Ok(account) => Ok(HttpResponse::Created().json(AccountResponse::from(account))),
        Err(e) => {
            warn!("Registration failed for username: {}: {}", req.username, e);
            Err(e)
        }
    }
}

pub async fn login(
    form: web::Form<LoginForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received login request for username: {}", form.username);
    match state.auth.authenticate(&form.username, &form.password).await {
        Ok(account) => {
            let token = state.auth.issue_token(&account)?;
            info!("Login successful for username: {}", form.username);
            Ok(HttpResponse::Ok().json(token))
        }
        Err(e) => {
            warn!("Login failed for username: {}: {}", form.username, e);
            Err(e)
        }
    }
}

pub async fn me(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let account = state.auth.current_account(&user).await?;
    Ok(HttpResponse::Ok().json(AccountResponse::from(account)))
}

pub async fn assign_role(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<AssignRoleRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let target = path.into_inner();
    let account = state.auth.assign_role(&user, target, req.role).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Role assigned to user {}", account.id),
        "user": AccountResponse::from(account),
    })))
}
