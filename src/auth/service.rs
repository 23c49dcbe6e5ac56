use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password_blocking, verify_password_blocking, MAX_PASSWORD_BYTES};
use crate::config::Settings;
use crate::db::{Account, NewAccount, Repository, Role};
use crate::error::{AppError, AuthError};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Username
    pub uid: Uuid,    // Account ID
    pub role: Role,
    pub iat: i64,     // Issued at
    pub exp: i64,     // Expiration time
}

/// Token payload returned by `/token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

/// Caller identity resolved from a verified bearer token.
///
/// `role` is the role at issue time and is informational only. Authorization
/// decisions re-read the account (see [`AuthService::require_admin`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: Uuid,
    pub username: String,
    pub role: Role,
}

pub struct AuthService {
    repo: Arc<dyn Repository>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    bcrypt_cost: u32,
    admin_username: Option<String>,
    // Hash checked against when the username is unknown, so both failure paths pay for bcrypt.
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn Repository>, jwt_secret: &str, token_ttl: Duration, bcrypt_cost: u32) -> Self {
        Self {
            repo,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_ttl,
            bcrypt_cost,
            admin_username: None,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn from_settings(repo: Arc<dyn Repository>, settings: &Settings) -> Self {
        let mut service = Self::new(
            repo,
            &settings.auth.jwt_secret,
            settings.token_ttl(),
            settings.auth.bcrypt_cost,
        );
        service.admin_username = settings.auth.admin_username.clone();
        service
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<Account, AppError> {
        let password_hash = hash_password_blocking(password.to_string(), self.bcrypt_cost).await?;
        let role = match &self.admin_username {
            Some(admin) if admin == username => Role::Admin,
            _ => Role::User,
        };

        let account = self
            .repo
            .create_account(NewAccount {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            })
            .await?;

        info!("Registered account {} ({}) with role {}", account.username, account.id, account.role);
        Ok(account)
    }

    /// Verifies credentials. Unknown usernames, wrong passwords and passwords
    /// longer than bcrypt can hash all fail identically and cost one bcrypt check.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Account, AppError> {
        let account = self.repo.find_account_by_username(username).await?;

        let hash = match &account {
            Some(account) => account.password_hash.clone(),
            None => self.fallback_hash().await?.to_string(),
        };
        let matched = verify_password_blocking(password.to_string(), hash).await?;

        match account {
            None => {
                debug!("Login rejected: no account named {}", username);
                Err(AuthError::InvalidCredentials.into())
            }
            Some(_) if password.len() > MAX_PASSWORD_BYTES => {
                debug!("Login rejected: oversized password for {}", username);
                Err(AuthError::InvalidCredentials.into())
            }
            Some(_) if !matched => {
                debug!("Login rejected: password mismatch for {}", username);
                Err(AuthError::InvalidCredentials.into())
            }
            Some(account) => Ok(account),
        }
    }

    async fn fallback_hash(&self) -> Result<&str, AppError> {
        let cost = self.bcrypt_cost;
        let hash = self
            .dummy_hash
            .get_or_try_init(|| hash_password_blocking(Uuid::new_v4().to_string(), cost))
            .await?;
        Ok(hash.as_str())
    }

    pub fn issue_token(&self, account: &Account) -> Result<AccessToken, AppError> {
        self.issue_token_at(account, Utc::now())
    }

    pub fn issue_token_at(&self, account: &Account, issued_at: DateTime<Utc>) -> Result<AccessToken, AppError> {
        let claims = Claims {
            sub: account.username.clone(),
            uid: account.id,
            role: account.role,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.token_ttl).timestamp(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("token encoding failed: {}", e)))?;

        Ok(AccessToken {
            access_token,
            token_type: "bearer".to_string(),
        })
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                AuthError::Unauthenticated
            })?
            .claims;

        if claims.exp <= Utc::now().timestamp() {
            debug!("Token rejected: expired at {}", claims.exp);
            return Err(AuthError::Unauthenticated.into());
        }
        if claims.sub.is_empty() {
            debug!("Token rejected: empty subject");
            return Err(AuthError::Unauthenticated.into());
        }

        Ok(claims)
    }

    /// Resolves the caller behind a bearer token. Every failure is `Unauthenticated`.
    pub fn verify_token(&self, token: &str) -> Result<Identity, AppError> {
        let claims = self.decode_token(token)?;
        Ok(Identity {
            account_id: claims.uid,
            username: claims.sub,
            role: claims.role,
        })
    }

    pub async fn current_account(&self, identity: &Identity) -> Result<Account, AppError> {
        self.repo
            .find_account_by_id(identity.account_id)
            .await?
            .ok_or_else(|| AuthError::Unauthenticated.into())
    }

    /// Re-reads the caller's account so a revoked role takes effect before the token expires.
    pub async fn require_admin(&self, identity: &Identity) -> Result<Account, AppError> {
        let account = self.current_account(identity).await?;
        if !account.is_admin() {
            warn!("Account {} attempted an admin action", account.username);
            return Err(AuthError::Forbidden.into());
        }
        Ok(account)
    }

    pub async fn assign_role(&self, caller: &Identity, target: Uuid, role: Role) -> Result<Account, AppError> {
        let admin = self.require_admin(caller).await?;
        let account = self
            .repo
            .set_account_role(target, role)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        info!("{} assigned role {} to account {}", admin.username, role, account.id);
        Ok(account)
    }
}
