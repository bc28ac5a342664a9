//! Accounts and sessions
//!
//! A bearer token is resolved to a [`SessionContext`] once and kept in a
//! moka cache, so guarded routes do not hit the database on every request.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use moka::future::Cache;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entities::{password_resets, prelude::*, profiles, sessions};
use crate::error::ServiceError;
use crate::models::auth::{
    ForgotPasswordResponse, ProfileResponse, ResetPasswordRequest, SessionResponse,
    SignInRequest, SignUpRequest, UpdateProfileRequest,
};
use crate::services::password::{generate_token, hash_password, hash_token, verify_password};

const SESSION_CACHE_TTL: Duration = Duration::from_secs(300);
const SESSION_CACHE_CAPACITY: u64 = 10_000;
const RESET_TOKEN_TTL_MINUTES: i64 = 60;
const BAD_CREDENTIALS: &str = "Invalid email or password";

/// Who is calling, resolved from the bearer token
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub email: String,
    pub is_admin: bool,
    pub expires_at: DateTime<FixedOffset>,
}

#[derive(Clone)]
pub struct AuthService {
    session_ttl: chrono::Duration,
    sessions: Cache<String, SessionContext>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

impl AuthService {
    pub fn new(session_ttl_hours: i64) -> Self {
        let sessions = Cache::builder()
            .max_capacity(SESSION_CACHE_CAPACITY)
            .time_to_live(SESSION_CACHE_TTL)
            .build();
        Self {
            session_ttl: chrono::Duration::hours(session_ttl_hours),
            sessions,
        }
    }

    pub async fn sign_up(
        &self,
        db: &DatabaseConnection,
        req: SignUpRequest,
    ) -> Result<SessionResponse, ServiceError> {
        req.validate()?;
        let email = normalize_email(&req.email);

        let existing = Profiles::find()
            .filter(profiles::Column::Email.eq(&email))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let now = now();
        let profile = profiles::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(hash_password(&req.password)?),
            full_name: Set(req.full_name.trim().to_string()),
            phone: Set(req.phone.filter(|p| !p.trim().is_empty())),
            professional_type: Set(req.professional_type),
            is_admin: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!(user_id = %profile.id, "Account created");
        self.start_session(db, profile).await
    }

    pub async fn sign_in(
        &self,
        db: &DatabaseConnection,
        req: SignInRequest,
    ) -> Result<SessionResponse, ServiceError> {
        let email = normalize_email(&req.email);
        let profile = Profiles::find()
            .filter(profiles::Column::Email.eq(&email))
            .one(db)
            .await?;

        let Some(profile) = profile else {
            warn!("Sign-in for unknown email");
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };
        if !verify_password(&req.password, &profile.password_hash)? {
            warn!(user_id = %profile.id, "Sign-in with wrong password");
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        self.start_session(db, profile).await
    }

    async fn start_session(
        &self,
        db: &DatabaseConnection,
        profile: profiles::Model,
    ) -> Result<SessionResponse, ServiceError> {
        let token = generate_token();
        let now = now();
        let session = sessions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(profile.id),
            token_hash: Set(hash_token(&token)),
            expires_at: Set(now + self.session_ttl),
            created_at: Set(now),
        }
        .insert(db)
        .await?;

        info!(user_id = %profile.id, "Session started");
        Ok(SessionResponse {
            token,
            expires_at: session.expires_at,
            user: ProfileResponse::from(profile),
        })
    }

    pub async fn sign_out(&self, db: &DatabaseConnection, token: &str) -> Result<(), ServiceError> {
        let token_hash = hash_token(token);
        Sessions::delete_many()
            .filter(sessions::Column::TokenHash.eq(&token_hash))
            .exec(db)
            .await?;
        self.sessions.invalidate(&token_hash).await;
        Ok(())
    }

    /// Resolve a bearer token, consulting the cache first.
    pub async fn resolve(
        &self,
        db: &DatabaseConnection,
        token: &str,
    ) -> Result<SessionContext, ServiceError> {
        let token_hash = hash_token(token);

        if let Some(ctx) = self.sessions.get(&token_hash).await {
            if ctx.expires_at > now() {
                debug!(user_id = %ctx.user_id, "Session cache hit");
                return Ok(ctx);
            }
            self.sessions.invalidate(&token_hash).await;
        }

        let session = Sessions::find()
            .filter(sessions::Column::TokenHash.eq(&token_hash))
            .one(db)
            .await?
            .filter(|s| s.expires_at > now())
            .ok_or_else(|| ServiceError::Unauthorized("Session expired or invalid".to_string()))?;

        let profile = Profiles::find_by_id(session.user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Session expired or invalid".to_string()))?;

        let ctx = SessionContext {
            user_id: profile.id,
            email: profile.email,
            is_admin: profile.is_admin,
            expires_at: session.expires_at,
        };
        self.sessions.insert(token_hash, ctx.clone()).await;
        Ok(ctx)
    }

    /// Always succeeds so callers cannot learn which e-mails have accounts.
    pub async fn forgot_password(
        &self,
        db: &DatabaseConnection,
        email: &str,
        expose_token: bool,
    ) -> Result<ForgotPasswordResponse, ServiceError> {
        let email = normalize_email(email);
        let profile = Profiles::find()
            .filter(profiles::Column::Email.eq(&email))
            .one(db)
            .await?;

        let Some(profile) = profile else {
            return Ok(ForgotPasswordResponse {
                accepted: true,
                reset_token: None,
            });
        };

        let token = generate_token();
        let now = now();
        password_resets::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(profile.id),
            token_hash: Set(hash_token(&token)),
            expires_at: Set(now + chrono::Duration::minutes(RESET_TOKEN_TTL_MINUTES)),
            used_at: Set(None),
            created_at: Set(now),
        }
        .insert(db)
        .await?;

        info!(user_id = %profile.id, "Password reset requested");
        Ok(ForgotPasswordResponse {
            accepted: true,
            reset_token: expose_token.then_some(token),
        })
    }

    /// Set a new password and sign the user out everywhere.
    pub async fn reset_password(
        &self,
        db: &DatabaseConnection,
        req: ResetPasswordRequest,
    ) -> Result<(), ServiceError> {
        req.validate()?;

        let reset = PasswordResets::find()
            .filter(password_resets::Column::TokenHash.eq(hash_token(req.token.trim())))
            .filter(password_resets::Column::UsedAt.is_null())
            .one(db)
            .await?
            .filter(|r| r.expires_at > now())
            .ok_or_else(|| ServiceError::Unauthorized("Reset link is invalid or has expired".to_string()))?;

        let profile = Profiles::find_by_id(reset.user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Account".to_string()))?;

        let password_hash = hash_password(&req.password)?;
        let user_id = profile.id;

        let txn = db.begin().await?;
        let mut active = profile.into_active_model();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(now());
        active.update(&txn).await?;

        let mut reset = reset.into_active_model();
        reset.used_at = Set(Some(now()));
        reset.update(&txn).await?;

        let revoked = Sessions::delete_many()
            .filter(sessions::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        self.sessions.invalidate_all();

        info!(user_id = %user_id, sessions_revoked = revoked.rows_affected, "Password reset");
        Ok(())
    }

    pub async fn profile(
        &self,
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> Result<ProfileResponse, ServiceError> {
        Profiles::find_by_id(user_id)
            .one(db)
            .await?
            .map(ProfileResponse::from)
            .ok_or_else(|| ServiceError::NotFound("Profile".to_string()))
    }

    pub async fn update_profile(
        &self,
        db: &DatabaseConnection,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<ProfileResponse, ServiceError> {
        req.validate()?;
        let profile = Profiles::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Profile".to_string()))?;

        let mut active = profile.into_active_model();
        if let Some(name) = req.full_name {
            active.full_name = Set(name.trim().to_string());
        }
        if let Some(phone) = req.phone {
            active.phone = Set(Some(phone).filter(|p| !p.trim().is_empty()));
        }
        if let Some(kind) = req.professional_type {
            active.professional_type = Set(Some(kind));
        }
        active.updated_at = Set(now());

        let updated = active.update(db).await?;
        Ok(ProfileResponse::from(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn profile(is_admin: bool) -> profiles::Model {
        let now = now();
        profiles::Model {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            password_hash: hash_password("correct-horse").unwrap(),
            full_name: "Jane Doe".to_string(),
            phone: None,
            professional_type: Some("advisor".to_string()),
            is_admin,
            created_at: now,
            updated_at: now,
        }
    }

    fn session_for(profile: &profiles::Model, token: &str, ttl: chrono::Duration) -> sessions::Model {
        sessions::Model {
            id: Uuid::new_v4(),
            user_id: profile.id,
            token_hash: hash_token(token),
            expires_at: now() + ttl,
            created_at: now(),
        }
    }

    #[tokio::test]
    async fn test_resolve_caches_session() {
        let user = profile(true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![session_for(&user, "tok", chrono::Duration::hours(1))]])
            .append_query_results([vec![user.clone()]])
            .into_connection();
        let auth = AuthService::new(168);

        let ctx = auth.resolve(&db, "tok").await.unwrap();
        assert_eq!(ctx.user_id, user.id);
        assert!(ctx.is_admin);

        // Served from cache; the mock has no further results queued
        let again = auth.resolve(&db, "tok").await.unwrap();
        assert_eq!(again, ctx);
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let user = profile(false);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![session_for(&user, "old", chrono::Duration::hours(-1))]])
            .into_connection();
        let auth = AuthService::new(168);

        let err = auth.resolve(&db, "old").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_sign_in_same_message_for_unknown_and_wrong_password() {
        let user = profile(false);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<profiles::Model>::new()])
            .append_query_results([vec![user]])
            .into_connection();
        let auth = AuthService::new(168);

        let unknown = auth
            .sign_in(
                &db,
                SignInRequest {
                    email: "ghost@example.com".to_string(),
                    password: "whatever1".to_string(),
                },
            )
            .await
            .unwrap_err();
        let wrong = auth
            .sign_in(
                &db,
                SignInRequest {
                    email: "jane@example.com".to_string(),
                    password: "not-the-password".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(wrong, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email_is_accepted() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<profiles::Model>::new()])
            .into_connection();
        let auth = AuthService::new(168);

        let res = auth.forgot_password(&db, "ghost@example.com", true).await.unwrap();
        assert!(res.accepted);
        assert!(res.reset_token.is_none());
    }

    #[tokio::test]
    async fn test_reset_password_writes_in_one_transaction() {
        let user = profile(false);
        let reset = password_resets::Model {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_hash: hash_token("reset-token"),
            expires_at: now() + chrono::Duration::minutes(30),
            used_at: None,
            created_at: now(),
        };
        let mut spent = reset.clone();
        spent.used_at = Some(now());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![reset]])
            .append_query_results([vec![user.clone()]])
            .append_query_results([vec![user.clone()]])
            .append_query_results([vec![spent]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();
        let auth = AuthService::new(168);

        auth.reset_password(
            &db,
            ResetPasswordRequest {
                token: "reset-token".to_string(),
                password: "new-password-123".to_string(),
            },
        )
        .await
        .unwrap();

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 3);
        let statements = log[2].statements();
        assert_eq!(statements.len(), 5);
        assert_eq!(statements[0].sql, "BEGIN");
        assert!(statements[1].sql.starts_with(r#"UPDATE "profiles""#));
        assert!(statements[2].sql.starts_with(r#"UPDATE "password_resets""#));
        assert!(statements[3].sql.starts_with(r#"DELETE FROM "sessions""#));
        assert_eq!(statements[4].sql, "COMMIT");
    }
}
