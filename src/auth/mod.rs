//! Request guards standing in for the database's row-level policies.
//!
//! Machine-to-machine calls from the voice vendor carry a shared secret;
//! dashboard calls carry a bearer session. A bearer caller only reaches rows
//! of clinics it holds an active membership in, with a role that permits
//! the action.

pub mod policy;

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use blake2::{Blake2b, Digest};
use chrono::Utc;
use diesel::prelude::*;
use futures_util::future::LocalBoxFuture;

use crate::{
    config::Settings,
    database::{self, DbPool},
    error::ApiError,
    models::{account_sessions::AccountSession, clinic_users::ClinicUser},
};

pub use self::policy::{Action, Role};

pub const VOICE_SECRET_HEADER: &str = "x-voice-secret";

/// Session tokens are stored by digest only.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Blake2b::digest(token.as_bytes()))
}

fn secrets_match(provided: &str, expected: &str) -> bool {
    Blake2b::digest(provided.as_bytes()) == Blake2b::digest(expected.as_bytes())
}

fn app_settings(req: &HttpRequest) -> Result<web::Data<Settings>, ApiError> {
    req.app_data::<web::Data<Settings>>()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("settings are not registered").into())
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn check_voice_secret(req: &HttpRequest) -> Result<VoiceSecret, ApiError> {
    let settings = app_settings(req)?;
    let provided = req
        .headers()
        .get(VOICE_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing shared secret".into()))?;
    if !secrets_match(provided, &settings.voice_shared_secret) {
        log::warn!("rejected voice request with a wrong shared secret");
        return Err(ApiError::Unauthorized("Invalid shared secret".into()));
    }
    Ok(VoiceSecret)
}

/// Proof that the request came from the voice vendor.
pub struct VoiceSecret;

impl FromRequest for VoiceSecret {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(check_voice_secret(req))
    }
}

/// An authenticated dashboard account and its active clinic memberships.
#[derive(Debug, Clone)]
pub struct Caller {
    pub account_id: String,
    memberships: Vec<ClinicUser>,
}

impl Caller {
    pub fn new(account_id: String, memberships: Vec<ClinicUser>) -> Self {
        Self {
            account_id,
            memberships,
        }
    }

    pub fn role_in(&self, clinic_id: &str) -> Option<Role> {
        self.memberships
            .iter()
            .find(|m| m.is_active && m.clinic_id == clinic_id)
            .and_then(|m| m.role.parse().ok())
    }

    pub fn authorize(&self, clinic_id: &str, action: Action) -> Result<Role, ApiError> {
        match self.role_in(clinic_id) {
            Some(role) if role.permits(action) => Ok(role),
            Some(role) => Err(ApiError::Forbidden(format!(
                "Role '{}' may not perform this operation",
                role
            ))),
            None => Err(ApiError::Forbidden("Not a member of this clinic".into())),
        }
    }

    pub fn clinic_ids(&self) -> Vec<String> {
        self.memberships
            .iter()
            .filter(|m| m.is_active)
            .map(|m| m.clinic_id.clone())
            .collect()
    }
}

async fn load_caller(
    pool: &web::Data<DbPool>,
    token: String,
    max_age_secs: i64,
) -> Result<Caller, ApiError> {
    use crate::schema::{account_sessions, clinic_users};

    let token_hash = hash_token(&token);
    database::run(pool, move |conn| {
        let session = account_sessions::table
            .find(&token_hash)
            .get_result::<AccountSession>(conn)
            .optional()?
            .ok_or_else(|| ApiError::Unauthorized("No such session".into()))?;

        let age = Utc::now()
            .naive_utc()
            .signed_duration_since(session.issued_at);
        if age.num_seconds() > max_age_secs {
            return Err(ApiError::Unauthorized("Session has expired".into()));
        }

        let memberships = clinic_users::table
            .filter(clinic_users::account_id.eq(&session.account_id))
            .filter(clinic_users::is_active.eq(true))
            .load::<ClinicUser>(conn)?;

        Ok(Caller::new(session.account_id, memberships))
    })
    .await
}

impl FromRequest for Caller {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let settings = app_settings(req);
        Box::pin(async move {
            let token = token.ok_or_else(|| ApiError::Unauthorized("Missing bearer token".into()))?;
            let pool = pool.ok_or_else(|| anyhow::anyhow!("DB pool is not registered"))?;
            let settings = settings?;
            load_caller(&pool, token, settings.session_max_age_secs).await
        })
    }
}

/// Either the voice vendor or a dashboard account.
pub enum ApiAccess {
    Voice,
    User(Caller),
}

impl ApiAccess {
    /// Checks a clinic-scoped action; the vendor is trusted for every clinic.
    pub fn authorize(&self, clinic_id: &str, action: Action) -> Result<(), ApiError> {
        match self {
            ApiAccess::Voice => Ok(()),
            ApiAccess::User(caller) => caller.authorize(clinic_id, action).map(|_| ()),
        }
    }

    pub fn account_id(&self) -> Option<String> {
        match self {
            ApiAccess::Voice => None,
            ApiAccess::User(caller) => Some(caller.account_id.clone()),
        }
    }
}

impl FromRequest for ApiAccess {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if req.headers().contains_key(VOICE_SECRET_HEADER) {
            let res = check_voice_secret(req).map(|_| ApiAccess::Voice);
            return Box::pin(async move { res });
        }
        if bearer_token(req).is_none() {
            return Box::pin(async {
                Err(ApiError::Unauthorized(
                    "Missing shared secret or bearer token".into(),
                ))
            });
        }
        let caller = Caller::from_request(req, payload);
        Box::pin(async move { caller.await.map(ApiAccess::User) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn membership(clinic_id: &str, role: &str, is_active: bool) -> ClinicUser {
        ClinicUser {
            id: 1,
            account_id: "acct".into(),
            clinic_id: clinic_id.into(),
            role: role.into(),
            is_active,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn authorize_checks_membership_then_role() {
        let caller = Caller::new(
            "acct".into(),
            vec![membership("c1", "staff", true), membership("c2", "admin", false)],
        );

        assert_eq!(caller.authorize("c1", Action::ManageWalkIns).unwrap(), Role::Staff);
        assert!(matches!(
            caller.authorize("c1", Action::ConfigureClinic),
            Err(ApiError::Forbidden(_))
        ));
        // inactive membership counts as none
        assert!(matches!(
            caller.authorize("c2", Action::View),
            Err(ApiError::Forbidden(_))
        ));
        assert_eq!(caller.clinic_ids(), vec!["c1".to_string()]);
    }

    #[test]
    fn token_hashes_are_stable_hex() {
        let hash = hash_token("abc");
        assert_eq!(hash, hash_token("abc"));
        assert_ne!(hash, hash_token("abd"));
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn secrets_compare_by_value() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cret", "s3cret "));
    }
}
