use argon2::{
    Argon2, PasswordVerifier,
    password_hash::{PasswordHash, PasswordHasher, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    models::StudentStatus,
    repository::RepositoryState,
};

/// Token lifetime in seconds (24 hours).
const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims
///
/// Represents the standard payload structure expected inside a JSON Web Token (JWT).
/// These claims are signed by the server's secret and validated upon every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): The UUID of the student. This is the primary key used
    /// to re-resolve the account on every authenticated request.
    pub sub: Uuid,
    /// Expiration Time (exp): Timestamp after which the JWT must not be accepted.
    pub exp: usize,
    /// Issued At (iat): Timestamp when the JWT was issued.
    pub iat: usize,
}

/// issue_token
///
/// Signs a 24-hour HS256 session token for the given student. Called by the
/// login handler after the credentials have been verified.
pub fn issue_token(student_id: Uuid, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: student_id,
        iat: now as usize,
        exp: (now + TOKEN_TTL_SECS) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// hash_password
///
/// Produces an argon2 PHC string with a fresh random salt. This is the only
/// form in which a password ever reaches the store.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| ApiError::Crypto)?;
    Ok(hash.to_string())
}

/// verify_password
///
/// Checks a candidate password against a stored PHC string. A mismatch is
/// `Ok(false)`; only a corrupt stored hash is an error.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| ApiError::Crypto)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request: a student that exists
/// in the store and is ACTIVE. Handlers use the `id` for every per-student
/// read; there is no role field because this surface serves students only.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function
/// argument in any authenticated handler. This cleanly separates authentication
/// (extractor) from business logic (the handler).
///
/// The process:
/// 1. Dependency Resolution: Repository and AppConfig from the application state.
/// 2. Local Bypass: development-time access using the 'x-student-id' header,
///    only honored in Env::Local.
/// 3. Token Validation: standard Bearer extraction and JWT decoding.
/// 4. DB Lookup: the student must still exist and be ACTIVE. A token issued
///    before a suspension or deletion stops working immediately.
///
/// Rejection: 401 on any authentication failure; 500 only when the store
/// itself is unreachable (that is not an authentication outcome).
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Dependency Resolution
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 2. Local Development Bypass Check
        // In Env::Local a known student UUID in the 'x-student-id' header
        // authenticates the request without a token. The account still has to
        // exist and be ACTIVE, so lifecycle rules stay observable locally.
        if config.env == Env::Local {
            if let Some(header_value) = parts.headers.get("x-student-id") {
                if let Ok(id_str) = header_value.to_str() {
                    if let Ok(student_id) = Uuid::parse_str(id_str) {
                        let student = repo
                            .get_student(student_id)
                            .await
                            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
                        if let Some(student) = student {
                            if student.status == StudentStatus::Active {
                                return Ok(AuthUser { id: student.id });
                            }
                        }
                    }
                }
            }
        }
        // If Env is Production, or the bypass failed, execution falls through
        // to the standard JWT validation flow.

        // 3. Token Extraction
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        // 4. JWT Decoding Setup
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::default();
        validation.validate_exp = true;

        // 5. Decode and Validate the Token
        let token_data = match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => data,
            Err(e) => {
                match e.kind() {
                    // Token expired: the most common failure for a valid-but-old token.
                    ErrorKind::ExpiredSignature => return Err(StatusCode::UNAUTHORIZED),
                    // Bad signature, malformed token, etc.
                    _ => return Err(StatusCode::UNAUTHORIZED),
                }
            }
        };

        // 6. Database Lookup (Final Verification)
        // The subject must map to an existing, ACTIVE student. PENDING and
        // SUSPENDED accounts can hold valid tokens but may not use them.
        let student = repo
            .get_student(token_data.claims.sub)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        if student.status != StudentStatus::Active {
            return Err(StatusCode::UNAUTHORIZED);
        }

        Ok(AuthUser { id: student.id })
    }
}
