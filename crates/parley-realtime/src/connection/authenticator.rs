//! WebSocket connection authentication.
//!
//! Connections authenticate with an access token passed as a query
//! parameter on the upgrade request. Failures are rejected before the
//! upgrade completes.

use std::sync::Arc;

use parley_auth::jwt::decoder::JwtDecoder;
use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_core::types::UserId;
use parley_entity::user::role::UserRole;

/// Identity established for an authenticated connection.
#[derive(Debug, Clone)]
pub struct ConnectionIdentity {
    pub user_id: UserId,
    pub username: String,
    pub role: UserRole,
}

/// Validates upgrade-time credentials and produces a connection identity.
#[derive(Clone)]
pub struct ConnectionAuthenticator {
    decoder: Arc<JwtDecoder>,
}

impl ConnectionAuthenticator {
    /// Create a new authenticator
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Authenticate an upgrade request. A missing token and an invalid
    /// token are distinct failures so clients can tell them apart.
    pub fn authenticate(&self, token: Option<&str>) -> AppResult<ConnectionIdentity> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Missing authentication token"))?;

        let claims = self.decoder.decode_access_token(token)?;

        Ok(ConnectionIdentity {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_auth::jwt::encoder::JwtEncoder;
    use parley_core::config::auth::AuthConfig;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "connection-authenticator-test-secret".into(),
            jwt_access_ttl_minutes: 15,
            jwt_refresh_ttl_hours: 24,
            password_min_length: 8,
        }
    }

    fn authenticator() -> ConnectionAuthenticator {
        ConnectionAuthenticator::new(Arc::new(JwtDecoder::new(&test_config())))
    }

    #[test]
    fn missing_token_is_rejected() {
        let auth = authenticator();
        assert!(auth.authenticate(None).is_err());
        assert!(auth.authenticate(Some("")).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let auth = authenticator();
        assert!(auth.authenticate(Some("not.a.jwt")).is_err());
    }

    #[test]
    fn valid_access_token_yields_identity() {
        let config = test_config();
        let encoder = JwtEncoder::new(&config);
        let user_id = UserId::new();
        let pair = encoder
            .generate_token_pair(user_id, UserRole::User, "carol")
            .unwrap();

        let auth = authenticator();
        let identity = auth.authenticate(Some(&pair.access_token)).unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.username, "carol");
    }

    #[test]
    fn refresh_token_is_not_accepted() {
        let config = test_config();
        let encoder = JwtEncoder::new(&config);
        let pair = encoder
            .generate_token_pair(UserId::new(), UserRole::User, "carol")
            .unwrap();

        let auth = authenticator();
        assert!(auth.authenticate(Some(&pair.refresh_token)).is_err());
    }
}
