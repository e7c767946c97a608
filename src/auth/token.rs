//! Anti-forgery tokens for the save, export and import forms
//!
//! A token is `base64url(HMAC-SHA256(secret, action | user | tick))` where the
//! tick is the current time divided by half the configured lifetime. A token
//! verifies during its own tick and the next one, so it lives between half and
//! all of the lifetime.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use log::debug;
use sha2::Sha256;
use time::{Duration, OffsetDateTime};

type HmacSha256 = Hmac<Sha256>;

/// The form a token is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenAction {
    Save,
    Export,
    Import,
}

impl TokenAction {
    /// Action name bound into the signature
    pub fn as_str(self) -> &'static str {
        match self {
            TokenAction::Save => "save",
            TokenAction::Export => "export",
            TokenAction::Import => "import",
        }
    }

    /// Form field carrying the token
    pub fn field_name(self) -> &'static str {
        match self {
            TokenAction::Save => "asm_save_nonce",
            TokenAction::Export => "asm_export_nonce",
            TokenAction::Import => "asm_import_nonce",
        }
    }
}

impl std::fmt::Display for TokenAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issues and verifies action-scoped tokens
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Vec<u8>,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: impl Into<Vec<u8>>, lifetime: Duration) -> Self {
        Self {
            secret: secret.into(),
            lifetime,
        }
    }

    /// Issue a token for `action` on behalf of `user_id`
    pub fn issue(&self, action: TokenAction, user_id: u64) -> String {
        self.issue_at(action, user_id, OffsetDateTime::now_utc())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, action: TokenAction, user_id: u64, now: OffsetDateTime) -> String {
        match self.mac(action, user_id, self.tick(now)) {
            Some(mac) => URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()),
            None => String::new(),
        }
    }

    /// Check a submitted token
    pub fn verify(&self, action: TokenAction, user_id: u64, token: &str) -> bool {
        self.verify_at(action, user_id, token, OffsetDateTime::now_utc())
    }

    /// Check a submitted token as if the current time were `now`
    pub fn verify_at(
        &self,
        action: TokenAction,
        user_id: u64,
        token: &str,
        now: OffsetDateTime,
    ) -> bool {
        let Ok(signature) = URL_SAFE_NO_PAD.decode(token.as_bytes()) else {
            debug!("Rejected {action} token: not base64url");
            return false;
        };
        if signature.is_empty() {
            return false;
        }

        let tick = self.tick(now);
        let valid = [tick, tick - 1].into_iter().any(|t| {
            self.mac(action, user_id, t)
                .is_some_and(|mac| mac.verify_slice(&signature).is_ok())
        });
        if !valid {
            debug!("Rejected {action} token for user {user_id}");
        }
        valid
    }

    fn tick(&self, now: OffsetDateTime) -> i64 {
        let half = (self.lifetime.whole_seconds() / 2).max(1);
        now.unix_timestamp().div_euclid(half)
    }

    fn mac(&self, action: TokenAction, user_id: u64, tick: i64) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(action.as_str().as_bytes());
        mac.update(b"|");
        mac.update(user_id.to_string().as_bytes());
        mac.update(b"|");
        mac.update(tick.to_string().as_bytes());
        Some(mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret".to_vec(), Duration::days(1))
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = issuer();
        let token = tokens.issue(TokenAction::Export, 1);

        assert!(tokens.verify(TokenAction::Export, 1, &token));
    }

    #[test]
    fn test_token_bound_to_action_and_user() {
        let tokens = issuer();
        let token = tokens.issue(TokenAction::Export, 1);

        assert!(!tokens.verify(TokenAction::Import, 1, &token));
        assert!(!tokens.verify(TokenAction::Export, 2, &token));
    }

    #[test]
    fn test_token_expires_after_two_ticks() {
        let tokens = issuer();
        let issued = datetime!(2025-03-01 08:00 UTC);
        let token = tokens.issue_at(TokenAction::Save, 7, issued);

        assert!(tokens.verify_at(TokenAction::Save, 7, &token, issued + Duration::hours(12)));
        assert!(!tokens.verify_at(TokenAction::Save, 7, &token, issued + Duration::hours(25)));
    }

    #[test]
    fn test_garbage_and_foreign_tokens_rejected() {
        let tokens = issuer();
        let other = TokenIssuer::new(b"other-secret".to_vec(), Duration::days(1));

        assert!(!tokens.verify(TokenAction::Save, 1, ""));
        assert!(!tokens.verify(TokenAction::Save, 1, "not a token!"));
        assert!(!tokens.verify(TokenAction::Save, 1, &other.issue(TokenAction::Save, 1)));
    }

    #[test]
    fn test_debug_hides_secret() {
        assert!(!format!("{:?}", issuer()).contains("test-secret"));
    }
}
