use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderMap;
use serde_json::{Map, Value};

use crate::{ClaimsPayload, CognitoAuthError, UserIdentity, token_extractor::extract_token};

/// External capability that validates a bearer token and returns its claims.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate `token` once. Rejections are returned as errors.
    async fn validate(&self, token: &str) -> Result<ClaimsPayload, CognitoAuthError>;
}

/// Outcome of a successful verification pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verification {
    Verified(UserIdentity),
    /// No token was present, the validator was not called
    NoIdentity,
}

impl Verification {
    pub fn into_identity(self) -> Option<UserIdentity> {
        match self {
            Self::Verified(identity) => Some(identity),
            Self::NoIdentity => None,
        }
    }
}

/// Extracts a token from a request and maps validated claims to a [`UserIdentity`].
#[derive(Clone)]
pub struct ClaimsVerifier {
    validator: Arc<dyn TokenValidator>,
}

impl ClaimsVerifier {
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }

    /// Verify the token carried by a request.
    ///
    /// # Arguments
    /// * `headers` - request headers, searched for `Authorization: Bearer`
    /// * `body` - parsed JSON body, searched for `idToken`
    ///
    /// # Errors
    /// Returns the validator's error unchanged if the token is rejected
    pub async fn verify(
        &self,
        headers: &HeaderMap,
        body: Option<&Map<String, Value>>,
    ) -> Result<Verification, CognitoAuthError> {
        let Some(token) = extract_token(headers, body) else {
            tracing::debug!("no bearer token in request");
            return Ok(Verification::NoIdentity);
        };
        self.verify_token(&token).await
    }

    /// Verify an already extracted token. An empty token is never sent to the validator.
    pub async fn verify_token(&self, token: &str) -> Result<Verification, CognitoAuthError> {
        if token.is_empty() {
            return Ok(Verification::NoIdentity);
        }
        let payload = self.validator.validate(token).await?;
        Ok(Verification::Verified(UserIdentity::from(payload)))
    }
}
