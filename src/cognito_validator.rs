use async_trait::async_trait;
use jsonwebtokens as jwt;
use jsonwebtokens_cognito::KeySet;

use crate::{ClaimsPayload, CognitoAuthError, CognitoConfig, OAuthTokenType, TokenValidator};

/// Validator for JWT tokens issued by Cognito
#[derive(Clone)]
pub struct CognitoValidator {
    key_set: KeySet,
    token_verifier: jwt::Verifier,
}

impl CognitoValidator {
    /// Create a new `CognitoValidator` and prefetch the pool's signing keys.
    ///
    /// # Arguments
    /// * `config` - region, user pool, app client id and token type to accept
    ///
    /// # Errors
    /// Returns an error if the key set cannot be built or fetched
    pub async fn new(config: &CognitoConfig) -> Result<Self, CognitoAuthError> {
        let key_set = KeySet::new(&config.region, &config.user_pool_id)
            .map_err(|error| CognitoAuthError::KeySet(error.to_string()))?;
        key_set
            .prefetch_jwks()
            .await
            .map_err(|error| CognitoAuthError::KeySet(error.to_string()))?;

        let client_id = config.client_id.as_str();
        let token_verifier = match config.token_use {
            OAuthTokenType::Id => key_set.new_id_token_verifier(&[client_id]).build()?,
            OAuthTokenType::Access => key_set.new_access_token_verifier(&[client_id]).build()?,
        };

        tracing::debug!(
            region = %config.region,
            user_pool_id = %config.user_pool_id,
            token_use = ?config.token_use,
            "cognito key set loaded"
        );

        Ok(Self {
            key_set,
            token_verifier,
        })
    }
}

#[async_trait]
impl TokenValidator for CognitoValidator {
    async fn validate(&self, token: &str) -> Result<ClaimsPayload, CognitoAuthError> {
        let claims = self
            .key_set
            .verify(token, &self.token_verifier)
            .await
            .map_err(|error| CognitoAuthError::Validation(error.to_string()))?;
        Ok(serde_json::from_value(claims)?)
    }
}
