mod authentication_layer;
mod authentication_service;
mod claims;
mod claims_verifier;
mod cognito_validator;
mod config;
mod token_extractor;

pub use authentication_layer::{Authenticated, AuthenticationLayer, AuthenticationMiddleware};
pub use authentication_service::{
    AuthAction, AuthRequest, AuthStrategy, AuthenticationResult, AuthenticationService,
    COGNITO_STRATEGY, CognitoStrategy, JWT_STRATEGY, configure_authentication,
};
pub use claims::{ClaimsPayload, UserIdentity};
pub use claims_verifier::{ClaimsVerifier, TokenValidator, Verification};
pub use cognito_validator::CognitoValidator;
pub use config::{CognitoConfig, OAuthTokenType};
pub use token_extractor::{TokenExtractor, extract_token};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CognitoAuthError {
    #[error("Invalid configuration: `{0}`")]
    Configuration(String),
    #[error("Failed to build key set: `{0}`")]
    KeySet(String),
    #[error(transparent)]
    Jsonwebtokens(#[from] jsonwebtokens::error::Error),
    #[error("Token rejected: `{0}`")]
    Validation(String),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::error::Error),
    #[error("Not authenticated")]
    NotAuthenticated,
}
