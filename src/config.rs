use serde::Deserialize;

use crate::CognitoAuthError;

/// Which Cognito token the validator accepts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthTokenType {
    #[default]
    Id,
    Access,
}

impl OAuthTokenType {
    fn parse(value: &str) -> Result<Self, CognitoAuthError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "access" => Ok(Self::Access),
            other => Err(CognitoAuthError::Configuration(format!(
                "COGNITO_TOKEN_USE must be `id` or `access`, got `{other}`"
            ))),
        }
    }
}

/// Client configuration for the Cognito user pool.
///
/// Required once at startup. A missing or empty value is fatal.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitoConfig {
    pub region: String,
    #[serde(alias = "cognitoUserPoolId")]
    pub user_pool_id: String,
    pub client_id: String,
    #[serde(default)]
    pub token_use: OAuthTokenType,
}

impl CognitoConfig {
    /// Build the configuration from a JSON settings object, e.g.
    /// `{"region": "eu-west-1", "userPoolId": "...", "clientId": "...", "tokenUse": "id"}`.
    ///
    /// # Errors
    /// Returns [`CognitoAuthError::Configuration`] if the object is absent,
    /// malformed or has empty fields
    pub fn from_value(value: Option<&serde_json::Value>) -> Result<Self, CognitoAuthError> {
        let Some(value) = value else {
            return Err(CognitoAuthError::Configuration(
                "cognito client is not configured".to_string(),
            ));
        };
        let config: Self = serde_json::from_value(value.clone())
            .map_err(|error| CognitoAuthError::Configuration(error.to_string()))?;
        config.validate()
    }

    /// Read `COGNITO_REGION`, `COGNITO_USER_POOL_ID`, `COGNITO_CLIENT_ID` and
    /// the optional `COGNITO_TOKEN_USE` from the process environment.
    ///
    /// # Errors
    /// Returns [`CognitoAuthError::Configuration`] naming the first missing variable
    pub fn from_env() -> Result<Self, CognitoAuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, CognitoAuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| CognitoAuthError::Configuration(format!("missing {key}")))
        };

        let token_use = lookup("COGNITO_TOKEN_USE")
            .filter(|value| !value.trim().is_empty())
            .map(|value| OAuthTokenType::parse(&value))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            region: required("COGNITO_REGION")?,
            user_pool_id: required("COGNITO_USER_POOL_ID")?,
            client_id: required("COGNITO_CLIENT_ID")?,
            token_use,
        })
    }

    fn validate(self) -> Result<Self, CognitoAuthError> {
        for (name, value) in [
            ("region", &self.region),
            ("userPoolId", &self.user_pool_id),
            ("clientId", &self.client_id),
        ] {
            if value.trim().is_empty() {
                return Err(CognitoAuthError::Configuration(format!("empty {name}")));
            }
        }
        Ok(self)
    }
}
