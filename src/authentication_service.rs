use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;
use http::HeaderMap;
use serde_json::{Map, Value};

use crate::{AuthenticationLayer, ClaimsVerifier, CognitoAuthError, UserIdentity};

pub const COGNITO_STRATEGY: &str = "cognito";
pub const JWT_STRATEGY: &str = "jwt";

/// Lifecycle operation of the authentication service that a hook guards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AuthAction {
    /// Issue credentials
    Create,
    /// Revoke credentials
    Remove,
}

impl fmt::Display for AuthAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Remove => f.write_str("remove"),
        }
    }
}

/// Read-only view of an inbound request handed to strategies.
#[derive(Clone, Copy, Debug)]
pub struct AuthRequest<'a> {
    pub headers: &'a HeaderMap,
    pub body: Option<&'a Map<String, Value>>,
}

/// A named, pluggable authentication method.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` means this strategy found nothing to authenticate with.
    async fn authenticate(
        &self,
        request: AuthRequest<'_>,
    ) -> Result<Option<UserIdentity>, CognitoAuthError>;
}

/// The `cognito` strategy.
#[derive(Clone)]
pub struct CognitoStrategy {
    verifier: ClaimsVerifier,
}

impl CognitoStrategy {
    pub fn new(verifier: ClaimsVerifier) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl AuthStrategy for CognitoStrategy {
    fn name(&self) -> &str {
        COGNITO_STRATEGY
    }

    async fn authenticate(
        &self,
        request: AuthRequest<'_>,
    ) -> Result<Option<UserIdentity>, CognitoAuthError> {
        let verification = self.verifier.verify(request.headers, request.body).await?;
        Ok(verification.into_identity())
    }
}

/// Identity produced by a successful authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticationResult {
    pub strategy: String,
    /// Entity id, the identity's email
    pub id: Option<String>,
    pub user: UserIdentity,
}

/// Registry of strategies plus the strategy lists each action accepts.
#[derive(Clone, Default)]
pub struct AuthenticationService {
    strategies: HashMap<String, Arc<dyn AuthStrategy>>,
    hooks: HashMap<AuthAction, Vec<String>>,
}

impl AuthenticationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy under its own name, replacing any previous one.
    pub fn register(mut self, strategy: Arc<dyn AuthStrategy>) -> Self {
        self.strategies.insert(strategy.name().to_string(), strategy);
        self
    }

    /// Require one of `strategies`, tried in order, before `action`.
    ///
    /// # Errors
    /// Returns [`CognitoAuthError::Configuration`] if a name is not registered
    /// or the list is empty
    pub fn hook(
        mut self,
        action: AuthAction,
        strategies: &[&str],
    ) -> Result<Self, CognitoAuthError> {
        if strategies.is_empty() {
            return Err(CognitoAuthError::Configuration(format!(
                "no strategies given for `{action}`"
            )));
        }
        if let Some(unknown) = strategies
            .iter()
            .find(|name| !self.strategies.contains_key(**name))
        {
            return Err(CognitoAuthError::Configuration(format!(
                "strategy `{unknown}` is not registered"
            )));
        }
        self.hooks.insert(
            action,
            strategies.iter().map(|name| name.to_string()).collect(),
        );
        Ok(self)
    }

    /// Authenticate `request` for `action`. First strategy to return an identity wins.
    ///
    /// # Errors
    /// Returns the last strategy error if every strategy failed and at least one errored,
    /// otherwise [`CognitoAuthError::NotAuthenticated`]
    pub async fn authenticate(
        &self,
        action: AuthAction,
        request: AuthRequest<'_>,
    ) -> Result<AuthenticationResult, CognitoAuthError> {
        let Some(names) = self.hooks.get(&action) else {
            return Err(CognitoAuthError::Configuration(format!(
                "no authentication hook for `{action}`"
            )));
        };

        let mut last_error = None;
        for name in names {
            let Some(strategy) = self.strategies.get(name) else {
                continue;
            };
            tracing::debug!(%action, strategy = %name, "attempting authentication");
            match strategy.authenticate(request).await {
                Ok(Some(user)) => {
                    return Ok(AuthenticationResult {
                        strategy: name.clone(),
                        id: user.email.clone(),
                        user,
                    });
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(%action, strategy = %name, %error, "strategy rejected request");
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or(CognitoAuthError::NotAuthenticated))
    }

    /// Layer guarding credential creation.
    pub fn create_layer(self: &Arc<Self>) -> AuthenticationLayer {
        AuthenticationLayer::new(self.clone(), AuthAction::Create)
    }

    /// Layer guarding credential removal.
    pub fn remove_layer(self: &Arc<Self>) -> AuthenticationLayer {
        AuthenticationLayer::new(self.clone(), AuthAction::Remove)
    }
}

/// Register the `cognito` strategy next to a host-provided `jwt` strategy and install
/// the hooks: `create` accepts either, `remove` accepts only `cognito`.
///
/// # Errors
/// Returns [`CognitoAuthError::Configuration`] if `jwt` is not named [`JWT_STRATEGY`]
pub fn configure_authentication(
    verifier: ClaimsVerifier,
    jwt: Arc<dyn AuthStrategy>,
) -> Result<Arc<AuthenticationService>, CognitoAuthError> {
    if jwt.name() != JWT_STRATEGY {
        return Err(CognitoAuthError::Configuration(format!(
            "expected a `{JWT_STRATEGY}` strategy, got `{}`",
            jwt.name()
        )));
    }

    let service = AuthenticationService::new()
        .register(Arc::new(CognitoStrategy::new(verifier)))
        .register(jwt)
        .hook(AuthAction::Create, &[COGNITO_STRATEGY, JWT_STRATEGY])?
        .hook(AuthAction::Remove, &[COGNITO_STRATEGY])?;
    Ok(Arc::new(service))
}
