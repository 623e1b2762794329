use std::{
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::{Body, to_bytes},
    extract::{FromRequestParts, Request},
    response::Response,
};
use futures_util::future::BoxFuture;
use http::{StatusCode, request::Parts};
use http_body_util::LengthLimitError;
use serde_json::{Map, Value};
use tower::{Layer, Service};

use crate::{AuthAction, AuthRequest, AuthenticationService, UserIdentity};

/// Bodies larger than this are refused before any strategy runs.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Layer that authenticates requests for one [`AuthAction`] of an [`AuthenticationService`]
#[derive(Clone)]
pub struct AuthenticationLayer {
    service: Arc<AuthenticationService>,
    action: AuthAction,
}

impl AuthenticationLayer {
    pub fn new(service: Arc<AuthenticationService>, action: AuthAction) -> Self {
        Self { service, action }
    }
}

impl<S> Layer<S> for AuthenticationLayer {
    type Service = AuthenticationMiddleware<S>;
    fn layer(&self, inner: S) -> Self::Service {
        AuthenticationMiddleware {
            inner,
            service: self.service.clone(),
            action: self.action,
        }
    }
}

#[derive(Clone)]
pub struct AuthenticationMiddleware<S> {
    inner: S,
    service: Arc<AuthenticationService>,
    action: AuthAction,
}

impl<S> Service<Request> for AuthenticationMiddleware<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let service = self.service.clone();
        let action = self.action;

        // see here for why and how to clone the inner service
        // https://docs.rs/tower/latest/tower/trait.Service.html#be-careful-when-cloning-inner-services
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move {
            let (mut parts, body) = request.into_parts();

            let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
                Ok(bytes) => bytes,
                Err(error) if exceeds_length_limit(&error) => {
                    let response =
                        create_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
                    return Ok(response);
                }
                Err(error) => {
                    tracing::debug!(%error, "failed to read request body");
                    let response =
                        create_response(StatusCode::BAD_REQUEST, "Failed to read request body");
                    return Ok(response);
                }
            };
            let json_body = if bytes.is_empty() {
                None
            } else {
                serde_json::from_slice::<Map<String, Value>>(&bytes).ok()
            };

            let auth_request = AuthRequest {
                headers: &parts.headers,
                body: json_body.as_ref(),
            };
            let result = match service.authenticate(action, auth_request).await {
                Ok(result) => result,
                Err(error) => {
                    tracing::debug!(%action, %error, "authentication failed");
                    let response = create_response(StatusCode::UNAUTHORIZED, "Not authenticated");
                    return Ok(response);
                }
            };

            parts.extensions.insert(result.user.clone());
            parts.extensions.insert(result);

            let request = Request::from_parts(parts, Body::from(bytes));
            let response = inner.call(request).await?;
            Ok(response)
        })
    }
}

fn exceeds_length_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(error) = source {
        if error.is::<LengthLimitError>() {
            return true;
        }
        source = error.source();
    }
    false
}

fn create_response(status: StatusCode, body_text: &'static str) -> Response {
    let mut response = Response::default();
    *response.status_mut() = status;
    *response.body_mut() = Body::from(body_text);
    response
}

/// Extractor for the [`UserIdentity`] inserted by [`AuthenticationLayer`]
#[derive(Clone, Debug)]
pub struct Authenticated(pub UserIdentity);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserIdentity>()
            .cloned()
            .map(Authenticated)
            .ok_or((
                StatusCode::INTERNAL_SERVER_ERROR,
                "UserIdentity not found - authentication layer not configured",
            ))
    }
}
