use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::messages;

/// Request-scoped authentication gate for everything under the API prefix.
///
/// Per request: no bearer token fails with 401 immediately; a present token is
/// verified against the process-wide [`TokenService`]; any verification
/// failure (malformed, bad signature, expired) terminates the chain with a 401
/// envelope before the handler runs. On success the decoded claims are
/// inserted into the request extensions -- the single context mutation -- and
/// the chain continues. No I/O happens here; the check is O(1) relative to
/// the store.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S> AuthMiddlewareService<S> {
    /// Terminates the chain with the error rendered as a response; the
    /// handler is never invoked and the request context stays untouched.
    fn reject<B: 'static>(
        req: ServiceRequest,
        error: AppError,
    ) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
        let (request, _payload) = req.into_parts();
        let response = ServiceResponse::new(request, error.error_response()).map_into_right_body();
        Box::pin(ready(Ok(response)))
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Registration and login are the only unauthenticated entry points.
        let path = req.path();
        if path.starts_with("/api/user/register") || path.starts_with("/api/user/login") {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) });
        }

        let tokens = match req.app_data::<web::Data<TokenService>>() {
            Some(tokens) => tokens.clone(),
            None => {
                return Self::reject(
                    req,
                    AppError::InternalServerError("token service not configured".into()),
                )
            }
        };

        let auth_header = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match auth_header {
            Some(token) => match tokens.verify(token) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    let fut = self.service.call(req);
                    Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
                }
                Err(token_err) => Self::reject(req, AppError::from(token_err)),
            },
            None => Self::reject(req, AppError::Unauthorized(messages::MISSING_TOKEN.into())),
        }
    }
}
