use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
};
use futures_util::future::LocalBoxFuture;
use log::warn;

use crate::errors::AppError;
use crate::utils::jwt::validate_token;

/// The authenticated caller, resolved from the bearer token's `sub` claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

impl Principal {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Owner-scoped handlers take `Principal`; handlers that also serve anonymous
/// callers take `Option<Principal>`.
impl FromRequest for Principal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Principal>()
                .cloned()
                .ok_or_else(|| AppError::Unauthenticated("Authentication required".into()).into()),
        )
    }
}

/// Resolves the caller from `Authorization: Bearer <jwt>`.
///
/// A request without the header continues anonymously. A header that is
/// malformed or carries an invalid or expired token is answered with 401
/// without reaching the inner service.
pub struct JwtAuth {
    secret: Rc<str>,
}

impl JwtAuth {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Rc::from(secret),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service,
            secret: Rc::clone(&self.secret),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: S,
    secret: Rc<str>,
}

fn bearer_token(req: &ServiceRequest) -> Result<String, &'static str> {
    let header_str = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or("Invalid authorization header")?;
    header_str
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .ok_or("Invalid authorization format")
}

fn reject<B>(
    req: ServiceRequest,
    message: &str,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
    let res = req.error_response(AppError::Unauthenticated(message.to_string()));
    Box::pin(async move { Ok(res.map_into_right_body()) })
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
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
        if !req.headers().contains_key(header::AUTHORIZATION) {
            return self.forward(req);
        }

        let token = match bearer_token(&req) {
            Ok(token) => token,
            Err(message) => return reject(req, message),
        };

        let claims = match validate_token(&token, &self.secret) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Rejected bearer token for {}: {:#}", req.path(), e);
                return reject(req, "Invalid token");
            }
        };

        req.extensions_mut().insert(Principal(claims.sub));

        self.forward(req)
    }
}

impl<S> JwtAuthMiddleware<S> {
    fn forward<B>(
        &self,
        req: ServiceRequest,
    ) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>>
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
