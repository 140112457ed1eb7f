use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::claims::user::UserClaim;
use crate::error::AppError;
use crate::models::User;

/// The authenticated caller, stored in request extensions by `CheckLogin`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i32,
    pub username: String,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Principal {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

impl FromRequest for Principal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Principal>()
                .cloned()
                .ok_or_else(|| Error::from(AppError::Auth("Not authenticated".into()))),
        )
    }
}

/// Works out who is making a request.
pub trait PrincipalResolver: Send + Sync {
    fn resolve(&self, req: &HttpRequest) -> Result<Principal, AppError>;
}

/// Accepts `Authorization: Bearer <jwt>` signed with the shared secret.
pub struct JwtResolver {
    key: DecodingKey,
    validation: Validation,
}

impl JwtResolver {
    pub fn new(secret: &str) -> Self {
        JwtResolver {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

impl PrincipalResolver for JwtResolver {
    fn resolve(&self, req: &HttpRequest) -> Result<Principal, AppError> {
        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Auth("Missing Authorization header".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Auth("Invalid Authorization scheme".into()))?;

        let claims = decode::<UserClaim>(token, &self.key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected token");
                AppError::Auth("Invalid or expired token".into())
            })?
            .claims;

        Ok(Principal {
            user_id: claims.id,
            username: claims.username,
        })
    }
}

/// Resolves every request to the same user. Only for local development and
/// tests; never selected unless `AUTH_MODE=fixed`.
pub struct FixedPrincipal(pub Principal);

impl PrincipalResolver for FixedPrincipal {
    fn resolve(&self, _req: &HttpRequest) -> Result<Principal, AppError> {
        Ok(self.0.clone())
    }
}

pub struct CheckLogin {
    resolver: Arc<dyn PrincipalResolver>,
}

impl CheckLogin {
    pub fn new(resolver: Arc<dyn PrincipalResolver>) -> Self {
        CheckLogin { resolver }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CheckLogin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CheckLoginMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CheckLoginMiddleware {
            service,
            resolver: self.resolver.clone(),
        }))
    }
}

pub struct CheckLoginMiddleware<S> {
    service: S,
    resolver: Arc<dyn PrincipalResolver>,
}

impl<S, B> Service<ServiceRequest> for CheckLoginMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let resolved = self.resolver.resolve(req.request());

        match resolved {
            Ok(principal) => {
                req.extensions_mut().insert(principal);
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), "Authentication failed: {}", e);
                let response = req.error_response(e).map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}
