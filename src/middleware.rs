// src/middleware.rs

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ok, Ready};
use log::{error, warn};

use crate::app_state::AppState;
use crate::auth::{Identity, TOKEN_COOKIE};
use crate::error::AppError;

/// Requires a valid `token` cookie. On success the decoded [`Identity`] is
/// placed in the request extensions; otherwise the request is answered with
/// 401 before it reaches a handler.
#[derive(Debug)]
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = AuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddleware { service })
    }
}

pub struct AuthMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
            }
            Err(err) => {
                let (req_parts, _payload) = req.into_parts();
                let resp = err.error_response();
                let srv_resp = ServiceResponse::new(req_parts, resp);
                return Box::pin(async move { Ok(srv_resp) });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_boxed_body())
        })
    }
}

fn authenticate(req: &ServiceRequest) -> Result<Identity, AppError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        error!("AppState missing from app data; cannot verify credentials");
        return Err(AppError::Internal("application state is not configured"));
    };

    let cookie = req.cookie(TOKEN_COOKIE);
    state
        .tokens
        .authenticate(cookie.as_ref().map(|c| c.value()))
        .map_err(|err| {
            warn!("Rejected {} {}: {}", req.method(), req.path(), err);
            AppError::from(err)
        })
}
