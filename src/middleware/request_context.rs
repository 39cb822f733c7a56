use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::config::DefaultsConfig;
use crate::core::{AppError, RequestContext};

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
pub const USER_ID_HEADER: &str = "X-User-Id";
pub const COMPANY_ID_HEADER: &str = "X-Company-Id";
pub const CURRENCY_ID_HEADER: &str = "X-Currency-Id";

/// Request ID stored in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Middleware that tags every request with an ID and logs its outcome
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        req.extensions_mut().insert(RequestId(request_id.clone()));

        let method = req.method().clone();
        let path = req.path().to_string();

        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            "Incoming request"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;

            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = %res.status(),
                "Request completed"
            );

            Ok(res)
        })
    }
}

fn header_id(req: &HttpRequest, name: &str) -> Result<Option<i64>, AppError> {
    match req.headers().get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(Some)
            .ok_or_else(|| AppError::invalid_input(format!("Invalid {} header", name))),
    }
}

/// Build the caller's context from headers, falling back to configured defaults
pub fn context_from_request(req: &HttpRequest) -> Result<RequestContext, AppError> {
    let defaults = req
        .app_data::<web::Data<DefaultsConfig>>()
        .ok_or_else(|| AppError::Configuration("Request context defaults not registered".to_string()))?;

    Ok(RequestContext::new(
        header_id(req, USER_ID_HEADER)?.unwrap_or(defaults.user_id),
        header_id(req, COMPANY_ID_HEADER)?.unwrap_or(defaults.company_id),
        header_id(req, CURRENCY_ID_HEADER)?.unwrap_or(defaults.currency_id),
    ))
}

impl FromRequest for RequestContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(context_from_request(req))
    }
}
