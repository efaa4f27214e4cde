// src/handlers/support.rs
// DOCUMENTATION: Shared helpers for HTTP handlers
// PURPOSE: Extractor error mapping, absolute request URLs, client addresses, 405 fallback

use crate::errors::YamdbError;
use actix_web::{error, web, HttpRequest, HttpResponse};
use std::net::IpAddr;

/// Absolute URL of the request as the client sent it, query included
/// DOCUMENTATION: Honors X-Forwarded-Proto/Host set by the reverse proxy
pub fn request_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}{}", info.scheme(), info.host(), req.uri())
}

/// Client address used for throttling
/// Forwarded headers count only when the peer is a trusted proxy
pub fn client_ip(req: &HttpRequest, trusted_proxies: &[IpAddr]) -> Option<IpAddr> {
    let peer = req.peer_addr()?.ip();
    if !trusted_proxies.contains(&peer) {
        return Some(peer);
    }

    forwarded_client(req).or(Some(peer))
}

/// X-Real-IP, else the last X-Forwarded-For hop (the one the proxy appended)
fn forwarded_client(req: &HttpRequest) -> Option<IpAddr> {
    let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok());

    header("X-Real-IP")
        .and_then(|v| v.trim().parse().ok())
        .or_else(|| {
            header("X-Forwarded-For")
                .and_then(|v| v.rsplit(',').next())
                .and_then(|v| v.trim().parse().ok())
        })
}

/// Fallback for methods a resource does not support
pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, YamdbError> {
    log::debug!("{} not allowed on {}", req.method(), req.path());
    Err(YamdbError::MethodNotAllowed(req.method().to_string()))
}

/// Malformed JSON bodies become 400 with the usual error envelope
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected JSON body: {}", err);
        let message = match &err {
            error::JsonPayloadError::Deserialize(e) => e.to_string(),
            other => other.to_string(),
        };
        YamdbError::ValidationError(message).into()
    })
}

/// Unparseable path segments (a non-numeric id) are 404
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req| {
        log::debug!("Unmatched path {}: {}", req.path(), err);
        YamdbError::NotFound(req.path().to_string()).into()
    })
}

/// Bad filter values (`?year=abc`) are 400
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        YamdbError::InvalidInput(err.to_string()).into()
    })
}
