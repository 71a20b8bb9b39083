use crate::errors::AppError;
use axum::http::HeaderMap;
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;

pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

pub fn require_bearer(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let token = extract_bearer(headers).ok_or(AppError::Unauthorized)?;
    if token != expected {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

pub fn check_origin(headers: &HeaderMap, allowed: &[String]) -> Result<(), AppError> {
    let origin = headers
        .get("Origin")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::OriginDenied)?;
    if allowed.iter().any(|o| o == origin) {
        Ok(())
    } else {
        Err(AppError::OriginDenied)
    }
}

pub fn content_length_ok(headers: &HeaderMap, max_kb: usize) -> Result<(), AppError> {
    if let Some(len) = headers
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok())
    {
        if len > max_kb * 1024 {
            return Err(AppError::RequestTooLarge);
        }
    }
    Ok(())
}

type GlobalLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;
type TokenLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

// global plus per-token request limiting; both gates must pass
pub struct RateLimiters {
    global: GlobalLimiter,
    per_token: TokenLimiter,
}

impl RateLimiters {
    pub fn new(global_rps: u32, global_burst: u32, token_rps: u32, token_burst: u32) -> Self {
        Self {
            global: RateLimiter::direct(quota(global_rps, global_burst)),
            per_token: RateLimiter::keyed(quota(token_rps, token_burst)),
        }
    }

    pub fn check(&self, token: Option<&str>) -> Result<(), AppError> {
        if self.global.check().is_err() {
            return Err(AppError::RateLimited);
        }
        if let Some(token) = token {
            if self.per_token.check_key(&token.to_string()).is_err() {
                return Err(AppError::RateLimited);
            }
        }
        Ok(())
    }
}

fn quota(per_second: u32, burst: u32) -> Quota {
    let per_second = NonZeroU32::new(per_second).unwrap_or(nonzero!(1u32));
    let burst = NonZeroU32::new(burst).unwrap_or(nonzero!(1u32));
    Quota::per_second(per_second).allow_burst(burst)
}
