//! Request extractors for caller identity and client metadata.

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use std::net::{IpAddr, SocketAddr};

use crate::error::AppError;
use crate::state::AppState;
use serde_json::json;

/// Header carrying the authenticated user id, set by the upstream identity
/// provider.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller. Rejects with `401` when the header is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

/// The caller if one is identified. A malformed header still rejects with `401`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeUser(pub Option<i64>);

/// Reads the user id header.
///
/// # Errors
///
/// Returns [`AppError::Unauthorized`] if the header is present but is not a
/// positive integer.
pub fn user_id_from_headers(headers: &HeaderMap) -> Result<Option<i64>, AppError> {
    let Some(value) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .map(Some)
        .ok_or_else(|| {
            AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "X-User-Id header is invalid" }),
            )
        })
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_id_from_headers(&parts.headers)?
            .map(CurrentUser)
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({ "reason": "X-User-Id header is missing" }),
                )
            })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(user_id_from_headers(&parts.headers)?))
    }
}

/// Client address and user agent, logged with shares and code runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Resolves the client IP.
///
/// Behind a trusted proxy the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`; otherwise only the socket peer address is used. Values that
/// do not parse as an IP address are ignored.
pub fn client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    behind_proxy: bool,
) -> Option<String> {
    let header_ip = |name: &str| -> Option<IpAddr> {
        headers
            .get(name)?
            .to_str()
            .ok()?
            .split(',')
            .next()?
            .trim()
            .parse()
            .ok()
    };

    let forwarded = if behind_proxy {
        header_ip("x-forwarded-for").or_else(|| header_ip("x-real-ip"))
    } else {
        None
    };

    forwarded
        .or_else(|| peer.map(|addr| addr.ip()))
        .map(|ip| ip.to_string())
}

impl FromRequestParts<AppState> for ClientMeta {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.chars().take(512).collect::<String>())
            .filter(|v| !v.is_empty());

        Ok(ClientMeta {
            ip: client_ip(&parts.headers, peer, state.behind_proxy),
            user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_user_id_missing() {
        assert_eq!(user_id_from_headers(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn test_user_id_valid() {
        let h = headers(&[("x-user-id", " 42 ")]);
        assert_eq!(user_id_from_headers(&h).unwrap(), Some(42));
    }

    #[test]
    fn test_user_id_invalid() {
        for bad in ["abc", "-3", "0", ""] {
            let mut h = HeaderMap::new();
            h.insert(USER_ID_HEADER, HeaderValue::from_str(bad).unwrap());
            let err = user_id_from_headers(&h).unwrap_err();
            assert!(matches!(err, AppError::Unauthorized { .. }), "{bad}");
        }
    }

    #[test]
    fn test_client_ip_prefers_forwarded_behind_proxy() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        assert_eq!(
            client_ip(&h, Some(peer), true).as_deref(),
            Some("203.0.113.7")
        );
        assert_eq!(client_ip(&h, Some(peer), false).as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let h = headers(&[("x-forwarded-for", "garbage"), ("x-real-ip", "::1")]);
        assert_eq!(client_ip(&h, None, true).as_deref(), Some("::1"));
    }

    #[test]
    fn test_client_ip_none_without_sources() {
        assert_eq!(client_ip(&HeaderMap::new(), None, true), None);
    }
}
