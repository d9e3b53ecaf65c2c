//! Rate limiting middleware using token bucket algorithm.
//!
//! Limits are keyed per client IP. The key extractor is chosen at startup:
//! [`PeerIpKeyExtractor`](tower_governor::key_extractor::PeerIpKeyExtractor)
//! for direct exposure, or
//! [`SmartIpKeyExtractor`](tower_governor::key_extractor::SmartIpKeyExtractor)
//! behind a trusted reverse proxy.

use axum::{Router, routing::MethodRouter};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

use crate::state::AppState;

type IpLayer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Creates a rate limiter for regular endpoints.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
pub fn layer<K: KeyExtractor>(key_extractor: K) -> IpLayer<K> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(key_extractor)
            .per_second(2)
            .burst_size(100)
            .finish()
            .unwrap(),
    );

    GovernorLayer::new(governor_conf)
}

/// Creates a stricter rate limiter for anonymous write endpoints.
///
/// # Limits
///
/// - **Rate**: 1 request per second
/// - **Burst**: 10 requests
///
/// Used for the contact form and newsletter subscription, which anyone can
/// post to. Applied on top of [`layer`].
pub fn secure_layer<K: KeyExtractor>(key_extractor: K) -> IpLayer<K> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(key_extractor)
            .per_second(1)
            .burst_size(10)
            .finish()
            .unwrap(),
    );

    GovernorLayer::new(governor_conf)
}

/// Where the limiter reads the client IP from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientIpSource {
    /// Socket peer address.
    Peer,
    /// `X-Forwarded-For` / `X-Real-IP`, falling back to the peer. Use only
    /// behind a trusted reverse proxy.
    Proxy,
}

impl ClientIpSource {
    pub fn from_behind_proxy(behind_proxy: bool) -> Self {
        if behind_proxy { Self::Proxy } else { Self::Peer }
    }
}

/// Applies the regular limiter to a whole router.
pub fn apply(router: Router<AppState>, source: ClientIpSource) -> Router<AppState> {
    match source {
        ClientIpSource::Proxy => router.layer(layer(SmartIpKeyExtractor)),
        ClientIpSource::Peer => router.layer(layer(PeerIpKeyExtractor)),
    }
}

/// Applies the stricter limiter to one route. Without a source the route is
/// returned unchanged.
pub fn strict(
    method_router: MethodRouter<AppState>,
    source: Option<ClientIpSource>,
) -> MethodRouter<AppState> {
    match source {
        Some(ClientIpSource::Proxy) => method_router.layer(secure_layer(SmartIpKeyExtractor)),
        Some(ClientIpSource::Peer) => method_router.layer(secure_layer(PeerIpKeyExtractor)),
        None => method_router,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_source_from_flag() {
        assert_eq!(ClientIpSource::from_behind_proxy(true), ClientIpSource::Proxy);
        assert_eq!(ClientIpSource::from_behind_proxy(false), ClientIpSource::Peer);
    }
}
