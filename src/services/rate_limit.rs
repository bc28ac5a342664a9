//! Sliding one-minute window per client key

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use parking_lot::Mutex;

const WINDOW: Duration = Duration::from_secs(60);

/// Meeting requests allowed per client per minute
pub const MEETING_REQUESTS_PER_MINUTE: usize = 5;

#[derive(Clone)]
pub struct RateLimiter {
    limit: usize,
    keys: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
}

impl RateLimiter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            keys: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a request for `key`; false when the window is already full.
    pub fn check_and_record(&self, key: &str) -> bool {
        self.check_and_record_at(key, Instant::now())
    }

    fn check_and_record_at(&self, key: &str, now: Instant) -> bool {
        let mut keys = self.keys.lock();

        // Keep the map from growing with one-off clients
        if keys.len() > 10_000 {
            keys.retain(|_, timestamps| {
                timestamps.retain(|t| now.duration_since(*t) < WINDOW);
                !timestamps.is_empty()
            });
        }

        let timestamps = keys.entry(key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < WINDOW);
        if timestamps.len() >= self.limit {
            return false;
        }
        timestamps.push(now);
        true
    }
}

/// Client identity for rate limiting.
///
/// The socket peer address, unless `trust_forwarded` is set and a proxy
/// supplied `X-Forwarded-For` or `X-Real-IP`.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> String {
    let forwarded = trust_forwarded
        .then(|| forwarded_for(headers))
        .flatten();
    match (forwarded, peer) {
        (Some(addr), _) => addr,
        (None, Some(peer)) => peer.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_per_key() {
        let limiter = RateLimiter::new(MEETING_REQUESTS_PER_MINUTE);
        let start = Instant::now();
        for _ in 0..MEETING_REQUESTS_PER_MINUTE {
            assert!(limiter.check_and_record_at("1.2.3.4", start));
        }
        assert!(!limiter.check_and_record_at("1.2.3.4", start));
        // Other clients are unaffected
        assert!(limiter.check_and_record_at("5.6.7.8", start));
        // The window slides
        assert!(limiter.check_and_record_at("1.2.3.4", start + Duration::from_secs(61)));
    }

    #[test]
    fn test_client_key_uses_peer_address() {
        let peer: SocketAddr = "198.51.100.4:50123".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7".parse().unwrap());

        // Forwarding headers are ignored unless trusted
        assert_eq!(client_key(&headers, Some(peer), false), "198.51.100.4");
        assert_eq!(client_key(&HeaderMap::new(), None, false), "unknown");
    }

    #[test]
    fn test_client_key_from_trusted_headers() {
        let peer: SocketAddr = "10.0.0.1:443".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers, Some(peer), true), "10.0.0.1");

        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(client_key(&headers, Some(peer), true), "10.0.0.2");

        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(client_key(&headers, Some(peer), true), "203.0.113.7");
    }
}
