use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use std::convert::Infallible;
use std::net::SocketAddr;

// Client address as seen by the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // first hop of X-Forwarded-For wins when behind a proxy
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty());

        if let Some(ip) = forwarded {
            return Ok(ClientIp(ip.to_string()));
        }

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(ClientIp(peer.unwrap_or_else(|| "unknown".to_string())))
    }
}

// Opaque identity for rate limiting (hash of salt + ip), raw IPs are never stored
pub fn identity_hash(salt: &str, ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(ip);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> ClientIp {
        let (mut parts, _) = request.into_parts();
        ClientIp::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn prefers_first_forwarded_hop() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await, ClientIp("203.0.113.7".to_string()));
    }

    #[tokio::test]
    async fn falls_back_to_peer_address() {
        let mut request = Request::builder().body(()).unwrap();
        let addr: SocketAddr = "198.51.100.4:5555".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(extract(request).await, ClientIp("198.51.100.4".to_string()));
    }

    #[tokio::test]
    async fn unknown_without_any_source() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(extract(request).await, ClientIp("unknown".to_string()));
    }

    #[test]
    fn hash_is_stable_and_salted() {
        let a = identity_hash("salt", "203.0.113.7");
        assert_eq!(a, identity_hash("salt", "203.0.113.7"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, identity_hash("other", "203.0.113.7"));
        assert_ne!(a, identity_hash("salt", "203.0.113.8"));
    }
}
