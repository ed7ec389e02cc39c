use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Best-effort client address, for telemetry only. Forwarded headers win over
/// the socket peer so the value survives a reverse proxy.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
        .unwrap_or_else(|| peer.ip().to_string())
}

/// The raw upstream protocol escapes line breaks in generated markdown; undo
/// that before the text reaches the client.
pub fn normalize_markdown_content(content: &str) -> String {
    content.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "10.0.0.7:52100".parse().unwrap()
    }

    #[test]
    fn prefers_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.5, 198.51.100.2"),
        );
        assert_eq!(client_ip(&headers, peer()), "203.0.113.5");
    }

    #[test]
    fn falls_back_to_real_ip_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.9"));
        assert_eq!(client_ip(&headers, peer()), "198.51.100.9");
    }

    #[test]
    fn falls_back_to_socket_peer() {
        assert_eq!(client_ip(&HeaderMap::new(), peer()), "10.0.0.7");
    }

    #[test]
    fn unescapes_literal_newlines() {
        assert_eq!(normalize_markdown_content("a\\nb"), "a\nb");
        assert_eq!(normalize_markdown_content("plain"), "plain");
    }
}
