//! Lookup providers: the HTTP transport seam and the ipinfo.io payload parser.

use super::types::{Coordinate, LocationInfo, LookupError, TransportError};
use serde_json::Value;

const USER_AGENT: &str = "locmap/0.3";

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single GET. Implementations must not retry.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

// ─── ureq transport ─────────────────────────────────────────────

/// Blocking transport backed by `ureq` with its default timeouts.
#[derive(Debug, Default, Clone, Copy)]
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        match ureq::get(url).set("User-Agent", USER_AGENT).call() {
            Ok(response) => {
                let status = response.status();
                let body = response
                    .into_string()
                    .map_err(|e| TransportError(e.to_string()))?;
                Ok(HttpResponse { status, body })
            }
            // ureq reports 4xx/5xx as errors; to us they are completed responses.
            // The body of a failed status is never inspected.
            Err(ureq::Error::Status(status, _)) => Ok(HttpResponse {
                status,
                body: String::new(),
            }),
            Err(ureq::Error::Transport(t)) => Err(TransportError(t.to_string())),
        }
    }
}

// ─── ipinfo.io payload ──────────────────────────────────────────

/// Parse an ipinfo.io JSON body into a [`LocationInfo`].
pub fn parse_ipinfo(body: &str) -> Result<LocationInfo, LookupError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| LookupError::Malformed(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| LookupError::Malformed("body is not a JSON object".into()))?;

    let loc = match object.get("loc") {
        None | Some(Value::Null) => return Err(LookupError::MissingLocation),
        Some(Value::String(s)) if s.trim().is_empty() => return Err(LookupError::MissingLocation),
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(LookupError::Malformed(format!("'loc' is not a string: {}", other)))
        }
    };

    let coordinate = parse_loc(loc)?;

    Ok(LocationInfo {
        city: text_field(object.get("city")),
        region: text_field(object.get("region")),
        country: text_field(object.get("country")),
        coordinate,
    })
}

/// Parse `"lat,lng"`.
pub fn parse_loc(loc: &str) -> Result<Coordinate, LookupError> {
    let mut parts = loc.split(',');
    let (lat, lng) = match (parts.next(), parts.next(), parts.next()) {
        (Some(lat), Some(lng), None) => (lat.trim(), lng.trim()),
        _ => return Err(LookupError::Malformed(format!("'loc' is not \"lat,lng\": '{}'", loc))),
    };

    let lat: f64 = lat
        .parse()
        .map_err(|_| LookupError::Malformed(format!("bad latitude '{}'", lat)))?;
    let lng: f64 = lng
        .parse()
        .map_err(|_| LookupError::Malformed(format!("bad longitude '{}'", lng)))?;

    Coordinate::new(lat, lng)
        .ok_or_else(|| LookupError::Malformed(format!("coordinate out of range: {}, {}", lat, lng)))
}

fn text_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one canned HTTP response on a loopback port.
    fn one_shot_server(response: &'static str) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/json", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let mut request = Vec::new();
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
        });
        (url, handle)
    }

    #[test]
    fn test_ureq_ok_response() {
        let (url, server) = one_shot_server(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 13\r\nConnection: close\r\n\r\n{\"loc\":\"1,2\"}",
        );
        let response = UreqTransport.get(&url).unwrap();
        server.join().unwrap();
        assert_eq!(response, HttpResponse { status: 200, body: r#"{"loc":"1,2"}"#.to_string() });
    }

    #[test]
    fn test_ureq_error_status_is_a_response() {
        let (url, server) = one_shot_server(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 13\r\nConnection: close\r\n\r\n{\"loc\":\"1,2\"}",
        );
        let response = UreqTransport.get(&url).unwrap();
        server.join().unwrap();
        assert_eq!(response.status, 500);
        assert!(!response.ok());
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_ureq_closed_port_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/json", listener.local_addr().unwrap());
        drop(listener);
        assert!(UreqTransport.get(&url).is_err());
    }

    #[test]
    fn test_parse_full_payload() {
        let body = r#"{"ip":"1.2.3.4","loc":"34.0522,-118.2437","city":"Los Angeles","region":"CA","country":"US"}"#;
        let info = parse_ipinfo(body).unwrap();
        assert_relative_eq!(info.coordinate.lat, 34.0522);
        assert_relative_eq!(info.coordinate.lng, -118.2437);
        assert_eq!(info.city.as_deref(), Some("Los Angeles"));
        assert_eq!(info.region.as_deref(), Some("CA"));
        assert_eq!(info.country.as_deref(), Some("US"));
    }

    #[test]
    fn test_parse_loc_only() {
        let info = parse_ipinfo(r#"{"loc":"0,0"}"#).unwrap();
        assert_eq!(info.coordinate, Coordinate { lat: 0.0, lng: 0.0 });
        assert!(info.city.is_none() && info.region.is_none() && info.country.is_none());
    }

    #[test]
    fn test_missing_loc() {
        assert!(matches!(parse_ipinfo(r#"{"city":"Unknown"}"#), Err(LookupError::MissingLocation)));
        assert!(matches!(parse_ipinfo(r#"{"loc":null}"#), Err(LookupError::MissingLocation)));
        assert!(matches!(parse_ipinfo(r#"{"loc":"  "}"#), Err(LookupError::MissingLocation)));
        assert!(matches!(parse_ipinfo("{}"), Err(LookupError::MissingLocation)));
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(parse_ipinfo("<html>"), Err(LookupError::Malformed(_))));
        assert!(matches!(parse_ipinfo("[1,2]"), Err(LookupError::Malformed(_))));
        assert!(matches!(parse_ipinfo(r#"{"loc":42}"#), Err(LookupError::Malformed(_))));
    }

    #[test]
    fn test_malformed_loc() {
        for loc in ["abc", "1,2,3", "12.5", "north,south", "1,", "NaN,0", "91,0", "0,181"] {
            assert!(
                matches!(parse_loc(loc), Err(LookupError::Malformed(_))),
                "expected malformed for {:?}",
                loc
            );
        }
    }

    #[test]
    fn test_loc_tolerates_spaces() {
        let c = parse_loc(" 40.7128 , -74.0060 ").unwrap();
        assert_relative_eq!(c.lat, 40.7128);
        assert_relative_eq!(c.lng, -74.006);
    }

    #[test]
    fn test_loc_bounds_inclusive() {
        assert!(parse_loc("90,180").is_ok());
        assert!(parse_loc("-90,-180").is_ok());
    }

    #[test]
    fn test_non_string_fields_are_absent() {
        let info = parse_ipinfo(r#"{"loc":"1,2","city":7,"region":null}"#).unwrap();
        assert!(info.city.is_none());
        assert!(info.region.is_none());
    }

    #[test]
    fn test_http_response_ok() {
        assert!(HttpResponse { status: 200, body: String::new() }.ok());
        assert!(HttpResponse { status: 204, body: String::new() }.ok());
        assert!(!HttpResponse { status: 301, body: String::new() }.ok());
        assert!(!HttpResponse { status: 500, body: String::new() }.ok());
    }
}
