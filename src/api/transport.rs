//! Purpose: Define the HTTP transport seam and its blocking ureq implementation.
//! Exports: `Transport`, `TransportResponse`, `UreqTransport`, `urlencode`.
//! Role: Black-box boundary between the facade and connection handling.
//! Invariants: Non-2xx statuses are returned, not errored; status policy
//! belongs to the facade.
//! Invariants: Transport-level failures map to `ErrorKind::Io` with source.

use crate::core::error::{ApiResult, Error, ErrorKind};
use std::io::Read;

/// One complete HTTP exchange as seen by the facade.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Case-insensitive response header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Blocking request/response capability. The facade depends only on this
/// contract; TLS, redirects, and timeouts live behind it.
pub trait Transport {
    fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<&[u8]>,
        headers: &[(String, String)],
    ) -> ApiResult<TransportResponse>;
}

pub struct UreqTransport {
    agent: ureq::Agent,
    debug: bool,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            debug: false,
        }
    }

    /// Enable verbose request/response tracing.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<&[u8]>,
        headers: &[(String, String)],
    ) -> ApiResult<TransportResponse> {
        let mut request = self.agent.request(method, uri);
        for (name, value) in headers {
            request = request.set(name, value);
        }
        if self.debug {
            tracing::debug!(method, uri, "dispatching request");
        }

        let result = match body {
            Some(payload) => request.send_bytes(payload),
            None => request.call(),
        };
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => {
                return Err(Error::new(ErrorKind::Io)
                    .with_message("request failed")
                    .with_source(err));
            }
        };

        let status = response.status();
        let response_headers = response
            .headers_names()
            .into_iter()
            .filter_map(|name| {
                response
                    .header(&name)
                    .map(|value| (name.clone(), value.to_string()))
            })
            .collect();
        let mut payload = Vec::new();
        response.into_reader().read_to_end(&mut payload).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read response body")
                .with_source(err)
        })?;
        if self.debug {
            tracing::debug!(status, bytes = payload.len(), "response received");
        }

        Ok(TransportResponse {
            status,
            headers: response_headers,
            body: payload,
        })
    }
}

/// Encode query or form parameters as `application/x-www-form-urlencoded`.
pub fn urlencode(params: &[(&str, &str)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in params {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::{TransportResponse, urlencode};

    #[test]
    fn urlencode_escapes_reserved_characters() {
        let encoded = urlencode(&[("pixel", "a b&c"), ("offset", "1")]);
        assert_eq!(encoded, "pixel=a+b%26c&offset=1");
    }

    #[test]
    fn urlencode_keeps_empty_values() {
        assert_eq!(urlencode(&[("pixel", "")]), "pixel=");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = TransportResponse {
            status: 405,
            headers: vec![("Allowed".to_string(), "GET, POST".to_string())],
            body: Vec::new(),
        };
        assert_eq!(response.header("allowed"), Some("GET, POST"));
        assert_eq!(response.header("Retry-After"), None);
    }
}
