//! Purpose: Provide the client facade for the Yandex Audience management API.
//! Exports: `AudienceClient`.
//! Role: Orchestrates auth, headers, URI building, dispatch, and record mapping.
//! Invariants: Each operation issues exactly one request (a server-bounded
//! sequence for paged lists) and surfaces every failure synchronously.
//! Invariants: 401/403/404/405 map to dedicated error kinds before the
//! payload is decoded; all other statuses fall through to payload decoding.

use crate::api::segment::{Segment, SegmentFile};
use crate::api::transport::{Transport, UreqTransport, urlencode};
use crate::core::decode::Decoded;
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::page::{PageQuery, fetch_all_pages};
use serde::Serialize;

pub const HOST: &str = "https://api-audience.yandex.ru/";
pub const OAUTH_TOKEN_URL: &str = "https://oauth.yandex.ru/token";

const VERSION: &str = "v1";
const DEFAULT_USER_AGENT: &str = "yaaudience";

fn management_path(suffix: &str) -> String {
    format!("{VERSION}/management/{suffix}")
}

#[derive(Serialize)]
struct ConfirmRequest<'a> {
    segment: ConfirmSegment<'a>,
}

#[derive(Serialize)]
struct ConfirmSegment<'a> {
    id: i64,
    name: &'a str,
    hashed: u8,
    content_type: &'a str,
}

/// Blocking client for segment management. Holds a lazily populated bearer
/// token and the raw payload of the most recent response.
pub struct AudienceClient {
    transport: Box<dyn Transport>,
    token: Option<String>,
    user_agent: String,
    oauth_params: Vec<(String, String)>,
    data: Vec<u8>,
}

impl AudienceClient {
    pub fn new() -> Self {
        Self {
            transport: Box::new(UreqTransport::new()),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            oauth_params: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    /// Form parameters posted to the OAuth token endpoint by `authorize`.
    /// Flow details are the caller's business; this client only stores the
    /// resulting token.
    pub fn set_oauth_params(&mut self, params: &[(&str, &str)]) {
        self.oauth_params = params
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
    }

    /// Raw payload of the most recent response.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// POST the configured OAuth parameters to the token endpoint and store
    /// the returned `access_token`, if any.
    pub fn authorize(&mut self) -> ApiResult<()> {
        let params: Vec<(&str, &str)> = self
            .oauth_params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        let body = urlencode(&params);
        let decoded = self.request_raw("POST", OAUTH_TOKEN_URL, Some(body.as_bytes()))?;
        if let Some(token) = decoded.str_field("access_token") {
            self.token = Some(token.to_string());
        }
        Ok(())
    }

    /// List existing segments, paging until the server-reported total is
    /// covered.
    pub fn segments(&mut self, pixel: &str) -> ApiResult<Vec<Segment>> {
        let path = management_path("segments");
        let combined = fetch_all_pages("segments", &[], PageQuery::default(), |offset, per_page| {
            let uri = build_uri(
                &path,
                &[
                    ("pixel", pixel),
                    ("offset", &offset.to_string()),
                    ("per_page", &per_page.to_string()),
                ],
            );
            self.dispatch("GET", &uri, None)
        })?;
        combined
            .array("segments")
            .ok_or_else(|| missing_field("segments"))?
            .iter()
            .map(Segment::from_value)
            .collect()
    }

    /// Upload a segment file as the raw request body.
    pub fn upload_segment_file(&mut self, file: &[u8]) -> ApiResult<SegmentFile> {
        self.upload(&management_path("segments/upload_file"), file)
    }

    /// Upload a segment CSV file as the raw request body.
    pub fn upload_segment_csv_file(&mut self, file: &[u8]) -> ApiResult<SegmentFile> {
        self.upload(&management_path("segments/upload_csv_file"), file)
    }

    /// Confirm a segment created from an uploaded file.
    pub fn confirm_segment(
        &mut self,
        id: i64,
        name: &str,
        content_type: &str,
        hashed: bool,
    ) -> ApiResult<Segment> {
        let payload = serde_json::to_vec(&ConfirmRequest {
            segment: ConfirmSegment {
                id,
                name,
                hashed: u8::from(hashed),
                content_type,
            },
        })
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode request json")
                .with_source(err)
        })?;
        let uri = build_uri(&management_path(&format!("segment/{id}/confirm")), &[]);
        let decoded = self.dispatch("POST", &uri, Some(&payload))?;
        Segment::from_value(decoded.get("segment").ok_or_else(|| missing_field("segment"))?)
    }

    /// Delete a segment; returns the response's `success` flag.
    pub fn delete_segment(&mut self, id: i64) -> ApiResult<bool> {
        let uri = build_uri(&management_path(&format!("segment/{id}")), &[]);
        let decoded = self.dispatch("DELETE", &uri, None)?;
        decoded
            .bool_field("success")
            .ok_or_else(|| missing_field("success"))
    }

    fn upload(&mut self, path: &str, file: &[u8]) -> ApiResult<SegmentFile> {
        let uri = build_uri(path, &[]);
        let decoded = self.dispatch("POST", &uri, Some(file))?;
        SegmentFile::from_value(decoded.get("segment").ok_or_else(|| missing_field("segment"))?)
    }

    fn dispatch(&mut self, method: &str, uri: &str, body: Option<&[u8]>) -> ApiResult<Decoded> {
        if self.token.is_none() {
            self.authorize()?;
        }
        self.request_raw(method, uri, body)
    }

    fn request_raw(&mut self, method: &str, uri: &str, body: Option<&[u8]>) -> ApiResult<Decoded> {
        let headers = self.headers();
        let response = self.transport.request(method, uri, body, &headers)?;
        self.data = response.body.clone();
        tracing::debug!(method, uri, status = response.status, "request complete");

        match response.status {
            401 => Err(Error::new(ErrorKind::Unauthorized)
                .with_status(401)
                .with_message("401: Check your token")),
            403 => Err(Error::new(ErrorKind::Forbidden)
                .with_status(403)
                .with_message("403: Check your access rights to object")),
            404 => Err(Error::new(ErrorKind::NotFound)
                .with_status(404)
                .with_message("404: Resource not found")),
            405 => {
                let allowed = response.header("Allowed").unwrap_or_default().to_string();
                Err(Error::new(ErrorKind::MethodNotAllowed)
                    .with_status(405)
                    .with_message(format!("405: Method not allowed\nUse {allowed}")))
            }
            // 400 and every other unmapped status fall through to payload
            // decoding; only an error-shaped body surfaces as an Api error.
            _ => Decoded::from_bytes(&response.body),
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        let token = self.token.as_deref().unwrap_or("");
        vec![
            ("User-Agent".to_string(), self.user_agent.clone()),
            (
                "Accept".to_string(),
                "application/x-yaaudience+json".to_string(),
            ),
            (
                "Accept-Language".to_string(),
                "ru,en-us;q=0.7,en;q=0.3".to_string(),
            ),
            ("Accept-Encoding".to_string(), "gzip,deflate".to_string()),
            (
                "Accept-Charset".to_string(),
                "utf-8;q=0.7,*;q=0.7".to_string(),
            ),
            ("Keep-Alive".to_string(), "300".to_string()),
            ("Connection".to_string(), "keep-alive".to_string()),
            ("Authorization".to_string(), format!("OAuth {token}")),
        ]
    }
}

impl Default for AudienceClient {
    fn default() -> Self {
        Self::new()
    }
}

fn build_uri(path: &str, params: &[(&str, &str)]) -> String {
    let mut uri = format!("{HOST}{path}.json");
    if !params.is_empty() {
        uri.push('?');
        uri.push_str(&urlencode(params));
    }
    uri
}

fn missing_field(field: &str) -> Error {
    Error::new(ErrorKind::Internal)
        .with_message("response missing expected field")
        .with_field(field)
}
