//! Outgoing HTTP response type.
//!
//! Unlike a handler's return value, a [`Response`] is written in place: any
//! interceptor in the chain may set it, and the ones outside may rewrite it on
//! the way back out.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use tracing::warn;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`Response::bytes`].
pub enum ContentType {
    Csv,          // text/csv
    EventStream,  // text/event-stream  (SSE)
    FormData,     // application/x-www-form-urlencoded
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    MsgPack,      // application/msgpack
    OctetStream,  // application/octet-stream  (binary / file download)
    Pdf,          // application/pdf
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::EventStream => "text/event-stream",
            Self::FormData    => "application/x-www-form-urlencoded",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::MsgPack     => "application/msgpack",
            Self::OctetStream => "application/octet-stream",
            Self::Pdf         => "application/pdf",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response, filled in by interceptors.
///
/// A fresh response is *unwritten*: if nothing sets a status or a body, the
/// server answers `404 Not Found`. Writing a body without an explicit status
/// answers `200 OK`.
///
/// ```rust
/// use strata::{ContentType, Response, StatusCode};
///
/// let mut res = Response::default();
/// assert_eq!(res.status(), StatusCode::NOT_FOUND);
///
/// res.text("hello");
/// assert_eq!(res.status(), StatusCode::OK);
///
/// res.set_status(StatusCode::CREATED)
///     .set_header("location", "/users/42")
///     .bytes(ContentType::Xml, b"<ok/>".to_vec());
/// assert_eq!(res.header("Location"), Some("/users/42"));
/// ```
#[derive(Debug, Default)]
pub struct Response {
    status: Option<StatusCode>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    written: bool,
}

impl Response {
    /// A written response with no body.
    pub fn with_status(status: StatusCode) -> Self {
        let mut res = Self::default();
        res.set_status(status);
        res
    }

    /// The status that will be sent.
    pub fn status(&self) -> StatusCode {
        match self.status {
            Some(status) => status,
            None if self.written => StatusCode::OK,
            None => StatusCode::NOT_FOUND,
        }
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = Some(status);
        self.written = true;
        self
    }

    /// Whether any interceptor has set a status or a body.
    pub fn is_written(&self) -> bool { self.written }

    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Returns the first value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets `name`, replacing any existing values. Headers alone do not mark
    /// the response as written.
    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.append_header(name, value)
    }

    /// Adds a value for `name`, keeping existing ones.
    pub fn append_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// JSON body (`application/json`).
    ///
    /// Pass bytes from your serialiser directly:
    /// - serde_json: `serde_json::to_vec(&val)?`
    /// - hand-built: `format!(r#"{{"id":{id}}}"#).into_bytes()`
    pub fn json(&mut self, body: Vec<u8>) -> &mut Self {
        self.write_body("application/json", body)
    }

    /// Plain-text body (`text/plain; charset=utf-8`).
    pub fn text(&mut self, body: impl Into<String>) -> &mut Self {
        self.write_body("text/plain; charset=utf-8", body.into().into_bytes())
    }

    /// Typed body. Use this for XML, HTML, binary, SSE, etc.
    pub fn bytes(&mut self, content_type: ContentType, body: Vec<u8>) -> &mut Self {
        self.write_body(content_type.as_str(), body)
    }

    /// Discards everything written so far, headers included.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    fn write_body(&mut self, content_type: &str, body: Vec<u8>) -> &mut Self {
        self.set_header("content-type", content_type);
        self.body = body;
        self.written = true;
        self
    }

    /// Converts into the hyper response type. Headers that are not valid
    /// HTTP are dropped with a warning.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let status = self.status();
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = status;

        let headers = res.headers_mut();
        for (name, value) in self.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_response_is_not_found() {
        let res = Response::default();
        assert!(!res.is_written());
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn headers_alone_do_not_write() {
        let mut res = Response::default();
        res.set_header("x-request-id", "abc");
        assert!(!res.is_written());
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn body_without_status_is_ok() {
        let mut res = Response::default();
        res.json(br#"{"id":1}"#.to_vec());
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.body(), br#"{"id":1}"#);
    }

    #[test]
    fn later_body_replaces_content_type() {
        let mut res = Response::default();
        res.text("first").bytes(ContentType::Html, b"<p>second</p>".to_vec());
        let content_types: Vec<_> = res.headers().iter()
            .filter(|(k, _)| k == "content-type")
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn reset_discards_everything() {
        let mut res = Response::with_status(StatusCode::ACCEPTED);
        res.set_header("x-a", "1").text("partial");
        res.reset();
        assert!(!res.is_written());
        assert!(res.headers().is_empty());
        assert!(res.body().is_empty());
    }

    #[test]
    fn into_inner_keeps_valid_headers_only() {
        let mut res = Response::with_status(StatusCode::CREATED);
        res.append_header("set-cookie", "a=1")
            .append_header("set-cookie", "b=2")
            .append_header("bad header", "x")
            .text("made");

        let inner = res.into_inner();
        assert_eq!(inner.status(), StatusCode::CREATED);
        assert_eq!(inner.headers().get_all("set-cookie").iter().count(), 2);
        assert_eq!(inner.headers()["content-type"], "text/plain; charset=utf-8");
        assert_eq!(inner.headers().len(), 3);
    }
}
