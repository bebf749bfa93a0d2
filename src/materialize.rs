//! Response materialization.
//!
//! After the chain unwinds, status and body may each still be unset. The
//! [`Materializer`] settles them deterministically, in this order:
//!
//! | status, body | status | body | content-type default |
//! |---|---|---|---|
//! | both unset | 404 | `"Not Found"` | `text/plain` |
//! | body `null`, status unset, no content-type | 204 | none | removed |
//! | body is a string | as set, else 200 | unchanged | `text/plain` |
//! | body is array / object / bool | as set, else 200 | unchanged | `application/json` |
//! | status is 204 | 204 | none | removed |
//! | anything else | as set, else 200 | unchanged | `application/octet-stream` |
//!
//! A content-type set by middleware always beats a default. The resulting
//! status must lie in `100..=599`; anything else is an error, never clamped.

use http::StatusCode;

use crate::error::{Error, Result};
use crate::headers::{HeaderMap, names};
use crate::host::HostResponse;
use crate::response::{Body, ContentType, Response};

const STATUS_MIN: u16 = 100;
const STATUS_MAX: u16 = 599;

const NOT_FOUND_TEXT: &str = "Not Found";

/// How a 204 treats a body and content-type that middleware set explicitly.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NoContentPolicy {
    /// Any 204 drops the body and the content-type header.
    #[default]
    Strip,
    /// Only a 204 derived from a `null` body drops them. A status of 204 set
    /// by middleware leaves body and content-type as they were.
    Preserve,
}

/// The definite response, ready for the wire.
#[derive(Debug)]
pub struct Materialized {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Option<Body>,
}

impl Materialized {
    /// Copies the result onto the host's output sink.
    pub fn write_to(self, sink: &mut HostResponse) {
        HeaderMap::wrap(&mut sink.headers).extend_from(&self.headers);
        sink.status_code = self.status;
        sink.body = self.body;
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Materializer {
    no_content: NoContentPolicy,
}

impl Materializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_content(mut self, policy: NoContentPolicy) -> Self {
        self.no_content = policy;
        self
    }

    pub fn policy(&self) -> NoContentPolicy {
        self.no_content
    }

    pub fn materialize(&self, response: Response) -> Result<Materialized> {
        let (status, mut body, mut headers) = response.into_parts();
        let explicit_status = status.is_some();
        let mut status = status;
        let mut content_type = headers
            .get(names::CONTENT_TYPE)
            .filter(|ct| !ct.is_empty())
            .map(str::to_owned);

        if body.is_none() && status.is_none() {
            status = Some(StatusCode::NOT_FOUND.as_u16());
            if content_type.is_none() {
                content_type = Some(ContentType::Text.as_str().to_owned());
                body = Some(Body::from(NOT_FOUND_TEXT));
            }
        } else if body.as_ref().is_some_and(Body::is_null) {
            if content_type.is_none() && status.is_none() {
                status = Some(StatusCode::NO_CONTENT.as_u16());
                body = None;
            }
        } else if let Some(b) = &body {
            if content_type.is_none() {
                content_type = b.implied_content_type().map(|ct| ct.as_str().to_owned());
            }
        }

        let status = status.unwrap_or(StatusCode::OK.as_u16());
        if status == StatusCode::NO_CONTENT.as_u16() {
            if self.no_content == NoContentPolicy::Strip || !explicit_status {
                body = None;
                content_type = None;
            }
        } else if content_type.is_none() {
            content_type = Some(ContentType::OctetStream.as_str().to_owned());
        }

        if !(STATUS_MIN..=STATUS_MAX).contains(&status) {
            return Err(Error::InvalidStatus(status));
        }

        match content_type {
            Some(ct) => {
                headers.set(names::CONTENT_TYPE, ct);
            }
            None => {
                headers.remove(names::CONTENT_TYPE);
            }
        }

        Ok(Materialized { status, headers, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: Option<u16>, body: Option<Body>, headers: &[(&str, &str)]) -> Response {
        let mut res = Response::default();
        if let Some(s) = status {
            res.set_status(s);
        }
        if let Some(b) = body {
            res.set_body(b);
        }
        for (k, v) in headers {
            res.set_header(*k, *v);
        }
        res
    }

    fn run(res: Response) -> Materialized {
        Materializer::new().materialize(res).unwrap()
    }

    #[test]
    fn nothing_set_is_not_found() {
        let out = run(response(None, None, &[]));
        assert_eq!(out.status, 404);
        assert_eq!(out.body, Some(Body::from("Not Found")));
        assert_eq!(out.headers.get("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn only_content_type_is_empty_not_found() {
        let out = run(response(None, None, &[("content-type", "application/octet-stream")]));
        assert_eq!(out.status, 404);
        assert_eq!(out.body, None);
        assert_eq!(out.headers.get("content-type"), Some("application/octet-stream"));
    }

    #[test]
    fn null_body_is_no_content() {
        let out = run(response(None, Some(Body::null()), &[]));
        assert_eq!(out.status, 204);
        assert_eq!(out.body, None);
        assert!(!out.headers.has("content-type"));
    }

    #[test]
    fn null_body_with_status_keeps_null() {
        let out = run(response(Some(200), Some(Body::null()), &[]));
        assert_eq!(out.status, 200);
        assert_eq!(out.body, Some(Body::null()));
        assert_eq!(out.headers.get("content-type"), Some("application/octet-stream"));
    }

    #[test]
    fn null_body_with_content_type_keeps_null() {
        let out = run(response(None, Some(Body::null()), &[("Content-Type", "application/json")]));
        assert_eq!(out.status, 200);
        assert_eq!(out.body, Some(Body::null()));
        assert_eq!(out.headers.iter().collect::<Vec<_>>(), vec![("Content-Type", "application/json")]);
    }

    #[test]
    fn string_body_is_text() {
        let out = run(response(None, Some(Body::from("hello")), &[]));
        assert_eq!(out.status, 200);
        assert_eq!(out.body, Some(Body::from("hello")));
        assert_eq!(out.headers.get("content-type"), Some("text/plain"));
    }

    #[test]
    fn structured_bodies_are_json() {
        for body in [json!({ "ok": true }), json!([1, 2, 3, 4]), json!(true)] {
            let out = run(response(None, Some(Body::from(body.clone())), &[]));
            assert_eq!(out.status, 200);
            assert_eq!(out.body, Some(Body::from(body)));
            assert_eq!(out.headers.get("content-type"), Some("application/json"));
        }
    }

    #[test]
    fn other_bodies_are_octet_stream() {
        for body in [Body::from(json!(42)), Body::from(vec![1u8, 2, 3])] {
            let out = run(response(Some(201), Some(body.clone()), &[]));
            assert_eq!(out.status, 201);
            assert_eq!(out.body, Some(body));
            assert_eq!(out.headers.get("content-type"), Some("application/octet-stream"));
        }
    }

    #[test]
    fn explicit_content_type_wins() {
        let out = run(response(None, Some(Body::from("<p>hi</p>")), &[("Content-Type", "text/html")]));
        assert_eq!(out.headers.iter().collect::<Vec<_>>(), vec![("Content-Type", "text/html")]);
    }

    #[test]
    fn empty_content_type_counts_as_unset() {
        let out = run(response(None, Some(Body::from("x")), &[("content-type", "")]));
        assert_eq!(out.headers.get("content-type"), Some("text/plain"));
    }

    #[test]
    fn explicit_no_content_strips_everything() {
        let out = run(response(
            Some(204),
            Some(Body::from(json!({ "ok": true }))),
            &[("Content-Type", "application/json")],
        ));
        assert_eq!(out.status, 204);
        assert_eq!(out.body, None);
        assert!(!out.headers.has("content-type"));
    }

    #[test]
    fn preserve_policy_keeps_explicit_no_content_body() {
        let res = response(
            Some(204),
            Some(Body::from(json!({ "ok": true }))),
            &[("Content-Type", "application/json")],
        );
        let out = Materializer::new()
            .no_content(NoContentPolicy::Preserve)
            .materialize(res)
            .unwrap();
        assert_eq!(out.status, 204);
        assert_eq!(out.body, Some(Body::from(json!({ "ok": true }))));
        assert_eq!(out.headers.get("content-type"), Some("application/json"));
    }

    #[test]
    fn preserve_policy_still_strips_derived_no_content() {
        let out = Materializer::new()
            .no_content(NoContentPolicy::Preserve)
            .materialize(response(None, Some(Body::null()), &[]))
            .unwrap();
        assert_eq!(out.status, 204);
        assert_eq!(out.body, None);
        assert!(!out.headers.has("content-type"));
    }

    #[test]
    fn other_headers_pass_through() {
        let out = run(response(Some(201), Some(Body::from("made")), &[("Location", "/things/1"), ("X-Trace", "abc")]));
        assert_eq!(
            out.headers.iter().collect::<Vec<_>>(),
            vec![("Location", "/things/1"), ("X-Trace", "abc"), ("content-type", "text/plain")]
        );
    }

    #[test]
    fn out_of_range_status_is_an_error() {
        for status in [650, 99, 0, 600] {
            let err = Materializer::new().materialize(response(Some(status), Some(Body::from("x")), &[])).unwrap_err();
            assert!(matches!(err, Error::InvalidStatus(s) if s == status));
        }
        // bounds are inclusive
        assert_eq!(run(response(Some(100), None, &[])).status, 100);
        assert_eq!(run(response(Some(599), None, &[])).status, 599);
    }

    #[test]
    fn writes_onto_sink() {
        let mut sink = HostResponse {
            headers: vec![("x-host".into(), "1".into())],
            ..HostResponse::default()
        };
        let out = run(response(None, Some(Body::from(json!({ "ok": true }))), &[("X-Host", "2")]));
        out.write_to(&mut sink);
        assert_eq!(sink.status_code, 200);
        assert_eq!(sink.body, Some(Body::from(json!({ "ok": true }))));
        assert_eq!(
            sink.headers,
            vec![
                ("x-host".to_owned(), "2".to_owned()),
                ("content-type".to_owned(), "application/json".to_owned()),
            ]
        );
    }
}
