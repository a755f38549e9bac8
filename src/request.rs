//! HTTP request sources: URL-encoded forms and JSON bodies.
//!
//! Both work on [`http::Request`] values so they plug into any server stack
//! built on the `http` crate.

use std::collections::HashMap;
use std::io::Read;
use std::sync::{Mutex, OnceLock};

use http::{Method, Request, header};
use percent_encoding::percent_decode_str;

use crate::document::Document;
use crate::error::SourceError;
use crate::source::Source;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Form values of a request as a [`Source`].
///
/// Collects the query string, plus the body when the request is a POST, PUT
/// or PATCH with content type `application/x-www-form-urlencoded`. Body
/// values come before query values.
///
/// A key that is present counts as found: its value is the first non-empty
/// value given for it, or `"1"` if every value is empty (`?verbose` or
/// `?verbose=`).
#[derive(Debug)]
pub struct Form {
    values: Result<HashMap<String, Vec<String>>, SourceError>,
}

impl Form {
    pub fn from_request<B: AsRef<[u8]>>(req: &Request<B>) -> Self {
        Self {
            values: parse_request(req),
        }
    }
}

fn parse_request<B: AsRef<[u8]>>(
    req: &Request<B>,
) -> Result<HashMap<String, Vec<String>>, SourceError> {
    let mut values: HashMap<String, Vec<String>> = HashMap::new();

    if has_form_body(req) {
        let body = std::str::from_utf8(req.body().as_ref())
            .map_err(|e| SourceError::Form(format!("body is not UTF-8: {e}")))?;
        parse_urlencoded(body, &mut values)?;
    }
    if let Some(query) = req.uri().query() {
        parse_urlencoded(query, &mut values)?;
    }
    Ok(values)
}

fn has_form_body<B>(req: &Request<B>) -> bool {
    let method = req.method();
    if method != Method::POST && method != Method::PUT && method != Method::PATCH {
        return false;
    }
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

fn parse_urlencoded(
    input: &str,
    values: &mut HashMap<String, Vec<String>>,
) -> Result<(), SourceError> {
    for pair in input.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        values
            .entry(decode_component(key)?)
            .or_default()
            .push(decode_component(value)?);
    }
    Ok(())
}

fn decode_component(raw: &str) -> Result<String, SourceError> {
    let bytes = raw.as_bytes();
    for (i, _) in raw.match_indices('%') {
        let escape = bytes.get(i + 1..i + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            return Err(SourceError::Form(format!("invalid escape in {raw:?}")));
        }
    }
    let plus_as_space = raw.replace('+', " ");
    percent_decode_str(&plus_as_space)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| SourceError::Form(format!("{raw:?} is not UTF-8: {e}")))
}

impl Source for Form {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        let values = self.values.as_ref().map_err(Clone::clone)?;
        Ok(values.get(key).map(|all| {
            all.iter()
                .find(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| "1".to_string())
        }))
    }
}

/// A JSON object request body as a [`Source`].
///
/// The body is read and parsed once, on first lookup. Like the file sources,
/// a failed read or parse is cached and returned on every lookup.
pub struct JsonBody<R> {
    reader: Mutex<Option<R>>,
    doc: OnceLock<Result<Document, SourceError>>,
}

impl<R: Read + Send> JsonBody<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(Some(reader)),
            doc: OnceLock::new(),
        }
    }

    pub fn from_request(req: Request<R>) -> Self {
        Self::new(req.into_body())
    }

    fn load(&self) -> Result<Document, SourceError> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| SourceError::Form("request body lock poisoned".into()))?
            .take();
        let Some(reader) = reader else {
            return Err(SourceError::Json {
                origin: "request body".into(),
                reason: "body already consumed".into(),
            });
        };
        let map = serde_json::from_reader(reader).map_err(|e| SourceError::Json {
            origin: "request body".into(),
            reason: e.to_string(),
        })?;
        tracing::debug!("parsed JSON request body");
        Ok(Document::Json(map))
    }
}

impl<R: Read + Send> Source for JsonBody<R> {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        match self.doc.get_or_init(|| self.load()) {
            Ok(doc) => Ok(doc.get(key)),
            Err(e) => Err(e.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUERY: &str = "A=1&B=&C=2&D&-A=really&-other&blah";

    fn assert_form(form: &Form) {
        let cases = [
            ("A", Some("1")),
            ("-A", Some("really")),
            ("B", Some("1")),
            ("C", Some("2")),
            ("D", Some("1")),
            ("E", None),
        ];
        for (key, expected) in cases {
            assert_eq!(
                form.lookup_key(key).unwrap().as_deref(),
                expected,
                "key {key}"
            );
        }
    }

    #[test]
    fn form_from_query_string() {
        let req = Request::get(format!("/?{QUERY}"))
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(Vec::new())
            .unwrap();
        assert_form(&Form::from_request(&req));
    }

    #[test]
    fn form_from_urlencoded_body() {
        let req = Request::post("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(QUERY.as_bytes().to_vec())
            .unwrap();
        assert_form(&Form::from_request(&req));
    }

    #[test]
    fn get_body_is_ignored() {
        let req = Request::get("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("A=1")
            .unwrap();
        assert_eq!(Form::from_request(&req).lookup_key("A").unwrap(), None);
    }

    #[test]
    fn body_values_come_before_query_values() {
        let req = Request::post("/?name=query")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded; charset=utf-8")
            .body("name=body")
            .unwrap();
        let form = Form::from_request(&req);
        assert_eq!(form.lookup_key("name").unwrap().as_deref(), Some("body"));
    }

    #[test]
    fn form_values_are_decoded() {
        let req = Request::get("/?greeting=hello+world&path=%2Fetc%2Fapp")
            .body(Vec::new())
            .unwrap();
        let form = Form::from_request(&req);
        assert_eq!(form.lookup_key("greeting").unwrap().as_deref(), Some("hello world"));
        assert_eq!(form.lookup_key("path").unwrap().as_deref(), Some("/etc/app"));
    }

    #[test]
    fn malformed_escape_fails_every_lookup() {
        let req = Request::get("/?A=%zz").body(Vec::new()).unwrap();
        let form = Form::from_request(&req);
        assert!(matches!(form.lookup_key("A"), Err(SourceError::Form(_))));
        assert!(matches!(form.lookup_key("B"), Err(SourceError::Form(_))));
    }

    #[test]
    fn json_body_lookup() {
        let req = Request::post("/")
            .body(r#"{"E1":"lorem ipsum", "B": 2}"#.as_bytes())
            .unwrap();
        let body = JsonBody::from_request(req);
        assert_eq!(body.lookup_key("E1").unwrap().as_deref(), Some("lorem ipsum"));
        assert_eq!(body.lookup_key("B").unwrap().as_deref(), Some("2"));
        assert_eq!(body.lookup_key("C").unwrap(), None);
    }

    #[test]
    fn malformed_json_body_keeps_failing() {
        let body = JsonBody::new("{oops".as_bytes());
        assert!(matches!(body.lookup_key("A"), Err(SourceError::Json { .. })));
        let err = body.lookup_key("A").unwrap_err();
        assert!(!err.to_string().contains("already consumed"));
    }
}
