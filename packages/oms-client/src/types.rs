//! Plain request/response values exchanged with an [`HttpExecutor`](crate::HttpExecutor).

use std::collections::HashMap;

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::Credentials;

/// The verbs the object memory REST interface uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => http::Method::GET,
            Method::POST => http::Method::POST,
            Method::PUT => http::Method::PUT,
            Method::DELETE => http::Method::DELETE,
        }
    }
}

/// Request payload. The server takes JSON for structured resources and
/// plain text for ACL entries.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL of the resource.
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn with_json_body(mut self, body: impl Serialize) -> Result<Self, serde_json::Error> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    pub fn with_text_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach HTTP Basic authorization when credentials are present.
    pub fn with_credentials(self, credentials: Option<&Credentials>) -> Self {
        let Some(creds) = credentials else {
            return self;
        };
        let token = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", creds.username, creds.password));
        self.with_header("Authorization", format!("Basic {}", token))
    }
}

/// What came back, whatever the status.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase, e.g. "Not Found".
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body_text: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_become_basic_auth() {
        let creds = Credentials::new("alice", "secret");
        let request = HttpRequest::delete("http://oms/rest/a").with_credentials(Some(&creds));
        // "alice:secret"
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Basic YWxpY2U6c2VjcmV0")
        );
    }

    #[test]
    fn anonymous_request_has_no_auth_header() {
        let request = HttpRequest::get("http://oms/mgmt/memoryList").with_credentials(None);
        assert!(request.headers.is_empty());
        assert_eq!(request.method, Method::GET);
    }

    #[test]
    fn response_json_parses_body_text() {
        let response = HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: HashMap::new(),
            body_text: r#"["a","b"]"#.to_string(),
        };
        assert!(response.is_success());
        let names: Vec<String> = response.json().unwrap();
        assert_eq!(names, vec!["a", "b"]);
    }
}
