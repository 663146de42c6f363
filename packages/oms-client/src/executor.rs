//! The transport seam.
//!
//! `RestOmsClient` builds [`HttpRequest`]s and hands them to an
//! [`HttpExecutor`], so the REST mapping can run against canned responses
//! without a server.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};

use crate::error::Error;
use crate::types::{HttpRequest, HttpResponse, RequestBody};

pub trait HttpExecutor: Send + Sync {
    /// Perform one round trip.
    ///
    /// Non-2xx answers are returned as `Ok`; only transport failures are `Err`.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, Error>;
}

/// Blocking reqwest client with a fixed per-request timeout.
pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// 30 second timeout.
    pub fn with_default_timeout() -> Result<Self, Error> {
        Self::new(Duration::from_secs(30))
    }

    fn build(&self, request: &HttpRequest) -> Result<RequestBuilder, Error> {
        let mut builder = self.client.request(request.method.into(), &request.url);
        for (name, value) in &request.headers {
            let invalid = |e: &dyn std::fmt::Display| Error::InvalidHeader {
                message: format!("{}: {}", name, e),
            };
            let name = HeaderName::try_from(name.as_str()).map_err(|e| invalid(&e))?;
            let value = HeaderValue::try_from(value.as_str()).map_err(|e| invalid(&e))?;
            builder = builder.header(name, value);
        }
        Ok(match &request.body {
            Some(RequestBody::Json(body)) => builder.json(body),
            Some(RequestBody::Text(text)) => builder
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(text.clone()),
            None => builder,
        })
    }
}

impl HttpExecutor for ReqwestExecutor {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let response = self.build(request)?.send()?;

        let status = response.status();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
            .collect();

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            headers,
            body_text: response.text()?,
        })
    }
}

/// Canned responses keyed by method and URL.
#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::types::Method;
    use std::sync::{Arc, Mutex};

    /// Answers 404 to anything it has no response for.
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        responses: Arc<Mutex<HashMap<(Method, String), HttpResponse>>>,
        recorded: Arc<Mutex<Vec<HttpRequest>>>,
        /// Every request fails with this transport error when set.
        failure: Arc<Mutex<Option<String>>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(
            self,
            method: Method,
            url: impl Into<String>,
            response: HttpResponse,
        ) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert((method, url.into()), response);
            self
        }

        pub fn fail_with(self, message: impl Into<String>) -> Self {
            *self.failure.lock().unwrap() = Some(message.into());
            self
        }

        pub fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.recorded.lock().unwrap().clone()
        }

        pub fn ok(body: impl Into<String>) -> HttpResponse {
            Self::status(200, "OK", body)
        }

        pub fn status(status: u16, text: &str, body: impl Into<String>) -> HttpResponse {
            HttpResponse {
                status,
                status_text: text.to_string(),
                headers: HashMap::new(),
                body_text: body.into(),
            }
        }
    }

    impl HttpExecutor for MockExecutor {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
            self.recorded.lock().unwrap().push(request.clone());

            if let Some(message) = self.failure.lock().unwrap().clone() {
                return Err(Error::Unreachable { message });
            }

            let key = (request.method, request.url.clone());
            Ok(self
                .responses
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .unwrap_or_else(|| Self::status(404, "Not Found", "")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockExecutor;
    use super::*;
    use crate::types::Method;

    #[test]
    fn mock_executor_matches_method_and_url() {
        let executor = MockExecutor::new()
            .with_response(Method::GET, "http://oms/x", MockExecutor::ok("get"))
            .with_response(Method::DELETE, "http://oms/x", MockExecutor::ok("delete"));

        let get = executor.execute(&HttpRequest::get("http://oms/x")).unwrap();
        let delete = executor.execute(&HttpRequest::delete("http://oms/x")).unwrap();

        assert_eq!(get.body_text, "get");
        assert_eq!(delete.body_text, "delete");
    }

    #[test]
    fn mock_executor_returns_404_when_no_match() {
        let executor = MockExecutor::new();
        let result = executor.execute(&HttpRequest::get("http://oms/none")).unwrap();
        assert_eq!(result.status, 404);
    }

    #[test]
    fn mock_executor_fails_when_configured() {
        let executor = MockExecutor::new().fail_with("Network error");
        let result = executor.execute(&HttpRequest::get("http://oms/any"));
        assert!(result.unwrap_err().is_unreachable());
        assert_eq!(executor.recorded_requests().len(), 1);
    }

    #[test]
    fn reqwest_executor_creation() {
        assert!(ReqwestExecutor::with_default_timeout().is_ok());
        assert!(ReqwestExecutor::new(Duration::from_secs(5)).is_ok());
    }
}
