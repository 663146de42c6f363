//! REST client for an object memory server.

use serde_json::json;
use url::Url;

use crate::error::Error;
use crate::executor::{HttpExecutor, ReqwestExecutor};
use crate::model::Block;
use crate::store::{BlockFieldUpdate, Credentials, ObjectMemoryStore, OwnerCredentials};
use crate::types::{HttpRequest, HttpResponse};

/// `ObjectMemoryStore` over the server's REST interface.
///
/// Memories live under `{base}/rest/{memory}`; server management
/// endpoints under `{base}/mgmt`.
pub struct RestOmsClient<E: HttpExecutor = ReqwestExecutor> {
    base: Url,
    executor: E,
}

impl RestOmsClient<ReqwestExecutor> {
    /// Create a client with the default reqwest executor.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Self::with_executor(base_url, ReqwestExecutor::with_default_timeout()?)
    }
}

impl<E: HttpExecutor> RestOmsClient<E> {
    pub fn with_executor(base_url: &str, executor: E) -> Result<Self, Error> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                message: format!("{} cannot be used as a base URL", base_url),
            });
        }
        Ok(Self { base, executor })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// URL of a memory, which is also its primary id.
    pub fn memory_url(&self, memory: &str) -> Result<String, Error> {
        self.url_for(&["rest", memory])
    }

    fn url_for(&self, segments: &[&str]) -> Result<String, Error> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl {
                message: self.base.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url.to_string())
    }

    fn send(&self, request: HttpRequest, resource: &str) -> Result<HttpResponse, Error> {
        tracing::debug!(method = ?request.method, url = %request.url, "oms request");
        let response = self.executor.execute(&request)?;
        expect_success(response, resource)
    }
}

fn expect_success(response: HttpResponse, resource: &str) -> Result<HttpResponse, Error> {
    if response.is_success() {
        return Ok(response);
    }
    if response.status == 404 {
        return Err(Error::NotFound {
            resource: resource.to_string(),
        });
    }
    let body = response.body_text.trim();
    let message = if body.is_empty() {
        response.status_text.clone()
    } else {
        body.to_string()
    };
    Err(Error::Rejected {
        status: response.status,
        message,
    })
}

/// Parse a memory list body.
///
/// Accepts a JSON string array as well as the looser `[a, b]` form some
/// servers emit. Empty names are dropped.
pub(crate) fn parse_memory_list(body: &str) -> Vec<String> {
    let names = match serde_json::from_str::<Vec<String>>(body) {
        Ok(names) => names,
        Err(_) => body
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .map(|name| name.trim().trim_matches('"').to_string())
            .collect(),
    };
    names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

impl<E: HttpExecutor> ObjectMemoryStore for RestOmsClient<E> {
    fn memory_names(&self) -> Result<Vec<String>, Error> {
        let url = self.url_for(&["mgmt", "memoryList"])?;
        let response = self.send(HttpRequest::get(url), "memory list")?;
        Ok(parse_memory_list(&response.body_text))
    }

    fn owner(&self, memory: &str) -> Result<String, Error> {
        let url = self.url_for(&["rest", memory, "mgmt", "owner"])?;
        let response = self.send(HttpRequest::get(url), memory)?;
        Ok(response
            .body_text
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    fn blocks(&self, memory: &str) -> Result<Vec<Block>, Error> {
        let url = self.url_for(&["rest", memory, "blocks"])?;
        let response = self.send(HttpRequest::get(url), memory)?;
        if response.body_text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(response.json()?)
    }

    fn block(&self, memory: &str, id: &str) -> Result<Option<Block>, Error> {
        let url = self.url_for(&["rest", memory, "blocks", id])?;
        match self.send(HttpRequest::get(url), id) {
            Ok(response) => Ok(Some(response.json()?)),
            Err(Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn create_memory(
        &self,
        name: &str,
        owner: &OwnerCredentials,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error> {
        let url = self.url_for(&["mgmt", "createMemory"])?;
        let body = json!({
            "header": { "primaryId": self.memory_url(name)? },
            "owner": owner,
        });
        let request = HttpRequest::post(url)
            .with_json_body(body)?
            .with_credentials(credentials);
        self.send(request, name)?;
        Ok(())
    }

    fn delete_memory(&self, name: &str, credentials: Option<&Credentials>) -> Result<(), Error> {
        let request = HttpRequest::delete(self.memory_url(name)?).with_credentials(credentials);
        self.send(request, name)?;
        Ok(())
    }

    fn create_block(
        &self,
        memory: &str,
        block: &Block,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error> {
        let url = self.url_for(&["rest", memory, "blocks"])?;
        let request = HttpRequest::post(url)
            .with_json_body(block)?
            .with_credentials(credentials);
        self.send(request, memory)?;
        Ok(())
    }

    fn delete_block(
        &self,
        memory: &str,
        id: &str,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error> {
        let url = self.url_for(&["rest", memory, "blocks", id])?;
        self.send(HttpRequest::delete(url).with_credentials(credentials), id)?;
        Ok(())
    }

    fn set_acl(
        &self,
        memory: &str,
        acl_xml: &str,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error> {
        let url = self.url_for(&["rest", memory, "mgmt", "acl"])?;
        let request = HttpRequest::put(url)
            .with_text_body(acl_xml)
            .with_credentials(credentials);
        self.send(request, memory)?;
        Ok(())
    }

    fn set_owner(
        &self,
        memory: &str,
        owner: &OwnerCredentials,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error> {
        let url = self.url_for(&["rest", memory, "mgmt", "owner"])?;
        let request = HttpRequest::put(url)
            .with_json_body(owner)?
            .with_credentials(credentials);
        self.send(request, memory)?;
        Ok(())
    }

    fn update_block_field(
        &self,
        memory: &str,
        id: &str,
        update: BlockFieldUpdate,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error> {
        let url = self.url_for(&["rest", memory, "blocks", id, update.field_name()])?;
        let request = match &update {
            BlockFieldUpdate::Description(text) | BlockFieldUpdate::Title(text) => {
                HttpRequest::put(url).with_json_body(text)?
            }
            BlockFieldUpdate::Payload(value) => HttpRequest::put(url).with_json_body(value)?,
            BlockFieldUpdate::Link(link) => HttpRequest::put(url).with_json_body(link)?,
        };
        self.send(request.with_credentials(credentials), id)?;
        Ok(())
    }
}
