//! HTTP transport for the remote run-management API (`/api/v2`).

mod jsonapi;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tfsync_core::Workspace;
use tracing::debug;
use url::Url;

use crate::context::OpContext;
use crate::error::ClientError;
use crate::traits::WorkspaceClient;
use crate::types::{ListOptions, WorkspaceCreateOptions, WorkspaceList, WorkspaceUpdateOptions};

use jsonapi::{
    Document, ErrorDocument, RequestDocument, SshKeyBody, WorkspaceBody, WorkspaceData,
};

const JSON_API: &str = "application/vnd.api+json";
const WORKSPACE: &str = "workspace";

/// Default service address.
pub const DEFAULT_ADDRESS: &str = "https://app.terraform.io";

/// Connection settings for [`TfeClient`].
#[derive(Debug, Clone)]
pub struct TfeClientConfig {
    pub address: String,
    pub token: Option<String>,
    pub request_timeout: Duration,
}

impl Default for TfeClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            token: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl TfeClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// reqwest-based [`WorkspaceClient`].
pub struct TfeClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl TfeClient {
    pub fn new(config: TfeClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.address)
            .map_err(|e| ClientError::transport(format!("invalid address {}: {e}", config.address)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::transport(format!(
                "invalid address {}: not a base URL",
                config.address
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            token: config.token,
        })
    }

    /// Builds `{address}/api/v2/{segments...}` with each segment percent-encoded.
    fn api_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::transport("address cannot be a base URL"))?
            .pop_if_empty()
            .extend(["api", "v2"])
            .extend(segments);
        Ok(url)
    }

    fn workspace_url(&self, organization: &str, name: &str) -> Result<Url, ClientError> {
        self.api_url(&["organizations", organization, "workspaces", name])
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, url)
            .header("Accept", JSON_API)
            .header("Content-Type", JSON_API);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Sends the request unless or until the context is cancelled.
    async fn send(
        &self,
        ctx: &OpContext,
        req: RequestBuilder,
        not_found_id: &str,
    ) -> Result<String, ClientError> {
        ctx.check()?;
        // Raced through the end of the body download.
        let exchange = async {
            let resp = req
                .send()
                .await
                .map_err(|e| ClientError::transport(e.to_string()))?;
            let status = resp.status();
            Ok::<_, ClientError>((status, resp.text().await))
        };
        let (status, body) = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(ClientError::Cancelled),
            result = exchange => result?,
        };

        if status.is_success() {
            return body
                .map_err(|e| ClientError::transport(format!("error reading response body: {e}")));
        }
        Err(error_for_status(status, &body.unwrap_or_default(), not_found_id))
    }
}

fn error_for_status(status: StatusCode, body: &str, not_found_id: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorDocument>(body)
        .ok()
        .and_then(|doc| doc.message())
        .unwrap_or_else(|| body.to_string());
    match status {
        StatusCode::NOT_FOUND => ClientError::not_found(WORKSPACE, not_found_id),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::unauthorized(message),
        StatusCode::UNPROCESSABLE_ENTITY => ClientError::invalid_request(message),
        _ => ClientError::http(status.as_u16(), message),
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::decode(e.to_string()))
}

fn decode_workspace(body: &str) -> Result<Workspace, ClientError> {
    decode::<Document<WorkspaceData>>(body).map(|doc| doc.data.into())
}

#[async_trait]
impl WorkspaceClient for TfeClient {
    async fn create(
        &self,
        ctx: &OpContext,
        organization: &str,
        options: &WorkspaceCreateOptions,
    ) -> Result<Workspace, ClientError> {
        let url = self.api_url(&["organizations", organization, "workspaces"])?;
        debug!(organization = %organization, name = %options.name, "POST workspace");
        let body = RequestDocument::workspaces(WorkspaceBody::from(options));
        let req = self.request(Method::POST, url).json(&body);
        let resp = self.send(ctx, req, organization).await?;
        decode_workspace(&resp)
    }

    async fn read(
        &self,
        ctx: &OpContext,
        organization: &str,
        name: &str,
    ) -> Result<Workspace, ClientError> {
        let url = self.workspace_url(organization, name)?;
        debug!(organization = %organization, name = %name, "GET workspace");
        let req = self.request(Method::GET, url);
        let resp = self
            .send(ctx, req, &format!("{organization}/{name}"))
            .await?;
        decode_workspace(&resp)
    }

    async fn update(
        &self,
        ctx: &OpContext,
        organization: &str,
        name: &str,
        options: &WorkspaceUpdateOptions,
    ) -> Result<Workspace, ClientError> {
        let url = self.workspace_url(organization, name)?;
        debug!(organization = %organization, name = %name, "PATCH workspace");
        let body = RequestDocument::workspaces(WorkspaceBody::from(options));
        let req = self.request(Method::PATCH, url).json(&body);
        let resp = self
            .send(ctx, req, &format!("{organization}/{name}"))
            .await?;
        decode_workspace(&resp)
    }

    async fn delete(
        &self,
        ctx: &OpContext,
        organization: &str,
        name: &str,
    ) -> Result<(), ClientError> {
        let url = self.workspace_url(organization, name)?;
        debug!(organization = %organization, name = %name, "DELETE workspace");
        let req = self.request(Method::DELETE, url);
        self.send(ctx, req, &format!("{organization}/{name}"))
            .await?;
        Ok(())
    }

    async fn list(
        &self,
        ctx: &OpContext,
        organization: &str,
        options: &ListOptions,
    ) -> Result<WorkspaceList, ClientError> {
        let url = self.api_url(&["organizations", organization, "workspaces"])?;
        debug!(organization = %organization, page = options.page_number, "GET workspaces");
        let mut query: Vec<(&str, String)> = Vec::new();
        if options.page_number > 0 {
            query.push(("page[number]", options.page_number.to_string()));
        }
        if let Some(size) = options.page_size {
            query.push(("page[size]", size.to_string()));
        }
        let req = self.request(Method::GET, url).query(&query);
        let resp = self.send(ctx, req, organization).await?;
        decode::<Document<Vec<WorkspaceData>>>(&resp).map(Document::into_list)
    }

    async fn assign_ssh_key(
        &self,
        ctx: &OpContext,
        workspace_id: &str,
        ssh_key_id: &str,
    ) -> Result<Workspace, ClientError> {
        let url = self.api_url(&["workspaces", workspace_id, "relationships", "ssh-key"])?;
        debug!(workspace_id = %workspace_id, ssh_key_id = %ssh_key_id, "assign SSH key");
        let body = RequestDocument::workspaces(SshKeyBody {
            id: Some(ssh_key_id),
        });
        let req = self.request(Method::PATCH, url).json(&body);
        let resp = self.send(ctx, req, workspace_id).await?;
        decode_workspace(&resp)
    }

    async fn unassign_ssh_key(
        &self,
        ctx: &OpContext,
        workspace_id: &str,
    ) -> Result<Workspace, ClientError> {
        let url = self.api_url(&["workspaces", workspace_id, "relationships", "ssh-key"])?;
        debug!(workspace_id = %workspace_id, "unassign SSH key");
        let body = RequestDocument::workspaces(SshKeyBody { id: None });
        let req = self.request(Method::PATCH, url).json(&body);
        let resp = self.send(ctx, req, workspace_id).await?;
        decode_workspace(&resp)
    }

    fn backend_name(&self) -> &'static str {
        "tfe-http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(address: &str) -> TfeClient {
        TfeClient::new(TfeClientConfig::new(address)).unwrap()
    }

    #[test]
    fn test_api_url_encodes_segments() {
        let c = client("https://tfe.example.com");
        let url = c.workspace_url("acme", "web app").unwrap();
        assert_eq!(
            url.as_str(),
            "https://tfe.example.com/api/v2/organizations/acme/workspaces/web%20app"
        );
    }

    #[test]
    fn test_api_url_keeps_address_prefix() {
        let c = client("https://example.com/tfe/");
        let url = c.api_url(&["workspaces", "ws-1"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/tfe/api/v2/workspaces/ws-1");
    }

    #[test]
    fn test_rejects_invalid_address() {
        assert!(TfeClient::new(TfeClientConfig::new("not a url")).is_err());
    }

    #[test]
    fn test_status_mapping() {
        assert!(error_for_status(StatusCode::NOT_FOUND, "", "acme/web").is_not_found());
        assert!(matches!(
            error_for_status(StatusCode::FORBIDDEN, "", "x"),
            ClientError::Unauthorized { .. }
        ));
        assert_eq!(
            error_for_status(StatusCode::BAD_GATEWAY, "upstream", "x"),
            ClientError::http(502, "upstream")
        );
    }
}
