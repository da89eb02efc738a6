//! Instance-variables API client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::error::{ApiError, is_rate_limit_error};
use super::types::{CreateVariableRequest, RemoteVariable};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::reconcile::{ProgressCallback, ReconcileProgress, emit};
use crate::retry::with_retry;
use crate::store::VariableStore;
use crate::variable::Variable;

/// Page size for list requests.
const PAGE_SIZE: u32 = 100;

/// Request timeout for the default transport.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the instance-level CI/CD variables endpoints.
///
/// All I/O goes through an [`HttpTransport`], so tests can drive the client
/// with an in-memory mock.
#[derive(Clone)]
pub struct InstanceVariablesClient {
    transport: Arc<dyn HttpTransport>,
    host: String,
    token: String,
}

impl InstanceVariablesClient {
    /// Create a client against `host` using a personal access token with
    /// administrator access.
    ///
    /// `host` may be given with or without a scheme; `https://` is assumed
    /// when absent.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = InstanceVariablesClient::new("gitlab.example.com", "token")?;
    /// ```
    pub fn new(host: &str, token: &str) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::with_timeout(REQUEST_TIMEOUT)
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self::new_with_transport(host, token, Arc::new(transport)))
    }

    pub fn new_with_transport(host: &str, token: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            host: normalize_host(host),
            token: token.to_string(),
        }
    }

    /// Get the host URL.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    fn headers(&self, with_body: bool) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), "varsync".to_string()),
            ("PRIVATE-TOKEN".to_string(), self.token.clone()),
        ];
        if with_body {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        headers
    }

    fn variables_url(&self) -> Result<Url, ApiError> {
        Url::parse(&format!("{}/api/v4/admin/ci/variables", self.host))
            .map_err(|e| ApiError::Config(e.to_string()))
    }

    fn variable_url(&self, key: &str, environment_scope: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}/api/v4/admin/ci/variables/{}", self.host, key))
            .map_err(|e| ApiError::Config(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("filter[environment_scope]", environment_scope);
        Ok(url)
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: Url,
        body: Vec<u8>,
    ) -> Result<HttpResponse, ApiError> {
        let request = HttpRequest {
            method,
            url: url.to_string(),
            headers: self.headers(!body.is_empty()),
            body,
        };

        let response = self.transport.send(request).await?;

        if !(200..300).contains(&response.status) {
            let message = String::from_utf8_lossy(&response.body).to_string();
            return Err(ApiError::from_status(response.status, &message));
        }

        Ok(response)
    }

    /// Fetch one page of the remote variable set.
    async fn list_page(&self, page: u32) -> Result<Vec<RemoteVariable>, ApiError> {
        let mut url = self.variables_url()?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &PAGE_SIZE.to_string());

        let response = self.send(HttpMethod::Get, url, Vec::new()).await?;
        serde_json::from_slice(&response.body).map_err(ApiError::Json)
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait]
impl VariableStore for InstanceVariablesClient {
    async fn list_variables(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Variable>, ApiError> {
        emit(on_progress, ReconcileProgress::FetchingVariables);

        // Pages are fetched until the server returns an empty one; the full
        // set is aggregated before any comparison happens.
        let mut variables: Vec<Variable> = Vec::new();
        let mut page = 1u32;
        loop {
            let page_vars = self.list_page(page).await?;
            if page_vars.is_empty() {
                break;
            }
            let count = page_vars.len();
            variables.extend(page_vars.into_iter().map(Variable::from));
            emit(
                on_progress,
                ReconcileProgress::FetchedPage {
                    page,
                    count,
                    total_so_far: variables.len(),
                },
            );
            page += 1;
        }

        emit(
            on_progress,
            ReconcileProgress::FetchComplete {
                total: variables.len(),
            },
        );

        Ok(variables)
    }

    async fn create_variable(
        &self,
        var: &Variable,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<(), ApiError> {
        let url = self.variables_url()?;
        let body = serde_json::to_vec(&CreateVariableRequest::from(var)).map_err(ApiError::Json)?;

        with_retry(
            || {
                let url = url.clone();
                let body = body.clone();
                async move { self.send(HttpMethod::Post, url, body).await.map(|_| ()) }
            },
            is_rate_limit_error,
            &var.key,
            on_progress,
        )
        .await
    }

    async fn delete_variable(
        &self,
        key: &str,
        environment_scope: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<(), ApiError> {
        let url = self.variable_url(key, environment_scope)?;

        with_retry(
            || {
                let url = url.clone();
                async move { self.send(HttpMethod::Delete, url, Vec::new()).await.map(|_| ()) }
            },
            is_rate_limit_error,
            key,
            on_progress,
        )
        .await
    }
}
