//! HTTP Gateway
//!
//! `reqwest`-backed implementation of [`Gateway`].

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::args::{CreateProjectArgs, CreateTaskArgs, CreateTeamArgs, MemberArgs, StatusArgs};
use super::{Gateway, GatewayError, GatewayResult};
use crate::domain::{
    Collection, NewMember, NewProject, NewTask, NewTeam, Project, ProjectStatus, Task, Team,
};

/// Production API root
pub const DEFAULT_API_BASE: &str = "https://workaasana.vercel.app";

/// Characters left as-is in an id path segment (RFC 3986 unreserved)
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base: String,
}

impl HttpGateway {
    /// Gateway without a request timeout
    pub fn new(base: impl Into<String>) -> GatewayResult<Self> {
        Self::with_timeout(base, None)
    }

    pub fn with_timeout(base: impl Into<String>, timeout: Option<Duration>) -> GatewayResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base, collection.as_str())
    }

    fn entity_url(&self, collection: Collection, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(collection),
            utf8_percent_encode(id, PATH_SEGMENT)
        )
    }

    async fn fetch<T: DeserializeOwned>(&self, collection: Collection) -> GatewayResult<T> {
        let url = self.collection_url(collection);
        log::debug!("[GATEWAY] GET {}", url);
        let response = self.client.get(&url).send().await.map_err(network)?;
        decode(check(response).await?).await
    }

    async fn send<B: Serialize + ?Sized>(&self, method: Method, url: String, body: &B) -> GatewayResult<Response> {
        log::debug!("[GATEWAY] {} {}", method, url);
        let response = self
            .client
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(network)?;
        check(response).await
    }
}

/// Turn a non-2xx response into `ServerRejected`, keeping the body for context
async fn check(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    log::warn!("[GATEWAY] {} rejected with {}", url, status);
    Err(GatewayError::ServerRejected {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
    let bytes = response.bytes().await.map_err(network)?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
}

fn network(e: reqwest::Error) -> GatewayError {
    GatewayError::Network(e.to_string())
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn list_projects(&self) -> GatewayResult<Vec<Project>> {
        self.fetch(Collection::Projects).await
    }

    async fn list_tasks(&self) -> GatewayResult<Vec<Task>> {
        self.fetch(Collection::Tasks).await
    }

    async fn list_teams(&self) -> GatewayResult<Vec<Team>> {
        self.fetch(Collection::Teams).await
    }

    async fn create_project(&self, draft: &NewProject) -> GatewayResult<Project> {
        let url = self.collection_url(Collection::Projects);
        let response = self.send(Method::POST, url, &CreateProjectArgs::from(draft)).await?;
        decode(response).await
    }

    async fn create_task(&self, draft: &NewTask) -> GatewayResult<Task> {
        let url = self.collection_url(Collection::Tasks);
        let response = self.send(Method::POST, url, &CreateTaskArgs::from(draft)).await?;
        decode(response).await
    }

    async fn create_team(&self, draft: &NewTeam) -> GatewayResult<Team> {
        let url = self.collection_url(Collection::Teams);
        let response = self.send(Method::POST, url, &CreateTeamArgs::from(draft)).await?;
        decode(response).await
    }

    async fn update_project_status(&self, id: &str, status: ProjectStatus) -> GatewayResult<()> {
        let url = self.entity_url(Collection::Projects, id);
        self.send(Method::PATCH, url, &StatusArgs { status }).await?;
        Ok(())
    }

    async fn add_team_member(&self, team_id: &str, member: &NewMember) -> GatewayResult<()> {
        let url = format!("{}/members", self.entity_url(Collection::Teams, team_id));
        self.send(Method::POST, url, &MemberArgs { name: &member.name }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_url_encodes_id() {
        let gateway = HttpGateway::new("http://localhost:3000/").unwrap();
        assert_eq!(gateway.base(), "http://localhost:3000");
        assert_eq!(
            gateway.entity_url(Collection::Projects, "a b/c"),
            "http://localhost:3000/projects/a%20b%2Fc"
        );
        assert_eq!(
            gateway.entity_url(Collection::Teams, "65f0-ab_c.d~e"),
            "http://localhost:3000/teams/65f0-ab_c.d~e"
        );
    }
}
