use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::ApiError,
    protocol::{ApplicantStatusRequest, ProposalsResponse, UserProposalsResponse},
};
use tracing::debug;

use crate::error::ServiceError;

/// Remote proposal backend.
#[async_trait]
pub trait ProposalService: Send + Sync {
    async fn fetch_proposals(&self) -> Result<ProposalsResponse, ServiceError>;
    async fn fetch_user_proposals(&self) -> Result<UserProposalsResponse, ServiceError>;
    async fn update_applicant_status(
        &self,
        request: ApplicantStatusRequest,
    ) -> Result<(), ServiceError>;
}

pub struct HttpProposalService {
    http: Client,
    api_url: String,
    auth_token: Option<String>,
}

impl HttpProposalService {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    pub fn with_options(
        api_url: impl Into<String>,
        auth_token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ServiceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let url = format!("{}{path}", self.api_url);
        debug!(%url, "GET");
        let res = self.authorize(self.http.get(&url)).send().await?;
        let res = ensure_success(res).await?;
        res.json::<T>()
            .await
            .map_err(|err| ServiceError::Decode(err.to_string()))
    }
}

async fn ensure_success(res: Response) -> Result<Response, ServiceError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    let message = ApiError::message_from_body(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    Err(ServiceError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ProposalService for HttpProposalService {
    async fn fetch_proposals(&self) -> Result<ProposalsResponse, ServiceError> {
        self.get_json("/proposals").await
    }

    async fn fetch_user_proposals(&self) -> Result<UserProposalsResponse, ServiceError> {
        self.get_json("/proposals/user").await
    }

    async fn update_applicant_status(
        &self,
        request: ApplicantStatusRequest,
    ) -> Result<(), ServiceError> {
        let url = format!("{}/proposal/applicant-status", self.api_url);
        debug!(%url, proposal = %request.proposal_id, applicant = %request.applicant_id, "PUT");
        let res = self
            .authorize(self.http.put(&url))
            .json(&request)
            .send()
            .await?;
        ensure_success(res).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
