//! HTTP client for the leave API, for RPA tools and other services.

use derive_more::Display;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::leave_request::{BatchResponse, LeaveResponse, SearchParams};
use crate::api::stats::{EmployeeSummaryResponse, StatsResponse};
use crate::model::{LeavePatch, LeaveRequest};

#[derive(Debug, Display)]
pub enum ClientError {
    #[display(fmt = "request failed: {}", _0)]
    Transport(reqwest::Error),

    #[display(fmt = "server responded {}: {}", status, message)]
    Api { status: u16, message: String },
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Transport(e) => Some(e),
            ClientError::Api { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct LeaveClient {
    http: reqwest::Client,
    base_url: String,
}

impl LeaveClient {
    /// `base_url` includes the API prefix, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.endpoint(path))
    }

    pub async fn list_leaves(&self) -> ClientResult<Vec<LeaveResponse>> {
        send(self.request(Method::GET, "leaves")).await
    }

    pub async fn get_leave(&self, id: &str) -> ClientResult<LeaveResponse> {
        send(self.request(Method::GET, &format!("leaves/{id}"))).await
    }

    pub async fn leaves_for_employee(&self, employee_id: &str) -> ClientResult<Vec<LeaveResponse>> {
        send(self.request(Method::GET, &format!("leaves/employee/{employee_id}"))).await
    }

    pub async fn search_leaves(&self, params: &SearchParams) -> ClientResult<Vec<LeaveResponse>> {
        send(self.request(Method::GET, "leaves/search").query(params)).await
    }

    pub async fn create_leave(&self, request: &LeaveRequest) -> ClientResult<LeaveResponse> {
        send(self.request(Method::POST, "leaves").json(request)).await
    }

    pub async fn update_leave(&self, id: &str, patch: &LeavePatch) -> ClientResult<LeaveResponse> {
        send(self.request(Method::PUT, &format!("leaves/{id}")).json(patch)).await
    }

    pub async fn approve_leave(&self, id: &str) -> ClientResult<LeaveResponse> {
        send(self.request(Method::PUT, &format!("leaves/{id}/approve"))).await
    }

    pub async fn reject_leave(&self, id: &str) -> ClientResult<LeaveResponse> {
        send(self.request(Method::PUT, &format!("leaves/{id}/reject"))).await
    }

    pub async fn delete_leave(&self, id: &str) -> ClientResult<DeleteResponse> {
        send(self.request(Method::DELETE, &format!("leaves/{id}"))).await
    }

    pub async fn submit_batch(&self, requests: &[LeaveRequest]) -> ClientResult<BatchResponse> {
        send(self.request(Method::POST, "leaves/batch").json(requests)).await
    }

    pub async fn stats(&self) -> ClientResult<StatsResponse> {
        send(self.request(Method::GET, "stats")).await
    }

    pub async fn employee_summary(&self, employee_id: &str) -> ClientResult<EmployeeSummaryResponse> {
        send(self.request(Method::GET, &format!("employees/{employee_id}/summary"))).await
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
    let response = request.send().await?;
    decode(response).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
