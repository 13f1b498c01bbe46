// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use parla_app::{
    ConnectorSummary, GroupDirectory, NewRule, Rule, RuleId, RuleUpdate, Suggestion, SuggestionId,
    Task, TaskId, TaskSubmission, User,
};

pub mod auth;
pub mod mock;
pub mod token;

pub use auth::{AuthState, AuthStore, MOCK_TOKEN, Session, sign_in_url};
pub use mock::{MockOutcome, MockPayload};
pub use token::{CookieFileStorage, MemoryTokenStorage, TokenStorage};

use mock::MockOutcome::Matched;

/// Blocking HTTP client for the assistant backend. Carries the bearer token
/// from storage on every request; in mock mode, requests are routed through
/// the canned dispatcher before touching the network.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
    mock: bool,
    storage: Arc<dyn TokenStorage>,
    auth: AuthStore,
}

impl Client {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        storage: Arc<dyn TokenStorage>,
        auth: AuthStore,
        mock: bool,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
            mock,
            storage,
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_mock(&self) -> bool {
        self.mock
    }

    pub fn auth_store(&self) -> &AuthStore {
        &self.auth
    }

    /// Session bound to the same storage and auth store as this client.
    pub fn session(&self) -> Session {
        Session::new(self.storage.clone(), self.auth.clone())
    }

    pub fn current_user(&self) -> Result<User> {
        self.get_json("/v1/users/me")
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        self.get_json("/v1/dashboard/apex-tasks")
    }

    pub fn list_suggestions(&self) -> Result<Vec<Suggestion>> {
        self.get_json("/v1/suggestions")
    }

    pub fn list_rules(&self) -> Result<Vec<Rule>> {
        self.get_json("/v1/rules")
    }

    pub fn connector_summary(&self) -> Result<ConnectorSummary> {
        self.get_json("/v1/connectors/all")
    }

    pub fn connector_connect_url(&self, service: &str) -> Result<String> {
        let redirect: RedirectEnvelope =
            self.get_json(&format!("/v1/connectors/connect/{service}"))?;
        Ok(redirect.redirect_url)
    }

    pub fn list_groups(&self) -> Result<GroupDirectory> {
        self.get_json("/v1/groups")
    }

    pub fn delete_suggestion(&self, id: &SuggestionId) -> Result<()> {
        self.mutate(Method::DELETE, &format!("/v1/suggestions/{id}"), None::<&()>)
    }

    /// Republishes the full rule record with the new status.
    pub fn update_rule(&self, update: &RuleUpdate) -> Result<()> {
        self.mutate(
            Method::PATCH,
            &format!("/v1/rules/{}", update.rule_id),
            Some(update),
        )
    }

    pub fn create_rule(&self, rule: &NewRule) -> Result<RuleId> {
        let created: RuleCreatedEnvelope =
            self.mutate_json(Method::POST, "/v1/rules", Some(rule))?;
        Ok(created.rule_id)
    }

    /// Multipart task submission carrying whichever of message/image/audio
    /// are present. Returns the backend's acknowledgement message.
    pub fn submit_task(&self, id: &TaskId, submission: &TaskSubmission) -> Result<String> {
        let path = format!("/v1/dashboard/apex-task/{id}");

        if self.mock && let Matched(payload) = mock::dispatch(&path, &Method::POST) {
            let ack: AckEnvelope = decode_mock(payload, &path)?;
            return Ok(ack.message);
        }

        let mut form = Form::new();
        if let Some(message) = &submission.message {
            form = form.text("message", message.clone());
        }
        if let Some(image) = &submission.image {
            form = form.part(
                "image",
                Part::bytes(image.bytes.clone()).file_name(image.file_name.clone()),
            );
        }
        if let Some(audio) = &submission.audio {
            form = form.part(
                "audio",
                Part::bytes(audio.bytes.clone()).file_name(audio.file_name.clone()),
            );
        }

        let response = self
            .request(Method::POST, &path)
            .multipart(form)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let response = self.check_status(response, &path)?;
        let ack: AckEnvelope = response
            .json()
            .with_context(|| format!("decode response from {path}"))?;
        Ok(ack.message)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        if self.mock && let Matched(payload) = mock::dispatch(path, &Method::GET) {
            return decode_mock(payload, path);
        }

        let response = self
            .request(Method::GET, path)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let response = self.check_status(response, path)?;
        response
            .json()
            .with_context(|| format!("decode response from {path}"))
    }

    fn mutate<B: Serialize>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()> {
        if self.mock && let Matched(_) = mock::dispatch(path, &method) {
            return Ok(());
        }
        let response = self.send_body(method, path, body)?;
        self.check_status(response, path)?;
        Ok(())
    }

    fn mutate_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        if self.mock && let Matched(payload) = mock::dispatch(path, &method) {
            return decode_mock(payload, path);
        }
        let response = self.send_body(method, path, body)?;
        let response = self.check_status(response, path)?;
        response
            .json()
            .with_context(|| format!("decode response from {path}"))
    }

    fn send_body<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        request
            .send()
            .map_err(|error| connection_error(&self.base_url, error))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, format!("{}{path}", self.base_url));
        if let Some(token) = self.storage.get() {
            request = request.bearer_auth(token);
        }
        request
    }

    fn check_status(&self, response: Response, path: &str) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body).context(format!("request {path}")));
        }
        Ok(response)
    }

    /// A real 401 invalidates the stored token; the mock sentinel is exempt
    /// so development sessions survive a misconfigured backend.
    fn handle_unauthorized(&self) {
        if self.storage.get().as_deref() == Some(MOCK_TOKEN) {
            log::debug!("unauthorized with mock token, ignoring");
            return;
        }
        log::info!("unauthorized response, clearing auth state");
        self.storage.clear();
        self.auth.set(false, false);
    }
}

fn decode_mock<T: DeserializeOwned>(payload: MockPayload, path: &str) -> Result<T> {
    let value = payload.into_value()?;
    serde_json::from_value(value).with_context(|| format!("decode mock payload for {path}"))
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check api.base_url and your network ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<DetailEnvelope>(body)
        && let Some(detail) = parsed.detail
        && !detail.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), detail);
    }

    if let Ok(parsed) = serde_json::from_str::<MessageEnvelope>(body)
        && let Some(message) = parsed.message
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    if body.len() < 100 && !body.contains('{') && !body.is_empty() {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub success: bool,
    pub job_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCreatedEnvelope {
    pub success: String,
    pub rule_id: RuleId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectEnvelope {
    pub redirect_url: String,
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::clean_error_response;
    use reqwest::StatusCode;

    #[test]
    fn error_response_prefers_structured_detail() {
        let error = clean_error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":"rule text must not be empty"}"#,
        );
        assert_eq!(
            error.to_string(),
            "server error (422): rule text must not be empty"
        );
    }

    #[test]
    fn error_response_falls_back_to_message_field() {
        let error = clean_error_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"missing chat scope"}"#,
        );
        assert_eq!(error.to_string(), "server error (400): missing chat scope");
    }

    #[test]
    fn error_response_uses_short_plain_bodies() {
        let error = clean_error_response(StatusCode::BAD_GATEWAY, "upstream timeout");
        assert_eq!(error.to_string(), "server error (502): upstream timeout");
    }

    #[test]
    fn error_response_hides_long_or_html_bodies() {
        let error = clean_error_response(StatusCode::INTERNAL_SERVER_ERROR, &"x".repeat(500));
        assert_eq!(error.to_string(), "server returned 500");

        let error = clean_error_response(StatusCode::NOT_FOUND, "");
        assert_eq!(error.to_string(), "server returned 404");
    }
}
