// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Manager HTTP Client
//
// Anti-Corruption Layer between the manager's HTTP/JSON API and the domain
// outcome types. Every HTTP or transport condition is mapped to a variant of
// RegistrationOutcome / HeartbeatOutcome; nothing escapes as an error.
//
// POST {endpoint}/register   {hostname, group[, agentKey]}
//   200/201 {key?, id?, status?}   -> Accepted (or PendingApproval when status=pending)
//                                     credential = agentKey when one was sent, else key
//   403                            -> PendingApproval
//   anything else / transport      -> Rejected
//
// POST {endpoint}/heartbeat  Authorization: Bearer <key>  {hostname, status, group}
//   200 {command}                  -> Directive
//   401                            -> CredentialInvalid
//   anything else / transport      -> TransportFailure

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::credential::Credential;
use crate::domain::directive::Directive;
use crate::domain::heartbeat::HeartbeatOutcome;
use crate::domain::identity::IdentityContext;
use crate::domain::manager::{HeartbeatClient, RegistrationClient};
use crate::domain::node_config::ManagerConfig;
use crate::domain::registration::{RegistrationOutcome, RegistrationRejection};

const REGISTER_ROUTE: &str = "register";
const HEARTBEAT_ROUTE: &str = "heartbeat";
const ONLINE_STATUS: &str = "online";
const PENDING_STATUS: &str = "pending";

/// The client holds no key-origin setting of its own: the caller decides by
/// passing (or not passing) a candidate to `register`.
pub struct HttpManagerClient {
    client: Client,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    hostname: &'a str,
    group: &'a str,
    #[serde(rename = "agentKey", skip_serializing_if = "Option::is_none")]
    agent_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct RegisterResponse {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Serialize)]
struct HeartbeatRequest<'a> {
    hostname: &'a str,
    status: &'a str,
    group: &'a str,
}

#[derive(Deserialize)]
struct HeartbeatResponse {
    #[serde(default)]
    command: Option<String>,
}

impl HttpManagerClient {
    pub fn new(config: &ManagerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    fn accepted(body: RegisterResponse, candidate: Option<&Credential>) -> RegistrationOutcome {
        let id = body.id.and_then(|id| match id {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        });

        let issued = body.key.and_then(Credential::new);

        let credential = match (candidate, issued) {
            (Some(candidate), issued) => {
                if let Some(issued) = issued.filter(|k| k != candidate) {
                    tracing::warn!(
                        candidate = %candidate,
                        issued = %issued,
                        "Manager issued a different key than the one submitted; keeping the submitted key"
                    );
                }
                candidate.clone()
            }
            (None, Some(issued)) => issued,
            (None, None) => {
                return RegistrationOutcome::Rejected(RegistrationRejection::InvalidResponse(
                    "response carries no key".to_string(),
                ))
            }
        };

        RegistrationOutcome::Accepted { credential, id }
    }
}

/// Flatten a reqwest error into a short operator-facing reason.
fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    }
}

#[async_trait]
impl RegistrationClient for HttpManagerClient {
    async fn register(
        &self,
        identity: &IdentityContext,
        candidate: Option<&Credential>,
    ) -> RegistrationOutcome {
        let url = identity.route(REGISTER_ROUTE);
        let request = RegisterRequest {
            hostname: identity.hostname(),
            group: identity.group(),
            agent_key: candidate.map(Credential::expose),
        };

        tracing::debug!(url = %url, candidate = ?candidate, "Sending registration request");

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                return RegistrationOutcome::Rejected(RegistrationRejection::Transport(
                    describe_transport_error(&e),
                ))
            }
        };

        let status = response.status();
        match status {
            StatusCode::OK | StatusCode::CREATED => {
                let body: RegisterResponse = match response.json().await {
                    Ok(body) => body,
                    Err(e) => {
                        return RegistrationOutcome::Rejected(
                            RegistrationRejection::InvalidResponse(e.to_string()),
                        )
                    }
                };

                if body
                    .status
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(PENDING_STATUS))
                {
                    return RegistrationOutcome::PendingApproval;
                }

                Self::accepted(body, candidate)
            }
            StatusCode::FORBIDDEN => RegistrationOutcome::PendingApproval,
            _ => {
                let body = response.text().await.unwrap_or_default();
                RegistrationOutcome::Rejected(RegistrationRejection::Status {
                    code: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl HeartbeatClient for HttpManagerClient {
    async fn beat(&self, identity: &IdentityContext, credential: &Credential) -> HeartbeatOutcome {
        let url = identity.route(HEARTBEAT_ROUTE);
        let request = HeartbeatRequest {
            hostname: identity.hostname(),
            status: ONLINE_STATUS,
            group: identity.group(),
        };

        let response = match self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", credential.expose()))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return HeartbeatOutcome::TransportFailure(describe_transport_error(&e)),
        };

        match response.status() {
            StatusCode::OK => match response.json::<HeartbeatResponse>().await {
                Ok(body) => HeartbeatOutcome::Directive(Directive::from_command(body.command.as_deref())),
                Err(e) => HeartbeatOutcome::TransportFailure(format!(
                    "invalid heartbeat response: {}",
                    e
                )),
            },
            StatusCode::UNAUTHORIZED => HeartbeatOutcome::CredentialInvalid,
            status => {
                let body = response.text().await.unwrap_or_default();
                HeartbeatOutcome::TransportFailure(format!("HTTP {}: {}", status, body))
            }
        }
    }
}
