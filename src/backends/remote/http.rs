// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! HTTP implementation of the remote sandbox session traits.
//!
//! Talks to the provisioning service's REST surface:
//! `POST {base}/sandboxes` provisions, `POST {base}/sandboxes/{id}/code`
//! submits, `DELETE {base}/sandboxes/{id}` tears down. All calls carry the
//! credential as a bearer token.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::backends::remote::session::{SandboxExecution, SandboxSession, SessionFactory};
use crate::config::RemoteConfig;
use crate::errors::EngineError;
use crate::observability::messages::{SessionProvisioned, SessionTornDown};

/// Provisions sandboxes against a remote REST endpoint.
pub struct HttpSessionFactory {
    client: Client,
    base_url: String,
    api_key: String,
    template: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateResponse {
    sandbox_id: String,
}

impl HttpSessionFactory {
    pub fn new(config: &RemoteConfig, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            template: config.template.clone(),
        }
    }
}

#[async_trait]
impl SessionFactory for HttpSessionFactory {
    async fn create(&self) -> Result<Box<dyn SandboxSession>, EngineError> {
        let response = self
            .client
            .post(format!("{}/sandboxes", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "template": self.template }))
            .send()
            .await
            .map_err(|err| EngineError::Provisioning(err.to_string()))?
            .error_for_status()
            .map_err(|err| EngineError::Provisioning(err.to_string()))?;

        let created: CreateResponse = response
            .json()
            .await
            .map_err(|err| EngineError::Provisioning(err.to_string()))?;

        tracing::info!(
            "{}",
            SessionProvisioned {
                sandbox_id: &created.sandbox_id
            }
        );

        Ok(Box::new(HttpSandboxSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            sandbox_id: created.sandbox_id,
        }))
    }
}

/// One provisioned sandbox reachable over HTTP.
pub struct HttpSandboxSession {
    client: Client,
    base_url: String,
    api_key: String,
    sandbox_id: String,
}

#[async_trait]
impl SandboxSession for HttpSandboxSession {
    async fn run_code(&self, code: &str) -> Result<SandboxExecution, EngineError> {
        let response = self
            .client
            .post(format!(
                "{}/sandboxes/{}/code",
                self.base_url, self.sandbox_id
            ))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "code": code }))
            .send()
            .await
            .map_err(|err| EngineError::Provisioning(err.to_string()))?
            .error_for_status()
            .map_err(|err| EngineError::Provisioning(err.to_string()))?;

        response
            .json()
            .await
            .map_err(|err| EngineError::Provisioning(err.to_string()))
    }

    async fn kill(&self) {
        let result = self
            .client
            .delete(format!("{}/sandboxes/{}", self.base_url, self.sandbox_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => tracing::info!(
                "{}",
                SessionTornDown {
                    sandbox_id: &self.sandbox_id
                }
            ),
            Err(err) => tracing::warn!(
                "Failed to tear down sandbox session {}: {}",
                self.sandbox_id,
                err
            ),
        }
    }
}
