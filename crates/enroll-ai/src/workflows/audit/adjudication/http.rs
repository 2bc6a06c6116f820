use std::time::Duration;

use serde::Serialize;

use super::super::domain::AuditOutcome;
use super::super::dossier::Dossier;
use super::{enforce_decision_contract, Adjudicator, AdjudicationError};

/// Typed client for a remote Adjudication Service. The client is built once
/// with a bounded timeout; a timeout or transport error surfaces as
/// [`AdjudicationError::Transport`] so the invoking layer can retry.
#[derive(Debug, Clone)]
pub struct RemoteAdjudicator {
    http: reqwest::Client,
    endpoint: String,
    rule_spec: String,
}

#[derive(Debug, Serialize)]
struct AdjudicationRequest<'a> {
    rule_spec: &'a str,
    dossier: &'a Dossier,
}

impl RemoteAdjudicator {
    pub fn new(
        endpoint: impl Into<String>,
        rule_spec: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AdjudicationError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AdjudicationError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            rule_spec: rule_spec.into(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/api/v1/adjudications",
            self.endpoint.trim_end_matches('/')
        )
    }
}

impl Adjudicator for RemoteAdjudicator {
    async fn adjudicate(&self, dossier: Dossier) -> Result<AuditOutcome, AdjudicationError> {
        let response = self
            .http
            .post(self.url())
            .json(&AdjudicationRequest {
                rule_spec: &self.rule_spec,
                dossier: &dossier,
            })
            .send()
            .await
            .map_err(|err| AdjudicationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdjudicationError::Status {
                status: status.as_u16(),
            });
        }

        let outcome: AuditOutcome = response
            .json()
            .await
            .map_err(|err| AdjudicationError::Malformed(err.to_string()))?;

        enforce_decision_contract(outcome)
    }
}
