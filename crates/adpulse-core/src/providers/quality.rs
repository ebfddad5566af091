use crate::model::Creative;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Boundary to an external LLM/vision scorer.
///
/// The contract is intentionally thin: an optional score in [0, 1] per
/// creative, where 1 is best. The deterministic signal path must always work
/// without it — a provider failure degrades to `None`, never to an aborted
/// batch.
#[async_trait]
pub trait QualityProvider: Send + Sync {
    async fn quality(&self, creative: &Creative, asset_hash: Option<&str>)
        -> anyhow::Result<Option<f64>>;
}

/// Provider that reports no supplementary signal; the scorer then runs on
/// deterministic signals only.
pub struct NullQualityProvider;

#[async_trait]
impl QualityProvider for NullQualityProvider {
    async fn quality(
        &self,
        _creative: &Creative,
        _asset_hash: Option<&str>,
    ) -> anyhow::Result<Option<f64>> {
        Ok(None)
    }
}

/// Fixed per-creative scores, for tests and offline replays.
pub struct StaticQualityProvider {
    scores: HashMap<String, f64>,
}

impl StaticQualityProvider {
    pub fn new(scores: HashMap<String, f64>) -> Self {
        Self { scores }
    }
}

#[async_trait]
impl QualityProvider for StaticQualityProvider {
    async fn quality(
        &self,
        creative: &Creative,
        _asset_hash: Option<&str>,
    ) -> anyhow::Result<Option<f64>> {
        Ok(self.scores.get(&creative.creative_id).copied())
    }
}

#[derive(Serialize)]
struct QualityRequest<'a> {
    creative_id: &'a str,
    platform: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    copy_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    asset_sha256: Option<&'a str>,
}

#[derive(Deserialize)]
struct QualityResponse {
    score: Option<f64>,
}

/// JSON-over-HTTP provider for a hosted scoring endpoint.
pub struct HttpQualityProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpQualityProvider {
    pub fn new(endpoint: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl QualityProvider for HttpQualityProvider {
    async fn quality(
        &self,
        creative: &Creative,
        asset_hash: Option<&str>,
    ) -> anyhow::Result<Option<f64>> {
        let req = QualityRequest {
            creative_id: &creative.creative_id,
            platform: &creative.platform,
            copy_text: creative.copy_text.as_deref(),
            asset_sha256: asset_hash,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&req)
            .send()
            .await?
            .error_for_status()?;
        let body: QualityResponse = resp.json().await?;
        Ok(body.score.map(|s| s.clamp(0.0, 1.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssetRef, CreativeKind};
    use chrono::NaiveDate;

    fn creative(id: &str) -> Creative {
        Creative {
            creative_id: id.into(),
            platform: "meta".into(),
            kind: CreativeKind::Image,
            asset: AssetRef::ContentHash {
                sha256: "0".repeat(64),
            },
            first_seen: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            copy_text: None,
            derived_from: None,
        }
    }

    #[tokio::test]
    async fn null_provider_reports_nothing() {
        let p = NullQualityProvider;
        assert_eq!(p.quality(&creative("cr_1"), None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn static_provider_serves_known_ids_only() {
        let p = StaticQualityProvider::new(HashMap::from([("cr_1".to_string(), 0.7)]));
        assert_eq!(p.quality(&creative("cr_1"), None).await.unwrap(), Some(0.7));
        assert_eq!(p.quality(&creative("cr_2"), None).await.unwrap(), None);
    }
}
