use super::{interpret_response, FILE_FIELD};
use crate::error::AnalysisError;
use crate::model::{AnalysisResult, DetectorConfig, HealthStatus, ImageFile};
use anyhow::{bail, Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Url};

#[derive(Debug, Clone)]
pub struct DetectorClient {
    pub http: reqwest::Client,
    base_url: Url,
}

impl DetectorClient {
    pub fn new(cfg: &DetectorConfig) -> Result<Self> {
        let base_url = Url::parse(&cfg.base_url)
            .with_context(|| format!("invalid base URL: {}", cfg.base_url))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            bail!("base URL must be an http(s) URL: {}", cfg.base_url);
        }

        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/<name>`, keeping any path prefix the base URL carries.
    pub fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }

    /// POST the image to `/predict` as a single multipart part named `file`.
    pub async fn predict(&self, file: &ImageFile) -> Result<AnalysisResult, AnalysisError> {
        let url = self.endpoint("predict");
        tracing::debug!(%url, file = file.name(), size = file.size(), "sending predict request");

        let part = Part::stream_with_length(Body::from(file.bytes().clone()), file.size())
            .file_name(file.name().to_string())
            .mime_str(file.media_type().as_mime())?;
        let form = Form::new().part(FILE_FIELD, part);

        let resp = self.http.post(url).multipart(form).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        tracing::debug!(%status, bytes = body.len(), "predict response received");

        interpret_response(status, &body)
    }

    /// Probe `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint("health");
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("health request to {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("health check returned HTTP {status}");
        }
        resp.json::<HealthStatus>()
            .await
            .context("failed to decode health response")
    }
}
