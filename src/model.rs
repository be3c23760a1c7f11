use crate::session::AnalysisState;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Largest image the client will hand to the inference service (16 MiB).
pub const MAX_IMAGE_BYTES: u64 = 16 * 1024 * 1024;

/// Label the inference service uses for the AI-generated class.
pub const AI_GENERATED_LABEL: &str = "AI-Generated Images";

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl MediaType {
    pub fn as_mime(self) -> &'static str {
        match self {
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
        }
    }

    /// Map a file extension to an accepted media type (`png`, `jpg`, `jpeg`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(MediaType::Png),
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            _ => None,
        }
    }
}

/// Rejections raised while turning a path into an [`ImageFile`].
#[derive(Debug, Error)]
pub enum InputError {
    #[error("unsupported file type for {0}; only PNG, JPG and JPEG are accepted")]
    UnsupportedType(String),
    #[error("{name} is {size} bytes; the limit is 16 MiB")]
    TooLarge { name: String, size: u64 },
    #[error("{0} is empty")]
    Empty(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// An image chosen by the user, held in memory with its declared media type.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    name: String,
    media_type: MediaType,
    bytes: Bytes,
}

impl ImageFile {
    pub fn from_bytes(name: impl Into<String>, media_type: MediaType, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type,
            bytes: bytes.into(),
        }
    }

    /// Read and pre-validate an image from disk.
    ///
    /// The extension decides the media type; the size is checked against
    /// [`MAX_IMAGE_BYTES`] before the file is read.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let display = path.display().to_string();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| display.clone());

        let media_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(MediaType::from_extension)
            .ok_or_else(|| InputError::UnsupportedType(name.clone()))?;

        let io_err = |source| InputError::Io {
            path: display.clone(),
            source,
        };
        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > MAX_IMAGE_BYTES {
            return Err(InputError::TooLarge { name, size });
        }
        if size == 0 {
            return Err(InputError::Empty(name));
        }

        let bytes = std::fs::read(path).map_err(io_err)?;
        Ok(Self::from_bytes(name, media_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Parsed body of a successful `/predict` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub prediction: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub percentage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_probability: Option<f64>,
    #[serde(default)]
    pub details: Option<ProbabilityDetails>,
}

/// Per-class probabilities. The two values are not assumed to sum to 1.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbabilityDetails {
    #[serde(default)]
    pub ai_generated_probability: Option<f64>,
    #[serde(default)]
    pub real_image_probability: Option<f64>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// File facts shown next to the preview and in reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub media_type: MediaType,
    pub size: u64,
}

impl From<&ImageFile> for FileSummary {
    fn from(file: &ImageFile) -> Self {
        Self {
            name: file.name().to_string(),
            media_type: file.media_type(),
            size: file.size(),
        }
    }
}

/// Everything a presentation layer needs to render the current interaction.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub file: Option<FileSummary>,
    pub preview: Option<crate::preview::Preview>,
    pub state: AnalysisState,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Snapshot(Box<SessionSnapshot>),
    Info(InfoEvent),
}

/// Structured status messages emitted by the controller for UI/CLI layers.
#[derive(Debug, Clone)]
pub enum InfoEvent {
    Message(String),
    FileRejected(String),
    Health { healthy: bool, detail: String },
    RequestIgnored,
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::FileRejected(reason) => format!("File rejected: {}", reason),
            InfoEvent::Health { healthy, detail } => {
                if *healthy {
                    format!("Backend healthy: {}", detail)
                } else {
                    format!("Backend unavailable: {}", detail)
                }
            }
            InfoEvent::RequestIgnored => "Analysis already in progress".to_string(),
        }
    }
}
