use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GlimpseError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlimpseConfig {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the remote multimodal search service.
    #[serde(default = "default_backend_url")]
    pub url: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Attach the `modality eq video` filter to every request.
    #[serde(default = "default_true")]
    pub video_only: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            embedding_model: default_embedding_model(),
            page_size: default_page_size(),
            video_only: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory relayed files are written to, served under `/uploads/`.
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_bytes: default_max_upload_bytes(),
        }
    }
}

// -- Defaults --

fn default_web_host() -> String {
    "127.0.0.1".to_string()
}
fn default_web_port() -> u16 {
    8090
}
fn default_backend_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_embedding_model() -> String {
    "multimodal".to_string()
}
fn default_page_size() -> u32 {
    10
}
fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_max_upload_bytes() -> u64 {
    100 * 1024 * 1024
}
fn default_true() -> bool {
    true
}

impl GlimpseConfig {
    /// Load configuration with a two-layer TOML merge:
    /// 1. `~/.config/glimpse/config.toml` (global)
    /// 2. `./glimpse.toml` (per-deployment)
    pub fn load(working_dir: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        let local = working_dir
            .map(|dir| dir.join("glimpse.toml"))
            .unwrap_or_else(|| PathBuf::from("glimpse.toml"));
        if local.exists() {
            builder = builder.add_source(File::from(local).required(false));
        }

        let config = builder
            .build()
            .map_err(|e| GlimpseError::Config(e.to_string()))?;

        let mut cfg: Self = config
            .try_deserialize()
            .map_err(|e| GlimpseError::Config(e.to_string()))?;

        for warning in cfg.validate() {
            tracing::warn!("config: {warning}");
        }
        Ok(cfg)
    }

    /// Validate config values, clamping out-of-range values and collecting
    /// warnings. Lenient on purpose: values are fixed, not rejected.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if url::Url::parse(&self.backend.url).is_err() {
            warnings.push(format!(
                "backend url '{}' is not a valid URL, falling back to {}",
                self.backend.url,
                default_backend_url()
            ));
            self.backend.url = default_backend_url();
        }

        if self.backend.page_size == 0 {
            warnings.push(format!(
                "page_size must be at least 1, using {}",
                default_page_size()
            ));
            self.backend.page_size = default_page_size();
        }

        if self.backend.embedding_model.is_empty() {
            warnings.push(format!(
                "embedding_model cannot be empty, using '{}'",
                default_embedding_model()
            ));
            self.backend.embedding_model = default_embedding_model();
        }

        if self.upload.max_bytes == 0 {
            warnings.push("upload max_bytes of 0 would reject everything, using default".into());
            self.upload.max_bytes = default_max_upload_bytes();
        }

        warnings
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("glimpse").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_self_consistent() {
        let mut cfg = GlimpseConfig::default();
        assert!(cfg.validate().is_empty());
        assert_eq!(cfg.backend.page_size, 10);
        assert_eq!(cfg.backend.embedding_model, "multimodal");
        assert!(cfg.backend.video_only);
    }

    #[test]
    fn test_validate_clamps_bad_values() {
        let mut cfg = GlimpseConfig::default();
        cfg.backend.page_size = 0;
        cfg.backend.url = "nonsense".into();
        cfg.upload.max_bytes = 0;

        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 3);
        assert_eq!(cfg.backend.page_size, 10);
        assert_eq!(cfg.backend.url, default_backend_url());
        assert!(cfg.upload.max_bytes > 0);
    }

    #[test]
    fn test_partial_toml_fills_in_defaults() {
        let cfg: GlimpseConfig = Config::builder()
            .add_source(config::File::from_str(
                "[backend]\nurl = \"http://search.internal:9000\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.backend.url, "http://search.internal:9000");
        assert_eq!(cfg.backend.page_size, 10);
        assert_eq!(cfg.web.port, 8090);
    }
}
