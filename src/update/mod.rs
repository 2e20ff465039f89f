//! Update check against a published `version.json` manifest.
//!
//! The check is fire-and-forget: any network or parse failure is logged and
//! reported as "no update".

mod version;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

pub use version::ReleaseVersion;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Manifest has no version")]
    MissingVersion,

    #[error("Invalid version '{0}'")]
    InvalidVersion(String),
}

/// Contents of the update manifest.
///
/// `url` predates per-platform links and points at the Windows installer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateInfo {
    #[serde(alias = "Version")]
    pub version: Option<String>,
    #[serde(alias = "Url")]
    pub url: Option<String>,
    #[serde(alias = "ReleaseNotes")]
    pub release_notes: Option<String>,
    #[serde(alias = "UrlWindows")]
    pub url_windows: Option<String>,
    #[serde(alias = "UrlMacIntel")]
    pub url_mac_intel: Option<String>,
    #[serde(alias = "UrlMacArm")]
    pub url_mac_arm: Option<String>,
    #[serde(alias = "UrlLinux")]
    pub url_linux: Option<String>,
}

/// Where a download link is needed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacIntel,
    MacArm,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn from_parts(os: &str, arch: &str) -> Self {
        match (os, arch) {
            ("windows", _) => Self::Windows,
            ("macos", "aarch64") => Self::MacArm,
            ("macos", _) => Self::MacIntel,
            ("linux", _) => Self::Linux,
            _ => Self::Other,
        }
    }
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}

impl UpdateInfo {
    /// Set `url` to the download link for `platform`.
    ///
    /// Windows prefers `url_windows` and keeps the legacy `url` otherwise;
    /// other platforms only use their dedicated field.
    pub fn resolve_platform_url(&mut self, platform: Platform) {
        self.url = match platform {
            Platform::Windows => non_empty(&self.url_windows).or_else(|| non_empty(&self.url)),
            Platform::MacArm => non_empty(&self.url_mac_arm),
            Platform::MacIntel => non_empty(&self.url_mac_intel),
            Platform::Linux => non_empty(&self.url_linux),
            Platform::Other => None,
        };
    }

    /// The manifest if it offers a newer release with a link for `platform`.
    pub fn newer_than(
        mut self,
        current: &ReleaseVersion,
        platform: Platform,
    ) -> Result<Option<Self>, UpdateError> {
        let raw = self.version.clone().ok_or(UpdateError::MissingVersion)?;
        let latest = ReleaseVersion::parse(&raw).ok_or(UpdateError::InvalidVersion(raw))?;

        self.resolve_platform_url(platform);
        if self.url.is_none() {
            tracing::debug!(?platform, "no download link for this platform");
            return Ok(None);
        }
        Ok((latest > *current).then_some(self))
    }
}

/// HTTP client for the update manifest.
#[derive(Debug, Clone)]
pub struct UpdateClient {
    url: String,
    client: Client,
}

impl UpdateClient {
    pub fn from_config(config: &Config) -> Result<Self, UpdateError> {
        Self::new(&config.update_url, &config.user_agent)
    }

    pub fn new(url: impl Into<String>, user_agent: &str) -> Result<Self, UpdateError> {
        let client = Client::builder().user_agent(user_agent.to_string()).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Download and parse the manifest.
    pub async fn fetch(&self) -> Result<UpdateInfo, UpdateError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpdateError::Server(format!("{}: {}", status, body)));
        }
        Ok(response.json().await?)
    }

    /// Newer release for the running platform, or `None` on any failure.
    pub async fn check_for_update(&self, current: &ReleaseVersion) -> Option<UpdateInfo> {
        let result = match self.fetch().await {
            Ok(info) => info.newer_than(current, Platform::current()),
            Err(e) => Err(e),
        };
        match result {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("update check failed: {}", e);
                None
            }
        }
    }
}
