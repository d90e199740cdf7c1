use serde::{Deserialize, Serialize};

use crate::CatalogError;

pub const DEFAULT_REMOTE_BASE_URL: &str = "https://aerocoreos.tail79107c.ts.net/echoverse/Albums/";

/// Host and share name of the network share the inventory was recorded against. Used to
/// recognise and rebuild UNC paths whose separators were lost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareLayout {
    pub host: String,
    pub share: String,
}

impl Default for ShareLayout {
    fn default() -> Self {
        Self {
            host: "envy2-0".to_string(),
            share: "EchoVerse_Music".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub remote_base_url: String,
    pub remote_enabled: bool,
    pub allowed_roots: Vec<String>,
    pub share: ShareLayout,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            remote_base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
            remote_enabled: true,
            allowed_roots: vec![
                r"M:\Albums\".to_string(),
                r"D:\Clients\AeroVista\Projects\EchoVerse_Music\Albums\".to_string(),
                "music_catalog/".to_string(),
                r"\\envy2-0\EchoVerse_Music\Albums\".to_string(),
                "//envy2-0/EchoVerse_Music/Albums/".to_string(),
            ],
            share: ShareLayout::default(),
        }
    }
}

impl StorageConfig {
    pub fn remote_url(&self, relative: &str) -> String {
        format!("{}{}", self.remote_base_url, relative)
    }
}

/// Update payload for the storage configuration. `remote_base_url` and `allowed_roots` are
/// required; omitted optional fields keep their current values.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StorageConfigUpdate {
    pub remote_base_url: Option<String>,
    pub remote_enabled: Option<bool>,
    pub allowed_roots: Option<Vec<String>>,
    pub share: Option<ShareLayout>,
}

impl StorageConfigUpdate {
    pub fn into_config(self, current: &StorageConfig) -> Result<StorageConfig, CatalogError> {
        let remote_base_url = self
            .remote_base_url
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                CatalogError::ConfigurationInvalid("remote_base_url is required".to_string())
            })?;
        let allowed_roots = self.allowed_roots.ok_or_else(|| {
            CatalogError::ConfigurationInvalid("allowed_roots is required".to_string())
        })?;
        let allowed_roots = allowed_roots
            .into_iter()
            .map(|root| root.trim().to_string())
            .filter(|root| !root.is_empty())
            .collect();

        Ok(StorageConfig {
            remote_base_url,
            remote_enabled: self.remote_enabled.unwrap_or(current.remote_enabled),
            allowed_roots,
            share: self.share.unwrap_or_else(|| current.share.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_requires_base_url() {
        let update = StorageConfigUpdate {
            remote_base_url: Some("   ".to_string()),
            allowed_roots: Some(vec!["/srv/music".to_string()]),
            ..Default::default()
        };
        let err = update.into_config(&StorageConfig::default()).unwrap_err();
        assert!(matches!(err, CatalogError::ConfigurationInvalid(_)));
    }

    #[test]
    fn update_requires_roots() {
        let update = StorageConfigUpdate {
            remote_base_url: Some("https://remote.example/Albums/".to_string()),
            ..Default::default()
        };
        let err = update.into_config(&StorageConfig::default()).unwrap_err();
        assert!(matches!(err, CatalogError::ConfigurationInvalid(_)));
    }

    #[test]
    fn update_keeps_current_optional_fields() {
        let current = StorageConfig {
            remote_enabled: false,
            ..StorageConfig::default()
        };
        let update = StorageConfigUpdate {
            remote_base_url: Some(" https://remote.example/Albums/ ".to_string()),
            allowed_roots: Some(vec!["/srv/music".to_string(), "  ".to_string()]),
            ..Default::default()
        };
        let config = update.into_config(&current).unwrap();
        assert_eq!(config.remote_base_url, "https://remote.example/Albums/");
        assert_eq!(config.allowed_roots, vec!["/srv/music".to_string()]);
        assert!(!config.remote_enabled);
        assert_eq!(config.share, current.share);
    }

    #[test]
    fn remote_url_appends_relative_path() {
        let config = StorageConfig::default();
        assert_eq!(
            config.remote_url("Neon Dreams/cover.jpg"),
            format!("{}Neon Dreams/cover.jpg", DEFAULT_REMOTE_BASE_URL)
        );
    }
}
