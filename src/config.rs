use crate::cert::service::DEFAULT_VERIFICATION_BASE_URL;
use crate::utils::errors::{CertError, Result};
use crate::utils::paths::CertAnchorPaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_ISSUER: &str = "system";

/// Settings read from `config.yaml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store_path: Option<PathBuf>,
    pub verification_base_url: Option<String>,
    pub issuer: Option<String>,
}

impl Config {
    /// Load config from `path`; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.verification_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CertError::Config(format!(
                    "verification_base_url must be an http(s) URL: {url}"
                )));
            }
        }
        Ok(())
    }

    /// Store file: explicit override, then config, then the data directory
    pub fn store_path(&self, override_path: Option<&str>) -> Result<PathBuf> {
        if let Some(path) = override_path {
            return CertAnchorPaths::expand_home(path);
        }
        match &self.store_path {
            Some(path) => CertAnchorPaths::expand_home(&path.to_string_lossy()),
            None => CertAnchorPaths::store_file(),
        }
    }

    pub fn verification_base_url(&self) -> &str {
        self.verification_base_url
            .as_deref()
            .unwrap_or(DEFAULT_VERIFICATION_BASE_URL)
    }

    /// Default `issuedBy`: config, then `$USER`, then "system"
    pub fn issuer(&self) -> String {
        self.issuer
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ISSUER.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&tmp.path().join("absent.yaml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.verification_base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_load_yaml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        fs::write(
            &path,
            "store_path: /srv/certs/store.json\nverification_base_url: https://certs.example.edu\nissuer: registrar\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.store_path(None).unwrap(),
            PathBuf::from("/srv/certs/store.json")
        );
        assert_eq!(
            config.store_path(Some("/tmp/other.json")).unwrap(),
            PathBuf::from("/tmp/other.json")
        );
        assert_eq!(config.verification_base_url(), "https://certs.example.edu");
        assert_eq!(config.issuer(), "registrar");
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_urls() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");

        fs::write(&path, "store: /tmp/x.json\n").unwrap();
        assert!(matches!(Config::load(&path), Err(CertError::Yaml(_))));

        fs::write(&path, "verification_base_url: ftp://example\n").unwrap();
        assert!(matches!(Config::load(&path), Err(CertError::Config(_))));
    }
}
