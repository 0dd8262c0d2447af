use crate::utils::errors::{CertError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub struct CertAnchorPaths;
const PROGRAM_NAME: &str = "cert-anchor";

impl CertAnchorPaths {
    /// Get the base data directory: ~/.local/share/cert-anchor/
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|dir| dir.join(PROGRAM_NAME))
            .ok_or_else(|| CertError::Config("Cannot determine local data directory".to_string()))
    }

    /// Get the config directory: ~/.config/cert-anchor/
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(PROGRAM_NAME))
            .ok_or_else(|| CertError::Config("Cannot determine config directory".to_string()))
    }

    /// Get the default config file: ~/.config/cert-anchor/config.yaml
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.yaml"))
    }

    /// Get the default certificate store: ~/.local/share/cert-anchor/certificates.json
    pub fn store_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("certificates.json"))
    }

    /// Expand a leading `~/` to the user's home directory
    pub fn expand_home(path: &str) -> Result<PathBuf> {
        match path.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .ok_or_else(|| CertError::Config("Cannot determine home directory".to_string())),
            None => Ok(PathBuf::from(path)),
        }
    }

    /// Ensure a directory exists with proper permissions
    pub fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;

            // Set restrictive permissions on data directories (700)
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let mut perms = fs::metadata(path)?.permissions();
                perms.set_mode(0o700);
                fs::set_permissions(path, perms)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        let path = CertAnchorPaths::expand_home("/var/lib/certs.json").unwrap();
        assert_eq!(path, PathBuf::from("/var/lib/certs.json"));
    }

    #[test]
    fn test_ensure_dir_exists_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        CertAnchorPaths::ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
