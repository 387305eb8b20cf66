//! On-disk cache of API tokens.
//!
//! One file per (user, server host, port) in the user's home directory:
//! `~/.migasfree-token_{user}_{host}[_{port}]`. The file holds the raw token and
//! is made read-only for its owner once written. Entries are never invalidated
//! here; a stale token surfaces as an HTTP error on the first call that uses it.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

pub const TOKEN_FILE_PREFIX: &str = ".migasfree-token";
pub const HOME_DIR_ENV: &str = "MIGASFREE_SDK_HOME";

#[derive(Debug, Error)]
pub enum TokenCacheError {
    #[error("failed to resolve the user's home directory")]
    HomeDirectoryNotFound,
    #[error("IO error on token file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The home directory holding token files
///
/// `MIGASFREE_SDK_HOME` overrides the platform home directory.
pub fn default_home() -> Result<PathBuf, TokenCacheError> {
    if let Ok(home) = std::env::var(HOME_DIR_ENV) {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or(TokenCacheError::HomeDirectoryNotFound)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(home: &Path, user: &str, server: &str) -> Self {
        Self {
            path: home.join(Self::file_name(user, server)),
        }
    }

    /// `.migasfree-token_{user}_{host}` with `_{port}` appended when the server has one
    pub fn file_name(user: &str, server: &str) -> String {
        let mut parts = server.split(':');
        let host = parts.next().unwrap_or_default();
        let port = match (parts.next(), parts.next()) {
            (Some(port), None) => format!("_{}", port),
            _ => String::new(),
        };
        format!("{}_{}_{}{}", TOKEN_FILE_PREFIX, user, host, port)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached token, `None` when there is no cache file
    pub fn load(&self) -> Result<Option<String>, TokenCacheError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                debug!("Using cached token from {}", self.path.display());
                Ok(Some(content.trim().to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!("No token file at {}", self.path.display());
                Ok(None)
            }
            Err(source) => Err(self.io_error(source)),
        }
    }

    /// Write the token and restrict the file to owner-read
    pub fn store(&self, token: &str) -> Result<(), TokenCacheError> {
        // a previous token file is read-only
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| self.io_error(e))?;
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, token).map_err(|e| self.io_error(e))?;
        self.restrict_permissions()?;
        debug!("Saved token to {}", self.path.display());
        Ok(())
    }

    #[cfg(unix)]
    fn restrict_permissions(&self) -> Result<(), TokenCacheError> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&self.path, fs::Permissions::from_mode(0o400))
            .map_err(|e| self.io_error(e))
    }

    #[cfg(not(unix))]
    fn restrict_permissions(&self) -> Result<(), TokenCacheError> {
        let mut permissions = fs::metadata(&self.path)
            .map_err(|e| self.io_error(e))?
            .permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&self.path, permissions).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> TokenCacheError {
        TokenCacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
