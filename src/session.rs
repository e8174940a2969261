// Per-invocation context: the authorization token and the identity the
// user is acting as. Built once in `main` and passed by reference, so
// nothing about the session lives in process-wide state.

use std::path::{Path, PathBuf};

use crate::error::{ClientError, Result};

/// Impersonation value meaning "act as myself".
pub const SELF_NICKNAME: &str = "me";

const TOKEN_FILE: &str = ".envios_token";

#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    impersonate: String,
}

impl Session {
    pub fn new(token: impl Into<String>, impersonate: impl Into<String>) -> Self {
        Session {
            token: token.into(),
            impersonate: impersonate.into(),
        }
    }

    /// Pick the token from the explicit value (flag or env) or fall back
    /// to the token file. Fails before any remote call when neither exists.
    pub fn resolve(explicit: Option<&str>, token_file: &Path, impersonate: &str) -> Result<Self> {
        let token = match explicit.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => t.to_string(),
            None => load_token(token_file)?.ok_or(ClientError::NotAuthenticated)?,
        };
        Ok(Session::new(token, impersonate))
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Nickname to impersonate, or `None` when acting as the token owner.
    pub fn impersonating(&self) -> Option<&str> {
        let nick = self.impersonate.trim();
        if nick.is_empty() || nick == SELF_NICKNAME {
            None
        } else {
            Some(nick)
        }
    }
}

/// Token file in the user's home directory.
pub fn token_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(TOKEN_FILE)
}

pub fn persist_token(path: &Path, token: &str) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ClientError::NotAuthenticated);
    }
    std::fs::write(path, token).map_err(|source| ClientError::Io {
        context: format!("writing {}", path.display()),
        source,
    })
}

/// Load the stored token. A missing or blank file means "no token".
pub fn load_token(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(data) => {
            let token = data.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ClientError::Io {
            context: format!("reading {}", path.display()),
            source,
        }),
    }
}
