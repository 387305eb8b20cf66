//! Credential providers.
//!
//! The client asks a [`CredentialProvider`] for whatever it cannot resolve on its
//! own: the server when neither the caller nor a configuration file names one,
//! the username when none was given, and the password before requesting a token.

use inquire::{Password, PasswordDisplayMode, Text};
use tracing::trace;

use crate::model::DEFAULT_SERVER;

const APP_NAME: &str = "Migasfree SDK";

/// Source of interactive credentials
///
/// `None` or an empty string means the user cancelled or no prompt is possible.
pub trait CredentialProvider {
    fn prompt_server(&self) -> Option<String>;
    fn prompt_username(&self, server: &str) -> Option<String>;
    fn prompt_password(&self, server: &str, username: &str) -> Option<String>;
}

/// Prompts on the controlling terminal
#[derive(Debug, Default, Clone)]
pub struct InteractivePrompt;

impl CredentialProvider for InteractivePrompt {
    fn prompt_server(&self) -> Option<String> {
        let answer = Text::new("Server:")
            .with_default(DEFAULT_SERVER)
            .with_help_message(APP_NAME)
            .prompt();
        match answer {
            Ok(server) => Some(server.trim().to_string()),
            Err(e) => {
                trace!("Server prompt unavailable: {}", e);
                None
            }
        }
    }

    fn prompt_username(&self, server: &str) -> Option<String> {
        let help = format!("{} @ {}", APP_NAME, server);
        match Text::new("User:").with_help_message(&help).prompt() {
            Ok(user) => Some(user.trim().to_string()),
            Err(e) => {
                trace!("User prompt unavailable: {}", e);
                None
            }
        }
    }

    fn prompt_password(&self, server: &str, username: &str) -> Option<String> {
        let message = format!("Password {}@{}:", username, server);
        let answer = Password::new(&message)
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt();
        match answer {
            Ok(password) => Some(password),
            Err(e) => {
                trace!("Password prompt unavailable: {}", e);
                None
            }
        }
    }
}

/// Fixed answers, for scripts and non-interactive environments
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials {
    server: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl CredentialProvider for StaticCredentials {
    fn prompt_server(&self) -> Option<String> {
        self.server.clone()
    }

    fn prompt_username(&self, _server: &str) -> Option<String> {
        self.username.clone()
    }

    fn prompt_password(&self, _server: &str, _username: &str) -> Option<String> {
        self.password.clone()
    }
}
