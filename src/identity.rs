use crate::config::Config;
use anyhow::{Context, Result};
use std::sync::Mutex;
use tracing::info;

const GUEST: &str = "Guest";

/// Who is signed in, as far as the todo screen cares.
pub trait Identity {
    fn login_id(&self) -> Option<String>;
    fn sign_out(&self) -> Result<()>;
}

/// Identity kept in the config file: `login` stores it, `sign_out` forgets it.
pub struct ConfigIdentity {
    config: Mutex<Config>,
}

impl ConfigIdentity {
    pub fn new(config: Config) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }
}

impl Identity for ConfigIdentity {
    fn login_id(&self) -> Option<String> {
        self.config.lock().ok().and_then(|config| config.login_id.clone())
    }

    fn sign_out(&self) -> Result<()> {
        let mut config = self
            .config
            .lock()
            .map_err(|_| anyhow::anyhow!("identity state poisoned"))?;
        let previous = config.login_id.take();
        config.save().context("Failed to forget signed-in user")?;
        info!(login_id = previous.as_deref().unwrap_or(""), "signed out");
        Ok(())
    }
}

/// Greeting name for a login identifier such as an email address.
///
/// Uses the part before the first `@` with its first character upper-cased.
/// Without an `@` the whole identifier is used. An absent identifier, or one
/// with nothing before the `@`, yields `"Guest"`.
pub fn display_name(login_id: Option<&str>) -> String {
    let local = match login_id {
        Some(id) => id.split('@').next().unwrap_or(""),
        None => "",
    };

    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => GUEST.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_from_email() {
        assert_eq!(display_name(Some("jane.doe@example.com")), "Jane.doe");
        assert_eq!(display_name(Some("x@y")), "X");
    }

    #[test]
    fn test_display_name_uses_first_at_only() {
        assert_eq!(display_name(Some("bob@work@home")), "Bob");
    }

    #[test]
    fn test_display_name_without_at_uses_whole_identifier() {
        assert_eq!(display_name(Some("alice")), "Alice");
    }

    #[test]
    fn test_display_name_falls_back_to_guest() {
        assert_eq!(display_name(None), "Guest");
        assert_eq!(display_name(Some("")), "Guest");
        assert_eq!(display_name(Some("@example.com")), "Guest");
    }

    #[test]
    fn test_display_name_non_ascii_first_letter() {
        assert_eq!(display_name(Some("émile@example.fr")), "Émile");
    }

    #[test]
    fn test_config_identity_reports_login() {
        let identity = ConfigIdentity::new(Config {
            login_id: Some("x@y".to_string()),
            ..Config::default()
        });
        assert_eq!(identity.login_id().as_deref(), Some("x@y"));
    }
}
