use std::any::Any;

use orgadmin_states::{State, state_assign_impl};
use serde::Deserialize;
use ustr::Ustr;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const DEFAULT_DROPDOWN_LIMIT: usize = 50;

/// Raw environment input; every field is optional and defaulted in [`BusinessConfig::from_raw`].
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    orgadmin_api_base_url: Option<String>,
    orgadmin_username: Option<String>,
    orgadmin_password: Option<String>,
    orgadmin_page_size: Option<u64>,
    orgadmin_dropdown_limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessConfig {
    /// Server root, without the trailing `/api`.
    pub api_base_url: String,
    /// Basic-auth credentials. Both must be present to be sent.
    pub username: Option<String>,
    pub password: Option<String>,
    pub page_size: u64,
    /// Option count above which a dropdown switches to the filter dialog.
    pub dropdown_limit: usize,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL.to_owned())
    }
}

impl BusinessConfig {
    pub fn new(base_url: String) -> Self {
        Self {
            api_base_url: base_url,
            username: None,
            password: None,
            page_size: DEFAULT_PAGE_SIZE,
            dropdown_limit: DEFAULT_DROPDOWN_LIMIT,
        }
    }

    /// Reads `ORGADMIN_*` environment variables.
    pub fn init() -> anyhow::Result<Self> {
        Self::from_iter(std::env::vars())
    }

    pub fn from_iter<I, K, V>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let raw: RawConfig = serde_env::from_iter(
            vars.into_iter()
                .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned())),
        )?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> anyhow::Result<Self> {
        let RawConfig {
            orgadmin_api_base_url,
            orgadmin_username,
            orgadmin_password,
            orgadmin_page_size,
            orgadmin_dropdown_limit,
        } = raw;

        let api_base_url = match orgadmin_api_base_url {
            Some(url) => {
                log::info!("Using provided ORGADMIN_API_BASE_URL: {url}");
                url.trim_end_matches('/').to_owned()
            }
            None => {
                log::info!("ORGADMIN_API_BASE_URL not set, defaulting to {DEFAULT_API_BASE_URL}");
                DEFAULT_API_BASE_URL.to_owned()
            }
        };

        let page_size = orgadmin_page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            anyhow::bail!("ORGADMIN_PAGE_SIZE must be greater than zero");
        }

        if orgadmin_username.is_some() != orgadmin_password.is_some() {
            log::warn!("ORGADMIN_USERNAME and ORGADMIN_PASSWORD must be set together; ignoring");
        }

        Ok(Self {
            api_base_url,
            username: orgadmin_username,
            password: orgadmin_password,
            page_size,
            dropdown_limit: orgadmin_dropdown_limit.unwrap_or(DEFAULT_DROPDOWN_LIMIT),
        })
    }

    pub fn api_url(&self) -> Ustr {
        if self.api_base_url.is_empty() {
            Ustr::from("/api")
        } else {
            Ustr::from(&format!("{}/api", self.api_base_url))
        }
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

impl State for BusinessConfig {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_set() {
        let config = BusinessConfig::from_iter(Vec::<(String, String)>::new()).unwrap();

        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.api_url(), Ustr::from("http://localhost:8080/api"));
        assert_eq!(config.page_size, 50);
        assert_eq!(config.dropdown_limit, 50);
        assert_eq!(config.credentials(), None);
    }

    #[test]
    fn reads_environment_values() {
        let config = BusinessConfig::from_iter(vec![
            ("ORGADMIN_API_BASE_URL", "https://play.example.org/dev/"),
            ("ORGADMIN_USERNAME", "admin"),
            ("ORGADMIN_PASSWORD", "district"),
            ("ORGADMIN_PAGE_SIZE", "25"),
        ])
        .unwrap();

        assert_eq!(config.api_base_url, "https://play.example.org/dev");
        assert_eq!(
            config.api_url(),
            Ustr::from("https://play.example.org/dev/api")
        );
        assert_eq!(config.credentials(), Some(("admin", "district")));
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let result = BusinessConfig::from_iter(vec![("ORGADMIN_PAGE_SIZE", "0")]);
        assert!(result.is_err());
    }

    #[test]
    fn empty_base_url_uses_relative_api() {
        let config = BusinessConfig::new(String::new());
        assert_eq!(config.api_url(), Ustr::from("/api"));
    }
}
