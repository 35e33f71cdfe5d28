use std::collections::HashMap;

/// Bundled config for builds without a `.env` (web, mobile)
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

const BASE_URL_VAR: &str = "FISCAL_API_BASE_URL";
const NAMESPACE_VAR: &str = "FISCAL_STORAGE_NAMESPACE";
const DEFAULT_NAMESPACE: &str = "painel_fiscal";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the fiscal API. Empty means same origin.
    pub api_base_url: String,
    pub storage_namespace: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            storage_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the bundled `config.env`, then `.env` (native only),
    /// then real environment variables.
    pub fn load() -> Self {
        let mut values = parse_env_lines(BUNDLED_CONFIG);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match dotenvy::dotenv_iter() {
                Ok(iter) => {
                    for (key, value) in iter.flatten() {
                        values.insert(key, value);
                    }
                }
                Err(err) => tracing::debug!("no .env file loaded: {err}"),
            }
        }

        for var in [BASE_URL_VAR, NAMESPACE_VAR] {
            if let Ok(value) = std::env::var(var) {
                values.insert(var.to_string(), value);
            }
        }

        Self::from_values(&values)
    }

    pub fn from_values(values: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let api_base_url = values
            .get(BASE_URL_VAR)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);
        let storage_namespace = values
            .get(NAMESPACE_VAR)
            .map(|ns| ns.trim().to_string())
            .filter(|ns| !ns.is_empty())
            .unwrap_or(defaults.storage_namespace);
        Self {
            api_base_url,
            storage_namespace,
        }
    }

    /// Absolute URL for an API path such as `/api/chat`.
    pub fn endpoint(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        format!("{}{}", self.resolved_base(), path)
    }

    #[cfg(target_arch = "wasm32")]
    fn resolved_base(&self) -> String {
        if !self.api_base_url.is_empty() {
            return self.api_base_url.clone();
        }
        // reqwest needs absolute URLs even in the browser
        web_sys::window()
            .and_then(|window| window.location().origin().ok())
            .unwrap_or_default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn resolved_base(&self) -> String {
        self.api_base_url.clone()
    }
}

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments.
fn parse_env_lines(source: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bundled_lines() {
        let values = parse_env_lines("# comment\n\nFISCAL_API_BASE_URL = http://localhost:5000/ \nBROKEN\n");
        assert_eq!(values.len(), 1);
        let config = AppConfig::from_values(&values);
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.storage_namespace, "painel_fiscal");
    }

    #[test]
    fn bundled_config_is_valid() {
        let config = AppConfig::from_values(&parse_env_lines(BUNDLED_CONFIG));
        assert_eq!(config.storage_namespace, "painel_fiscal");
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = AppConfig {
            api_base_url: "https://fiscal.example.com".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(
            config.endpoint("/api/chat"),
            "https://fiscal.example.com/api/chat"
        );
        assert_eq!(
            config.endpoint("login"),
            "https://fiscal.example.com/login"
        );
    }
}
