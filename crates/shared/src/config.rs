//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Billing run configuration.
    #[serde(default)]
    pub billing: BillingConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL, e.g. `sqlite://classbill.db?mode=rwc`.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Whether the server applies pending migrations on startup.
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_run_migrations() -> bool {
    true
}

/// Which students a draft generation run bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentSelection {
    /// Bill active students; when no student is flagged active, bill everyone.
    ///
    /// Legacy behavior. It can pull deactivated or test students into a run.
    #[default]
    ActiveOrAll,
    /// Bill active students only.
    ActiveOnly,
}

/// Billing run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Student selection policy for draft generation.
    #[serde(default)]
    pub student_selection: StudentSelection,
    /// Root directory issued invoice documents are written to.
    #[serde(default = "default_documents_dir")]
    pub documents_dir: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            student_selection: StudentSelection::default(),
            documents_dir: default_documents_dir(),
        }
    }
}

fn default_documents_dir() -> String {
    "invoices".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CLASSBILL").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("CLASSBILL__DATABASE__URL", Some("sqlite::memory:")),
                ("CLASSBILL__SERVER__PORT", None),
                ("CLASSBILL__BILLING__STUDENT_SELECTION", None),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 5);
                assert!(config.database.run_migrations);
                assert_eq!(config.server.port, 8080);
                assert_eq!(
                    config.billing.student_selection,
                    StudentSelection::ActiveOrAll
                );
                assert_eq!(config.billing.documents_dir, "invoices");
                assert!(!config.logging.json);
            },
        );
    }

    #[test]
    fn test_student_selection_from_environment() {
        temp_env::with_vars(
            [
                ("CLASSBILL__DATABASE__URL", Some("sqlite::memory:")),
                ("CLASSBILL__BILLING__STUDENT_SELECTION", Some("active_only")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(
                    config.billing.student_selection,
                    StudentSelection::ActiveOnly
                );
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars([("CLASSBILL__DATABASE__URL", None::<&str>)], || {
            assert!(AppConfig::load().is_err());
        });
    }
}
