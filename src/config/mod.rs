//! Application configuration module
//!
//! This module provides type-safe configuration loading using the `config`
//! and `dotenvy` crates. Values come from an optional `formflow.toml` file
//! and from environment variables with the `FORMFLOW` prefix, where nested
//! values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use formflow::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Storing forms in {:?}", config.storage.backend);
//! ```

mod error;
mod logging;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

use crate::domain::form::{FormConfiguration, FormOptions};

/// Environment variable naming the configuration file
pub const CONFIG_FILE_ENV: &str = "FORMFLOW_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "formflow";

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Vocabulary and templates the forms speak with
    #[serde(default)]
    pub form: FormConfiguration,

    /// Form behavior switches
    #[serde(default)]
    pub options: FormOptions,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads `formflow.toml` (or the file named by `FORMFLOW_CONFIG`) if present
    /// 3. Reads environment variables with `FORMFLOW` prefix
    /// 4. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `FORMFLOW__STORAGE__BACKEND=file` -> `storage.backend = file`
    /// - `FORMFLOW__OPTIONS__PROMPT_IN_START=true` -> `options.prompt_in_start = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or values cannot be
    /// parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let file = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::default()
                    .prefix("FORMFLOW")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Checks that yes/no vocabularies are present and compile as patterns,
    /// that template overrides are not empty, and that the storage and
    /// logging sections are usable.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_terms("yes", &self.form.yes)?;
        validate_terms("no", &self.form.no)?;
        validate_terms("no preference", &self.form.no_preference)?;
        for command in self.form.commands.values() {
            validate_terms("a command", &command.terms)?;
        }
        if let Some((usage, _)) = self
            .form
            .templates
            .iter()
            .find(|(_, template)| template.trim().is_empty())
        {
            return Err(ValidationError::EmptyTemplate(*usage));
        }
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

fn validate_terms(what: &'static str, terms: &[String]) -> Result<(), ValidationError> {
    if terms.is_empty() {
        return Err(ValidationError::EmptyTerms(what));
    }
    for term in terms {
        regex::Regex::new(term).map_err(|e| ValidationError::InvalidTerm {
            term: term.clone(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::TemplateUsage;
    use std::env;
    use std::io::Write;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to clear environment variables after testing
    fn clear_env() {
        env::remove_var(CONFIG_FILE_ENV);
        env::remove_var("FORMFLOW__STORAGE__BACKEND");
        env::remove_var("FORMFLOW__STORAGE__PATH");
        env::remove_var("FORMFLOW__OPTIONS__PROMPT_IN_START");
        env::remove_var("FORMFLOW__LOGGING__JSON");
    }

    #[test]
    fn test_load_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var(CONFIG_FILE_ENV, "/nonexistent/formflow");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(!config.options.prompt_in_start);
        assert_eq!(config.form, FormConfiguration::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var(CONFIG_FILE_ENV, "/nonexistent/formflow");
        env::set_var("FORMFLOW__STORAGE__BACKEND", "file");
        env::set_var("FORMFLOW__STORAGE__PATH", "/tmp/forms");
        env::set_var("FORMFLOW__OPTIONS__PROMPT_IN_START", "true");
        env::set_var("FORMFLOW__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.path, std::path::PathBuf::from("/tmp/forms"));
        assert!(config.options.prompt_in_start);
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[options]
prompt_fields_with_values = true

[form]
yes = ["yes", "yup"]

[form.templates]
not_understood = "Sorry, I don't know \"{{input}}\"."
"#
        )
        .unwrap();
        env::set_var(CONFIG_FILE_ENV, file.path());
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.options.prompt_fields_with_values);
        assert_eq!(config.form.yes, vec!["yes", "yup"]);
        assert_eq!(config.form.no, FormConfiguration::default().no);
        assert_eq!(
            config.form.template(TemplateUsage::NotUnderstood),
            "Sorry, I don't know \"{input}\"."
        );
    }

    #[test]
    fn test_validate_rejects_empty_yes_terms() {
        let mut config = AppConfig::default();
        config.form.yes.clear();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::EmptyTerms("yes"))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_term_pattern() {
        let mut config = AppConfig::default();
        config.form.no.push("(unclosed".to_string());
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTerm { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_template() {
        let mut config = AppConfig::default();
        config
            .form
            .templates
            .insert(TemplateUsage::Feedback, "  ".to_string());
        assert!(matches!(
            config.validate(),
            Err(ValidationError::EmptyTemplate(TemplateUsage::Feedback))
        ));
    }
}
