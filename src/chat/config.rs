//! Configuration types for the chat front end.
//!
//! CLI argument parsing via `arrrg`, resolved into a [`ChatConfig`] with
//! defaults matching the original product: `gpt-4o` at temperature 0.5.

use arrrg_derive::CommandLine;

use crate::client::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::config::DEFAULT_CONFIG_PATH;

/// Command-line arguments for the edulingo-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Path to the configuration file.
    #[arrrg(optional, "Configuration file (default: config.json)", "PATH")]
    pub config: Option<String>,

    /// Model to use for generation.
    #[arrrg(optional, "Model to use (default: gpt-4o)", "MODEL")]
    pub model: Option<String>,
}

/// Resolved configuration for a chat session.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Path of the startup configuration file.
    pub config_path: String,

    /// The model used for generating responses.
    pub model: String,

    /// Sampling temperature sent with every request.
    pub temperature: f32,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    pub fn new() -> Self {
        Self {
            config_path: DEFAULT_CONFIG_PATH.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            config_path: args
                .config
                .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string()),
            model: args.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            ..ChatConfig::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.config_path, "config.json");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.temperature, 0.5);
    }

    #[test]
    fn config_from_args_defaults() {
        let args = ChatArgs::default();
        let config = ChatConfig::from(args);
        assert_eq!(config.config_path, "config.json");
        assert_eq!(config.model, "gpt-4o");
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            config: Some("/etc/edulingo/config.json".to_string()),
            model: Some("gpt-4o-mini".to_string()),
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.config_path, "/etc/edulingo/config.json");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.5);
    }
}
