use thiserror::Error;
use zonk_bot::{AiConfig, AiPlayer};
use zonk_core::model::seat::Seat;

use crate::config::AgentConfig;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid params for agent '{name}': {message}")]
    InvalidParams { name: String, message: String },
}

/// Resolved agent: its name and the sanitised config every match starts from.
#[derive(Debug, Clone)]
pub(crate) struct AgentBlueprint {
    pub(crate) name: String,
    pub(crate) config: AiConfig,
}

impl AgentBlueprint {
    pub(crate) fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    pub(crate) fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let params = if config.params.is_null() {
            serde_yaml::Value::Mapping(Default::default())
        } else {
            config.params.clone()
        };

        let mut ai: AiConfig =
            serde_yaml::from_value(params).map_err(|err| AgentError::InvalidParams {
                name: config.name.clone(),
                message: err.to_string(),
            })?;

        if let Some(raw) = config.strategy.as_deref() {
            ai.selection = config.selection().ok_or_else(|| AgentError::InvalidParams {
                name: config.name.clone(),
                message: format!("unknown selection strategy '{raw}'"),
            })?;
        }

        Ok(Self {
            name: config.name.clone(),
            config: ai.sanitized(),
        })
    }

    pub(crate) fn spawn(&self, seat: Seat) -> AiPlayer {
        AiPlayer::new(seat, self.config)
    }
}
