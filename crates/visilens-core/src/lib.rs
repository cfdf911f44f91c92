pub mod app_config;
pub mod config;
pub mod lexicons;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use lexicons::{load_lexicons, Lexicons};
pub use types::{
    ContentDocument, InputType, Mentions, OpinionPayload, RaterOpinion, ScoreAssessment,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read lexicons file {path}: {source}")]
    LexiconsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lexicons file: {0}")]
    LexiconsFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
