//! Rater access for analysis jobs: the OpenRouter chat-completions client,
//! the fixed instruction prompt, defensive payload normalization, and the
//! concurrent per-rater fan-out with failure isolation.

mod client;
mod error;
mod fanout;
mod models;
mod normalize;
mod prompt;

pub use client::RaterClient;
pub use error::RaterError;
pub use fanout::query_raters;
pub use models::{default_raters, resolve_model};
pub use normalize::RawOpinion;
pub use prompt::build_prompt;
