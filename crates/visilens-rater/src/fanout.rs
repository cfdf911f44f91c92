//! Concurrent fan-out of one analysis prompt across the selected raters.

use chrono::Utc;
use futures::future::join_all;
use visilens_core::types::PROVIDER;
use visilens_core::{ContentDocument, RaterOpinion};

use crate::client::RaterClient;
use crate::models::resolve_model;
use crate::prompt::build_prompt;

/// Query every requested rater concurrently and return exactly one opinion
/// per id, in request order.
///
/// Per-rater failures never propagate: a failing rater is logged and degrades
/// to [`RaterOpinion::degraded`], leaving the other raters untouched. An empty
/// id list returns an empty vec without any network traffic.
pub async fn query_raters(
    client: &RaterClient,
    content: &ContentDocument,
    rater_ids: &[String],
) -> Vec<RaterOpinion> {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let prompt = build_prompt(content, &today);

    let calls = rater_ids.iter().map(|id| {
        let prompt = prompt.as_str();
        async move {
            let model_name = resolve_model(id);
            match client.query_opinion(model_name, prompt).await {
                Ok(payload) => RaterOpinion {
                    model: id.clone(),
                    provider: PROVIDER.to_string(),
                    payload,
                },
                Err(e) => {
                    tracing::warn!(rater = %id, model = %model_name, error = %e, "rater query failed, substituting degraded opinion");
                    RaterOpinion::degraded(id)
                }
            }
        }
    });

    join_all(calls).await
}
