//! Creatives generation endpoint
//!
//! Streams each provider's batch of ad creatives as one JSON object per line
//! so the caller sees results as they complete instead of waiting for the
//! slowest provider

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::header::CONTENT_TYPE,
    response::Response,
};
use futures::StreamExt;
use serde::Deserialize;
use tracing::error;

use super::AppState;
use crate::services::creatives;
use crate::utils::error::AppError;

#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    /// NCT ID of the trial the campaign is for
    pub nct_id: String,
}

/// GET /creatives/generate/{customer_id}?nct_id=...
///
/// Fatal failures (unknown customer, missing service config, trial lookup
/// errors) return an error payload; per-provider failures silently reduce the
/// number of streamed lines.
pub async fn generate_creatives(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
    Query(params): Query<GenerateParams>,
) -> Result<Response, AppError> {
    let results = creatives::generate(
        &state.resolver,
        &state.registry,
        &state.trials,
        &customer_id,
        &params.nct_id,
    )
    .await?;

    let ndjson = results.filter_map(|batch| async move {
        match serde_json::to_vec(&batch) {
            Ok(mut line) => {
                line.push(b'\n');
                Some(Ok::<_, std::convert::Infallible>(Bytes::from(line)))
            }
            Err(e) => {
                error!("Failed to serialize creatives batch: {}", e);
                None
            }
        }
    });

    Response::builder()
        .header(CONTENT_TYPE, "application/x-ndjson")
        .body(Body::from_stream(ndjson))
        .map_err(|e| AppError::Internal(e.to_string()))
}
