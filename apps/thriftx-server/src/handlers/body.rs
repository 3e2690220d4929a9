//! Request bodies for admin routes, read only after the caller is authorized.

use actix_web::web::{self, Bytes};
use serde::de::DeserializeOwned;

use crate::middleware::error::{AppError, AppResult};

/// Largest accepted JSON body on post mutations.
pub const MAX_JSON_BYTES: usize = 2 * 1024 * 1024;

/// Drain `payload`, failing with 413 past `limit` bytes.
pub async fn read_limited(payload: web::Payload, limit: usize) -> AppResult<Bytes> {
    match payload.to_bytes_limited(limit).await {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(err)) => Err(AppError::BadRequest(err.to_string())),
        Err(_) => Err(AppError::PayloadTooLarge(format!(
            "Request body exceeds {limit} bytes"
        ))),
    }
}

/// Read `payload` as JSON.
pub async fn read_json<T: DeserializeOwned>(payload: web::Payload) -> AppResult<T> {
    let bytes = read_limited(payload, MAX_JSON_BYTES).await?;
    serde_json::from_slice(&bytes).map_err(|err| AppError::BadRequest(err.to_string()))
}
