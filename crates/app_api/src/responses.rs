use serde::Serialize;
use tracker_app::{AppError, SyncStats};
use tracker_core::DbStats;

/// Envelope every command returns to the frontend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> CommandResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
            code: err.code().map(str::to_string),
        }
    }
}

/// Converts a handler result into the success/error envelope.
pub fn respond<T>(result: Result<T, AppError>) -> CommandResponse<T> {
    match result {
        Ok(data) => CommandResponse::ok(data),
        Err(err) => CommandResponse::error(&err),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildResponse {
    pub providers: Vec<SyncStats>,
    pub elapsed_ms: u64,
    pub stats: DbStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingResponse {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}
