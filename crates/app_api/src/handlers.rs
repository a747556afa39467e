use std::path::Path;

use tracker_app::{AppError, Result};
use tracker_core::{DbStats, Provider, SessionRecord, UsageSnapshot};

use crate::{
    AppContext, GetSessionsRequest, GetSettingRequest, OkResponse, ParseFileRequest,
    RebuildResponse, SaveSettingRequest, SettingResponse, expand_home_path,
};

fn parse_provider(value: &str) -> Result<Provider> {
    value
        .parse::<Provider>()
        .map_err(|err| AppError::InvalidInput(err.to_string()))
}

pub fn get_all_usage(ctx: &AppContext) -> Result<UsageSnapshot> {
    ctx.app_state.services.analytics.usage()
}

pub fn get_sessions(ctx: &AppContext, req: GetSessionsRequest) -> Result<Vec<SessionRecord>> {
    let provider = parse_provider(&req.provider)?;
    let sessions = ctx.app_state.services.sync.sessions(provider)?;
    Ok(sessions.as_ref().clone())
}

pub fn refresh_data(ctx: &AppContext) -> Result<UsageSnapshot> {
    ctx.app_state.services.analytics.refresh()
}

pub fn force_rebuild(ctx: &AppContext) -> Result<RebuildResponse> {
    let report = ctx.app_state.services.storage.rebuild()?;
    let stats = ctx.app_state.services.storage.stats()?;
    Ok(RebuildResponse {
        providers: report.providers,
        elapsed_ms: report.elapsed_ms,
        stats,
    })
}

pub fn get_setting(ctx: &AppContext, req: GetSettingRequest) -> Result<SettingResponse> {
    let value = ctx
        .app_state
        .services
        .settings
        .get(&req.key, &req.default)?;
    Ok(SettingResponse {
        key: req.key,
        value,
    })
}

pub fn save_setting(ctx: &AppContext, req: SaveSettingRequest) -> Result<OkResponse> {
    ctx.app_state
        .services
        .settings
        .save(&req.key, &req.value)?;
    Ok(OkResponse { ok: true })
}

pub fn get_db_stats(ctx: &AppContext) -> Result<DbStats> {
    ctx.app_state.services.storage.stats()
}

/// Parses one log file without touching the store.
pub fn parse_file(req: ParseFileRequest) -> Result<SessionRecord> {
    let provider = parse_provider(&req.provider)?;
    let path = expand_home_path(&req.path);
    if !Path::new(&path).is_file() {
        return Err(AppError::NotFound(format!(
            "session file not found: {}",
            path.display()
        )));
    }
    Ok(ingest::parse_session(provider, &path))
}
