use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;
use zip::write::FileOptions;

use crate::app::api::client::LinkClient;
use crate::app::config::{load_config, AppConfig};
use crate::app::error::AppError;

#[derive(Debug, Serialize)]
struct DiagnosticsManifest {
    app_version: &'static str,
    os: &'static str,
    arch: &'static str,
    timestamp_utc: String,
    trace_id: String,
}

/// What we admit to knowing about the signed-in user. Never the email,
/// name, or contact: support bundles get shared around.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub logged_in: bool,
    pub user_type: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiProbe {
    base_url: String,
    reachable: bool,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct DiagnosticsPayload {
    manifest: DiagnosticsManifest,
    config: AppConfig,
    session: SessionSummary,
    api: ApiProbe,
}

fn resolve_output_dir(output_dir: Option<String>) -> String {
    if let Some(dir) = output_dir
        .as_ref()
        .map(|value| value.trim())
        .filter(|v| !v.is_empty())
    {
        return dir.to_string();
    }
    std::env::temp_dir()
        .join("link_response_diagnostics")
        .to_string_lossy()
        .to_string()
}

pub async fn export_diagnostics_bundle(
    client: &LinkClient,
    session: SessionSummary,
    output_dir: Option<String>,
    trace_id: &str,
) -> Result<PathBuf, AppError> {
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            warn!(trace_id = %trace_id, error = %err, "Failed to load config for diagnostics");
            AppConfig::default()
        }
    };

    let resolved_dir = resolve_output_dir(output_dir);
    fs::create_dir_all(&resolved_dir)
        .map_err(|err| AppError::system(format!("Failed to create output dir: {err}"), trace_id))?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let trace_short = trace_id.chars().take(8).collect::<String>();
    let filename = format!("diagnostics_{}_{}.zip", timestamp, trace_short);
    let bundle_path = PathBuf::from(&resolved_dir).join(filename);

    let manifest = DiagnosticsManifest {
        app_version: env!("CARGO_PKG_VERSION"),
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        timestamp_utc: Utc::now().to_rfc3339(),
        trace_id: trace_id.to_string(),
    };

    // The cheapest read-only endpoint doubles as the reachability probe.
    let api = match client.base_stations().await {
        Ok(_) => ApiProbe {
            base_url: client.endpoints().base().to_string(),
            reachable: true,
            error: None,
        },
        Err(failure) => {
            warn!(trace_id = %trace_id, error = %failure, "API probe failed during diagnostics");
            ApiProbe {
                base_url: client.endpoints().base().to_string(),
                reachable: false,
                error: Some(failure.to_string()),
            }
        }
    };

    let payload = DiagnosticsPayload {
        manifest,
        config,
        session,
        api,
    };

    let json = serde_json::to_vec_pretty(&payload).map_err(|err| {
        AppError::system(
            format!("Failed to serialize diagnostics payload: {err}"),
            trace_id,
        )
    })?;

    let file = fs::File::create(&bundle_path)
        .map_err(|err| AppError::system(format!("Failed to create bundle: {err}"), trace_id))?;
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("diagnostics.json", FileOptions::<()>::default())
        .map_err(|err| AppError::system(format!("Failed to write bundle: {err}"), trace_id))?;
    zip.write_all(&json)
        .map_err(|err| AppError::system(format!("Failed to write bundle: {err}"), trace_id))?;
    zip.finish()
        .map_err(|err| AppError::system(format!("Failed to finalize bundle: {err}"), trace_id))?;

    Ok(bundle_path)
}
