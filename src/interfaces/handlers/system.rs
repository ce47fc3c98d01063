use std::time::Duration;

use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use humantime::format_duration;
use serde::Serialize;
use sysinfo::System;

use crate::{
    constants::START_TIME,
    repositories::{project::ProjectRepository, storage::ObjectStorage},
    use_cases::extractors::AdminSession,
    AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Ok,
    Unavailable,
}

impl ComponentStatus {
    fn from_check<E: std::fmt::Display>(component: &str, result: Result<(), E>) -> Self {
        match result {
            Ok(()) => ComponentStatus::Ok,
            Err(e) => {
                tracing::warn!(component, "Health check failed: {}", e);
                ComponentStatus::Unavailable
            }
        }
    }
}

#[derive(Serialize)]
struct HostInfo {
    os: String,
    hostname: String,
    cpu_count: usize,
    memory_total: String,
    process_memory: String,
}

#[derive(Serialize)]
struct AdminHealth {
    status: &'static str,
    version: &'static str,
    uptime: String,
    started_at: String,
    timestamp: String,
    record_store: ComponentStatus,
    object_storage: ComponentStatus,
    open_drafts: usize,
    host: HostInfo,
}

fn host_info() -> HostInfo {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_cpu_all();

    let process_memory = sysinfo::get_current_pid()
        .ok()
        .and_then(|pid| {
            sys.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[pid]), true);
            sys.process(pid).map(|p| format!("{:.2} MB", p.memory() as f64 / 1024.0 / 1024.0))
        })
        .unwrap_or_else(|| "Unknown".to_string());

    HostInfo {
        os: System::long_os_version().unwrap_or_else(|| "Unknown".to_string()),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        cpu_count: sys.cpus().len(),
        memory_total: format!("{:.2} GB", sys.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0),
        process_memory,
    }
}

/// Backend reachability for the admin dashboard.
#[get("/health")]
pub async fn admin_health_check(_admin: AdminSession, state: web::Data<AppState>) -> HttpResponse {
    let handler = &state.project_handler;
    let (records, storage) = tokio::join!(
        handler.project_repo.check_connection(),
        handler.storage.check(),
    );

    let record_store = ComponentStatus::from_check("record_store", records);
    let object_storage = ComponentStatus::from_check("object_storage", storage);

    let now = Utc::now();
    let uptime = now.signed_duration_since(*START_TIME).num_seconds().max(0) as u64;

    let degraded = record_store != ComponentStatus::Ok || object_storage != ComponentStatus::Ok;

    HttpResponse::Ok().json(AdminHealth {
        status: if degraded { "degraded" } else { "healthy" },
        version: env!("CARGO_PKG_VERSION"),
        uptime: format_duration(Duration::from_secs(uptime)).to_string(),
        started_at: START_TIME.to_rfc3339(),
        timestamp: now.to_rfc3339(),
        record_store,
        object_storage,
        open_drafts: state.drafts.len(),
        host: host_info(),
    })
}
