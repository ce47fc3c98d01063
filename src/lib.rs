use std::{sync::Arc, time::Duration};

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, session_gate, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, storage, utils};

use auth::jwt::JwtService;
use repositories::{
    memory::{InMemoryProjectRepo, InMemoryUserRepo},
    project::ProjectRepository,
    sqlx_repo::{SqlxProjectRepo, SqlxUserRepo},
    storage::ObjectStorage,
    user::UserRepository,
};
use settings::{AppConfig, RecordStoreKind, StorageBackendKind};
use storage::{local::LocalObjectStorage, remote::RemoteObjectStorage};
use use_cases::{
    auth::AuthHandler, drafts::DraftWorkspace, editor::ProjectEditor, projects::ProjectHandler,
};

pub type DynUserRepo = Arc<dyn UserRepository>;
pub type DynProjectRepo = Arc<dyn ProjectRepository>;
pub type DynObjectStorage = Arc<dyn ObjectStorage>;

pub type AppAuthHandler = AuthHandler<DynUserRepo, JwtService>;
pub type AppProjectHandler = ProjectHandler<DynProjectRepo, DynObjectStorage>;
pub type AppProjectEditor = ProjectEditor<DynProjectRepo, DynObjectStorage>;

/// Backends the application runs against.
pub struct Backends {
    pub user_repo: DynUserRepo,
    pub project_repo: DynProjectRepo,
    pub storage: DynObjectStorage,
    /// Set when uploads live on local disk and are served under `/media`.
    pub media: Option<LocalObjectStorage>,
}

impl Backends {
    /// Connects the record store and object storage selected by the config.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let (user_repo, project_repo): (DynUserRepo, DynProjectRepo) = match config.record_store {
            RecordStoreKind::Postgres => {
                let max_connections = (config.worker_count as u32).clamp(2, 20);
                let pool = db::postgres::create_pool(&config.database_url, max_connections).await?;
                db::postgres::run_migrations(&pool).await?;
                (
                    Arc::new(SqlxUserRepo::new(pool.clone())),
                    Arc::new(SqlxProjectRepo::new(pool)),
                )
            }
            RecordStoreKind::Memory => {
                tracing::warn!("Using the in-memory record store; data is lost on restart");
                (Arc::new(InMemoryUserRepo::new()), Arc::new(InMemoryProjectRepo::new()))
            }
        };

        let (storage, media): (DynObjectStorage, Option<LocalObjectStorage>) = match config.storage_backend {
            StorageBackendKind::Local => {
                let local = LocalObjectStorage::new(&config.uploads_dir, &config.public_base_url);
                local.check().await?;
                (Arc::new(local.clone()), Some(local))
            }
            StorageBackendKind::Remote => (Arc::new(RemoteObjectStorage::new(config)?), None),
        };

        Ok(Backends { user_repo, project_repo, storage, media })
    }

    pub fn in_memory(config: &AppConfig) -> Self {
        let local = LocalObjectStorage::new(&config.uploads_dir, &config.public_base_url);
        Backends {
            user_repo: Arc::new(InMemoryUserRepo::new()),
            project_repo: Arc::new(InMemoryProjectRepo::new()),
            storage: Arc::new(local.clone()),
            media: Some(local),
        }
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub auth_handler: Arc<AppAuthHandler>,
    pub project_handler: Arc<AppProjectHandler>,
    pub editor: AppProjectEditor,
    pub drafts: DraftWorkspace,
    pub media: Option<LocalObjectStorage>,
}

impl AppState {
    pub fn new(config: &AppConfig, backends: Backends) -> Self {
        let jwt_service = JwtService::new(config);
        let auth_handler = AuthHandler::new(backends.user_repo, jwt_service);

        let project_handler = ProjectHandler::new(
            backends.project_repo.clone(),
            backends.storage.clone(),
            Duration::from_secs(config.deletion_ticket_ttl_secs),
        );
        let editor = ProjectEditor::new(backends.project_repo, backends.storage);

        AppState {
            config: config.clone(),
            auth_handler: Arc::new(auth_handler),
            project_handler: Arc::new(project_handler),
            editor,
            drafts: DraftWorkspace::new(),
            media: backends.media,
        }
    }
}
