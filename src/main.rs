use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use tokio::sync::broadcast::error::RecvError;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use portfolio_admin::{
    background_task::start_purge_task,
    entities::user::NewAdmin,
    graceful_shutdown::shutdown_signal,
    middlewares::auth::AuthMiddleware,
    repositories::identity::IdentityProvider,
    routes::configure_routes,
    settings::AppConfig,
    AppState, Backends,
};

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(env_filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn cors(config: &AppConfig) -> Cors {
    let origins = config.cors_origins();
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        cors.allow_any_origin()
    } else {
        origins.iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => {
            init_tracing(cfg.log_json);
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            init_tracing(false);
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let backends = match Backends::from_config(&config).await {
        Ok(backends) => backends,
        Err(e) => {
            tracing::error!("Failed to initialise backends: {:#}", e);
            std::process::exit(1);
        }
    };

    let app_state = web::Data::new(AppState::new(&config, backends));

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        let admin = NewAdmin { email: email.clone(), password: password.clone() };
        match app_state.auth_handler.ensure_admin(admin).await {
            Ok(true) => tracing::info!("Admin account bootstrapped"),
            Ok(false) => tracing::debug!("Admin account already present"),
            Err(e) => {
                tracing::error!("Admin bootstrap failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    let mut sessions = app_state.auth_handler.subscribe();
    tokio::spawn(async move {
        loop {
            match sessions.recv().await {
                Ok(Some(user)) => tracing::info!(user = %user.email, "Session started"),
                Ok(None) => tracing::info!("Session ended"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session log fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::spawn(start_purge_task(
        app_state.auth_handler.clone(),
        app_state.project_handler.clone(),
    ));

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(AuthMiddleware)
            .wrap(NormalizePath::trim())
            .wrap(cors(&server_config))
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
