use std::{net::SocketAddr, process, sync::Arc, time::Duration};

use gazette::{
    application::{
        admin::posts::AdminPostService,
        error::AppError,
        posts::PostQueryService,
        repos::{PostsRepo, PostsWriteRepo},
    },
    cache::{CacheConfig, PostCache, spawn_sweeper},
    config::{self, Settings},
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiRateLimiter, HttpState, SessionConfig},
        telemetry,
    },
    monitor::{PerformanceMonitor, spawn_summary_logger},
};
use tokio::{sync::Notify, task::JoinHandle};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_migrate(settings: Settings) -> Result<(), AppError> {
    let pool = connect_pool(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::migration(err.to_string())))?;

    info!(target = "gazette::migrate", "Migrations applied");
    Ok(())
}

async fn run_serve(settings: Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let cache = Arc::new(PostCache::new());
    let monitor = Arc::new(PerformanceMonitor::new(
        settings.monitor.max_samples.get() as usize,
        settings.monitor.slow_query,
    ));
    let rate_limiter = Arc::new(ApiRateLimiter::from_settings(&settings.rate_limit));
    let state = build_http_state(
        &settings,
        repositories,
        cache.clone(),
        monitor.clone(),
        rate_limiter.clone(),
    );

    if settings.auth.admin_password.is_none() {
        warn!(
            target = "gazette::serve",
            "auth.admin_password is not set; admin login is disabled"
        );
    }

    let cache_config = CacheConfig::from(&settings.cache);
    let mut tasks: Vec<JoinHandle<()>> = vec![
        spawn_sweeper(cache, cache_config.sweep_interval),
        http::spawn_pruner(
            rate_limiter,
            Duration::from_secs(u64::from(settings.rate_limit.window_seconds.get())),
        ),
    ];
    if settings.monitor.log_summary {
        tasks.push(spawn_summary_logger(monitor, settings.monitor.log_interval));
    }

    let result = serve_http(&settings, state).await;

    for task in tasks {
        task.abort();
        let _ = task.await;
    }

    result
}

async fn connect_pool(settings: &Settings) -> Result<sqlx::PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}

async fn init_repositories(settings: &Settings) -> Result<Arc<PostgresRepositories>, AppError> {
    let pool = connect_pool(settings).await?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::migration(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_http_state(
    settings: &Settings,
    repositories: Arc<PostgresRepositories>,
    cache: Arc<PostCache>,
    monitor: Arc<PerformanceMonitor>,
    rate_limiter: Arc<ApiRateLimiter>,
) -> HttpState {
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories;

    let posts = Arc::new(PostQueryService::new(
        posts_repo.clone(),
        cache.clone(),
        monitor.clone(),
        CacheConfig::from(&settings.cache),
        settings.read_path.on_store_failure,
    ));
    let admin_posts = Arc::new(AdminPostService::new(
        posts_repo.clone(),
        posts_write_repo,
        cache.clone(),
    ));

    HttpState {
        posts,
        admin_posts,
        store: posts_repo,
        cache,
        monitor,
        sessions: Arc::new(SessionConfig::from(&settings.auth)),
        session_key: http::session_key(&settings.auth),
        rate_limiter,
    }
}

async fn serve_http(settings: &Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let addr = settings.server.addr;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(target = "gazette::serve", %addr, "Listening");

    let shutdown = Arc::new(Notify::new());
    let signal = shutdown.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { signal.notified().await })
        .await
    });

    let joined = tokio::select! {
        joined = &mut server => joined,
        _ = tokio::signal::ctrl_c() => {
            info!(target = "gazette::serve", "Shutdown signal received");
            shutdown.notify_one();
            match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(
                        target = "gazette::serve",
                        timeout_secs = settings.server.graceful_shutdown.as_secs(),
                        "Graceful shutdown timed out; dropping open connections"
                    );
                    server.abort();
                    return Ok(());
                }
            }
        }
    };

    joined
        .map_err(|err| AppError::unexpected(format!("server task failed: {err}")))?
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))
}
