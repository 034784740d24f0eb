//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{fmt, net::SocketAddr, num::NonZeroU32, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub use cli::{CliArgs, Command, DatabaseOverride, MigrateArgs, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "gazette";
const ENV_PREFIX: &str = "GAZETTE";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_CACHE_SWEEP_SECS: u64 = 10 * 60;
const DEFAULT_LIST_TTL_SECS: u64 = 5 * 60;
const DEFAULT_FEATURED_TTL_SECS: u64 = 10 * 60;
const DEFAULT_POST_TTL_SECS: u64 = 15 * 60;
const DEFAULT_MONITOR_MAX_SAMPLES: u64 = 1000;
const DEFAULT_SLOW_QUERY_MS: u64 = 500;
const DEFAULT_MONITOR_LOG_INTERVAL_SECS: u64 = 5 * 60;
const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;
const MIN_SESSION_SECRET_BYTES: usize = 32;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u64 = 100;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub monitor: MonitorSettings,
    pub read_path: ReadPathSettings,
    pub auth: AuthSettings,
    pub rate_limit: RateLimitSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub sweep_interval: Duration,
    pub list_ttl: Duration,
    pub featured_ttl: Duration,
    pub post_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub max_samples: NonZeroU32,
    pub slow_query: Duration,
    pub log_summary: bool,
    pub log_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct ReadPathSettings {
    pub on_store_failure: StoreFailurePolicy,
}

/// What the read path does when the store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreFailurePolicy {
    /// Log, count an error, and answer with an empty list or not-found.
    #[default]
    Degrade,
    /// Surface the failure to the caller.
    Propagate,
}

impl FromStr for StoreFailurePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "degrade" => Ok(Self::Degrade),
            "propagate" => Ok(Self::Propagate),
            other => Err(format!(
                "unknown policy `{other}`, expected `degrade` or `propagate`"
            )),
        }
    }
}

impl fmt::Display for StoreFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degrade => f.write_str("degrade"),
            Self::Propagate => f.write_str("propagate"),
        }
    }
}

#[derive(Clone)]
pub struct AuthSettings {
    pub admin_email: String,
    pub admin_password: Option<String>,
    pub session_secret: Option<String>,
    pub cookie_secure: bool,
    pub session_max_age: Duration,
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("session_secret", &self.session_secret.as_ref().map(|_| "<redacted>"))
            .field("cookie_secure", &self.cookie_secure)
            .field("session_max_age", &self.session_max_age)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub window_seconds: NonZeroU32,
    pub max_requests: NonZeroU32,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Migrate(args)) => raw.apply_database_override(&args.database),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    cache: RawCacheSettings,
    monitor: RawMonitorSettings,
    read_path: RawReadPathSettings,
    auth: RawAuthSettings,
    rate_limit: RawRateLimitSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(seconds) = overrides.cache_sweep_interval_seconds {
            self.cache.sweep_interval_seconds = Some(seconds);
        }
        if let Some(enabled) = overrides.monitor_log_summary {
            self.monitor.log_summary = Some(enabled);
        }
        if let Some(policy) = overrides.on_store_failure.as_ref() {
            self.read_path.on_store_failure = Some(policy.clone());
        }
        if let Some(window) = overrides.rate_limit_window_seconds {
            self.rate_limit.window_seconds = Some(window);
        }
        if let Some(max) = overrides.rate_limit_max_requests {
            self.rate_limit.max_requests = Some(max);
        }
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            cache,
            monitor,
            read_path,
            auth,
            rate_limit,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            cache: build_cache_settings(cache)?,
            monitor: build_monitor_settings(monitor)?,
            read_path: build_read_path_settings(read_path)?,
            auth: build_auth_settings(auth)?,
            rate_limit: build_rate_limit_settings(rate_limit)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_shutdown = positive_seconds(
        server.graceful_shutdown_seconds,
        DEFAULT_GRACEFUL_SHUTDOWN_SECS,
        "server.graceful_shutdown_seconds",
    )?;

    Ok(ServerSettings {
        addr,
        graceful_shutdown,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = database.url.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let max_value = database
        .max_connections
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
    let max_connections = non_zero_u32(max_value.into(), "database.max_connections")?;

    Ok(DatabaseSettings {
        url,
        max_connections,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    Ok(CacheSettings {
        sweep_interval: positive_seconds(
            cache.sweep_interval_seconds,
            DEFAULT_CACHE_SWEEP_SECS,
            "cache.sweep_interval_seconds",
        )?,
        list_ttl: positive_seconds(
            cache.list_ttl_seconds,
            DEFAULT_LIST_TTL_SECS,
            "cache.list_ttl_seconds",
        )?,
        featured_ttl: positive_seconds(
            cache.featured_ttl_seconds,
            DEFAULT_FEATURED_TTL_SECS,
            "cache.featured_ttl_seconds",
        )?,
        post_ttl: positive_seconds(
            cache.post_ttl_seconds,
            DEFAULT_POST_TTL_SECS,
            "cache.post_ttl_seconds",
        )?,
    })
}

fn build_monitor_settings(monitor: RawMonitorSettings) -> Result<MonitorSettings, LoadError> {
    let max_samples = non_zero_u32(
        monitor.max_samples.unwrap_or(DEFAULT_MONITOR_MAX_SAMPLES),
        "monitor.max_samples",
    )?;

    let slow_query_ms = monitor.slow_query_ms.unwrap_or(DEFAULT_SLOW_QUERY_MS);
    if slow_query_ms == 0 {
        return Err(LoadError::invalid(
            "monitor.slow_query_ms",
            "must be greater than zero",
        ));
    }

    Ok(MonitorSettings {
        max_samples,
        slow_query: Duration::from_millis(slow_query_ms),
        log_summary: monitor.log_summary.unwrap_or(false),
        log_interval: positive_seconds(
            monitor.log_interval_seconds,
            DEFAULT_MONITOR_LOG_INTERVAL_SECS,
            "monitor.log_interval_seconds",
        )?,
    })
}

fn build_read_path_settings(
    read_path: RawReadPathSettings,
) -> Result<ReadPathSettings, LoadError> {
    let on_store_failure = match read_path.on_store_failure {
        Some(value) => StoreFailurePolicy::from_str(&value)
            .map_err(|reason| LoadError::invalid("read_path.on_store_failure", reason))?,
        None => StoreFailurePolicy::default(),
    };

    Ok(ReadPathSettings { on_store_failure })
}

fn build_auth_settings(auth: RawAuthSettings) -> Result<AuthSettings, LoadError> {
    let admin_email = auth
        .admin_email
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string());
    if !admin_email.contains('@') {
        return Err(LoadError::invalid(
            "auth.admin_email",
            "must be an email address",
        ));
    }

    let admin_password = auth.admin_password.filter(|value| !value.is_empty());

    let session_secret = auth.session_secret.filter(|value| !value.is_empty());
    if session_secret
        .as_ref()
        .is_some_and(|secret| secret.len() < MIN_SESSION_SECRET_BYTES)
    {
        return Err(LoadError::invalid(
            "auth.session_secret",
            format!("must be at least {MIN_SESSION_SECRET_BYTES} bytes"),
        ));
    }

    Ok(AuthSettings {
        admin_email,
        admin_password,
        session_secret,
        cookie_secure: auth.cookie_secure.unwrap_or(false),
        session_max_age: positive_seconds(
            auth.session_max_age_seconds,
            DEFAULT_SESSION_MAX_AGE_SECS,
            "auth.session_max_age_seconds",
        )?,
    })
}

fn build_rate_limit_settings(
    rate_limit: RawRateLimitSettings,
) -> Result<RateLimitSettings, LoadError> {
    let window_seconds_val = rate_limit
        .window_seconds
        .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS);
    let window_seconds = non_zero_u32(window_seconds_val, "rate_limit.window_seconds")?;

    let max_requests_val = rate_limit
        .max_requests
        .unwrap_or(DEFAULT_RATE_LIMIT_MAX_REQUESTS);
    let max_requests = non_zero_u32(max_requests_val, "rate_limit.max_requests")?;

    Ok(RateLimitSettings {
        window_seconds,
        max_requests,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    sweep_interval_seconds: Option<u64>,
    list_ttl_seconds: Option<u64>,
    featured_ttl_seconds: Option<u64>,
    post_ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMonitorSettings {
    max_samples: Option<u64>,
    slow_query_ms: Option<u64>,
    log_summary: Option<bool>,
    log_interval_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawReadPathSettings {
    on_store_failure: Option<String>,
}

#[derive(Clone, Deserialize, Default)]
#[serde(default)]
struct RawAuthSettings {
    admin_email: Option<String>,
    admin_password: Option<String>,
    session_secret: Option<String>,
    cookie_secure: Option<bool>,
    session_max_age_seconds: Option<u64>,
}

impl fmt::Debug for RawAuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawAuthSettings")
            .field("admin_email", &self.admin_email)
            .field("cookie_secure", &self.cookie_secure)
            .field("session_max_age_seconds", &self.session_max_age_seconds)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRateLimitSettings {
    window_seconds: Option<u64>,
    max_requests: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn positive_seconds(
    value: Option<u64>,
    default: u64,
    key: &'static str,
) -> Result<Duration, LoadError> {
    let seconds = value.unwrap_or(default);
    if seconds == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    Ok(Duration::from_secs(seconds))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
