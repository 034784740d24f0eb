//! Diagnostics over the performance monitor and the post cache.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use crate::cache::CacheStats;
use crate::monitor::{CacheCounters, MetricSample, PerformanceSummary};

use super::super::HttpState;
use super::super::error::ApiError;

const SOURCE: &str = "infra::http::admin::metrics";
const RECENT_SAMPLES: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct MetricsQuery {
    pub metric: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActionQuery {
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MetricsReport {
    pub timestamp: String,
    pub performance: PerformanceSection,
    pub cache: CacheSection,
    pub system: SystemSection,
}

#[derive(Debug, Serialize)]
pub struct PerformanceSection {
    pub metric: Option<String>,
    pub summary: PerformanceSummary,
    pub recent: Vec<MetricSample>,
}

#[derive(Debug, Serialize)]
pub struct CacheSection {
    pub stats: CacheCounters,
    pub keys: CacheStats,
}

#[derive(Debug, Serialize)]
pub struct SystemSection {
    pub version: &'static str,
    pub uptime_seconds: f64,
}

pub(super) async fn show_metrics(
    State(state): State<HttpState>,
    Query(query): Query<MetricsQuery>,
) -> Json<MetricsReport> {
    let metric = query.metric.filter(|name| !name.is_empty());
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    Json(MetricsReport {
        timestamp,
        performance: PerformanceSection {
            summary: state.monitor.summary(metric.as_deref()),
            recent: state.monitor.recent(RECENT_SAMPLES),
            metric,
        },
        cache: CacheSection {
            stats: state.monitor.cache_stats(),
            keys: state.cache.stats(),
        },
        system: SystemSection {
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: state.monitor.uptime().as_secs_f64(),
        },
    })
}

pub(super) async fn run_action(
    State(state): State<HttpState>,
    Query(query): Query<ActionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    match query.action.as_deref() {
        Some("reset") => {
            state.monitor.reset();
            info!(target = "gazette::http::admin::metrics", "Metrics reset");
            Ok(Json(json!({
                "success": true,
                "message": "Metrics reset successfully",
            })))
        }
        Some("clear-cache") => {
            state.cache.clear();
            info!(target = "gazette::http::admin::metrics", "Cache cleared");
            Ok(Json(json!({
                "success": true,
                "message": "Cache cleared successfully",
            })))
        }
        _ => Err(ApiError::bad_request(
            SOURCE,
            "Invalid action. Use ?action=reset or ?action=clear-cache",
        )),
    }
}
