//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_selections_total` (counter): endpoint selections by role, mode
//! - `router_sessions_opened_total` (counter): sessions opened by role
//! - `router_sessions_closed_total` (counter): sessions closed by role
//! - `router_endpoints` (gauge): registered endpoints by role
//! - `router_reconfigurations_total` (counter): router swaps

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::load_balancer::BalancingMode;
use crate::routing::Role;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_selection(role: Role, mode: BalancingMode) {
    metrics::counter!("router_selections_total", "role" => role.label(), "mode" => mode.as_str()).increment(1);
}

pub fn record_session_opened(role: Role) {
    metrics::counter!("router_sessions_opened_total", "role" => role.label()).increment(1);
}

pub fn record_session_closed(role: Role) {
    metrics::counter!("router_sessions_closed_total", "role" => role.label()).increment(1);
}

pub fn set_endpoint_count(role: Role, count: usize) {
    metrics::gauge!("router_endpoints", "role" => role.label()).set(count as f64);
}

pub fn record_reconfiguration() {
    metrics::counter!("router_reconfigurations_total").increment(1);
}
