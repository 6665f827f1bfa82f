use std::net::SocketAddr;

// ── RED metrics (command-driven) ────────────────────────────────

/// Counter: total commands executed. Labels: command, status.
pub const COMMANDS_TOTAL: &str = "innkeep_commands_total";

/// Histogram: command latency in seconds. Labels: command.
pub const COMMAND_DURATION_SECONDS: &str = "innkeep_command_duration_seconds";

// ── Business metrics ────────────────────────────────────────────

/// Counter: bookings committed. Labels: kind (room, facility).
pub const BOOKINGS_TOTAL: &str = "innkeep_bookings_total";

/// Counter: engine operations rejected. Labels: kind (validation, not_found, capacity, conflict).
pub const REJECTIONS_TOTAL: &str = "innkeep_rejections_total";

/// Counter: revenue recorded on payment, in cents.
pub const REVENUE_CENTS_TOTAL: &str = "innkeep_revenue_cents_total";

/// Counter: loyalty points debited for discounts.
pub const POINTS_REDEEMED_TOTAL: &str = "innkeep_points_redeemed_total";

/// Counter: booking status transitions. Labels: to.
pub const STATUS_TRANSITIONS_TOTAL: &str = "innkeep_status_transitions_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: rooms currently Booked.
pub const ROOMS_BOOKED: &str = "innkeep_rooms_booked";

/// Gauge: parking slots currently Occupied.
pub const PARKING_OCCUPIED: &str = "innkeep_parking_occupied";

/// Gauge: parking requests waiting for a slot.
pub const WAITLIST_DEPTH: &str = "innkeep_waitlist_depth";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

pub fn error_label(err: &crate::engine::EngineError) -> &'static str {
    use crate::engine::ErrorKind;
    match err.kind() {
        ErrorKind::Validation => "validation",
        ErrorKind::NotFound => "not_found",
        ErrorKind::Capacity => "capacity",
        ErrorKind::Conflict => "conflict",
    }
}
