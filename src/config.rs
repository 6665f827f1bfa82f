use std::str::FromStr;
use std::time::Duration;

/// Loyalty ledger rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoyaltyPolicy {
    /// Balance at or above which a discount applies; also the amount debited.
    pub discount_threshold: u32,
    pub room_discount_pct: u32,
    pub facility_discount_pct: u32,
    /// Points earned per whole $100 charged.
    pub points_per_hundred: u32,
    /// Points credited when a service order completes.
    pub service_completion_points: u32,
}

impl Default for LoyaltyPolicy {
    fn default() -> Self {
        Self {
            discount_threshold: 1000,
            room_discount_pct: 10,
            facility_discount_pct: 50,
            points_per_hundred: 10,
            service_completion_points: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HotelConfig {
    pub rooms: u32,
    pub parking_slots: u32,
    pub max_guests: usize,
    pub max_bookings: usize,
    pub max_bills: usize,
    pub max_service_orders: usize,
    pub max_maintenance: usize,
    pub tax_pct: u32,
    pub loyalty: LoyaltyPolicy,
    /// Free a room when its stay completes (unless it is under maintenance).
    pub release_on_checkout: bool,
    pub tick_interval: Duration,
    pub metrics_port: Option<u16>,
    /// Seed for startup room prices; random when unset.
    pub price_seed: Option<u64>,
}

impl Default for HotelConfig {
    fn default() -> Self {
        Self {
            rooms: 50,
            parking_slots: 30,
            max_guests: 100,
            max_bookings: 200,
            max_bills: 200,
            max_service_orders: 10,
            max_maintenance: 20,
            tax_pct: 10,
            loyalty: LoyaltyPolicy::default(),
            release_on_checkout: true,
            tick_interval: Duration::from_secs(60),
            metrics_port: None,
            price_seed: None,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl HotelConfig {
    /// Read `INNKEEP_*` variables, falling back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            rooms: env_or("INNKEEP_ROOMS", d.rooms),
            parking_slots: env_or("INNKEEP_PARKING_SLOTS", d.parking_slots),
            max_guests: env_or("INNKEEP_MAX_GUESTS", d.max_guests),
            max_bookings: env_or("INNKEEP_MAX_BOOKINGS", d.max_bookings),
            max_bills: env_or("INNKEEP_MAX_BILLS", d.max_bills),
            max_service_orders: env_or("INNKEEP_MAX_SERVICE_ORDERS", d.max_service_orders),
            max_maintenance: env_or("INNKEEP_MAX_MAINTENANCE", d.max_maintenance),
            tax_pct: env_or("INNKEEP_TAX_PCT", d.tax_pct),
            loyalty: d.loyalty,
            release_on_checkout: env_or("INNKEEP_RELEASE_ON_CHECKOUT", d.release_on_checkout),
            tick_interval: Duration::from_secs(env_or("INNKEEP_TICK_SECS", 60u64).max(1)),
            metrics_port: std::env::var("INNKEEP_METRICS_PORT")
                .ok()
                .and_then(|s| s.parse().ok()),
            price_seed: std::env::var("INNKEEP_PRICE_SEED")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}
