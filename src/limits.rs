// ── Input limits (not configurable) ──────────────────────────────

/// Earliest calendar year accepted for any stay or facility date.
pub const MIN_YEAR: i32 = 2023;

/// Latest calendar year accepted for any stay or facility date.
pub const MAX_YEAR: i32 = 2100;

pub const MAX_GUEST_ID_LEN: usize = 14;
pub const MAX_NAME_LEN: usize = 49;
pub const MAX_CONTACT_LEN: usize = 14;
pub const MAX_EMAIL_LEN: usize = 49;
pub const MAX_PREFERENCES_LEN: usize = 99;
pub const MAX_VEHICLE_LEN: usize = 19;
pub const MAX_ISSUE_LEN: usize = 99;

/// Longest stay a single booking may cover.
pub const MAX_STAY_NIGHTS: i64 = 365;

/// Capacity of each broadcast channel on the notify hub.
pub const NOTIFY_CHANNEL_CAPACITY: usize = 256;
