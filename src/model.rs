use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::calendar::{Date, Stay};
use crate::money::Money;

pub type GuestId = String;
pub type RoomNo = u32;
pub type SlotNo = u32;
pub type FacilityId = u32;
pub type BillId = u32;
pub type BookingId = Ulid;

// ── Rooms ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Standard,
    Deluxe,
    Suite,
}

impl RoomType {
    /// Room types cycle Standard, Deluxe, Suite by room number.
    pub fn for_room(number: RoomNo) -> Self {
        match (number.saturating_sub(1)) % 3 {
            0 => RoomType::Standard,
            1 => RoomType::Deluxe,
            _ => RoomType::Suite,
        }
    }

    pub fn capacity(self) -> u32 {
        match self {
            RoomType::Standard => 2,
            RoomType::Deluxe => 4,
            RoomType::Suite => 6,
        }
    }

    pub fn features(self) -> Vec<String> {
        let list: &[&str] = match self {
            RoomType::Standard => &["TV", "WiFi", "AC"],
            RoomType::Deluxe => &["TV", "WiFi", "AC", "Mini-bar", "Balcony"],
            RoomType::Suite => &["TV", "WiFi", "AC", "Mini-bar", "Jacuzzi", "Living area"],
        };
        list.iter().map(|s| s.to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomStatus {
    Available,
    Booked,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub number: RoomNo,
    pub room_type: RoomType,
    pub status: RoomStatus,
    pub nightly_price: Money,
    pub floor: u32,
    pub capacity: u32,
    pub features: Vec<String>,
}

impl Room {
    pub fn new(number: RoomNo, room_type: RoomType, nightly_price: Money) -> Self {
        Self {
            number,
            room_type,
            status: RoomStatus::Available,
            nightly_price,
            floor: (number.saturating_sub(1)) / 10 + 1,
            capacity: room_type.capacity(),
            features: room_type.features(),
        }
    }
}

// ── Parking ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotStatus {
    Available,
    Occupied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSlot {
    pub number: SlotNo,
    pub status: SlotStatus,
    pub vehicle: Option<String>,
    pub guest_id: Option<GuestId>,
}

impl ParkingSlot {
    pub fn new(number: SlotNo) -> Self {
        Self {
            number,
            status: SlotStatus::Available,
            vehicle: None,
            guest_id: None,
        }
    }
}

/// A parking request waiting for a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub guest_id: GuestId,
    pub vehicle: String,
}

/// Where a parking request ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParkingOutcome {
    Assigned { slot: SlotNo },
    /// 1-based position in the waitlist.
    Waitlisted { position: usize },
}

/// A waitlisted request paired with a freed slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub slot: SlotNo,
    pub guest_id: GuestId,
    pub vehicle: String,
    pub booking_id: Option<BookingId>,
}

// ── Facilities ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacilityStatus {
    Available,
    Booked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub status: FacilityStatus,
    pub booking_fee: Money,
    /// Facilities considered "nearby" for suggestions.
    pub adjacent: BTreeSet<FacilityId>,
    /// Points earned per booking instead of the standard rate, when set.
    pub earn_override: Option<u32>,
}

impl Facility {
    pub fn new(id: FacilityId, name: impl Into<String>, booking_fee: Money) -> Self {
        Self {
            id,
            name: name.into(),
            status: FacilityStatus::Available,
            booking_fee,
            adjacent: BTreeSet::new(),
            earn_override: None,
        }
    }

    pub fn with_earn_override(mut self, points: u32) -> Self {
        self.earn_override = Some(points);
        self
    }
}

// ── Guests ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGuest {
    pub id: GuestId,
    pub name: String,
    pub contact: String,
    pub email: String,
    pub preferences: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: GuestId,
    pub name: String,
    pub contact: String,
    pub email: String,
    pub preferences: String,
    /// Loyalty ledger balance. Unsigned, so it can never go negative.
    pub loyalty_points: u32,
}

impl Guest {
    pub fn register(new: NewGuest) -> Self {
        Self {
            id: new.id,
            name: new.name,
            contact: new.contact,
            email: new.email,
            preferences: new.preferences,
            loyalty_points: 0,
        }
    }

    /// Debit `points` only if the balance covers it. Returns whether the debit happened.
    pub fn try_debit(&mut self, points: u32) -> bool {
        if self.loyalty_points >= points {
            self.loyalty_points -= points;
            true
        } else {
            false
        }
    }

    pub fn credit(&mut self, points: u32) {
        self.loyalty_points = self.loyalty_points.saturating_add(points);
    }
}

/// A guest together with their bookings in check-in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestProfile {
    pub guest: Guest,
    pub bookings: Vec<Booking>,
}

// ── Bookings ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Upcoming,
    Active,
    Completed,
    /// Reserved for an explicit cancellation operation; nothing reaches it yet.
    Cancelled,
}

impl BookingStatus {
    /// Upcoming or Active.
    pub fn is_live(self) -> bool {
        self < BookingStatus::Completed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub guest_id: GuestId,
    pub room_no: Option<RoomNo>,
    pub parking_slot: Option<SlotNo>,
    pub facility_id: Option<FacilityId>,
    pub stay: Stay,
    pub total: Money,
    pub status: BookingStatus,
}

impl Booking {
    pub fn room_stay(guest_id: GuestId, room_no: RoomNo, stay: Stay, total: Money) -> Self {
        Self {
            id: Ulid::new(),
            guest_id,
            room_no: Some(room_no),
            parking_slot: None,
            facility_id: None,
            stay,
            total,
            status: BookingStatus::Upcoming,
        }
    }

    pub fn facility_use(guest_id: GuestId, facility_id: FacilityId, stay: Stay, total: Money) -> Self {
        Self {
            id: Ulid::new(),
            guest_id,
            room_no: None,
            parking_slot: None,
            facility_id: Some(facility_id),
            stay,
            total,
            status: BookingStatus::Upcoming,
        }
    }

    pub fn check_in(&self) -> Date {
        self.stay.check_in
    }

    pub fn check_out(&self) -> Date {
        self.stay.check_out
    }
}

/// What a successful room or facility booking reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingReceipt {
    pub booking: Booking,
    pub base: Money,
    pub discount: Money,
    pub points_debited: u32,
    pub points_earned: u32,
    pub points_balance: u32,
    /// Nearby facilities still available (facility bookings only).
    pub nearby: Vec<FacilityId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub booking_id: BookingId,
    pub from: BookingStatus,
    pub to: BookingStatus,
}

// ── Services & maintenance ───────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOrder {
    pub id: u32,
    pub room_no: RoomNo,
    /// The stay the order was placed under.
    pub booking_id: BookingId,
    pub item: String,
    pub charge: Money,
    pub status: ServiceStatus,
    pub ordered_on: Date,
}

/// Room-service menu: item name and price.
pub const SERVICE_MENU: &[(&str, Money)] = &[
    ("Breakfast Set", Money::from_dollars(15)),
    ("Lunch Set", Money::from_dollars(20)),
    ("Dinner Set", Money::from_dollars(25)),
    ("Snack Pack", Money::from_dollars(10)),
    ("Beverage", Money::from_dollars(5)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    Electrical,
    Plumbing,
    Hvac,
    Furniture,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaintenanceStatus {
    Open,
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub id: u32,
    pub room_no: RoomNo,
    pub kind: IssueKind,
    pub description: String,
    pub priority: Priority,
    pub status: MaintenanceStatus,
    pub reported_on: Date,
}

// ── Billing ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillStatus {
    Unpaid,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Card,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub guest_id: GuestId,
    pub booking_id: BookingId,
    pub room_charges: Money,
    pub service_charges: Money,
    pub facility_charges: Money,
    pub tax: Money,
    pub total: Money,
    pub status: BillStatus,
    pub issue_date: Date,
    pub paid_with: Option<PaymentMethod>,
}

impl Bill {
    pub fn subtotal(&self) -> Money {
        self.room_charges + self.service_charges + self.facility_charges
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub bill_id: BillId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub points_earned: u32,
    pub points_balance: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyReport {
    pub rooms_booked: usize,
    pub rooms_total: usize,
    pub rooms_in_maintenance: usize,
    pub parking_occupied: usize,
    pub parking_total: usize,
    pub waitlist_depth: usize,
    pub open_maintenance: usize,
    pub bookings: usize,
    pub revenue: Money,
}

// ── Events ───────────────────────────────────────────────────────

/// Everything the engine commits, broadcast for the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    GuestRegistered { guest_id: GuestId },
    RoomBooked { booking_id: BookingId, guest_id: GuestId, room_no: RoomNo, total: Money },
    RoomReleased { room_no: RoomNo },
    FacilityBooked { booking_id: BookingId, guest_id: GuestId, facility_id: FacilityId, total: Money },
    FacilityReleased { facility_id: FacilityId },
    ParkingAssigned { guest_id: GuestId, slot: SlotNo },
    ParkingWaitlisted { guest_id: GuestId, position: usize },
    ParkingReleased { guest_id: GuestId, slot: SlotNo },
    BookingStatusChanged(StatusChange),
    MaintenanceReported { request_id: u32, room_no: RoomNo },
    MaintenanceUpdated { request_id: u32, status: MaintenanceStatus },
    ServiceOrdered { order_id: u32, room_no: RoomNo },
    ServiceUpdated { order_id: u32, status: ServiceStatus },
    BillGenerated { bill_id: BillId, guest_id: GuestId, total: Money },
    BillPaid { bill_id: BillId, amount: Money },
}

// ── Text forms ───────────────────────────────────────────────────

macro_rules! text_enum {
    ($ty:ident { $($variant:ident => [$($alias:literal),+]),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lower = s.to_ascii_lowercase();
                $(
                    if [$($alias),+].contains(&lower.as_str()) {
                        return Ok($ty::$variant);
                    }
                )+
                Err(format!("unknown {}: {s}", stringify!($ty)))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $($ty::$variant => f.write_str(stringify!($variant)),)+
                }
            }
        }
    };
}

text_enum!(RoomType { Standard => ["standard", "1"], Deluxe => ["deluxe", "2"], Suite => ["suite", "3"] });
text_enum!(RoomStatus { Available => ["available"], Booked => ["booked"], Maintenance => ["maintenance"] });
text_enum!(BookingStatus {
    Upcoming => ["upcoming"],
    Active => ["active"],
    Completed => ["completed"],
    Cancelled => ["cancelled"],
});
text_enum!(ServiceStatus {
    Pending => ["pending"],
    InProgress => ["in-progress", "inprogress", "1"],
    Completed => ["completed", "done", "2"],
});
text_enum!(IssueKind {
    Electrical => ["electrical", "1"],
    Plumbing => ["plumbing", "2"],
    Hvac => ["hvac", "3"],
    Furniture => ["furniture", "4"],
    Other => ["other", "5"],
});
text_enum!(Priority { Low => ["low", "1"], Medium => ["medium", "2"], High => ["high", "3"] });
text_enum!(MaintenanceStatus {
    Open => ["open"],
    InProgress => ["in-progress", "inprogress", "1"],
    Resolved => ["resolved", "2"],
});
text_enum!(PaymentMethod { Cash => ["cash", "1"], Card => ["card", "2"] });
