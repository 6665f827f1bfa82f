mod billing;
mod error;
mod index;
mod mutations;
mod pricing;
mod queries;
mod registry;
#[cfg(test)]
mod tests;
mod upkeep;
mod waitlist;

pub use billing::aggregate_charges;
pub use error::{EngineError, ErrorKind};
pub use index::{BookingIndex, BookingKey};
pub use pricing::{Quote, facility_points, points_for, quote_facility, quote_room};
pub use registry::ParkingLot;
pub use waitlist::Waitlist;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::AtomicI64;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};

use crate::config::HotelConfig;
use crate::layout::PropertyLayout;
use crate::model::*;
use crate::notify::NotifyHub;
use crate::observability::ROOMS_BOOKED;

pub type SharedRoom = Arc<RwLock<Room>>;
pub type SharedFacility = Arc<RwLock<Facility>>;
pub type SharedGuest = Arc<RwLock<Guest>>;

/// All hotel state for one property.
///
/// Rooms, facilities and guests are each their own lock. Parking slots and the
/// waitlist share one lock. Mutations take locks in a fixed order:
/// guest → room/facility → parking → bookings → services/maintenance → bills,
/// validate everything, then commit.
pub struct Engine {
    pub config: HotelConfig,
    pub(super) rooms: DashMap<RoomNo, SharedRoom>,
    pub(super) facilities: DashMap<FacilityId, SharedFacility>,
    pub(super) guests: DashMap<GuestId, SharedGuest>,
    /// Serializes the capacity check + insert of guest registration.
    pub(super) registration: Mutex<()>,
    pub(super) parking: Mutex<ParkingLot>,
    pub(super) bookings: RwLock<BookingIndex>,
    pub(super) services: RwLock<BTreeMap<u32, ServiceOrder>>,
    pub(super) maintenance: RwLock<BTreeMap<u32, MaintenanceRequest>>,
    pub(super) bills: RwLock<BTreeMap<BillId, Bill>>,
    /// Revenue recorded on payment, in cents.
    pub(super) revenue_cents: AtomicI64,
    pub notify: Arc<NotifyHub>,
}

impl Engine {
    pub fn new(config: HotelConfig, layout: PropertyLayout, notify: Arc<NotifyHub>) -> Self {
        let rooms = DashMap::new();
        for room in layout.rooms {
            rooms.insert(room.number, Arc::new(RwLock::new(room)));
        }
        let facilities = DashMap::new();
        for facility in layout.facilities {
            facilities.insert(facility.id, Arc::new(RwLock::new(facility)));
        }

        Self {
            config,
            rooms,
            facilities,
            guests: DashMap::new(),
            registration: Mutex::new(()),
            parking: Mutex::new(ParkingLot::new(layout.parking_slots)),
            bookings: RwLock::new(BookingIndex::new()),
            services: RwLock::new(BTreeMap::new()),
            maintenance: RwLock::new(BTreeMap::new()),
            bills: RwLock::new(BTreeMap::new()),
            revenue_cents: AtomicI64::new(0),
            notify,
        }
    }

    /// Engine over the standard property layout for `config`.
    pub fn standard(config: HotelConfig, notify: Arc<NotifyHub>) -> Self {
        let layout = PropertyLayout::standard(&config);
        Self::new(config, layout, notify)
    }

    pub(super) fn room(&self, room_no: RoomNo) -> Result<SharedRoom, EngineError> {
        self.rooms
            .get(&room_no)
            .map(|e| e.value().clone())
            .ok_or(EngineError::OutOfRange {
                what: "room",
                value: room_no,
                max: self.rooms.len() as u32,
            })
    }

    pub(super) fn facility(&self, facility_id: FacilityId) -> Result<SharedFacility, EngineError> {
        self.facilities
            .get(&facility_id)
            .map(|e| e.value().clone())
            .ok_or(EngineError::OutOfRange {
                what: "facility",
                value: facility_id,
                max: self.facilities.len() as u32,
            })
    }

    pub(super) fn guest(&self, guest_id: &str) -> Result<SharedGuest, EngineError> {
        self.guests
            .get(guest_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| EngineError::GuestNotFound(guest_id.to_string()))
    }

    pub(super) fn emit(&self, event: EngineEvent) {
        self.notify.send(&event);
    }

    /// Recount Booked rooms into the gauge. Call with no room lock held.
    pub(super) async fn record_rooms_booked(&self) -> usize {
        let arcs: Vec<SharedRoom> = self.rooms.iter().map(|e| e.value().clone()).collect();
        let mut booked = 0usize;
        for arc in arcs {
            if arc.read().await.status == RoomStatus::Booked {
                booked += 1;
            }
        }
        metrics::gauge!(ROOMS_BOOKED).set(booked as f64);
        booked
    }
}

/// Reject empty or over-long text input.
pub(super) fn check_text(value: &str, max_len: usize, what: &'static str) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::InvalidInput(what));
    }
    if value.len() > max_len {
        return Err(EngineError::InvalidInput(what));
    }
    Ok(())
}
