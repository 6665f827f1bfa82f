use std::sync::atomic::Ordering;

use crate::model::*;
use crate::money::Money;

use super::{Engine, EngineError};

impl Engine {
    pub async fn get_guest(&self, guest_id: &str) -> Result<Guest, EngineError> {
        let guest = self.guest(guest_id)?;
        let snapshot = guest.read().await.clone();
        Ok(snapshot)
    }

    /// A guest with every booking they hold, in check-in order.
    pub async fn guest_profile(&self, guest_id: &str) -> Result<GuestProfile, EngineError> {
        let guest = self.get_guest(guest_id).await?;
        let bookings = self.list_by_guest(guest_id).await;
        Ok(GuestProfile { guest, bookings })
    }

    pub async fn find_booking(&self, booking_id: BookingId) -> Result<Booking, EngineError> {
        self.bookings
            .read()
            .await
            .get(&booking_id)
            .cloned()
            .ok_or(EngineError::BookingNotFound(booking_id))
    }

    /// A guest's bookings in check-in order. Empty for unknown guests.
    pub async fn list_by_guest(&self, guest_id: &str) -> Vec<Booking> {
        self.bookings.read().await.by_guest(guest_id).cloned().collect()
    }

    pub async fn list_bookings(&self) -> Vec<Booking> {
        self.bookings.read().await.iter().cloned().collect()
    }

    pub async fn get_room(&self, room_no: RoomNo) -> Result<Room, EngineError> {
        let room = self.room(room_no)?;
        let snapshot = room.read().await.clone();
        Ok(snapshot)
    }

    /// Every room, ordered by number.
    pub async fn list_rooms(&self) -> Vec<Room> {
        let mut arcs: Vec<_> = self.rooms.iter().map(|e| (*e.key(), e.value().clone())).collect();
        arcs.sort_by_key(|(no, _)| *no);
        let mut rooms = Vec::with_capacity(arcs.len());
        for (_, arc) in arcs {
            rooms.push(arc.read().await.clone());
        }
        rooms
    }

    /// Available rooms, optionally restricted to one type.
    pub async fn available_rooms(&self, room_type: Option<RoomType>) -> Vec<Room> {
        self.list_rooms()
            .await
            .into_iter()
            .filter(|r| r.status == RoomStatus::Available)
            .filter(|r| room_type.is_none_or(|t| r.room_type == t))
            .collect()
    }

    pub async fn list_facilities(&self) -> Vec<Facility> {
        let mut arcs: Vec<_> = self
            .facilities
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        arcs.sort_by_key(|(id, _)| *id);
        let mut facilities = Vec::with_capacity(arcs.len());
        for (_, arc) in arcs {
            facilities.push(arc.read().await.clone());
        }
        facilities
    }

    /// Facilities adjacent to `facility_id`, whatever their status.
    pub async fn nearby_facilities(&self, facility_id: FacilityId) -> Result<Vec<Facility>, EngineError> {
        let adjacent = self.facility(facility_id)?.read().await.adjacent.clone();
        let mut nearby = Vec::with_capacity(adjacent.len());
        for id in adjacent {
            if let Ok(arc) = self.facility(id) {
                nearby.push(arc.read().await.clone());
            }
        }
        Ok(nearby)
    }

    pub async fn parking_slots(&self) -> Vec<ParkingSlot> {
        self.parking.lock().await.slots().cloned().collect()
    }

    /// Waiting parking requests, front of the queue first.
    pub async fn waitlist(&self) -> Vec<WaitlistEntry> {
        self.parking.lock().await.waitlist().iter().cloned().collect()
    }

    pub async fn parking_slot_of(&self, guest_id: &str) -> Option<SlotNo> {
        self.parking.lock().await.slot_of(guest_id)
    }

    pub async fn get_bill(&self, bill_id: BillId) -> Result<Bill, EngineError> {
        self.bills
            .read()
            .await
            .get(&bill_id)
            .cloned()
            .ok_or(EngineError::BillNotFound(bill_id))
    }

    /// All bills, or one guest's.
    pub async fn list_bills(&self, guest_id: Option<&str>) -> Vec<Bill> {
        self.bills
            .read()
            .await
            .values()
            .filter(|b| guest_id.is_none_or(|g| b.guest_id == g))
            .cloned()
            .collect()
    }

    pub async fn service_orders(&self) -> Vec<ServiceOrder> {
        self.services.read().await.values().cloned().collect()
    }

    pub async fn maintenance_requests(&self) -> Vec<MaintenanceRequest> {
        self.maintenance.read().await.values().cloned().collect()
    }

    /// Sum of every paid bill.
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents.load(Ordering::Relaxed))
    }

    pub async fn occupancy_report(&self) -> OccupancyReport {
        let rooms = self.list_rooms().await;
        let (parking_occupied, parking_total, waitlist_depth) = {
            let lot = self.parking.lock().await;
            (lot.occupied(), lot.total(), lot.waitlist().len())
        };
        let bookings = self.bookings.read().await.len();
        let open_maintenance = self
            .maintenance
            .read()
            .await
            .values()
            .filter(|r| r.status != MaintenanceStatus::Resolved)
            .count();

        OccupancyReport {
            rooms_booked: rooms.iter().filter(|r| r.status == RoomStatus::Booked).count(),
            rooms_total: rooms.len(),
            rooms_in_maintenance: rooms
                .iter()
                .filter(|r| r.status == RoomStatus::Maintenance)
                .count(),
            parking_occupied,
            parking_total,
            waitlist_depth,
            open_maintenance,
            bookings,
            revenue: self.revenue(),
        }
    }
}
