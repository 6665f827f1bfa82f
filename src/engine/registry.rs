use std::collections::BTreeMap;

use crate::model::*;

use super::waitlist::Waitlist;
use super::EngineError;

// ── Room & facility state machines ───────────────────────────────

impl Room {
    /// Available → Booked. Any other status is a conflict.
    pub fn allocate(&mut self) -> Result<(), EngineError> {
        if self.status != RoomStatus::Available {
            return Err(EngineError::RoomNotAvailable {
                room_no: self.number,
                status: self.status,
            });
        }
        self.status = RoomStatus::Booked;
        Ok(())
    }

    pub fn release(&mut self) {
        self.status = RoomStatus::Available;
    }

    /// Operational override: applies whatever the current status.
    pub fn take_out_of_service(&mut self) {
        self.status = RoomStatus::Maintenance;
    }
}

impl Facility {
    pub fn allocate(&mut self) -> Result<(), EngineError> {
        if self.status != FacilityStatus::Available {
            return Err(EngineError::FacilityNotAvailable(self.id));
        }
        self.status = FacilityStatus::Booked;
        Ok(())
    }

    pub fn release(&mut self) {
        self.status = FacilityStatus::Available;
    }
}

// ── Parking lot ──────────────────────────────────────────────────

/// Parking slots plus the waitlist, mutated together so "no free slot → enqueue"
/// and waitlist draining are single atomic steps.
#[derive(Debug, Default)]
pub struct ParkingLot {
    slots: BTreeMap<SlotNo, ParkingSlot>,
    waitlist: Waitlist,
}

impl ParkingLot {
    pub fn new(slot_numbers: impl IntoIterator<Item = SlotNo>) -> Self {
        Self {
            slots: slot_numbers.into_iter().map(|n| (n, ParkingSlot::new(n))).collect(),
            waitlist: Waitlist::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.slots.len()
    }

    pub fn occupied(&self) -> usize {
        self.slots
            .values()
            .filter(|s| s.status == SlotStatus::Occupied)
            .count()
    }

    pub fn slots(&self) -> impl Iterator<Item = &ParkingSlot> {
        self.slots.values()
    }

    pub fn waitlist(&self) -> &Waitlist {
        &self.waitlist
    }

    pub fn slot_of(&self, guest_id: &str) -> Option<SlotNo> {
        self.slots
            .values()
            .find(|s| s.guest_id.as_deref() == Some(guest_id))
            .map(|s| s.number)
    }

    /// Lowest-numbered free slot.
    fn first_free(&self) -> Option<SlotNo> {
        self.slots
            .values()
            .find(|s| s.status == SlotStatus::Available)
            .map(|s| s.number)
    }

    fn occupy(&mut self, number: SlotNo, guest_id: GuestId, vehicle: String) {
        if let Some(slot) = self.slots.get_mut(&number) {
            slot.status = SlotStatus::Occupied;
            slot.guest_id = Some(guest_id);
            slot.vehicle = Some(vehicle);
        }
    }

    /// Assign the first free slot, or queue the request when none is free.
    pub fn request(&mut self, guest_id: &str, vehicle: &str) -> Result<ParkingOutcome, EngineError> {
        if let Some(slot) = self.slot_of(guest_id) {
            return Err(EngineError::ParkingAlreadyAssigned {
                guest_id: guest_id.to_string(),
                slot,
            });
        }
        if self.waitlist.position(guest_id).is_some() {
            return Err(EngineError::AlreadyWaitlisted(guest_id.to_string()));
        }
        match self.first_free() {
            Some(slot) => {
                self.occupy(slot, guest_id.to_string(), vehicle.to_string());
                Ok(ParkingOutcome::Assigned { slot })
            }
            None => {
                let position = self.waitlist.push(WaitlistEntry {
                    guest_id: guest_id.to_string(),
                    vehicle: vehicle.to_string(),
                });
                Ok(ParkingOutcome::Waitlisted { position })
            }
        }
    }

    /// Free the slot held by a guest.
    pub fn release(&mut self, guest_id: &str) -> Result<SlotNo, EngineError> {
        let number = self
            .slot_of(guest_id)
            .ok_or_else(|| EngineError::NoSlotHeld(guest_id.to_string()))?;
        if let Some(slot) = self.slots.get_mut(&number) {
            *slot = ParkingSlot::new(number);
        }
        Ok(number)
    }

    /// Pair free slots (ascending) with waitlisted requests (arrival order) until
    /// either runs out.
    pub fn drain(&mut self) -> Vec<(SlotNo, WaitlistEntry)> {
        let mut assigned = Vec::new();
        while !self.waitlist.is_empty() {
            let Some(slot) = self.first_free() else { break };
            let Some(entry) = self.waitlist.pop() else { break };
            self.occupy(slot, entry.guest_id.clone(), entry.vehicle.clone());
            assigned.push((slot, entry));
        }
        assigned
    }
}
