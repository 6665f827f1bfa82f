use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::calendar::Date;
use crate::model::*;

use super::EngineError;

/// Position of a booking in the index: check-in date, ties broken by insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookingKey {
    pub check_in: Date,
    seq: u64,
}

/// All bookings ordered by check-in date, with id/guest/room secondary indices
/// kept in step with every insert.
#[derive(Debug, Default)]
pub struct BookingIndex {
    entries: BTreeMap<BookingKey, Booking>,
    by_id: HashMap<BookingId, BookingKey>,
    by_guest: HashMap<GuestId, BTreeSet<BookingKey>>,
    by_room: HashMap<RoomNo, BTreeSet<BookingKey>>,
    next_seq: u64,
}

impl BookingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, booking: Booking) -> Result<BookingKey, EngineError> {
        if self.by_id.contains_key(&booking.id) {
            return Err(EngineError::InvalidInput("duplicate booking id"));
        }
        let key = BookingKey {
            check_in: booking.check_in(),
            seq: self.next_seq,
        };
        self.next_seq += 1;

        self.by_id.insert(booking.id, key);
        self.by_guest.entry(booking.guest_id.clone()).or_default().insert(key);
        if let Some(room) = booking.room_no {
            self.by_room.entry(room).or_default().insert(key);
        }
        self.entries.insert(key, booking);
        Ok(key)
    }

    pub fn get(&self, id: &BookingId) -> Option<&Booking> {
        self.by_id.get(id).and_then(|k| self.entries.get(k))
    }

    /// Mutable access for fields outside the ordering key (status, parking slot).
    pub(super) fn get_mut(&mut self, id: &BookingId) -> Option<&mut Booking> {
        let key = *self.by_id.get(id)?;
        self.entries.get_mut(&key)
    }

    /// Every booking in check-in order.
    pub fn iter(&self) -> impl Iterator<Item = &Booking> {
        self.entries.values()
    }

    /// A guest's bookings in check-in order. Lazy; call again to restart.
    pub fn by_guest<'a>(&'a self, guest_id: &str) -> impl Iterator<Item = &'a Booking> + 'a {
        self.by_guest
            .get(guest_id)
            .into_iter()
            .flat_map(|keys| keys.iter())
            .filter_map(|k| self.entries.get(k))
    }

    pub fn by_room(&self, room_no: RoomNo) -> impl Iterator<Item = &Booking> {
        self.by_room
            .get(&room_no)
            .into_iter()
            .flat_map(|keys| keys.iter())
            .filter_map(|k| self.entries.get(k))
    }

    /// Earliest-check-in Active booking on a room.
    pub fn active_on_room(&self, room_no: RoomNo) -> Option<&Booking> {
        self.by_room(room_no).find(|b| b.status == BookingStatus::Active)
    }

    pub fn has_live_on_room(&self, room_no: RoomNo) -> bool {
        self.by_room(room_no).any(|b| b.status.is_live())
    }

    /// The booking a newly assigned parking slot should be recorded on: the guest's
    /// earliest live room stay, or failing that their earliest live booking.
    pub fn parking_target(&self, guest_id: &str) -> Option<BookingId> {
        let mut fallback = None;
        for b in self.by_guest(guest_id).filter(|b| b.status.is_live()) {
            if b.room_no.is_some() {
                return Some(b.id);
            }
            fallback.get_or_insert(b.id);
        }
        fallback
    }

    /// Forget a released slot on every live booking of the guest that records it.
    pub fn clear_parking(&mut self, guest_id: &str, slot: SlotNo) -> Vec<BookingId> {
        let Some(keys) = self.by_guest.get(guest_id) else {
            return Vec::new();
        };
        let mut cleared = Vec::new();
        for key in keys {
            if let Some(b) = self.entries.get_mut(key)
                && b.status.is_live()
                && b.parking_slot == Some(slot)
            {
                b.parking_slot = None;
                cleared.push(b.id);
            }
        }
        cleared
    }

    /// Move bookings forward by date: Upcoming → Active once `today >= check_in`,
    /// Active → Completed once `today >= check_out`. Idempotent for a fixed `today`.
    pub fn advance(&mut self, today: Date) -> Vec<StatusChange> {
        let upper = BookingKey {
            check_in: today,
            seq: u64::MAX,
        };
        let mut changes = Vec::new();
        // Nothing checking in after today can move.
        for booking in self.entries.range_mut(..=upper).map(|(_, b)| b) {
            if booking.status == BookingStatus::Upcoming && today >= booking.check_in() {
                booking.status = BookingStatus::Active;
                changes.push(StatusChange {
                    booking_id: booking.id,
                    from: BookingStatus::Upcoming,
                    to: BookingStatus::Active,
                });
            }
            if booking.status == BookingStatus::Active && today >= booking.check_out() {
                booking.status = BookingStatus::Completed;
                changes.push(StatusChange {
                    booking_id: booking.id,
                    from: BookingStatus::Active,
                    to: BookingStatus::Completed,
                });
            }
        }
        changes
    }
}
