use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::calendar::{self, Date, Stay};
use crate::limits::*;
use crate::model::*;
use crate::observability::*;

use super::pricing::{facility_points, points_for, quote_facility, quote_room};
use super::{Engine, EngineError, check_text};

impl Engine {
    pub async fn register_guest(&self, new: NewGuest) -> Result<Guest, EngineError> {
        check_text(&new.id, MAX_GUEST_ID_LEN, "guest id must be 1-14 characters")?;
        if new.id.chars().any(char::is_whitespace) {
            return Err(EngineError::InvalidInput("guest id must not contain whitespace"));
        }
        check_text(&new.name, MAX_NAME_LEN, "name must be 1-49 characters")?;
        if new.contact.len() > MAX_CONTACT_LEN {
            return Err(EngineError::InvalidInput("contact too long"));
        }
        if new.email.len() > MAX_EMAIL_LEN {
            return Err(EngineError::InvalidInput("email too long"));
        }
        if new.preferences.len() > MAX_PREFERENCES_LEN {
            return Err(EngineError::InvalidInput("preferences too long"));
        }

        let _registering = self.registration.lock().await;
        if self.guests.contains_key(&new.id) {
            return Err(EngineError::GuestAlreadyExists(new.id));
        }
        if self.guests.len() >= self.config.max_guests {
            return Err(EngineError::CapacityExceeded("guest registry full"));
        }

        let guest = Guest::register(new);
        self.guests
            .insert(guest.id.clone(), Arc::new(RwLock::new(guest.clone())));
        info!(guest_id = %guest.id, "guest registered");
        self.emit(EngineEvent::GuestRegistered {
            guest_id: guest.id.clone(),
        });
        Ok(guest)
    }

    /// Allocate a room and record the stay as one step: price it, apply the loyalty
    /// discount, insert the booking, mark the room Booked, and credit earned points.
    pub async fn book_room(
        &self,
        guest_id: &str,
        room_no: RoomNo,
        check_in: Date,
        check_out: Date,
    ) -> Result<BookingReceipt, EngineError> {
        let stay = Stay::new(check_in, check_out)?;
        let room_arc = self.room(room_no)?;
        let guest_arc = self.guest(guest_id)?;

        let mut guest = guest_arc.write().await;
        let mut room = room_arc.write().await;
        if room.status != RoomStatus::Available {
            debug!(room_no, status = %room.status, "room not available");
            return Err(EngineError::RoomNotAvailable {
                room_no,
                status: room.status,
            });
        }
        let mut bookings = self.bookings.write().await;
        if bookings.len() >= self.config.max_bookings {
            return Err(EngineError::CapacityExceeded("booking index full"));
        }

        let policy = &self.config.loyalty;
        let quote = quote_room(policy, room.nightly_price, &stay, guest.loyalty_points);
        let booking = Booking::room_stay(guest.id.clone(), room_no, stay, quote.total);

        // Commit. Nothing below can fail once the insert succeeds.
        bookings.insert(booking.clone())?;
        room.allocate()?;
        if quote.points_debited > 0 && guest.try_debit(quote.points_debited) {
            metrics::counter!(POINTS_REDEEMED_TOTAL).increment(quote.points_debited as u64);
        }
        let earned = points_for(policy, quote.total);
        guest.credit(earned);

        info!(
            booking_id = %booking.id,
            guest_id,
            room_no,
            total = %quote.total,
            "room booked"
        );
        metrics::counter!(BOOKINGS_TOTAL, "kind" => "room").increment(1);
        self.emit(EngineEvent::RoomBooked {
            booking_id: booking.id,
            guest_id: guest.id.clone(),
            room_no,
            total: quote.total,
        });

        let receipt = BookingReceipt {
            booking,
            base: quote.base,
            discount: quote.discount,
            points_debited: quote.points_debited,
            points_earned: earned,
            points_balance: guest.loyalty_points,
            nearby: Vec::new(),
        };
        drop(bookings);
        drop(room);
        drop(guest);
        self.record_rooms_booked().await;
        Ok(receipt)
    }

    /// Set a room back to Available.
    pub async fn release_room(&self, room_no: RoomNo) -> Result<(), EngineError> {
        let room_arc = self.room(room_no)?;
        room_arc.write().await.release();
        info!(room_no, "room released");
        self.emit(EngineEvent::RoomReleased { room_no });
        self.record_rooms_booked().await;
        Ok(())
    }

    /// Book a facility for one day. Facilities stay Booked until explicitly released.
    pub async fn book_facility(
        &self,
        guest_id: &str,
        facility_id: FacilityId,
        day: Date,
    ) -> Result<BookingReceipt, EngineError> {
        let stay = Stay::single_day(day)?;
        let facility_arc = self.facility(facility_id)?;
        let guest_arc = self.guest(guest_id)?;

        let receipt = {
            let mut guest = guest_arc.write().await;
            let mut facility = facility_arc.write().await;
            if facility.status != FacilityStatus::Available {
                return Err(EngineError::FacilityNotAvailable(facility_id));
            }
            let mut bookings = self.bookings.write().await;
            if bookings.len() >= self.config.max_bookings {
                return Err(EngineError::CapacityExceeded("booking index full"));
            }

            let policy = &self.config.loyalty;
            let quote = quote_facility(policy, facility.booking_fee, guest.loyalty_points);
            let booking = Booking::facility_use(guest.id.clone(), facility_id, stay, quote.total);

            bookings.insert(booking.clone())?;
            facility.allocate()?;
            if quote.points_debited > 0 && guest.try_debit(quote.points_debited) {
                metrics::counter!(POINTS_REDEEMED_TOTAL).increment(quote.points_debited as u64);
            }
            let earned = facility_points(policy, &facility, quote.total);
            guest.credit(earned);

            info!(
                booking_id = %booking.id,
                guest_id,
                facility = %facility.name,
                total = %quote.total,
                "facility booked"
            );
            metrics::counter!(BOOKINGS_TOTAL, "kind" => "facility").increment(1);
            self.emit(EngineEvent::FacilityBooked {
                booking_id: booking.id,
                guest_id: guest.id.clone(),
                facility_id,
                total: quote.total,
            });

            BookingReceipt {
                booking,
                base: quote.base,
                discount: quote.discount,
                points_debited: quote.points_debited,
                points_earned: earned,
                points_balance: guest.loyalty_points,
                nearby: Vec::new(),
            }
        };

        // Neighbours are read after the facility lock is dropped.
        let nearby = self
            .nearby_facilities(facility_id)
            .await?
            .into_iter()
            .filter(|f| f.status == FacilityStatus::Available)
            .map(|f| f.id)
            .collect();
        Ok(BookingReceipt { nearby, ..receipt })
    }

    pub async fn release_facility(&self, facility_id: FacilityId) -> Result<(), EngineError> {
        let facility_arc = self.facility(facility_id)?;
        facility_arc.write().await.release();
        info!(facility_id, "facility released");
        self.emit(EngineEvent::FacilityReleased { facility_id });
        Ok(())
    }

    /// Give the guest the lowest-numbered free slot, or queue them when the lot is full.
    /// An assigned slot is recorded on the guest's live booking.
    pub async fn allocate_parking(&self, guest_id: &str, vehicle: &str) -> Result<ParkingOutcome, EngineError> {
        check_text(vehicle, MAX_VEHICLE_LEN, "vehicle must be 1-19 characters")?;
        self.guest(guest_id)?;

        let mut lot = self.parking.lock().await;
        let outcome = lot.request(guest_id, vehicle)?;
        match outcome {
            ParkingOutcome::Assigned { slot } => {
                let mut bookings = self.bookings.write().await;
                if let Some(id) = bookings.parking_target(guest_id)
                    && let Some(b) = bookings.get_mut(&id)
                {
                    b.parking_slot = Some(slot);
                }
                info!(guest_id, slot, "parking assigned");
                self.emit(EngineEvent::ParkingAssigned {
                    guest_id: guest_id.to_string(),
                    slot,
                });
            }
            ParkingOutcome::Waitlisted { position } => {
                info!(guest_id, position, "parking waitlisted");
                self.emit(EngineEvent::ParkingWaitlisted {
                    guest_id: guest_id.to_string(),
                    position,
                });
            }
        }
        metrics::gauge!(PARKING_OCCUPIED).set(lot.occupied() as f64);
        metrics::gauge!(WAITLIST_DEPTH).set(lot.waitlist().len() as f64);
        Ok(outcome)
    }

    /// Free the guest's slot. Waiting requests are not served until the waitlist is drained.
    pub async fn release_parking(&self, guest_id: &str) -> Result<SlotNo, EngineError> {
        let mut lot = self.parking.lock().await;
        let slot = lot.release(guest_id)?;
        let cleared = self.bookings.write().await.clear_parking(guest_id, slot);
        info!(guest_id, slot, bookings = cleared.len(), "parking released");
        metrics::gauge!(PARKING_OCCUPIED).set(lot.occupied() as f64);
        self.emit(EngineEvent::ParkingReleased {
            guest_id: guest_id.to_string(),
            slot,
        });
        Ok(slot)
    }

    /// Hand free slots to waiting requests in arrival order until slots or requests run out.
    pub async fn drain_waitlist(&self) -> Vec<SlotAssignment> {
        let mut lot = self.parking.lock().await;
        let pairs = lot.drain();
        if pairs.is_empty() {
            return Vec::new();
        }

        let mut bookings = self.bookings.write().await;
        let mut assigned = Vec::with_capacity(pairs.len());
        for (slot, entry) in pairs {
            let booking_id = bookings.parking_target(&entry.guest_id);
            if let Some(id) = booking_id
                && let Some(b) = bookings.get_mut(&id)
            {
                b.parking_slot = Some(slot);
            }
            info!(guest_id = %entry.guest_id, slot, "parking assigned from waitlist");
            self.emit(EngineEvent::ParkingAssigned {
                guest_id: entry.guest_id.clone(),
                slot,
            });
            assigned.push(SlotAssignment {
                slot,
                guest_id: entry.guest_id,
                vehicle: entry.vehicle,
                booking_id,
            });
        }
        metrics::gauge!(PARKING_OCCUPIED).set(lot.occupied() as f64);
        metrics::gauge!(WAITLIST_DEPTH).set(lot.waitlist().len() as f64);
        assigned
    }

    /// Advance every booking's status to match `today`. Idempotent for a fixed date.
    /// With `release_on_checkout`, rooms whose stay completed become Available again
    /// unless they are under maintenance or still hold another live booking.
    pub async fn advance_statuses(&self, today: Date) -> Result<Vec<StatusChange>, EngineError> {
        let today = calendar::check(today)?;
        let (changes, checked_out) = {
            let mut bookings = self.bookings.write().await;
            let changes = bookings.advance(today);
            let checked_out: Vec<RoomNo> = changes
                .iter()
                .filter(|c| c.to == BookingStatus::Completed)
                .filter_map(|c| bookings.get(&c.booking_id).and_then(|b| b.room_no))
                .collect();
            (changes, checked_out)
        };

        for change in &changes {
            metrics::counter!(STATUS_TRANSITIONS_TOTAL, "to" => change.to.to_string()).increment(1);
            self.emit(EngineEvent::BookingStatusChanged(*change));
        }

        if self.config.release_on_checkout {
            for room_no in checked_out {
                let room_arc = self.room(room_no)?;
                let mut room = room_arc.write().await;
                if room.status != RoomStatus::Booked {
                    continue;
                }
                if self.bookings.read().await.has_live_on_room(room_no) {
                    continue;
                }
                room.release();
                info!(room_no, "room released at checkout");
                self.emit(EngineEvent::RoomReleased { room_no });
            }
        }
        if !changes.is_empty() {
            self.record_rooms_booked().await;
        }

        if !changes.is_empty() {
            info!(%today, transitions = changes.len(), "booking statuses advanced");
        }
        Ok(changes)
    }
}
