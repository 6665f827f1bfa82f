use thiserror::Error;

use crate::calendar::Date;
use crate::model::*;

/// Broad category of an [`EngineError`], for callers that only need to branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Capacity,
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    // Validation
    #[error("invalid date: {day:02}/{month:02}/{year}")]
    InvalidDate { day: u32, month: u32, year: i32 },
    #[error("check-out {check_out} must be after check-in {check_in}")]
    InvalidStay { check_in: Date, check_out: Date },
    #[error("{what} {value} out of range 1..={max}")]
    OutOfRange { what: &'static str, value: u32, max: u32 },
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    // Not found
    #[error("guest not found: {0}")]
    GuestNotFound(GuestId),
    #[error("booking not found: {0}")]
    BookingNotFound(BookingId),
    #[error("bill not found: {0}")]
    BillNotFound(BillId),
    #[error("service order not found: {0}")]
    ServiceOrderNotFound(u32),
    #[error("maintenance request not found: {0}")]
    MaintenanceNotFound(u32),
    #[error("no parking slot held by guest {0}")]
    NoSlotHeld(GuestId),
    #[error("room {0} has no active stay")]
    NoActiveStay(RoomNo),

    // Capacity
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(&'static str),

    // Conflict
    #[error("guest already exists: {0}")]
    GuestAlreadyExists(GuestId),
    #[error("room {room_no} is not available ({status})")]
    RoomNotAvailable { room_no: RoomNo, status: RoomStatus },
    #[error("facility {0} is not available")]
    FacilityNotAvailable(FacilityId),
    #[error("guest {guest_id} already holds parking slot {slot}")]
    ParkingAlreadyAssigned { guest_id: GuestId, slot: SlotNo },
    #[error("guest {0} is already on the parking waitlist")]
    AlreadyWaitlisted(GuestId),
    #[error("booking {booking_id} does not belong to guest {guest_id}")]
    BookingGuestMismatch { booking_id: BookingId, guest_id: GuestId },
    #[error("bill {0} is already paid")]
    BillAlreadyPaid(BillId),
    #[error("cannot move {what} {id} from {from} to {to}")]
    InvalidTransition { what: &'static str, id: u32, from: String, to: String },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        use EngineError::*;
        match self {
            InvalidDate { .. } | InvalidStay { .. } | OutOfRange { .. } | InvalidInput(_) => {
                ErrorKind::Validation
            }
            GuestNotFound(_)
            | BookingNotFound(_)
            | BillNotFound(_)
            | ServiceOrderNotFound(_)
            | MaintenanceNotFound(_)
            | NoSlotHeld(_)
            | NoActiveStay(_) => ErrorKind::NotFound,
            CapacityExceeded(_) => ErrorKind::Capacity,
            GuestAlreadyExists(_)
            | RoomNotAvailable { .. }
            | FacilityNotAvailable(_)
            | ParkingAlreadyAssigned { .. }
            | AlreadyWaitlisted(_)
            | BookingGuestMismatch { .. }
            | BillAlreadyPaid(_)
            | InvalidTransition { .. } => ErrorKind::Conflict,
        }
    }
}
