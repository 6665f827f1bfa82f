use std::sync::atomic::Ordering;

use tracing::{info, warn};

use crate::calendar;
use crate::model::*;
use crate::money::Money;
use crate::observability::*;

use super::pricing::{points_for, tax};
use super::{Engine, EngineError};

/// Charge breakdown for one booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charges {
    pub room: Money,
    pub service: Money,
    pub facility: Money,
    pub tax: Money,
    pub total: Money,
}

/// Room or facility charge from the booking, plus every completed service order placed
/// during this stay, plus flat-rate tax on the sum. Orders from an earlier stay in the
/// same room stay with that stay.
pub fn aggregate_charges<'a>(
    booking: &Booking,
    services: impl IntoIterator<Item = &'a ServiceOrder>,
    tax_pct: u32,
) -> Charges {
    let room = if booking.room_no.is_some() { booking.total } else { Money::ZERO };
    let facility = if booking.facility_id.is_some() { booking.total } else { Money::ZERO };
    let service: Money = match booking.room_no {
        Some(room_no) => services
            .into_iter()
            .filter(|s| s.room_no == room_no && s.booking_id == booking.id)
            .filter(|s| s.status == ServiceStatus::Completed)
            .map(|s| s.charge)
            .sum(),
        None => Money::ZERO,
    };
    let subtotal = room + service + facility;
    let tax = tax(subtotal, tax_pct);
    Charges {
        room,
        service,
        facility,
        tax,
        total: subtotal + tax,
    }
}

impl Engine {
    /// Snapshot a booking and its completed service charges into a new unpaid bill.
    pub async fn generate_bill(&self, guest_id: &str, booking_id: BookingId) -> Result<Bill, EngineError> {
        self.guest(guest_id)?;

        let booking = self
            .bookings
            .read()
            .await
            .get(&booking_id)
            .cloned()
            .ok_or(EngineError::BookingNotFound(booking_id))?;
        if booking.guest_id != guest_id {
            return Err(EngineError::BookingGuestMismatch {
                booking_id,
                guest_id: guest_id.to_string(),
            });
        }

        let charges = {
            let services = self.services.read().await;
            aggregate_charges(&booking, services.values(), self.config.tax_pct)
        };

        let mut bills = self.bills.write().await;
        if bills.len() >= self.config.max_bills {
            return Err(EngineError::CapacityExceeded("bill ledger full"));
        }
        let id = bills.keys().next_back().map_or(1, |last| last + 1);
        let bill = Bill {
            id,
            guest_id: guest_id.to_string(),
            booking_id,
            room_charges: charges.room,
            service_charges: charges.service,
            facility_charges: charges.facility,
            tax: charges.tax,
            total: charges.total,
            status: BillStatus::Unpaid,
            issue_date: calendar::today(),
            paid_with: None,
        };
        bills.insert(id, bill.clone());

        info!(bill_id = id, guest_id, total = %bill.total, "bill generated");
        self.emit(EngineEvent::BillGenerated {
            bill_id: id,
            guest_id: bill.guest_id.clone(),
            total: bill.total,
        });
        Ok(bill)
    }

    /// Settle an unpaid bill: mark it Paid, credit loyalty points, record revenue.
    pub async fn pay_bill(&self, bill_id: BillId, method: PaymentMethod) -> Result<PaymentReceipt, EngineError> {
        let guest_id = {
            let bills = self.bills.read().await;
            let bill = bills.get(&bill_id).ok_or(EngineError::BillNotFound(bill_id))?;
            if bill.status == BillStatus::Paid {
                return Err(EngineError::BillAlreadyPaid(bill_id));
            }
            bill.guest_id.clone()
        };
        let guest_arc = self.guest(&guest_id).ok();
        let mut guest = match &guest_arc {
            Some(g) => Some(g.write().await),
            None => None,
        };

        let mut bills = self.bills.write().await;
        let bill = bills.get_mut(&bill_id).ok_or(EngineError::BillNotFound(bill_id))?;
        // Another payment may have landed between the read and the write lock.
        if bill.status == BillStatus::Paid {
            return Err(EngineError::BillAlreadyPaid(bill_id));
        }
        bill.status = BillStatus::Paid;
        bill.paid_with = Some(method);

        let earned = points_for(&self.config.loyalty, bill.total);
        let balance = match guest.as_mut() {
            Some(g) => {
                g.credit(earned);
                g.loyalty_points
            }
            None => {
                warn!(bill_id, guest_id = %guest_id, "paid bill has no registered guest");
                0
            }
        };
        self.revenue_cents.fetch_add(bill.total.cents(), Ordering::Relaxed);
        metrics::counter!(REVENUE_CENTS_TOTAL).increment(bill.total.cents().max(0) as u64);

        info!(bill_id, method = %method, amount = %bill.total, "bill paid");
        self.emit(EngineEvent::BillPaid {
            bill_id,
            amount: bill.total,
        });
        Ok(PaymentReceipt {
            bill_id,
            amount: bill.total,
            method,
            points_earned: earned,
            points_balance: balance,
        })
    }
}
