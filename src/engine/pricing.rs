use serde::{Deserialize, Serialize};

use crate::calendar::Stay;
use crate::config::LoyaltyPolicy;
use crate::model::Facility;
use crate::money::Money;

/// Price of a booking before it is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub base: Money,
    pub discount: Money,
    pub total: Money,
    /// Loyalty points the discount costs; zero when no discount applied.
    pub points_debited: u32,
}

impl Quote {
    fn undiscounted(base: Money) -> Self {
        Self {
            base,
            discount: Money::ZERO,
            total: base,
            points_debited: 0,
        }
    }

    fn discounted(base: Money, pct: u32, points: u32) -> Self {
        let discount = base.percent(pct);
        Self {
            base,
            discount,
            total: base - discount,
            points_debited: points,
        }
    }
}

/// Nightly price × nights, less the loyalty discount when the balance reaches the threshold.
pub fn quote_room(policy: &LoyaltyPolicy, nightly: Money, stay: &Stay, balance: u32) -> Quote {
    let base = nightly.times(stay.nights());
    if balance >= policy.discount_threshold {
        Quote::discounted(base, policy.room_discount_pct, policy.discount_threshold)
    } else {
        Quote::undiscounted(base)
    }
}

/// Facility fee, halved for eligible guests. A free facility never consumes points.
pub fn quote_facility(policy: &LoyaltyPolicy, fee: Money, balance: u32) -> Quote {
    if balance >= policy.discount_threshold && fee > Money::ZERO {
        Quote::discounted(fee, policy.facility_discount_pct, policy.discount_threshold)
    } else {
        Quote::undiscounted(fee)
    }
}

/// `floor(total / $100) * rate`.
pub fn points_for(policy: &LoyaltyPolicy, total: Money) -> u32 {
    let hundreds = u32::try_from(total.whole_hundreds()).unwrap_or(u32::MAX);
    hundreds.saturating_mul(policy.points_per_hundred)
}

pub fn facility_points(policy: &LoyaltyPolicy, facility: &Facility, total: Money) -> u32 {
    facility
        .earn_override
        .unwrap_or_else(|| points_for(policy, total))
}

pub fn tax(subtotal: Money, pct: u32) -> Money {
    subtotal.percent(pct)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn three_nights() -> Stay {
        Stay::new(
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 6, 4).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn room_without_points_is_price_times_nights() {
        let p = LoyaltyPolicy::default();
        let q = quote_room(&p, Money::from_dollars(120), &three_nights(), 0);
        assert_eq!(q.total, Money::from_dollars(360));
        assert_eq!(q.discount, Money::ZERO);
        assert_eq!(q.points_debited, 0);
        assert_eq!(points_for(&p, q.total), 30);
    }

    #[test]
    fn room_with_threshold_points_gets_ten_percent() {
        let p = LoyaltyPolicy::default();
        let q = quote_room(&p, Money::from_dollars(120), &three_nights(), 1000);
        assert_eq!(q.total, Money::from_dollars(324));
        assert_eq!(q.discount, Money::from_dollars(36));
        assert_eq!(q.points_debited, 1000);
    }

    #[test]
    fn threshold_is_inclusive_and_strict_below() {
        let p = LoyaltyPolicy::default();
        let below = quote_room(&p, Money::from_dollars(100), &three_nights(), 999);
        assert_eq!(below.points_debited, 0);
        let above = quote_room(&p, Money::from_dollars(100), &three_nights(), 5000);
        // Flat debit, not proportional.
        assert_eq!(above.points_debited, 1000);
    }

    #[test]
    fn facility_half_price_when_eligible() {
        let p = LoyaltyPolicy::default();
        let q = quote_facility(&p, Money::from_dollars(50), 1200);
        assert_eq!(q.total, Money::from_dollars(25));
        assert_eq!(q.points_debited, 1000);
        let q = quote_facility(&p, Money::from_dollars(50), 10);
        assert_eq!(q.total, Money::from_dollars(50));
    }

    #[test]
    fn free_facility_never_discounts() {
        let p = LoyaltyPolicy::default();
        let q = quote_facility(&p, Money::ZERO, 5000);
        assert_eq!(q.discount, Money::ZERO);
        assert_eq!(q.points_debited, 0);
    }

    #[test]
    fn earn_override_replaces_standard_rate() {
        let p = LoyaltyPolicy::default();
        let spa = Facility::new(3, "Spa", Money::from_dollars(500)).with_earn_override(0);
        let hall = Facility::new(5, "Conference Room", Money::from_dollars(500));
        assert_eq!(facility_points(&p, &spa, Money::from_dollars(500)), 0);
        assert_eq!(facility_points(&p, &hall, Money::from_dollars(500)), 50);
    }

    #[test]
    fn points_floor_partial_hundreds() {
        let p = LoyaltyPolicy::default();
        assert_eq!(points_for(&p, Money::from_cents(9_999)), 0);
        assert_eq!(points_for(&p, Money::from_cents(32_400)), 30);
        assert_eq!(points_for(&p, Money::from_cents(39_600)), 30);
    }

    #[test]
    fn ten_percent_tax() {
        assert_eq!(tax(Money::from_dollars(360), 10), Money::from_dollars(36));
        assert_eq!(tax(Money::from_cents(12_345), 10), Money::from_cents(1_235));
    }
}
