use std::sync::Arc;

use chrono::NaiveDate;

use super::*;
use crate::calendar::Date;
use crate::config::HotelConfig;
use crate::layout::{PropertyLayout, house_facilities};
use crate::money::Money;
use crate::notify::{NotifyHub, Topic};

fn d(y: i32, m: u32, day: u32) -> Date {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Fixed tariffs so totals are predictable: Standard $120, Deluxe $250, Suite $600.
fn fixed_layout(config: &HotelConfig) -> PropertyLayout {
    let rooms = (1..=config.rooms)
        .map(|n| {
            let room_type = RoomType::for_room(n);
            let dollars = match room_type {
                RoomType::Standard => 120,
                RoomType::Deluxe => 250,
                RoomType::Suite => 600,
            };
            Room::new(n, room_type, Money::from_dollars(dollars))
        })
        .collect();
    PropertyLayout {
        rooms,
        parking_slots: (1..=config.parking_slots).collect(),
        facilities: house_facilities(),
    }
}

fn engine_with(config: HotelConfig) -> Engine {
    let layout = fixed_layout(&config);
    Engine::new(config, layout, Arc::new(NotifyHub::new()))
}

fn engine() -> Engine {
    engine_with(HotelConfig::default())
}

fn new_guest(id: &str) -> NewGuest {
    NewGuest {
        id: id.into(),
        name: format!("Guest {id}"),
        contact: "555-0100".into(),
        email: format!("{}@example.com", id.to_lowercase()),
        preferences: String::new(),
    }
}

async fn give_points(engine: &Engine, guest_id: &str, points: u32) {
    engine.guest(guest_id).unwrap().write().await.loyalty_points = points;
}

// ── Guests ───────────────────────────────────────────────

#[tokio::test]
async fn register_and_fetch_guest() {
    let engine = engine();
    let g = engine.register_guest(new_guest("G1")).await.unwrap();
    assert_eq!(g.loyalty_points, 0);
    assert_eq!(engine.get_guest("G1").await.unwrap().name, "Guest G1");
}

#[tokio::test]
async fn duplicate_guest_rejected() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    let err = engine.register_guest(new_guest("G1")).await.unwrap_err();
    assert_eq!(err, EngineError::GuestAlreadyExists("G1".into()));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn guest_input_validated() {
    let engine = engine();
    let mut g = new_guest("G1");
    g.name = String::new();
    assert!(matches!(
        engine.register_guest(g).await,
        Err(EngineError::InvalidInput(_))
    ));
    let g = new_guest("this-id-is-far-too-long");
    assert!(matches!(
        engine.register_guest(g).await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.get_guest("G1").await,
        Err(EngineError::GuestNotFound(_))
    ));
}

#[tokio::test]
async fn guest_registry_capacity() {
    let engine = engine_with(HotelConfig {
        max_guests: 2,
        ..HotelConfig::default()
    });
    engine.register_guest(new_guest("A")).await.unwrap();
    engine.register_guest(new_guest("B")).await.unwrap();
    let err = engine.register_guest(new_guest("C")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Capacity);
}

// ── Rooms ────────────────────────────────────────────────

#[tokio::test]
async fn book_room_prices_stay_and_earns_points() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    let receipt = engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 4))
        .await
        .unwrap();

    assert_eq!(receipt.booking.total, Money::from_dollars(360));
    assert_eq!(receipt.discount, Money::ZERO);
    assert_eq!(receipt.points_debited, 0);
    assert_eq!(receipt.points_earned, 30);
    assert_eq!(receipt.points_balance, 30);
    assert_eq!(receipt.booking.status, BookingStatus::Upcoming);
    assert_eq!(engine.get_room(1).await.unwrap().status, RoomStatus::Booked);
    assert_eq!(engine.get_guest("G1").await.unwrap().loyalty_points, 30);
}

#[tokio::test]
async fn loyal_guest_gets_room_discount() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    give_points(&engine, "G1", 1000).await;

    let receipt = engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 4))
        .await
        .unwrap();
    assert_eq!(receipt.base, Money::from_dollars(360));
    assert_eq!(receipt.discount, Money::from_dollars(36));
    assert_eq!(receipt.booking.total, Money::from_dollars(324));
    assert_eq!(receipt.points_debited, 1000);
    assert_eq!(receipt.points_earned, 30);
    assert_eq!(engine.get_guest("G1").await.unwrap().loyalty_points, 30);
}

#[tokio::test]
async fn booked_room_cannot_be_booked_again() {
    let engine = engine();
    engine.register_guest(new_guest("A")).await.unwrap();
    engine.register_guest(new_guest("B")).await.unwrap();
    engine
        .book_room("A", 2, d(2023, 6, 1), d(2023, 6, 2))
        .await
        .unwrap();
    let err = engine
        .book_room("B", 2, d(2023, 7, 1), d(2023, 7, 2))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::RoomNotAvailable {
            room_no: 2,
            status: RoomStatus::Booked
        }
    );
    assert_eq!(engine.get_guest("B").await.unwrap().loyalty_points, 0);
    assert_eq!(engine.list_bookings().await.len(), 1);
}

#[tokio::test]
async fn failed_booking_leaves_no_trace() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();

    // Unknown guest.
    assert!(matches!(
        engine.book_room("nobody", 1, d(2023, 6, 1), d(2023, 6, 2)).await,
        Err(EngineError::GuestNotFound(_))
    ));
    // Check-out not after check-in.
    assert!(matches!(
        engine.book_room("G1", 1, d(2023, 6, 2), d(2023, 6, 2)).await,
        Err(EngineError::InvalidStay { .. })
    ));
    // Room out of range.
    assert!(matches!(
        engine.book_room("G1", 51, d(2023, 6, 1), d(2023, 6, 2)).await,
        Err(EngineError::OutOfRange { what: "room", .. })
    ));
    // Date outside the supported window.
    assert!(matches!(
        engine.book_room("G1", 1, d(2022, 12, 30), d(2023, 1, 2)).await,
        Err(EngineError::InvalidDate { .. })
    ));

    assert_eq!(engine.get_room(1).await.unwrap().status, RoomStatus::Available);
    assert!(engine.list_bookings().await.is_empty());
    assert_eq!(engine.get_guest("G1").await.unwrap().loyalty_points, 0);
}

#[tokio::test]
async fn booking_index_capacity_rejects_without_allocating() {
    let engine = engine_with(HotelConfig {
        max_bookings: 1,
        ..HotelConfig::default()
    });
    engine.register_guest(new_guest("G1")).await.unwrap();
    engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 2))
        .await
        .unwrap();
    let err = engine
        .book_room("G1", 2, d(2023, 6, 1), d(2023, 6, 2))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Capacity);
    assert_eq!(engine.get_room(2).await.unwrap().status, RoomStatus::Available);
}

#[tokio::test]
async fn concurrent_bookings_of_one_room_admit_exactly_one() {
    let engine = Arc::new(engine());
    for i in 0..16 {
        engine.register_guest(new_guest(&format!("G{i}"))).await.unwrap();
    }

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .book_room(&format!("G{i}"), 7, d(2023, 6, 1), d(2023, 6, 3))
                .await
        }));
    }
    let mut ok = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => assert!(matches!(e, EngineError::RoomNotAvailable { room_no: 7, .. })),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(engine.list_bookings().await.len(), 1);
}

#[tokio::test]
async fn available_rooms_filters_by_type() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 2))
        .await
        .unwrap();
    let standard = engine.available_rooms(Some(RoomType::Standard)).await;
    assert!(standard.iter().all(|r| r.room_type == RoomType::Standard));
    assert!(!standard.iter().any(|r| r.number == 1));
    assert_eq!(engine.available_rooms(None).await.len(), 49);
    let numbers: Vec<RoomNo> = engine.list_rooms().await.iter().map(|r| r.number).collect();
    assert_eq!(numbers, (1..=50).collect::<Vec<_>>());
}

// ── Booking lifecycle ────────────────────────────────────

#[tokio::test]
async fn statuses_advance_and_room_is_released_at_checkout() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    let id = engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 4))
        .await
        .unwrap()
        .booking
        .id;

    let changes = engine.advance_statuses(d(2023, 6, 2)).await.unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(engine.find_booking(id).await.unwrap().status, BookingStatus::Active);
    assert_eq!(engine.get_room(1).await.unwrap().status, RoomStatus::Booked);

    engine.advance_statuses(d(2023, 6, 4)).await.unwrap();
    assert_eq!(engine.find_booking(id).await.unwrap().status, BookingStatus::Completed);
    assert_eq!(engine.get_room(1).await.unwrap().status, RoomStatus::Available);
}

#[tokio::test]
async fn advance_is_idempotent_for_a_fixed_date() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 4))
        .await
        .unwrap();
    engine
        .book_room("G1", 2, d(2023, 6, 3), d(2023, 6, 9))
        .await
        .unwrap();

    let first = engine.advance_statuses(d(2023, 6, 5)).await.unwrap();
    assert_eq!(first.len(), 3);
    let snapshot = engine.list_bookings().await;
    assert!(engine.advance_statuses(d(2023, 6, 5)).await.unwrap().is_empty());
    assert_eq!(engine.list_bookings().await, snapshot);
}

#[tokio::test]
async fn checkout_keeps_room_under_maintenance() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 2))
        .await
        .unwrap();
    engine
        .report_maintenance(1, IssueKind::Plumbing, "leaking tap", Priority::High)
        .await
        .unwrap();
    engine.advance_statuses(d(2023, 6, 3)).await.unwrap();
    assert_eq!(engine.get_room(1).await.unwrap().status, RoomStatus::Maintenance);
}

#[tokio::test]
async fn booked_room_count_follows_maintenance_and_checkout() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 3))
        .await
        .unwrap();
    engine
        .book_room("G1", 2, d(2023, 6, 1), d(2023, 6, 3))
        .await
        .unwrap();
    assert_eq!(engine.record_rooms_booked().await, 2);

    let req = engine
        .report_maintenance(1, IssueKind::Hvac, "no cooling", Priority::High)
        .await
        .unwrap();
    assert_eq!(engine.record_rooms_booked().await, 1);
    engine
        .update_maintenance(req.id, MaintenanceStatus::Resolved)
        .await
        .unwrap();
    assert_eq!(engine.record_rooms_booked().await, 2);

    engine
        .report_maintenance(2, IssueKind::Plumbing, "leaking tap", Priority::Low)
        .await
        .unwrap();
    engine.advance_statuses(d(2023, 6, 3)).await.unwrap();
    assert_eq!(engine.get_room(2).await.unwrap().status, RoomStatus::Maintenance);
    assert_eq!(engine.record_rooms_booked().await, 0);
    assert_eq!(
        engine.occupancy_report().await.rooms_booked,
        engine.record_rooms_booked().await
    );
}

#[tokio::test]
async fn checkout_release_can_be_disabled() {
    let engine = engine_with(HotelConfig {
        release_on_checkout: false,
        ..HotelConfig::default()
    });
    engine.register_guest(new_guest("G1")).await.unwrap();
    engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 2))
        .await
        .unwrap();
    engine.advance_statuses(d(2023, 6, 3)).await.unwrap();
    assert_eq!(engine.get_room(1).await.unwrap().status, RoomStatus::Booked);
    engine.release_room(1).await.unwrap();
    assert_eq!(engine.get_room(1).await.unwrap().status, RoomStatus::Available);
}

#[tokio::test]
async fn guest_profile_lists_bookings_in_check_in_order() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    engine
        .book_room("G1", 3, d(2023, 9, 1), d(2023, 9, 2))
        .await
        .unwrap();
    engine
        .book_room("G1", 4, d(2023, 6, 1), d(2023, 6, 2))
        .await
        .unwrap();
    engine.book_facility("G1", 1, d(2023, 7, 1)).await.unwrap();

    let profile = engine.guest_profile("G1").await.unwrap();
    let dates: Vec<Date> = profile.bookings.iter().map(|b| b.check_in()).collect();
    assert_eq!(dates, vec![d(2023, 6, 1), d(2023, 7, 1), d(2023, 9, 1)]);
    assert!(engine.list_by_guest("nobody").await.is_empty());
}

// ── Facilities ───────────────────────────────────────────

#[tokio::test]
async fn facility_booking_suggests_available_neighbours() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    engine.register_guest(new_guest("G2")).await.unwrap();
    engine.book_facility("G2", 4, d(2023, 6, 1)).await.unwrap();

    // Pool is next to Gym and Restaurant; the Restaurant is taken.
    let receipt = engine.book_facility("G1", 2, d(2023, 6, 1)).await.unwrap();
    assert_eq!(receipt.booking.total, Money::from_dollars(5));
    assert_eq!(receipt.booking.facility_id, Some(2));
    assert_eq!(receipt.booking.room_no, None);
    assert_eq!(receipt.nearby, vec![1]);

    assert!(matches!(
        engine.book_facility("G1", 2, d(2023, 6, 2)).await,
        Err(EngineError::FacilityNotAvailable(2))
    ));
    engine.release_facility(2).await.unwrap();
    engine.book_facility("G1", 2, d(2023, 6, 2)).await.unwrap();
}

#[tokio::test]
async fn facility_discount_and_points() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    give_points(&engine, "G1", 1200).await;

    let receipt = engine.book_facility("G1", 5, d(2023, 6, 1)).await.unwrap();
    assert_eq!(receipt.booking.total, Money::from_dollars(50));
    assert_eq!(receipt.points_debited, 1000);
    assert_eq!(receipt.points_earned, 0);
    assert_eq!(receipt.points_balance, 200);

    // The spa never earns points, whatever it costs.
    let receipt = engine.book_facility("G1", 3, d(2023, 6, 1)).await.unwrap();
    assert_eq!(receipt.booking.total, Money::from_dollars(50));
    assert_eq!(receipt.points_earned, 0);

    // A free facility never consumes points.
    give_points(&engine, "G1", 1000).await;
    let receipt = engine.book_facility("G1", 4, d(2023, 6, 1)).await.unwrap();
    assert_eq!(receipt.points_debited, 0);
    assert_eq!(receipt.points_balance, 1000);
}

#[tokio::test]
async fn unknown_facility_is_out_of_range() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    assert!(matches!(
        engine.book_facility("G1", 9, d(2023, 6, 1)).await,
        Err(EngineError::OutOfRange { what: "facility", .. })
    ));
    assert!(engine.nearby_facilities(9).await.is_err());
}

// ── Parking ──────────────────────────────────────────────

#[tokio::test]
async fn parking_waitlist_is_first_come_first_served() {
    let engine = engine_with(HotelConfig {
        parking_slots: 2,
        ..HotelConfig::default()
    });
    for g in ["A", "B", "C", "D"] {
        engine.register_guest(new_guest(g)).await.unwrap();
    }

    assert_eq!(
        engine.allocate_parking("A", "ABC-111").await.unwrap(),
        ParkingOutcome::Assigned { slot: 1 }
    );
    assert_eq!(
        engine.allocate_parking("B", "ABC-222").await.unwrap(),
        ParkingOutcome::Assigned { slot: 2 }
    );
    assert_eq!(
        engine.allocate_parking("C", "ABC-333").await.unwrap(),
        ParkingOutcome::Waitlisted { position: 1 }
    );
    assert_eq!(
        engine.allocate_parking("D", "ABC-444").await.unwrap(),
        ParkingOutcome::Waitlisted { position: 2 }
    );

    assert_eq!(engine.release_parking("A").await.unwrap(), 1);
    // Releasing does not hand the slot over by itself.
    assert_eq!(engine.waitlist().await.len(), 2);

    let assigned = engine.drain_waitlist().await;
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].guest_id, "C");
    assert_eq!(assigned[0].slot, 1);
    let waiting: Vec<String> = engine.waitlist().await.into_iter().map(|e| e.guest_id).collect();
    assert_eq!(waiting, vec!["D".to_string()]);
    assert_eq!(engine.parking_slot_of("C").await, Some(1));
}

#[tokio::test]
async fn parking_slot_recorded_on_live_stay() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    let id = engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 4))
        .await
        .unwrap()
        .booking
        .id;
    engine.allocate_parking("G1", "XYZ-9").await.unwrap();
    assert_eq!(engine.find_booking(id).await.unwrap().parking_slot, Some(1));
}

#[tokio::test]
async fn released_slot_is_cleared_from_the_booking() {
    let engine = engine_with(HotelConfig {
        parking_slots: 1,
        ..HotelConfig::default()
    });
    engine.register_guest(new_guest("A")).await.unwrap();
    engine.register_guest(new_guest("B")).await.unwrap();
    let a = engine
        .book_room("A", 1, d(2023, 6, 1), d(2023, 6, 4))
        .await
        .unwrap()
        .booking
        .id;
    let b = engine
        .book_room("B", 2, d(2023, 6, 1), d(2023, 6, 4))
        .await
        .unwrap()
        .booking
        .id;

    engine.allocate_parking("A", "CAR-A").await.unwrap();
    assert_eq!(engine.find_booking(a).await.unwrap().parking_slot, Some(1));
    engine.release_parking("A").await.unwrap();
    assert_eq!(engine.find_booking(a).await.unwrap().parking_slot, None);

    engine.allocate_parking("B", "CAR-B").await.unwrap();
    assert_eq!(engine.find_booking(a).await.unwrap().parking_slot, None);
    assert_eq!(engine.find_booking(b).await.unwrap().parking_slot, Some(1));
    assert_eq!(engine.parking_slot_of("A").await, None);
    assert_eq!(engine.parking_slot_of("B").await, Some(1));
}

#[tokio::test]
async fn parking_rejects_duplicates_and_unknown_guests() {
    let engine = engine_with(HotelConfig {
        parking_slots: 1,
        ..HotelConfig::default()
    });
    engine.register_guest(new_guest("A")).await.unwrap();
    engine.register_guest(new_guest("B")).await.unwrap();
    engine.allocate_parking("A", "CAR-1").await.unwrap();
    assert!(matches!(
        engine.allocate_parking("A", "CAR-1").await,
        Err(EngineError::ParkingAlreadyAssigned { slot: 1, .. })
    ));
    engine.allocate_parking("B", "CAR-2").await.unwrap();
    assert!(matches!(
        engine.allocate_parking("B", "CAR-2").await,
        Err(EngineError::AlreadyWaitlisted(_))
    ));
    assert!(matches!(
        engine.allocate_parking("ghost", "CAR-3").await,
        Err(EngineError::GuestNotFound(_))
    ));
    assert!(matches!(
        engine.release_parking("B").await,
        Err(EngineError::NoSlotHeld(_))
    ));
    assert!(matches!(
        engine.allocate_parking("A", "").await,
        Err(EngineError::InvalidInput(_))
    ));
}

// ── Maintenance ──────────────────────────────────────────

#[tokio::test]
async fn maintenance_overrides_booking_and_restores_it() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 4))
        .await
        .unwrap();

    let req = engine
        .report_maintenance(1, IssueKind::Electrical, "lights flicker", Priority::Medium)
        .await
        .unwrap();
    assert_eq!(req.status, MaintenanceStatus::Open);
    assert_eq!(engine.get_room(1).await.unwrap().status, RoomStatus::Maintenance);

    engine
        .update_maintenance(req.id, MaintenanceStatus::InProgress)
        .await
        .unwrap();
    engine
        .update_maintenance(req.id, MaintenanceStatus::Resolved)
        .await
        .unwrap();
    assert_eq!(engine.get_room(1).await.unwrap().status, RoomStatus::Booked);
}

#[tokio::test]
async fn resolving_unbooked_room_makes_it_available() {
    let engine = engine();
    let req = engine
        .report_maintenance(5, IssueKind::Hvac, "no cooling", Priority::Low)
        .await
        .unwrap();
    engine
        .update_maintenance(req.id, MaintenanceStatus::Resolved)
        .await
        .unwrap();
    assert_eq!(engine.get_room(5).await.unwrap().status, RoomStatus::Available);

    let err = engine
        .update_maintenance(req.id, MaintenanceStatus::InProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));
    assert!(matches!(
        engine.update_maintenance(99, MaintenanceStatus::Resolved).await,
        Err(EngineError::MaintenanceNotFound(99))
    ));
}

#[tokio::test]
async fn maintenance_log_capacity_and_ids() {
    let engine = engine_with(HotelConfig {
        max_maintenance: 2,
        ..HotelConfig::default()
    });
    let a = engine
        .report_maintenance(1, IssueKind::Other, "door", Priority::Low)
        .await
        .unwrap();
    let b = engine
        .report_maintenance(2, IssueKind::Furniture, "chair", Priority::Low)
        .await
        .unwrap();
    assert_eq!((a.id, b.id), (1, 2));
    let err = engine
        .report_maintenance(3, IssueKind::Other, "window", Priority::Low)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Capacity);
    assert_eq!(engine.get_room(3).await.unwrap().status, RoomStatus::Available);
}

// ── Services & billing ───────────────────────────────────

#[tokio::test]
async fn service_orders_need_an_active_stay() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 4))
        .await
        .unwrap();
    assert_eq!(
        engine.order_service(1, 1).await.unwrap_err(),
        EngineError::NoActiveStay(1)
    );
    engine.advance_statuses(d(2023, 6, 2)).await.unwrap();
    let order = engine.order_service(1, 1).await.unwrap();
    assert_eq!(order.item, "Breakfast Set");
    assert_eq!(order.charge, Money::from_dollars(15));
    assert!(matches!(
        engine.order_service(1, 6).await,
        Err(EngineError::OutOfRange { what: "menu item", .. })
    ));
    assert!(matches!(
        engine.order_service(1, 0).await,
        Err(EngineError::OutOfRange { .. })
    ));
}

#[tokio::test]
async fn completed_service_credits_guest_and_is_terminal() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 4))
        .await
        .unwrap();
    engine.advance_statuses(d(2023, 6, 1)).await.unwrap();
    let order = engine.order_service(1, 3).await.unwrap();

    engine
        .update_service(order.id, ServiceStatus::InProgress)
        .await
        .unwrap();
    engine
        .update_service(order.id, ServiceStatus::Completed)
        .await
        .unwrap();
    assert_eq!(engine.get_guest("G1").await.unwrap().loyalty_points, 31);
    assert!(matches!(
        engine.update_service(order.id, ServiceStatus::Pending).await,
        Err(EngineError::InvalidTransition { .. })
    ));
    assert!(matches!(
        engine.update_service(42, ServiceStatus::Completed).await,
        Err(EngineError::ServiceOrderNotFound(42))
    ));
}

#[tokio::test]
async fn bill_covers_stay_services_and_tax() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    let booking = engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 4))
        .await
        .unwrap()
        .booking;
    engine.advance_statuses(d(2023, 6, 2)).await.unwrap();
    let done = engine.order_service(1, 2).await.unwrap();
    engine.order_service(1, 5).await.unwrap();
    engine
        .update_service(done.id, ServiceStatus::Completed)
        .await
        .unwrap();

    let bill = engine.generate_bill("G1", booking.id).await.unwrap();
    assert_eq!(bill.id, 1);
    assert_eq!(bill.status, BillStatus::Unpaid);
    assert_eq!(bill.room_charges, Money::from_dollars(360));
    assert_eq!(bill.service_charges, Money::from_dollars(20));
    assert_eq!(bill.facility_charges, Money::ZERO);
    assert_eq!(bill.tax, Money::from_dollars(38));
    assert_eq!(bill.total, Money::from_dollars(418));
    assert_eq!(bill.total.cents() * 10, bill.subtotal().cents() * 11);
}

#[tokio::test]
async fn next_guest_in_room_is_not_billed_for_earlier_orders() {
    let engine = engine();
    engine.register_guest(new_guest("A")).await.unwrap();
    engine.register_guest(new_guest("B")).await.unwrap();
    let first = engine
        .book_room("A", 1, d(2023, 6, 1), d(2023, 6, 3))
        .await
        .unwrap()
        .booking;
    engine.advance_statuses(d(2023, 6, 1)).await.unwrap();
    let dinner = engine.order_service(1, 3).await.unwrap();
    assert_eq!(dinner.booking_id, first.id);
    engine
        .update_service(dinner.id, ServiceStatus::Completed)
        .await
        .unwrap();

    engine.advance_statuses(d(2023, 6, 3)).await.unwrap();
    let second = engine
        .book_room("B", 1, d(2023, 6, 3), d(2023, 6, 4))
        .await
        .unwrap()
        .booking;

    let later = engine.generate_bill("B", second.id).await.unwrap();
    assert_eq!(later.service_charges, Money::ZERO);
    assert_eq!(later.total, Money::from_dollars(132));
    let earlier = engine.generate_bill("A", first.id).await.unwrap();
    assert_eq!(earlier.service_charges, Money::from_dollars(25));
}

#[tokio::test]
async fn bill_requires_matching_guest() {
    let engine = engine();
    engine.register_guest(new_guest("A")).await.unwrap();
    engine.register_guest(new_guest("B")).await.unwrap();
    let booking = engine
        .book_room("A", 1, d(2023, 6, 1), d(2023, 6, 2))
        .await
        .unwrap()
        .booking;
    assert!(matches!(
        engine.generate_bill("B", booking.id).await,
        Err(EngineError::BookingGuestMismatch { .. })
    ));
    assert!(matches!(
        engine.generate_bill("A", ulid::Ulid::new()).await,
        Err(EngineError::BookingNotFound(_))
    ));
    assert!(matches!(
        engine.generate_bill("nobody", booking.id).await,
        Err(EngineError::GuestNotFound(_))
    ));
    assert!(engine.list_bills(None).await.is_empty());
}

#[tokio::test]
async fn paying_bill_records_revenue_once() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    let booking = engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 4))
        .await
        .unwrap()
        .booking;
    let bill = engine.generate_bill("G1", booking.id).await.unwrap();
    assert_eq!(engine.revenue(), Money::ZERO);

    let paid = engine.pay_bill(bill.id, PaymentMethod::Card).await.unwrap();
    assert_eq!(paid.amount, Money::from_dollars(396));
    assert_eq!(paid.points_earned, 30);
    assert_eq!(paid.points_balance, 60);
    assert_eq!(engine.revenue(), Money::from_dollars(396));

    let stored = engine.get_bill(bill.id).await.unwrap();
    assert_eq!(stored.status, BillStatus::Paid);
    assert_eq!(stored.paid_with, Some(PaymentMethod::Card));

    assert_eq!(
        engine.pay_bill(bill.id, PaymentMethod::Cash).await.unwrap_err(),
        EngineError::BillAlreadyPaid(bill.id)
    );
    assert_eq!(engine.revenue(), Money::from_dollars(396));
    assert!(matches!(
        engine.pay_bill(77, PaymentMethod::Cash).await,
        Err(EngineError::BillNotFound(77))
    ));
}

#[tokio::test]
async fn bills_filtered_by_guest() {
    let engine = engine();
    engine.register_guest(new_guest("A")).await.unwrap();
    engine.register_guest(new_guest("B")).await.unwrap();
    let a = engine.book_facility("A", 1, d(2023, 6, 1)).await.unwrap().booking;
    let b = engine.book_facility("B", 2, d(2023, 6, 1)).await.unwrap().booking;
    engine.generate_bill("A", a.id).await.unwrap();
    let bb = engine.generate_bill("B", b.id).await.unwrap();
    assert_eq!(bb.id, 2);
    assert_eq!(bb.facility_charges, Money::from_dollars(5));
    assert_eq!(engine.list_bills(Some("A")).await.len(), 1);
    assert_eq!(engine.list_bills(None).await.len(), 2);
}

// ── Reports & events ─────────────────────────────────────

#[tokio::test]
async fn occupancy_report_counts_everything() {
    let engine = engine_with(HotelConfig {
        parking_slots: 1,
        ..HotelConfig::default()
    });
    engine.register_guest(new_guest("A")).await.unwrap();
    engine.register_guest(new_guest("B")).await.unwrap();
    engine
        .book_room("A", 1, d(2023, 6, 1), d(2023, 6, 2))
        .await
        .unwrap();
    engine.allocate_parking("A", "CAR-1").await.unwrap();
    engine.allocate_parking("B", "CAR-2").await.unwrap();
    engine
        .report_maintenance(2, IssueKind::Other, "squeaky door", Priority::Low)
        .await
        .unwrap();

    let report = engine.occupancy_report().await;
    assert_eq!(report.rooms_total, 50);
    assert_eq!(report.rooms_booked, 1);
    assert_eq!(report.rooms_in_maintenance, 1);
    assert_eq!(report.parking_occupied, 1);
    assert_eq!(report.parking_total, 1);
    assert_eq!(report.waitlist_depth, 1);
    assert_eq!(report.open_maintenance, 1);
    assert_eq!(report.bookings, 1);
    assert_eq!(report.revenue, Money::ZERO);
}

#[tokio::test]
async fn committed_mutations_are_broadcast() {
    let engine = engine();
    let mut rooms = engine.notify.subscribe(Topic::Rooms);
    let mut all = engine.notify.subscribe(Topic::All);

    engine.register_guest(new_guest("G1")).await.unwrap();
    engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 2))
        .await
        .unwrap();

    assert!(matches!(
        all.recv().await.unwrap(),
        EngineEvent::GuestRegistered { .. }
    ));
    assert!(matches!(
        all.recv().await.unwrap(),
        EngineEvent::RoomBooked { room_no: 1, .. }
    ));
    assert!(matches!(
        rooms.recv().await.unwrap(),
        EngineEvent::RoomBooked { room_no: 1, .. }
    ));
    // Rejections emit nothing.
    let _ = engine.book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 2)).await;
    assert!(rooms.try_recv().is_err());
}

#[tokio::test]
async fn points_never_go_negative() {
    let engine = engine();
    engine.register_guest(new_guest("G1")).await.unwrap();
    give_points(&engine, "G1", 999).await;
    let receipt = engine
        .book_room("G1", 1, d(2023, 6, 1), d(2023, 6, 2))
        .await
        .unwrap();
    assert_eq!(receipt.points_debited, 0);
    assert_eq!(receipt.booking.total, Money::from_dollars(120));
    assert_eq!(receipt.points_balance, 999 + 10);

    give_points(&engine, "G1", 1000).await;
    for room in [4, 7, 10] {
        engine
            .book_room("G1", room, d(2023, 6, 1), d(2023, 6, 2))
            .await
            .unwrap();
    }
    // One discount, then the balance is below the threshold again.
    assert_eq!(engine.get_guest("G1").await.unwrap().loyalty_points, 30);
}
