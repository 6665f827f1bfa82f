use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::HotelConfig;
use crate::model::*;
use crate::money::Money;

/// The fixed physical inventory the engine is built from.
#[derive(Debug, Clone, Default)]
pub struct PropertyLayout {
    pub rooms: Vec<Room>,
    pub parking_slots: Vec<SlotNo>,
    pub facilities: Vec<Facility>,
}

impl PropertyLayout {
    /// Standard property: rooms cycling Standard/Deluxe/Suite with randomized tariffs,
    /// slots `1..=P`, and the five house facilities.
    pub fn standard(config: &HotelConfig) -> Self {
        let mut rng = match config.price_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let rooms = (1..=config.rooms)
            .map(|n| {
                let room_type = RoomType::for_room(n);
                let dollars = match room_type {
                    RoomType::Standard => 100 + rng.random_range(0..50),
                    RoomType::Deluxe => 200 + rng.random_range(0..100),
                    RoomType::Suite => 500 + rng.random_range(0..200),
                };
                Room::new(n, room_type, Money::from_dollars(dollars))
            })
            .collect();

        Self {
            rooms,
            parking_slots: (1..=config.parking_slots).collect(),
            facilities: house_facilities(),
        }
    }
}

/// Gym, Pool, Spa, Restaurant, Conference Room and the walkways between them.
pub fn house_facilities() -> Vec<Facility> {
    let mut facilities = vec![
        Facility::new(1, "Gym", Money::from_dollars(10)),
        Facility::new(2, "Pool", Money::from_dollars(5)),
        Facility::new(3, "Spa", Money::from_dollars(50)).with_earn_override(0),
        Facility::new(4, "Restaurant", Money::ZERO),
        Facility::new(5, "Conference Room", Money::from_dollars(100)),
    ];
    link(&mut facilities, &[(1, 2), (1, 3), (2, 4), (3, 4), (4, 5)]);
    facilities
}

/// Add undirected adjacency edges between facilities by id.
pub fn link(facilities: &mut [Facility], edges: &[(FacilityId, FacilityId)]) {
    for &(a, b) in edges {
        for f in facilities.iter_mut() {
            if f.id == a {
                f.adjacent.insert(b);
            } else if f.id == b {
                f.adjacent.insert(a);
            }
        }
    }
}
