use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::limits::NOTIFY_CHANNEL_CAPACITY;
use crate::model::EngineEvent;

/// What a subscriber listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Guests,
    Rooms,
    Parking,
    Facilities,
    Bookings,
    Services,
    Maintenance,
    Billing,
    /// Every event.
    All,
}

impl Topic {
    pub fn of(event: &EngineEvent) -> Topic {
        match event {
            EngineEvent::GuestRegistered { .. } => Topic::Guests,
            EngineEvent::RoomBooked { .. } | EngineEvent::RoomReleased { .. } => Topic::Rooms,
            EngineEvent::FacilityBooked { .. } | EngineEvent::FacilityReleased { .. } => {
                Topic::Facilities
            }
            EngineEvent::ParkingAssigned { .. }
            | EngineEvent::ParkingWaitlisted { .. }
            | EngineEvent::ParkingReleased { .. } => Topic::Parking,
            EngineEvent::BookingStatusChanged(_) => Topic::Bookings,
            EngineEvent::MaintenanceReported { .. } | EngineEvent::MaintenanceUpdated { .. } => {
                Topic::Maintenance
            }
            EngineEvent::ServiceOrdered { .. } | EngineEvent::ServiceUpdated { .. } => Topic::Services,
            EngineEvent::BillGenerated { .. } | EngineEvent::BillPaid { .. } => Topic::Billing,
        }
    }
}

/// Broadcast hub the activity log (and anything else) subscribes to.
pub struct NotifyHub {
    channels: DashMap<Topic, broadcast::Sender<EngineEvent>>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to a topic. Creates the channel if needed.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<EngineEvent> {
        let sender = self
            .channels
            .entry(topic)
            .or_insert_with(|| broadcast::channel(NOTIFY_CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send to the event's topic and to `All`. No-op if nobody is listening.
    pub fn send(&self, event: &EngineEvent) {
        for topic in [Topic::of(event), Topic::All] {
            if let Some(sender) = self.channels.get(&topic) {
                let _ = sender.send(event.clone());
            }
        }
    }
}
