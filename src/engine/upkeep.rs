use tracing::info;

use crate::calendar;
use crate::limits::*;
use crate::model::*;

use super::{Engine, EngineError, check_text};

impl Engine {
    /// Log a maintenance issue and take the room out of service, even if it is booked.
    pub async fn report_maintenance(
        &self,
        room_no: RoomNo,
        kind: IssueKind,
        description: &str,
        priority: Priority,
    ) -> Result<MaintenanceRequest, EngineError> {
        check_text(description, MAX_ISSUE_LEN, "issue description must be 1-99 characters")?;
        let room_arc = self.room(room_no)?;

        let mut room = room_arc.write().await;
        let mut requests = self.maintenance.write().await;
        if requests.len() >= self.config.max_maintenance {
            return Err(EngineError::CapacityExceeded("maintenance log full"));
        }
        let id = requests.keys().next_back().map_or(1, |last| last + 1);
        let request = MaintenanceRequest {
            id,
            room_no,
            kind,
            description: description.to_string(),
            priority,
            status: MaintenanceStatus::Open,
            reported_on: calendar::today(),
        };
        requests.insert(id, request.clone());
        room.take_out_of_service();
        drop(requests);
        drop(room);

        info!(request_id = id, room_no, priority = %priority, "maintenance reported");
        self.emit(EngineEvent::MaintenanceReported { request_id: id, room_no });
        self.record_rooms_booked().await;
        Ok(request)
    }

    /// Move a request to In Progress or Resolved. Resolving puts the room back in
    /// service: Booked if a live stay still holds it, Available otherwise.
    pub async fn update_maintenance(
        &self,
        request_id: u32,
        status: MaintenanceStatus,
    ) -> Result<MaintenanceRequest, EngineError> {
        let room_no = self
            .maintenance
            .read()
            .await
            .get(&request_id)
            .map(|r| r.room_no)
            .ok_or(EngineError::MaintenanceNotFound(request_id))?;
        let room_arc = self.room(room_no)?;

        let mut room = room_arc.write().await;
        let live_stay = self.bookings.read().await.has_live_on_room(room_no);
        let mut requests = self.maintenance.write().await;
        let request = requests
            .get_mut(&request_id)
            .ok_or(EngineError::MaintenanceNotFound(request_id))?;

        let allowed = matches!(
            (request.status, status),
            (MaintenanceStatus::Open, MaintenanceStatus::InProgress)
                | (MaintenanceStatus::Open, MaintenanceStatus::Resolved)
                | (MaintenanceStatus::InProgress, MaintenanceStatus::Resolved)
        );
        if !allowed {
            return Err(EngineError::InvalidTransition {
                what: "maintenance request",
                id: request_id,
                from: request.status.to_string(),
                to: status.to_string(),
            });
        }
        request.status = status;

        if status == MaintenanceStatus::Resolved {
            if live_stay {
                room.status = RoomStatus::Booked;
            } else {
                room.release();
                self.emit(EngineEvent::RoomReleased { room_no });
            }
        }

        let updated = request.clone();
        drop(requests);
        drop(room);

        info!(request_id, room_no, status = %status, "maintenance updated");
        self.emit(EngineEvent::MaintenanceUpdated { request_id, status });
        if status == MaintenanceStatus::Resolved {
            self.record_rooms_booked().await;
        }
        Ok(updated)
    }

    /// Order a room-service item (1-based menu choice) for a room with an active stay.
    pub async fn order_service(&self, room_no: RoomNo, choice: usize) -> Result<ServiceOrder, EngineError> {
        self.room(room_no)?;
        let &(item, charge) = choice
            .checked_sub(1)
            .and_then(|i| SERVICE_MENU.get(i))
            .ok_or(EngineError::OutOfRange {
                what: "menu item",
                value: choice as u32,
                max: SERVICE_MENU.len() as u32,
            })?;

        let bookings = self.bookings.read().await;
        let booking_id = bookings
            .active_on_room(room_no)
            .map(|b| b.id)
            .ok_or(EngineError::NoActiveStay(room_no))?;
        let mut services = self.services.write().await;
        if services.len() >= self.config.max_service_orders {
            return Err(EngineError::CapacityExceeded("service order book full"));
        }
        let id = services.keys().next_back().map_or(1, |last| last + 1);
        let order = ServiceOrder {
            id,
            room_no,
            booking_id,
            item: item.to_string(),
            charge,
            status: ServiceStatus::Pending,
            ordered_on: calendar::today(),
        };
        services.insert(id, order.clone());

        info!(order_id = id, room_no, item, "service ordered");
        self.emit(EngineEvent::ServiceOrdered { order_id: id, room_no });
        Ok(order)
    }

    /// Advance a service order. Completing it credits the guest of the room's active
    /// stay with the service-completion points.
    pub async fn update_service(&self, order_id: u32, status: ServiceStatus) -> Result<ServiceOrder, EngineError> {
        let room_no = self
            .services
            .read()
            .await
            .get(&order_id)
            .map(|o| o.room_no)
            .ok_or(EngineError::ServiceOrderNotFound(order_id))?;

        let guest_arc = if status == ServiceStatus::Completed {
            let bookings = self.bookings.read().await;
            bookings
                .active_on_room(room_no)
                .and_then(|b| self.guests.get(&b.guest_id).map(|g| g.value().clone()))
        } else {
            None
        };
        let mut guest = match &guest_arc {
            Some(g) => Some(g.write().await),
            None => None,
        };

        let mut services = self.services.write().await;
        let order = services
            .get_mut(&order_id)
            .ok_or(EngineError::ServiceOrderNotFound(order_id))?;
        let allowed = matches!(
            (order.status, status),
            (ServiceStatus::Pending, ServiceStatus::InProgress)
                | (ServiceStatus::Pending, ServiceStatus::Completed)
                | (ServiceStatus::InProgress, ServiceStatus::Completed)
        );
        if !allowed {
            return Err(EngineError::InvalidTransition {
                what: "service order",
                id: order_id,
                from: order.status.to_string(),
                to: status.to_string(),
            });
        }
        order.status = status;
        if let Some(guest) = guest.as_mut() {
            guest.credit(self.config.loyalty.service_completion_points);
        }

        info!(order_id, room_no, status = %status, "service updated");
        self.emit(EngineEvent::ServiceUpdated { order_id, status });
        Ok(order.clone())
    }
}
