use std::sync::Arc;

use crate::services::{Clock, OccupancyService, TicketService};
use crate::storage::TicketStore;

/// Shared by every handler. Both services sit over the same store.
#[derive(Clone)]
pub struct AppState {
    pub tickets: TicketService,
    pub occupancy: OccupancyService,
}

impl AppState {
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tickets: TicketService::new(store.clone(), clock.clone()),
            occupancy: OccupancyService::new(store, clock),
        }
    }
}
