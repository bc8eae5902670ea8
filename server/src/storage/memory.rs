use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    GarageDefaults, GarageSetting, Money, NewTicket, Ticket, TicketExit, TicketNumber, TicketStatus,
};
use crate::storage::{StoreError, TicketFilter, TicketStore};

const SETTINGS_ROW_ID: i32 = 1;

#[derive(Default)]
struct MemoryState {
    tickets: Vec<Ticket>,
    settings: Option<GarageSetting>,
}

/// Process-local store. Data is lost on restart.
#[derive(Default)]
pub struct InMemoryTicketStore {
    state: RwLock<MemoryState>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: GarageSetting) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                tickets: Vec::new(),
                settings: Some(settings),
            }),
        }
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket, StoreError> {
        let mut state = self.state.write().await;

        if state
            .tickets
            .iter()
            .any(|existing| existing.ticket_number == ticket.ticket_number)
        {
            return Err(StoreError::DuplicateTicketNumber(ticket.ticket_number));
        }

        let ticket = Ticket {
            id: Uuid::new_v4(),
            ticket_number: ticket.ticket_number,
            license_plate: ticket.license_plate,
            vehicle_type: ticket.vehicle_type,
            entry_time: ticket.entry_time,
            exit_time: None,
            duration_minutes: None,
            amount_paid_cents: None,
            status: TicketStatus::Active,
            payment_method: None,
        };
        state.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn find_ticket_by_number(
        &self,
        ticket_number: &TicketNumber,
    ) -> Result<Option<Ticket>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .tickets
            .iter()
            .find(|ticket| &ticket.ticket_number == ticket_number)
            .cloned())
    }

    async fn complete_ticket(
        &self,
        ticket_number: &TicketNumber,
        exit: &TicketExit,
    ) -> Result<Option<Ticket>, StoreError> {
        let mut state = self.state.write().await;

        let Some(ticket) = state
            .tickets
            .iter_mut()
            .find(|ticket| &ticket.ticket_number == ticket_number && ticket.is_active())
        else {
            return Ok(None);
        };

        ticket.exit_time = Some(exit.exit_time);
        ticket.duration_minutes = Some(exit.duration_minutes);
        ticket.amount_paid_cents = Some(exit.amount_paid.cents());
        ticket.payment_method = Some(exit.payment_method.clone());
        ticket.status = TicketStatus::Completed;

        Ok(Some(ticket.clone()))
    }

    async fn count_tickets(&self, filter: &TicketFilter) -> Result<i64, StoreError> {
        let state = self.state.read().await;
        let count = state.tickets.iter().filter(|t| filter.matches(t)).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn sum_amount_paid(&self, filter: &TicketFilter) -> Result<Money, StoreError> {
        let state = self.state.read().await;
        let cents = state
            .tickets
            .iter()
            .filter(|t| filter.matches(t))
            .filter_map(|t| t.amount_paid_cents)
            .sum();
        Ok(Money::from_cents(cents))
    }

    #[allow(clippy::cast_precision_loss)]
    async fn avg_duration_minutes(&self, filter: &TicketFilter) -> Result<Option<f64>, StoreError> {
        let state = self.state.read().await;
        let durations: Vec<i64> = state
            .tickets
            .iter()
            .filter(|t| filter.matches(t))
            .filter_map(|t| t.duration_minutes)
            .collect();

        if durations.is_empty() {
            return Ok(None);
        }
        let total: i64 = durations.iter().sum();
        Ok(Some(total as f64 / durations.len() as f64))
    }

    async fn list_recent_tickets(&self, limit: u32) -> Result<Vec<Ticket>, StoreError> {
        let state = self.state.read().await;
        let mut tickets = state.tickets.clone();
        tickets.sort_by(|a, b| b.entry_time.cmp(&a.entry_time));
        tickets.truncate(limit as usize);
        Ok(tickets)
    }

    async fn garage_settings(&self) -> Result<Option<GarageSetting>, StoreError> {
        Ok(self.state.read().await.settings.clone())
    }

    async fn ensure_garage_settings(
        &self,
        defaults: &GarageDefaults,
    ) -> Result<GarageSetting, StoreError> {
        let mut state = self.state.write().await;
        let settings = state.settings.get_or_insert_with(|| GarageSetting {
            id: SETTINGS_ROW_ID,
            total_spaces: defaults.total_spaces,
            hourly_rate_cents: defaults.hourly_rate_cents,
        });
        Ok(settings.clone())
    }
}
