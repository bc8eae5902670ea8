//! Persistence collaborator for the ticket lifecycle and occupancy reports.
//!
//! Services receive a `TicketStore` explicitly so they can run against
//! Postgres in production and the in-memory store in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    GarageDefaults, GarageSetting, Money, NewTicket, Ticket, TicketExit, TicketNumber, TicketStatus,
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryTicketStore;
pub use postgres::PgTicketStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ticket number {0} is already taken")]
    DuplicateTicketNumber(TicketNumber),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row filter for the aggregate queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub exited_since: Option<DateTime<Utc>>,
}

impl TicketFilter {
    pub fn active() -> Self {
        Self {
            status: Some(TicketStatus::Active),
            exited_since: None,
        }
    }

    pub fn completed() -> Self {
        Self {
            status: Some(TicketStatus::Completed),
            exited_since: None,
        }
    }

    pub fn completed_since(since: DateTime<Utc>) -> Self {
        Self {
            status: Some(TicketStatus::Completed),
            exited_since: Some(since),
        }
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        let status_ok = self.status.map_or(true, |status| ticket.status == status);
        let exit_ok = match self.exited_since {
            Some(since) => ticket.exit_time.is_some_and(|exit| exit >= since),
            None => true,
        };
        status_ok && exit_ok
    }
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Fails with `DuplicateTicketNumber` when the number is already used.
    async fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket, StoreError>;

    async fn find_ticket_by_number(
        &self,
        ticket_number: &TicketNumber,
    ) -> Result<Option<Ticket>, StoreError>;

    /// Applies `exit` only if the ticket is still active. `None` means no
    /// active ticket with that number exists.
    async fn complete_ticket(
        &self,
        ticket_number: &TicketNumber,
        exit: &TicketExit,
    ) -> Result<Option<Ticket>, StoreError>;

    async fn count_tickets(&self, filter: &TicketFilter) -> Result<i64, StoreError>;

    /// Zero when nothing matches.
    async fn sum_amount_paid(&self, filter: &TicketFilter) -> Result<Money, StoreError>;

    async fn avg_duration_minutes(&self, filter: &TicketFilter) -> Result<Option<f64>, StoreError>;

    /// Newest entries first.
    async fn list_recent_tickets(&self, limit: u32) -> Result<Vec<Ticket>, StoreError>;

    async fn garage_settings(&self) -> Result<Option<GarageSetting>, StoreError>;

    /// Creates the settings row from `defaults` unless one already exists.
    async fn ensure_garage_settings(
        &self,
        defaults: &GarageDefaults,
    ) -> Result<GarageSetting, StoreError>;
}
