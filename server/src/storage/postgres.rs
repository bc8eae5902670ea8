use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::{
    GarageDefaults, GarageSetting, Money, NewTicket, Ticket, TicketExit, TicketNumber, TicketStatus,
};
use crate::storage::{StoreError, TicketFilter, TicketStore};

const TICKET_COLUMNS: &str = "id, ticket_number, license_plate, vehicle_type, entry_time, \
     exit_time, duration_minutes, amount_paid_cents, status, payment_method";

#[derive(Clone)]
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn filtered(select: &str, filter: &TicketFilter) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(select);
        builder.push(" FROM tickets WHERE TRUE");
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(since) = filter.exited_since {
            builder.push(" AND exit_time >= ").push_bind(since);
        }
        builder
    }
}

fn map_insert_error(err: sqlx::Error, ticket_number: TicketNumber) -> StoreError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            StoreError::DuplicateTicketNumber(ticket_number)
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket, StoreError> {
        let sql = format!(
            "INSERT INTO tickets (ticket_number, license_plate, vehicle_type, entry_time, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {TICKET_COLUMNS}"
        );

        sqlx::query_as::<_, Ticket>(&sql)
            .bind(ticket.ticket_number.as_str())
            .bind(&ticket.license_plate)
            .bind(&ticket.vehicle_type)
            .bind(ticket.entry_time)
            .bind(TicketStatus::Active.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, ticket.ticket_number.clone()))
    }

    async fn find_ticket_by_number(
        &self,
        ticket_number: &TicketNumber,
    ) -> Result<Option<Ticket>, StoreError> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_number = $1");

        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(ticket_number.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    async fn complete_ticket(
        &self,
        ticket_number: &TicketNumber,
        exit: &TicketExit,
    ) -> Result<Option<Ticket>, StoreError> {
        // The status guard makes the active -> completed transition a single
        // conditional write, so two concurrent exits cannot both succeed.
        let sql = format!(
            "UPDATE tickets \
             SET exit_time = $2, duration_minutes = $3, amount_paid_cents = $4, \
                 payment_method = $5, status = $6 \
             WHERE ticket_number = $1 AND status = $7 \
             RETURNING {TICKET_COLUMNS}"
        );

        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(ticket_number.as_str())
            .bind(exit.exit_time)
            .bind(exit.duration_minutes)
            .bind(exit.amount_paid.cents())
            .bind(&exit.payment_method)
            .bind(TicketStatus::Completed.as_str())
            .bind(TicketStatus::Active.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    async fn count_tickets(&self, filter: &TicketFilter) -> Result<i64, StoreError> {
        let count = Self::filtered("SELECT COUNT(*)", filter)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn sum_amount_paid(&self, filter: &TicketFilter) -> Result<Money, StoreError> {
        let cents = Self::filtered("SELECT COALESCE(SUM(amount_paid_cents), 0)::BIGINT", filter)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(Money::from_cents(cents))
    }

    async fn avg_duration_minutes(&self, filter: &TicketFilter) -> Result<Option<f64>, StoreError> {
        let avg = Self::filtered("SELECT AVG(duration_minutes)::DOUBLE PRECISION", filter)
            .build_query_scalar::<Option<f64>>()
            .fetch_one(&self.pool)
            .await?;
        Ok(avg)
    }

    async fn list_recent_tickets(&self, limit: u32) -> Result<Vec<Ticket>, StoreError> {
        let sql = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY entry_time DESC, id LIMIT $1"
        );

        let tickets = sqlx::query_as::<_, Ticket>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(tickets)
    }

    async fn garage_settings(&self) -> Result<Option<GarageSetting>, StoreError> {
        let settings = sqlx::query_as::<_, GarageSetting>(
            "SELECT id, total_spaces, hourly_rate_cents FROM garage_settings ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(settings)
    }

    async fn ensure_garage_settings(
        &self,
        defaults: &GarageDefaults,
    ) -> Result<GarageSetting, StoreError> {
        sqlx::query(
            "INSERT INTO garage_settings (id, total_spaces, hourly_rate_cents) \
             VALUES (1, $1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(defaults.total_spaces)
        .bind(defaults.hourly_rate_cents)
        .execute(&self.pool)
        .await?;

        self.garage_settings()
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }
}
