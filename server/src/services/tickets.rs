use std::sync::Arc;

use tracing::{info, warn};

use crate::models::{NewTicket, Ticket, TicketExit, TicketNumber};
use crate::services::billing::{duration_minutes, parking_fee};
use crate::services::clock::Clock;
use crate::storage::{StoreError, TicketStore};
use crate::utils::error::AppError;

/// Attempts at drawing an unused ticket number before giving up.
pub const MAX_TICKET_NUMBER_ATTEMPTS: usize = 32;

pub trait TicketNumberSource: Send + Sync {
    fn next_number(&self) -> TicketNumber;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTicketNumbers;

impl TicketNumberSource for RandomTicketNumbers {
    fn next_number(&self) -> TicketNumber {
        TicketNumber::random(&mut rand::thread_rng())
    }
}

/// Issues tickets on entry and settles them on exit.
#[derive(Clone)]
pub struct TicketService {
    store: Arc<dyn TicketStore>,
    clock: Arc<dyn Clock>,
    numbers: Arc<dyn TicketNumberSource>,
}

impl TicketService {
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_number_source(store, clock, Arc::new(RandomTicketNumbers))
    }

    pub fn with_number_source(
        store: Arc<dyn TicketStore>,
        clock: Arc<dyn Clock>,
        numbers: Arc<dyn TicketNumberSource>,
    ) -> Self {
        Self {
            store,
            clock,
            numbers,
        }
    }

    /// Records a vehicle entering the garage.
    ///
    /// No capacity check is made: a ticket is issued even when every space
    /// is taken.
    pub async fn enter(&self, license_plate: &str, vehicle_type: &str) -> Result<Ticket, AppError> {
        let license_plate = required(license_plate, "License plate is required")?;
        let vehicle_type = required(vehicle_type, "Vehicle type is required")?;
        let entry_time = self.clock.now();

        for attempt in 1..=MAX_TICKET_NUMBER_ATTEMPTS {
            let new_ticket = NewTicket {
                ticket_number: self.numbers.next_number(),
                license_plate: license_plate.to_string(),
                vehicle_type: vehicle_type.to_string(),
                entry_time,
            };

            match self.store.insert_ticket(new_ticket).await {
                Ok(ticket) => {
                    info!(
                        ticket_number = %ticket.ticket_number,
                        license_plate = %ticket.license_plate,
                        vehicle_type = %ticket.vehicle_type,
                        "Ticket issued"
                    );
                    return Ok(ticket);
                }
                Err(StoreError::DuplicateTicketNumber(number)) => {
                    warn!(ticket_number = %number, attempt, "Ticket number already in use, drawing another");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::InternalServerError(format!(
            "no free ticket number after {MAX_TICKET_NUMBER_ATTEMPTS} attempts"
        )))
    }

    pub async fn get_by_number(&self, ticket_number: &str) -> Result<Ticket, AppError> {
        let number = parse_number(ticket_number)?;
        self.store
            .find_ticket_by_number(&number)
            .await?
            .ok_or_else(ticket_not_found)
    }

    /// Closes an active ticket, computing its duration and fee at the
    /// current hourly rate.
    pub async fn exit(&self, ticket_number: &str, payment_method: &str) -> Result<Ticket, AppError> {
        let ticket = self.get_by_number(ticket_number).await?;
        if !ticket.is_active() {
            return Err(already_processed());
        }
        let payment_method = required(payment_method, "Payment method is required")?;

        let settings = self
            .store
            .garage_settings()
            .await?
            .ok_or_else(|| AppError::InternalServerError("garage settings not found".to_string()))?;

        let exit_time = self.clock.now();
        let minutes = duration_minutes(ticket.entry_time, exit_time);
        let amount_paid = parking_fee(minutes, settings.hourly_rate()).ok_or_else(|| {
            AppError::InternalServerError(format!("fee overflow for {minutes} minutes"))
        })?;

        let exit = TicketExit {
            exit_time,
            duration_minutes: minutes,
            amount_paid,
            payment_method: payment_method.to_string(),
        };

        // A concurrent exit may have completed the ticket since it was read.
        let completed = self
            .store
            .complete_ticket(&ticket.ticket_number, &exit)
            .await?
            .ok_or_else(already_processed)?;

        info!(
            ticket_number = %completed.ticket_number,
            duration_minutes = minutes,
            amount_cents = amount_paid.cents(),
            payment_method = %exit.payment_method,
            "Ticket completed"
        );
        Ok(completed)
    }
}

// Blank input is rejected; accepted values are kept as submitted.
fn required<'a>(value: &'a str, message: &str) -> Result<&'a str, AppError> {
    if value.trim().is_empty() {
        Err(AppError::ValidationError(message.to_string()))
    } else {
        Ok(value)
    }
}

// A malformed number can never match a stored ticket.
fn parse_number(raw: &str) -> Result<TicketNumber, AppError> {
    TicketNumber::parse(raw.trim()).map_err(|_| ticket_not_found())
}

fn ticket_not_found() -> AppError {
    AppError::NotFound("Ticket not found".to_string())
}

fn already_processed() -> AppError {
    AppError::InvalidState("Ticket has already been processed".to_string())
}
