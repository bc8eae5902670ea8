use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::models::money::Money;

const TICKET_NUMBER_PREFIX: &str = "PS-";
const TICKET_NUMBER_MIN: u16 = 1000;
const TICKET_NUMBER_MAX: u16 = 9999;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid ticket number '{0}'")]
pub struct InvalidTicketNumber(pub String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid ticket status '{0}'")]
pub struct InvalidTicketStatus(pub String);

/// Human-facing ticket identifier, `PS-` followed by a number in 1000..=9999.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TicketNumber(String);

impl TicketNumber {
    pub fn from_suffix(suffix: u16) -> Result<Self, InvalidTicketNumber> {
        if (TICKET_NUMBER_MIN..=TICKET_NUMBER_MAX).contains(&suffix) {
            Ok(Self(format!("{TICKET_NUMBER_PREFIX}{suffix}")))
        } else {
            Err(InvalidTicketNumber(suffix.to_string()))
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let suffix = rng.gen_range(TICKET_NUMBER_MIN..=TICKET_NUMBER_MAX);
        Self(format!("{TICKET_NUMBER_PREFIX}{suffix}"))
    }

    pub fn parse(raw: &str) -> Result<Self, InvalidTicketNumber> {
        let invalid = || InvalidTicketNumber(raw.to_string());
        let digits = raw.strip_prefix(TICKET_NUMBER_PREFIX).ok_or_else(invalid)?;
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let suffix: u16 = digits.parse().map_err(|_| invalid())?;
        Self::from_suffix(suffix).map_err(|_| invalid())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TicketNumber {
    type Error = InvalidTicketNumber;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Active,
    Completed,
}

impl TicketStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Active => "active",
            TicketStatus::Completed => "completed",
        }
    }
}

impl TryFrom<String> for TicketStatus {
    type Error = InvalidTicketStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(TicketStatus::Active),
            "completed" => Ok(TicketStatus::Completed),
            _ => Err(InvalidTicketStatus(value)),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single vehicle stay. Exit fields stay `None` until the ticket is completed.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    #[sqlx(try_from = "String")]
    pub ticket_number: TicketNumber,
    pub license_plate: String,
    pub vehicle_type: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub amount_paid_cents: Option<i64>,
    #[sqlx(try_from = "String")]
    pub status: TicketStatus,
    pub payment_method: Option<String>,
}

impl Ticket {
    pub fn is_active(&self) -> bool {
        self.status == TicketStatus::Active
    }

    pub fn amount_paid(&self) -> Option<Money> {
        self.amount_paid_cents.map(Money::from_cents)
    }
}

#[derive(Debug, Clone)]
pub struct NewTicket {
    pub ticket_number: TicketNumber,
    pub license_plate: String,
    pub vehicle_type: String,
    pub entry_time: DateTime<Utc>,
}

/// Fields written together when a ticket transitions to completed.
#[derive(Debug, Clone)]
pub struct TicketExit {
    pub exit_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub amount_paid: Money,
    pub payment_method: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    #[serde(default)]
    pub license_plate: String,
    #[serde(default)]
    pub vehicle_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitTicketRequest {
    #[serde(default)]
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: Uuid,
    pub ticket_number: TicketNumber,
    pub license_plate: String,
    pub vehicle_type: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    /// Major currency units.
    pub amount_paid: Option<f64>,
    pub amount_paid_cents: Option<i64>,
    pub status: TicketStatus,
    pub payment_method: Option<String>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            amount_paid: ticket.amount_paid().map(|m| m.major_units()),
            id: ticket.id,
            ticket_number: ticket.ticket_number,
            license_plate: ticket.license_plate,
            vehicle_type: ticket.vehicle_type,
            entry_time: ticket.entry_time,
            exit_time: ticket.exit_time,
            duration_minutes: ticket.duration_minutes,
            amount_paid_cents: ticket.amount_paid_cents,
            status: ticket.status,
            payment_method: ticket.payment_method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_well_formed_numbers() {
        assert_eq!(TicketNumber::parse("PS-1000").unwrap().as_str(), "PS-1000");
        assert_eq!(TicketNumber::parse("PS-9999").unwrap().as_str(), "PS-9999");
    }

    #[test]
    fn test_parse_rejects_malformed_numbers() {
        for raw in ["", "PS-", "PS-999", "PS-0999", "PS-10000", "XX-1234", "ps-1234", "PS-12a4", "PS-+123"] {
            assert!(TicketNumber::parse(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_random_numbers_stay_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let number = TicketNumber::random(&mut rng);
            assert!(TicketNumber::parse(number.as_str()).is_ok(), "{number}");
        }
    }

    #[test]
    fn test_from_suffix_bounds() {
        assert!(TicketNumber::from_suffix(999).is_err());
        assert!(TicketNumber::from_suffix(10_000).is_err());
        assert_eq!(TicketNumber::from_suffix(4242).unwrap().to_string(), "PS-4242");
    }

    #[test]
    fn test_status_from_database_text() {
        assert_eq!(TicketStatus::try_from("active".to_string()), Ok(TicketStatus::Active));
        assert_eq!(TicketStatus::try_from("completed".to_string()), Ok(TicketStatus::Completed));
        assert!(TicketStatus::try_from("cancelled".to_string()).is_err());
    }

    #[test]
    fn test_response_uses_camel_case_and_major_units() {
        let ticket = Ticket {
            id: Uuid::new_v4(),
            ticket_number: TicketNumber::from_suffix(1234).unwrap(),
            license_plate: "TEST123".to_string(),
            vehicle_type: "Car".to_string(),
            entry_time: Utc::now(),
            exit_time: Some(Utc::now()),
            duration_minutes: Some(61),
            amount_paid_cents: Some(2000),
            status: TicketStatus::Completed,
            payment_method: Some("Credit Card".to_string()),
        };

        let json = serde_json::to_value(TicketResponse::from(ticket)).unwrap();
        assert_eq!(json["ticketNumber"], "PS-1234");
        assert_eq!(json["licensePlate"], "TEST123");
        assert_eq!(json["amountPaid"], 20.0);
        assert_eq!(json["amountPaidCents"], 2000);
        assert_eq!(json["status"], "completed");
        assert_eq!(json["paymentMethod"], "Credit Card");
    }
}
