use serde::Serialize;
use sqlx::FromRow;

use crate::models::money::Money;

pub const DEFAULT_TOTAL_SPACES: i32 = 140;
pub const DEFAULT_HOURLY_RATE_CENTS: i64 = 1000;

/// The garage-wide singleton: capacity and price per billed hour.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct GarageSetting {
    pub id: i32,
    pub total_spaces: i32,
    pub hourly_rate_cents: i64,
}

impl GarageSetting {
    pub fn hourly_rate(&self) -> Money {
        Money::from_cents(self.hourly_rate_cents)
    }
}

/// Values used to create the settings row on first boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GarageDefaults {
    pub total_spaces: i32,
    pub hourly_rate_cents: i64,
}

impl Default for GarageDefaults {
    fn default() -> Self {
        Self {
            total_spaces: DEFAULT_TOTAL_SPACES,
            hourly_rate_cents: DEFAULT_HOURLY_RATE_CENTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GarageStats {
    pub total_spaces: i64,
    pub occupied_spaces: i64,
    /// Negative when more tickets are active than there are spaces.
    pub available_spaces: i64,
    pub occupied_percentage: i64,
    pub available_percentage: i64,
    pub hourly_rate: Money,
    pub todays_revenue: Money,
    pub vehicles_processed_today: i64,
    pub average_stay_hours: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GarageStatsResponse {
    pub total_spaces: i64,
    pub occupied_spaces: i64,
    pub available_spaces: i64,
    pub occupied_spaces_percentage: i64,
    pub available_spaces_percentage: i64,
    pub hourly_rate: f64,
    pub todays_revenue: f64,
    pub vehicles_processed_today: i64,
    pub average_stay_time: f64,
}

impl From<GarageStats> for GarageStatsResponse {
    fn from(stats: GarageStats) -> Self {
        Self {
            total_spaces: stats.total_spaces,
            occupied_spaces: stats.occupied_spaces,
            available_spaces: stats.available_spaces,
            occupied_spaces_percentage: stats.occupied_percentage,
            available_spaces_percentage: stats.available_percentage,
            hourly_rate: stats.hourly_rate.major_units(),
            todays_revenue: stats.todays_revenue.major_units(),
            vehicles_processed_today: stats.vehicles_processed_today,
            average_stay_time: stats.average_stay_hours,
        }
    }
}
