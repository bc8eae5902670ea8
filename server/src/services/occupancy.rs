use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, Offset, Utc};

use crate::models::{ActivitySummary, GarageStats};
use crate::services::clock::Clock;
use crate::storage::{TicketFilter, TicketStore};
use crate::utils::error::AppError;

pub const DEFAULT_ACTIVITY_LIMIT: u32 = 10;
pub const MAX_ACTIVITY_LIMIT: u32 = 100;

/// Garage-wide occupancy and revenue figures.
#[derive(Clone)]
pub struct OccupancyService {
    store: Arc<dyn TicketStore>,
    clock: Arc<dyn Clock>,
}

impl OccupancyService {
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn get_stats(&self) -> Result<GarageStats, AppError> {
        let settings = self
            .store
            .garage_settings()
            .await?
            .ok_or_else(|| AppError::InternalServerError("garage settings not found".to_string()))?;

        let occupied_spaces = self.store.count_tickets(&TicketFilter::active()).await?;

        let today = TicketFilter::completed_since(start_of_local_day(self.clock.now()));
        let todays_revenue = self.store.sum_amount_paid(&today).await?;
        let vehicles_processed_today = self.store.count_tickets(&today).await?;

        let avg_minutes = self
            .store
            .avg_duration_minutes(&TicketFilter::completed())
            .await?;

        let total_spaces = i64::from(settings.total_spaces);
        let occupied_percentage = occupied_percentage(occupied_spaces, total_spaces);

        Ok(GarageStats {
            total_spaces,
            occupied_spaces,
            available_spaces: total_spaces - occupied_spaces,
            occupied_percentage,
            available_percentage: 100 - occupied_percentage,
            hourly_rate: settings.hourly_rate(),
            todays_revenue,
            vehicles_processed_today,
            average_stay_hours: average_stay_hours(avg_minutes),
        })
    }

    /// Most recent entries first, at most `limit` (capped at
    /// `MAX_ACTIVITY_LIMIT`).
    pub async fn list_recent_activity(&self, limit: u32) -> Result<Vec<ActivitySummary>, AppError> {
        let tickets = self
            .store
            .list_recent_tickets(limit.min(MAX_ACTIVITY_LIMIT))
            .await?;
        Ok(tickets.into_iter().map(ActivitySummary::from).collect())
    }
}

/// Floor of `occupied / total * 100`. A garage without capacity is reported
/// as full once anything occupies it.
pub fn occupied_percentage(occupied: i64, total: i64) -> i64 {
    let occupied = occupied.max(0);
    if total <= 0 {
        return if occupied > 0 { 100 } else { 0 };
    }
    occupied.saturating_mul(100) / total
}

/// Average stay in hours, one decimal place.
pub fn average_stay_hours(avg_minutes: Option<f64>) -> f64 {
    match avg_minutes {
        Some(minutes) if minutes > 0.0 => (minutes / 6.0).round() / 10.0,
        _ => 0.0,
    }
}

/// Midnight of the local calendar day containing `now`, as a UTC instant.
pub fn start_of_local_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let local = now.with_timezone(&Local);
    let midnight = local.date_naive().and_time(NaiveTime::MIN);
    match midnight.and_local_timezone(Local).earliest() {
        Some(start) => start.with_timezone(&Utc),
        // Midnight skipped by a DST change; fall back to the current offset.
        None => (midnight - local.offset().fix()).and_utc(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GarageDefaults, GarageSetting, Money, TicketStatus};
    use crate::services::clock::FixedClock;
    use crate::services::tickets::TicketService;
    use crate::storage::InMemoryTicketStore;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    struct Fixture {
        clock: Arc<FixedClock>,
        tickets: TicketService,
        occupancy: OccupancyService,
    }

    fn fixture_with(store: InMemoryTicketStore) -> Fixture {
        let store: Arc<dyn TicketStore> = Arc::new(store);
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()));
        Fixture {
            tickets: TicketService::new(store.clone(), clock.clone()),
            occupancy: OccupancyService::new(store, clock.clone()),
            clock,
        }
    }

    async fn fixture() -> Fixture {
        let store = InMemoryTicketStore::new();
        store.ensure_garage_settings(&GarageDefaults::default()).await.unwrap();
        fixture_with(store)
    }

    #[tokio::test]
    async fn test_empty_garage_stats() {
        let fx = fixture().await;
        let stats = fx.occupancy.get_stats().await.unwrap();

        assert_eq!(stats.total_spaces, 140);
        assert_eq!(stats.occupied_spaces, 0);
        assert_eq!(stats.available_spaces, 140);
        assert_eq!(stats.occupied_percentage, 0);
        assert_eq!(stats.available_percentage, 100);
        assert_eq!(stats.hourly_rate, Money::from_cents(1000));
        assert_eq!(stats.todays_revenue, Money::ZERO);
        assert_eq!(stats.vehicles_processed_today, 0);
        assert_eq!(stats.average_stay_hours, 0.0);
    }

    #[tokio::test]
    async fn test_missing_settings_is_internal_error() {
        let fx = fixture_with(InMemoryTicketStore::new());
        let err = fx.occupancy.get_stats().await.unwrap_err();
        assert!(matches!(err, AppError::InternalServerError(_)));
    }

    #[tokio::test]
    async fn test_overbooked_garage_goes_negative() {
        let fx = fixture_with(InMemoryTicketStore::with_settings(GarageSetting {
            id: 1,
            total_spaces: 2,
            hourly_rate_cents: 500,
        }));
        for plate in ["A1", "B2", "C3"] {
            fx.tickets.enter(plate, "Car").await.unwrap();
        }

        let stats = fx.occupancy.get_stats().await.unwrap();
        assert_eq!(stats.occupied_spaces, 3);
        assert_eq!(stats.available_spaces, -1);
        assert_eq!(stats.occupied_percentage, 150);
        assert_eq!(stats.available_percentage, -50);
    }

    #[tokio::test]
    async fn test_percentages_round_occupied_down() {
        let fx = fixture_with(InMemoryTicketStore::with_settings(GarageSetting {
            id: 1,
            total_spaces: 3,
            hourly_rate_cents: 1000,
        }));
        fx.tickets.enter("ONE", "Car").await.unwrap();

        let stats = fx.occupancy.get_stats().await.unwrap();
        assert_eq!(stats.occupied_percentage, 33);
        assert_eq!(stats.available_percentage, 67);
    }

    #[tokio::test]
    async fn test_todays_figures_exclude_exits_before_local_midnight() {
        let fx = fixture().await;
        let day_start = start_of_local_day(fx.clock.now());

        // Completed yesterday: counted in the average only.
        fx.clock.set(day_start - Duration::hours(3));
        let old = fx.tickets.enter("OLD1", "Car").await.unwrap();
        fx.clock.set(day_start - Duration::minutes(1));
        fx.tickets.exit(old.ticket_number.as_str(), "Cash").await.unwrap();

        // Entered yesterday, exits today: counts toward today.
        fx.clock.set(day_start - Duration::minutes(30));
        let overnight = fx.tickets.enter("NIGHT1", "Van").await.unwrap();
        fx.clock.set(day_start + Duration::minutes(30));
        fx.tickets.exit(overnight.ticket_number.as_str(), "Card").await.unwrap();

        fx.clock.set(day_start + Duration::hours(2));
        fx.tickets.enter("STILL1", "Car").await.unwrap();

        let stats = fx.occupancy.get_stats().await.unwrap();
        assert_eq!(stats.occupied_spaces, 1);
        assert_eq!(stats.vehicles_processed_today, 1);
        // 60 minutes -> 1 billed hour.
        assert_eq!(stats.todays_revenue, Money::from_cents(1000));
        // (179 + 60) / 2 = 119.5 minutes -> 2.0 hours
        assert_eq!(stats.average_stay_hours, 2.0);
    }

    #[tokio::test]
    async fn test_recent_activity_is_limited_and_ordered() {
        let fx = fixture().await;
        for i in 0..8 {
            fx.tickets.enter(&format!("CAR{i}"), "Car").await.unwrap();
            fx.clock.advance(Duration::minutes(7));
        }

        let recent = fx.occupancy.list_recent_activity(5).await.unwrap();
        assert_eq!(recent.len(), 5);
        assert!(recent.windows(2).all(|w| w[0].entry_time >= w[1].entry_time));
        assert_eq!(recent[0].license_plate, "CAR7");
        assert!(recent.iter().all(|a| a.status == TicketStatus::Active && a.amount.is_none()));
    }

    #[tokio::test]
    async fn test_recent_activity_limit_bounds() {
        let fx = fixture().await;
        for i in 0..(MAX_ACTIVITY_LIMIT + 5) {
            fx.tickets.enter(&format!("BULK{i}"), "Car").await.unwrap();
            fx.clock.advance(Duration::seconds(30));
        }

        assert!(fx.occupancy.list_recent_activity(0).await.unwrap().is_empty());

        let capped = fx.occupancy.list_recent_activity(500).await.unwrap();
        assert_eq!(capped.len(), MAX_ACTIVITY_LIMIT as usize);
        assert_eq!(capped[0].license_plate, format!("BULK{}", MAX_ACTIVITY_LIMIT + 4));
    }

    #[tokio::test]
    async fn test_recent_activity_reports_paid_amounts() {
        let fx = fixture().await;
        let ticket = fx.tickets.enter("PAID1", "Car").await.unwrap();
        fx.clock.advance(Duration::minutes(125));
        fx.tickets.exit(ticket.ticket_number.as_str(), "Cash").await.unwrap();

        let recent = fx.occupancy.list_recent_activity(DEFAULT_ACTIVITY_LIMIT).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].status, TicketStatus::Completed);
        assert_eq!(recent[0].duration_minutes, Some(125));
        assert_eq!(recent[0].amount, Some(Money::from_cents(3000)));
    }

    #[test]
    fn test_average_stay_rounding() {
        assert_eq!(average_stay_hours(None), 0.0);
        assert_eq!(average_stay_hours(Some(90.0)), 1.5);
        assert_eq!(average_stay_hours(Some(100.0)), 1.7);
        assert_eq!(average_stay_hours(Some(2.0)), 0.0);
    }

    #[test]
    fn test_zero_capacity_percentage() {
        assert_eq!(occupied_percentage(0, 0), 0);
        assert_eq!(occupied_percentage(4, 0), 100);
    }

    #[test]
    fn test_start_of_local_day_is_not_after_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 15, 45, 0).unwrap();
        let start = start_of_local_day(now);
        assert!(start <= now);
        assert!(now - start < Duration::hours(25));
    }

    proptest! {
        #[test]
        fn prop_percentages_sum_to_100(total in 1i64..10_000, occupied in 0i64..20_000) {
            let occupied_pct = occupied_percentage(occupied, total);
            prop_assert_eq!(occupied_pct + (100 - occupied_pct), 100);
            prop_assert!(occupied_pct * total <= occupied * 100);
            prop_assert!((occupied_pct + 1) * total > occupied * 100);
        }
    }
}
