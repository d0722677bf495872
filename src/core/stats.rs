//! Monthly statistics over persisted cargos

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::core::error::AppResult;
use crate::storage::db::{self, Cargo};

/// Message when the window is empty.
pub const NO_DATA_MSG: &str = "Нет данных за этот период";
/// Message when /open-month and /close-month were not both issued yet.
pub const NO_WINDOW_MSG: &str = "Период не задан. Используйте /open-month и /close-month";

/// Aggregates over one reporting window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTotals {
    pub count: usize,
    pub total_cost: f64,
    pub total_miles_empty: f64,
    pub total_miles_loaded: f64,
}

impl MonthlyTotals {
    pub fn total_miles(&self) -> f64 {
        self.total_miles_empty + self.total_miles_loaded
    }

    /// Average pay per mile; 0 when no miles were driven.
    pub fn rate_per_mile(&self) -> f64 {
        let miles = self.total_miles();
        if miles == 0.0 {
            0.0
        } else {
            self.total_cost / miles
        }
    }
}

/// Sums up a set of cargos. The caller filters by window first.
pub fn aggregate<'a>(cargos: impl IntoIterator<Item = &'a Cargo>) -> MonthlyTotals {
    let mut totals = MonthlyTotals {
        count: 0,
        total_cost: 0.0,
        total_miles_empty: 0.0,
        total_miles_loaded: 0.0,
    };
    for cargo in cargos {
        totals.count += 1;
        totals.total_cost += cargo.cost;
        totals.total_miles_empty += cargo.miles_empty;
        totals.total_miles_loaded += cargo.miles_loaded;
    }
    totals
}

/// Renders the monthly report for `[start, end]` inclusive.
///
/// Returns [`NO_DATA_MSG`] without doing any arithmetic when no cargo falls
/// into the window.
pub fn monthly_report(conn: &Connection, start: NaiveDate, end: NaiveDate) -> AppResult<String> {
    let cargos = db::get_all_cargos(conn)?; // ordered by created_at ascending
    let in_window: Vec<&Cargo> = cargos
        .iter()
        .filter(|c| {
            let day = c.created_at.date_naive();
            start <= day && day <= end
        })
        .collect();

    if in_window.is_empty() {
        return Ok(NO_DATA_MSG.to_string());
    }

    let totals = aggregate(in_window.iter().copied());

    let mut report = format!(
        "📊 Статистика за период {} — {}\n\n\
         Грузов: {}\n\
         Оплата всего: {}\n\
         Мили пустым: {}\n\
         Мили с грузом: {}\n\
         Мили всего: {}\n\
         Ставка за милю: {:.2}\n",
        start,
        end,
        totals.count,
        totals.total_cost,
        totals.total_miles_empty,
        totals.total_miles_loaded,
        totals.total_miles(),
        totals.rate_per_mile(),
    );

    report.push('\n');
    for cargo in &in_window {
        report.push_str(&format!(
            "{} | {} | {} | {} mi\n",
            cargo.number,
            cargo.created_at.date_naive(),
            cargo.cost,
            cargo.total_miles(),
        ));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn cargo(number: &str, day: NaiveDate, cost: f64, empty: f64, loaded: f64) -> Cargo {
        Cargo {
            id: Uuid::new_v4(),
            number: number.to_string(),
            dispatcher_id: Uuid::new_v4(),
            driver_id: Uuid::new_v4(),
            mc_id: Uuid::new_v4(),
            miles_empty: empty,
            miles_loaded: loaded,
            cost,
            route: "TX → CA".to_string(),
            created_at: Utc
                .from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap()),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded_conn(cargos: &[Cargo]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::migrate_schema(&conn).unwrap();
        for cargo in cargos {
            db::add_cargo(&conn, cargo).unwrap();
        }
        conn
    }

    #[test]
    fn test_aggregate_example_from_operations() {
        // Two cargos: $500 with 50+150 miles, $700 with 0+100 miles
        let cargos = vec![
            cargo("A-1", date(2026, 8, 1), 500.0, 50.0, 150.0),
            cargo("A-2", date(2026, 8, 2), 700.0, 0.0, 100.0),
        ];
        let totals = aggregate(&cargos);
        assert_eq!(totals.count, 2);
        assert_eq!(totals.total_cost, 1200.0);
        assert_eq!(totals.total_miles_empty, 50.0);
        assert_eq!(totals.total_miles_loaded, 250.0);
        assert_eq!(totals.total_miles(), 300.0);
        assert_eq!(totals.rate_per_mile(), 4.0);
    }

    #[test]
    fn test_rate_per_mile_guards_zero_miles() {
        let cargos = vec![cargo("A-1", date(2026, 8, 1), 500.0, 0.0, 0.0)];
        let totals = aggregate(&cargos);
        assert_eq!(totals.rate_per_mile(), 0.0);
    }

    #[test]
    fn test_empty_window_reports_no_data() {
        let conn = seeded_conn(&[cargo("A-1", date(2026, 6, 1), 500.0, 50.0, 150.0)]);
        let report = monthly_report(&conn, date(2026, 7, 1), date(2026, 8, 1)).unwrap();
        assert_eq!(report, NO_DATA_MSG);
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let conn = seeded_conn(&[
            cargo("A-1", date(2026, 7, 1), 500.0, 50.0, 150.0),
            cargo("A-2", date(2026, 8, 1), 700.0, 0.0, 100.0),
            cargo("A-3", date(2026, 8, 2), 100.0, 1.0, 1.0),
        ]);
        let report = monthly_report(&conn, date(2026, 7, 1), date(2026, 8, 1)).unwrap();
        assert!(report.contains("Грузов: 2"), "{report}");
        assert!(report.contains("A-1"), "{report}");
        assert!(report.contains("A-2"), "{report}");
        assert!(!report.contains("A-3"), "{report}");
    }

    #[test]
    fn test_report_lists_cargos_in_creation_order() {
        let conn = seeded_conn(&[
            cargo("B-2", date(2026, 8, 5), 700.0, 0.0, 100.0),
            cargo("B-1", date(2026, 8, 1), 500.0, 50.0, 150.0),
        ]);
        let report = monthly_report(&conn, date(2026, 8, 1), date(2026, 8, 31)).unwrap();
        let first = report.find("B-1").unwrap();
        let second = report.find("B-2").unwrap();
        assert!(first < second, "{report}");
        assert!(report.contains("Ставка за милю: 4.00"), "{report}");
    }
}
