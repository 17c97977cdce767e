use chrono::{NaiveDate, NaiveDateTime};
use ecotrack_core::db::{open_db, open_db_in_memory};
use ecotrack_core::{
    journey_event, CarbonEventInput, CarbonEventListQuery, Category, FootprintRepository,
    FootprintService, FootprintServiceError, PeriodWindow, RepoError, SqliteFootprintRepository,
    TransportMode,
};
use std::thread;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

fn at(d: u32, hour: u32) -> NaiveDateTime {
    day(d).and_hms_opt(hour, 15, 0).unwrap()
}

#[test]
fn first_event_creates_the_day_and_later_events_accumulate() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = FootprintService::new(SqliteFootprintRepository::new(&mut conn));

    let first = service
        .record_event(&CarbonEventInput::new("alice", at(3, 8), "food", 2.5))
        .unwrap();
    assert_eq!(first.day, day(3));
    assert_eq!(first.by_category.food, 2.5);
    assert_eq!(first.total, 2.5);

    let second = service
        .record_event(&CarbonEventInput::new("alice", at(3, 21), "transport", 4.0))
        .unwrap();
    assert_eq!(second.by_category.food, 2.5);
    assert_eq!(second.by_category.transport, 4.0);
    assert_eq!(second.total, 6.5);

    let third = service
        .record_event(&CarbonEventInput::new("alice", at(3, 22), "FOOD", 0.5))
        .unwrap();
    assert_eq!(third.by_category.food, 3.0);
    assert_eq!(third.total, 7.0);
}

#[test]
fn total_always_equals_category_sum() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = FootprintService::new(SqliteFootprintRepository::new(&mut conn));

    let impacts = [0.1, 2.7, 3.3, 0.0, 11.05, 7.2, 0.35, 19.9, 1.25, 4.4];
    for (index, impact) in impacts.iter().enumerate() {
        let category = Category::ALL[index % Category::ALL.len()];
        let footprint = service
            .record_event(&CarbonEventInput::new(
                "bob",
                at(10, 9),
                category.as_str(),
                *impact,
            ))
            .unwrap();
        assert_eq!(footprint.total, footprint.by_category.sum());
    }
}

#[test]
fn users_and_days_get_separate_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = FootprintService::new(SqliteFootprintRepository::new(&mut conn));

    service
        .record_event(&CarbonEventInput::new("alice", at(1, 9), "energy", 1.0))
        .unwrap();
    service
        .record_event(&CarbonEventInput::new("alice", at(2, 9), "energy", 2.0))
        .unwrap();
    let bob = service
        .record_event(&CarbonEventInput::new("bob", at(1, 9), "energy", 5.0))
        .unwrap();
    assert_eq!(bob.total, 5.0);

    let window = PeriodWindow::new(day(1), day(30)).unwrap();
    let alice_series = service.chart_series("alice", window).unwrap();
    assert_eq!(alice_series.len(), 2);
    assert_eq!(alice_series[0].total, 1.0);
    assert_eq!(alice_series[1].total, 2.0);
}

#[test]
fn invalid_category_is_rejected_without_state_change() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = FootprintService::new(SqliteFootprintRepository::new(&mut conn));

    let err = service
        .record_event(&CarbonEventInput::new("alice", at(5, 9), "invalid", 3.0))
        .unwrap_err();
    assert!(matches!(err, FootprintServiceError::InvalidCategory(ref value) if value == "invalid"));

    let window = PeriodWindow::new(day(1), day(30)).unwrap();
    assert!(service.chart_series("alice", window).unwrap().is_empty());
    let page = service
        .list_events(&CarbonEventListQuery::for_user("alice"))
        .unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn negative_impact_is_rejected_without_state_change() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = FootprintService::new(SqliteFootprintRepository::new(&mut conn));

    service
        .record_event(&CarbonEventInput::new("alice", at(5, 9), "food", 3.0))
        .unwrap();
    let err = service
        .record_event(&CarbonEventInput::new("alice", at(5, 10), "food", -1.0))
        .unwrap_err();
    assert!(matches!(err, FootprintServiceError::InvalidImpact(value) if value == -1.0));

    let window = PeriodWindow::new(day(5), day(5)).unwrap();
    let series = service.chart_series("alice", window).unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].total, 3.0);
    let page = service
        .list_events(&CarbonEventListQuery::for_user("alice"))
        .unwrap();
    assert_eq!(page.total, 1);
}

#[test]
fn blank_user_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = FootprintService::new(SqliteFootprintRepository::new(&mut conn));

    let err = service
        .record_event(&CarbonEventInput::new("   ", at(5, 9), "food", 1.0))
        .unwrap_err();
    assert!(matches!(err, FootprintServiceError::MissingUserId));
}

#[test]
fn overflowing_daily_total_is_rolled_back() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = FootprintService::new(SqliteFootprintRepository::new(&mut conn));

    service
        .record_event(&CarbonEventInput::new("alice", at(1, 9), "food", f64::MAX))
        .unwrap();
    let err = service
        .record_event(&CarbonEventInput::new("alice", at(1, 10), "food", f64::MAX))
        .unwrap_err();
    assert!(matches!(
        err,
        FootprintServiceError::Repo(RepoError::InvalidData(_))
    ));

    let window = PeriodWindow::new(day(1), day(1)).unwrap();
    let series = service.chart_series("alice", window).unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].total, f64::MAX);
    let page = service
        .list_events(&CarbonEventListQuery::for_user("alice"))
        .unwrap();
    assert_eq!(page.total, 1);

    service
        .record_event(&CarbonEventInput::new("alice", at(2, 9), "food", 1.0))
        .unwrap();
    let summary = service
        .summarize(
            "alice",
            PeriodWindow::new(day(2), day(2)).unwrap(),
            window,
        )
        .unwrap();
    assert!(summary.change_percentage.is_finite());
    assert!(summary.change_percentage >= 0.0);
}

#[test]
fn non_finite_amount_is_rejected_without_state_change() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = FootprintService::new(SqliteFootprintRepository::new(&mut conn));

    let err = service
        .record_event(&CarbonEventInput::new("alice", at(4, 9), "shopping", 2.0).with_amount(f64::NAN))
        .unwrap_err();
    assert!(matches!(err, FootprintServiceError::InvalidAmount(value) if value.is_nan()));

    let page = service
        .list_events(&CarbonEventListQuery::for_user("alice"))
        .unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn repository_increment_rejects_negative_delta() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteFootprintRepository::new(&mut conn);

    let err = repo
        .upsert_footprint_increment("alice", day(1), Category::Food, -0.5)
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo
        .find_footprints_by_user_and_range("alice", day(1), day(1))
        .unwrap()
        .is_empty());

    let created = repo
        .upsert_footprint_increment("alice", day(1), Category::Shopping, 1.5)
        .unwrap();
    let updated = repo
        .upsert_footprint_increment("alice", day(1), Category::Shopping, 2.0)
        .unwrap();
    assert_eq!(created.total, 1.5);
    assert_eq!(updated.by_category.shopping, 3.5);
    assert_eq!(updated.total, 3.5);
}

#[test]
fn failed_write_leaves_no_partial_rollup() {
    let mut conn = open_db_in_memory().unwrap();
    // Break the rollup table so the increment fails after the event insert.
    conn.execute_batch("DROP TABLE daily_footprints;").unwrap();

    let mut service = FootprintService::new(SqliteFootprintRepository::new(&mut conn));
    let err = service
        .record_event(&CarbonEventInput::new("alice", at(5, 9), "food", 1.0))
        .unwrap_err();
    assert!(matches!(err, FootprintServiceError::Repo(RepoError::Db(_))));
    drop(service);

    let events: i64 = conn
        .query_row("SELECT COUNT(*) FROM carbon_events;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(events, 0, "event insert must roll back with the failed increment");
}

#[test]
fn journeys_are_recorded_as_transport() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = FootprintService::new(SqliteFootprintRepository::new(&mut conn));

    let footprint = service
        .record_event(&journey_event(
            "alice",
            at(7, 8),
            TransportMode::Car,
            100.0,
            "Home",
            "Coast",
        ))
        .unwrap();
    assert!((footprint.by_category.transport - 21.0).abs() < 1e-9);

    let page = service
        .list_events(&CarbonEventListQuery::for_user("alice"))
        .unwrap();
    assert_eq!(page.items[0].subcategory.as_deref(), Some("car"));
}

#[test]
fn concurrent_events_for_same_day_are_not_lost() {
    const WRITERS: usize = 8;
    const EVENTS_PER_WRITER: usize = 25;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("concurrent.db");
    drop(open_db(&path).unwrap());

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let path = path.clone();
            thread::spawn(move || {
                let mut conn = open_db(&path).unwrap();
                let mut service = FootprintService::new(SqliteFootprintRepository::new(&mut conn));
                let category = Category::ALL[writer % Category::ALL.len()];
                for _ in 0..EVENTS_PER_WRITER {
                    service
                        .record_event(&CarbonEventInput::new(
                            "shared-user",
                            at(12, 12),
                            category.as_str(),
                            1.0,
                        ))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let mut conn = open_db(&path).unwrap();
    let repo = SqliteFootprintRepository::new(&mut conn);
    let rows = repo
        .find_footprints_by_user_and_range("shared-user", day(12), day(12))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total, (WRITERS * EVENTS_PER_WRITER) as f64);
    assert_eq!(rows[0].total, rows[0].by_category.sum());
    assert_eq!(
        repo.count_events(&CarbonEventListQuery::for_user("shared-user"))
            .unwrap(),
        (WRITERS * EVENTS_PER_WRITER) as u64
    );
}
