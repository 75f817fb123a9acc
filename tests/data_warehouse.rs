use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use experiment_mock::mock::mock_data_warehouse_experiment;
use experiment_mock::testing::{InMemoryPaymentStore, RecordingSink};
use mock_args::CommonMockArgs;
use payments_store::PaymentStore;
use rust_decimal::Decimal;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 1, 9, 30, 0).unwrap()
}

fn args(send_initial_events: bool, seed: u64) -> CommonMockArgs {
    CommonMockArgs {
        start_date: None,
        send_initial_events,
        seed: Some(seed),
    }
}

#[tokio::test]
async fn test_initial_inserts_one_payment_and_no_events() {
    let mut sink = RecordingSink::with_flag_response("test");
    let mut store = InMemoryPaymentStore::new();

    let summary =
        mock_data_warehouse_experiment(&mut sink, &mut store, "my-flag", &args(true, 1), now())
            .await
            .unwrap();

    assert!(sink.events.is_empty());
    assert_eq!(sink.flag_calls.len(), 1);
    assert_eq!(sink.flag_calls[0].0, "my-flag");

    assert!(store.table_exists);
    assert_eq!(store.rows.len(), 1);
    let row = &store.rows[0];
    assert_eq!(row.distinct_id, sink.flag_calls[0].1);
    assert!(row.amount >= Decimal::new(5, 0) && row.amount < Decimal::new(10, 0));
    assert_eq!(row.timestamp, now() - TimeDelta::hours(24));

    assert_eq!(summary.payments, 1);
    assert_eq!(summary.test_users, 1);
    assert!(store.closed);
    assert_eq!(sink.shutdowns, 1);
}

#[tokio::test]
async fn test_population_evaluates_flag_per_user() {
    let mut sink = RecordingSink::with_flag_response("test");
    let mut store = InMemoryPaymentStore::new();

    let summary =
        mock_data_warehouse_experiment(&mut sink, &mut store, "my-flag", &args(false, 3), now())
            .await
            .unwrap();

    assert_eq!(summary.users, 25);
    assert_eq!(sink.flag_calls.len(), 25);
    assert_eq!(summary.test_users, 25);

    let pageviews = sink.events_named("$pageview");
    assert_eq!(pageviews.len(), 25);
    assert_eq!(sink.events.len(), 25);
    for event in &pageviews {
        assert_eq!(event.properties["$feature/my-flag"], "test");
        assert_eq!(event.properties["$current_url"], "/pricing");
        assert!(event.timestamp >= now() - TimeDelta::days(10));
    }

    assert_eq!(summary.payments, store.rows.len());
    assert_eq!(sink.shutdowns, 1);
    assert_eq!(sink.captured_after_shutdown, 0);
    for row in &store.rows {
        let viewed = pageviews
            .iter()
            .find(|e| e.distinct_id == row.distinct_id)
            .expect("payment without a page view");
        // Stored DATETIME drops sub-second precision.
        assert!(row.timestamp >= viewed.timestamp - TimeDelta::seconds(1));
        assert!(row.timestamp <= now());
        assert!(row.amount >= Decimal::new(2, 0) && row.amount < Decimal::new(20, 0));
    }
}

#[tokio::test]
async fn test_failed_flag_evaluation_falls_back_to_control() {
    let mut sink = RecordingSink {
        fail_flag_calls: true,
        ..RecordingSink::default()
    };
    let mut store = InMemoryPaymentStore::new();

    let summary =
        mock_data_warehouse_experiment(&mut sink, &mut store, "my-flag", &args(false, 5), now())
            .await
            .unwrap();

    assert_eq!(summary.control_users, 25);
    assert_eq!(sink.flag_calls.len(), 25);
}

#[tokio::test]
async fn test_table_creation_failure_aborts_before_events() {
    let mut sink = RecordingSink::with_flag_response("control");
    let mut store = InMemoryPaymentStore::failing_table_creation();

    let err =
        mock_data_warehouse_experiment(&mut sink, &mut store, "my-flag", &args(false, 1), now())
            .await
            .unwrap_err();

    assert!(format!("{err:#}").contains("Failed to create payments table"));
    assert!(sink.events.is_empty());
    assert!(sink.flag_calls.is_empty());
    assert!(store.rows.is_empty());
    assert!(store.closed);
    assert_eq!(sink.shutdowns, 1);
}

#[tokio::test]
async fn test_running_twice_reuses_table() {
    let mut store = InMemoryPaymentStore::new();

    for seed in [1, 2] {
        let mut sink = RecordingSink::with_flag_response("control");
        // Reopen the same backing rows, like a second CLI invocation.
        store.closed = false;
        mock_data_warehouse_experiment(&mut sink, &mut store, "my-flag", &args(true, seed), now())
            .await
            .unwrap();
    }

    assert_eq!(store.ensure_table_calls, 2);
    assert_eq!(store.rows.len(), 2);
    assert_ne!(store.rows[0].distinct_id, store.rows[1].distinct_id);
    assert_eq!(store.rows[1].id, 2);
}

#[tokio::test]
async fn test_store_closed_after_run() {
    let mut sink = RecordingSink::with_flag_response("control");
    let mut store = InMemoryPaymentStore::new();

    mock_data_warehouse_experiment(&mut sink, &mut store, "my-flag", &args(true, 9), now())
        .await
        .unwrap();

    assert!(store.ensure_table().await.is_err());
}
