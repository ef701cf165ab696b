//! Offline tests for storefinder-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use storefinder_core::{AppConfig, DateBucket, Environment, RoadshowWindow};
use storefinder_db::{InventoryScope, PoolConfig, RoadshowWindowRow, StoreLocationRow};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        google_api_key: None,
        geocoder_timeout_secs: 10,
        include_filters: true,
        always_load_all_stores: false,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn roadshow_row_converts_to_window() {
    let row = RoadshowWindowRow {
        start_date: NaiveDate::from_ymd_opt(2023, 10, 28).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2023, 11, 5).unwrap(),
    };
    let window: RoadshowWindow = row.into();

    assert!(window.touches_month(DateBucket { year: 2023, month: 10 }));
    assert!(window.touches_month(DateBucket { year: 2023, month: 11 }));
    assert!(!window.touches_month(DateBucket { year: 2023, month: 12 }));
}

#[test]
fn online_row_without_dates_is_not_a_roadshow() {
    let row = StoreLocationRow {
        id: 3,
        name: "Trailhead Online".to_string(),
        address_line1: None,
        address_line2: None,
        city: None,
        state: None,
        zip: None,
        country: "US".to_string(),
        phone: None,
        website: Some("https://trailhead.example".to_string()),
        latitude: Decimal::ZERO,
        longitude: Decimal::ZERO,
        is_online: true,
        is_active: true,
        locality_id: None,
        category_ids: vec![],
        start_date: None,
        end_date: None,
    };

    assert!(row.roadshow_window().is_none());
    let point = row.point().expect("zero converts");
    assert!(point.lat.abs() < f64::EPSILON);
}

#[test]
fn inventory_scope_compares_by_value() {
    assert_eq!(InventoryScope::Item(4), InventoryScope::Item(4));
    assert_ne!(InventoryScope::Item(4), InventoryScope::Variation(4));
    assert_eq!(
        InventoryScope::Variations(vec![1, 2]),
        InventoryScope::Variations(vec![1, 2])
    );
}
