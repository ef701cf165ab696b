use std::sync::Arc;

use chrono::NaiveDate;
use storefinder_core::RoadshowWindow;

use super::*;
use crate::geocode::{NOT_FOUND_WARNING, QUOTA_WARNING};
use crate::memory::{location_at, InMemoryStore, Scripted, ScriptedGeocoder, StaticFacets};
use crate::model::StoreLocation;
use crate::resolver::resolve;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn located(
    id: i64,
    name: &str,
    lat: f64,
    lng: f64,
    category_ids: &[i64],
) -> StoreLocation {
    let mut l = location_at(id, name, lat, lng);
    l.category_ids = category_ids.to_vec();
    l
}

fn roadshow(
    id: i64,
    name: &str,
    (lat, lng): (f64, f64),
    locality: i64,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
) -> StoreLocation {
    let mut l = located(id, name, lat, lng, &[10]);
    l.locality_id = Some(locality);
    l.roadshow = Some(RoadshowWindow {
        start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).expect("start"),
        end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).expect("end"),
    });
    l
}

fn fixture_store() -> InMemoryStore {
    let mut online = located(5, "Trailhead Online", 0.0, 0.0, &[1]);
    online.is_online = true;
    let mut closed = located(6, "Closed Aurora", 39.7294, -104.8319, &[1]);
    closed.is_active = false;
    let mut inactive_roadshow = roadshow(
        20,
        "Costco Tukwila",
        (47.4600, -122.2600),
        1,
        (2023, 11, 1),
        (2023, 11, 12),
    );
    inactive_roadshow.is_active = false;
    let mut online_roadshow = roadshow(
        24,
        "Costco Web Event",
        (47.6, -122.3),
        1,
        (2023, 11, 1),
        (2023, 11, 30),
    );
    online_roadshow.is_online = true;

    InMemoryStore::new()
        .with_category(1, None, "retail")
        .with_category(2, Some(1), "grocery")
        .with_category(3, None, "outdoor")
        .with_category(10, None, "costco-roadshow")
        .with_inactive_category(11, None, "retired")
        .with_category(12, None, "gift-shops/east")
        .with_location(located(1, "Cherry Creek", 39.7197, -104.9530, &[2]))
        .with_location(located(2, "Union Station", 39.7527, -105.0001, &[3]))
        .with_location(located(3, "Boulder", 40.0176, -105.2797, &[1]))
        .with_location(located(4, "Colorado Springs", 38.8339, -104.8214, &[3]))
        .with_location(online)
        .with_location(closed)
        .with_location(inactive_roadshow)
        .with_location(roadshow(
            21,
            "Costco Seattle",
            (47.5635, -122.3289),
            1,
            (2023, 10, 28),
            (2023, 11, 5),
        ))
        .with_location(roadshow(
            22,
            "Costco Everett",
            (47.9100, -122.2200),
            1,
            (2023, 10, 15),
            (2023, 12, 15),
        ))
        .with_location(roadshow(
            23,
            "Costco Portland",
            (45.5000, -122.6000),
            2,
            (2023, 11, 3),
            (2023, 11, 19),
        ))
        .with_location(online_roadshow)
        .with_locality(1, "Washington")
        .with_locality(2, "Oregon")
        .with_product(1, "trail-mix")
        .with_variation(10, 1, "salted")
        .with_variation(11, 1, "sweet")
        .with_item(100, 10, "12oz")
        .with_item(101, 11, "24oz")
        .with_stock(1, 100)
        .with_stock(4, 101)
}

fn fixture_geocoder() -> ScriptedGeocoder {
    ScriptedGeocoder::new()
        .found("Denver, CO", 39.7392, -104.9903, "Denver, CO, USA")
        .found("Trinidad, CO", 37.1695, -104.5005, "Trinidad, CO 81082, USA")
        .found("Seattle", 47.6062, -122.3321, "Seattle, WA, USA")
        .answer("overloaded", Scripted::QuotaExceeded)
        .answer("nowhere", Scripted::NotFound)
        .answer("denied", Scripted::Denied)
}

fn fixture_facets() -> StaticFacets {
    StaticFacets::new()
        .with_value("flavor:salted", &[10])
        .with_value("flavor:sweet", &[11])
}

fn locator_with(store: InMemoryStore, settings: LocatorSettings) -> (Locator, Arc<ScriptedGeocoder>) {
    let geocoder = Arc::new(fixture_geocoder());
    let locator = Locator::new(
        Arc::new(store),
        geocoder.clone(),
        Arc::new(fixture_facets()),
        settings,
    );
    (locator, geocoder)
}

fn locator() -> Locator {
    locator_with(fixture_store(), LocatorSettings::default()).0
}

fn raw(pairs: &[(&str, &str)]) -> RawParams {
    let mut raw = RawParams::default();
    for (key, value) in pairs {
        let value = Some((*value).to_string());
        match *key {
            "location" => raw.location = value,
            "radius" => raw.radius = value,
            "date" => raw.date = value,
            "locality" => raw.locality = value,
            "filters" => raw.filters = value,
            other => panic!("unknown param {other}"),
        }
    }
    raw
}

async fn interactive(
    locator: &Locator,
    pairs: &[(&str, &str)],
    segments: &[&str],
) -> InteractivePayload {
    match locator
        .handle(&raw(pairs), PathSlugs::from_segments(segments), true)
        .await
        .expect("search succeeds")
    {
        Outcome::Interactive(payload) => payload,
        other => panic!("expected interactive payload, got {other:?}"),
    }
}

async fn page(locator: &Locator, pairs: &[(&str, &str)], segments: &[&str]) -> PageContext {
    match locator
        .handle(&raw(pairs), PathSlugs::from_segments(segments), false)
        .await
        .expect("search succeeds")
    {
        Outcome::Page(context) => *context,
        other => panic!("expected page context, got {other:?}"),
    }
}

async fn redirect(locator: &Locator, segments: &[&str]) -> String {
    match locator
        .handle(&RawParams::default(), PathSlugs::from_segments(segments), true)
        .await
        .expect("search succeeds")
    {
        Outcome::Redirect(r) => r.location(),
        other => panic!("expected redirect, got {other:?}"),
    }
}

fn ids(payload: &InteractivePayload) -> Vec<i64> {
    payload.stores.iter().map(|s| s.id).collect()
}

// ---------------------------------------------------------------------------
// Radius search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn denver_radius_search_sorts_nearby_active_stores() {
    let payload = interactive(&locator(), &[("location", "Denver, CO")], &[]).await;

    assert!(payload.success);
    assert_eq!(payload.query, "Denver, CO, USA");
    assert_eq!(payload.radius, 25);
    assert!(!payload.closest);
    assert_eq!(ids(&payload), vec![2, 1]);
    assert!((payload.location.lat - 39.7392).abs() < 1e-9);

    let kms: Vec<f64> = payload
        .stores
        .iter()
        .map(|s| s.distance_km.expect("distance"))
        .collect();
    assert!(kms.windows(2).all(|w| w[0] <= w[1]));
    assert!(kms.iter().all(|km| *km <= 25.0));
    for store in &payload.stores {
        let km = store.distance_km.expect("km");
        let miles = store.distance_miles.expect("miles");
        assert!((miles - km * 0.621_371).abs() < 1e-6);
        assert!(!store.closest);
    }
}

#[tokio::test]
async fn wider_radius_reaches_boulder() {
    let payload = interactive(
        &locator(),
        &[("location", "Denver, CO"), ("radius", "50")],
        &[],
    )
    .await;
    assert_eq!(ids(&payload), vec![2, 1, 3]);
}

#[tokio::test]
async fn category_scope_includes_descendants() {
    let payload = interactive(
        &locator(),
        &[("location", "Denver, CO"), ("radius", "50")],
        &["retail"],
    )
    .await;
    assert_eq!(ids(&payload), vec![1, 3]);
}

#[tokio::test]
async fn obscure_address_falls_back_to_single_nearest_store() {
    let payload = interactive(&locator(), &[("location", "Trinidad, CO")], &[]).await;

    assert!(payload.success);
    assert!(payload.closest);
    assert_eq!(ids(&payload), vec![4]);
    assert!(payload.stores[0].closest);
    assert!(payload.stores[0].distance_km.expect("distance") > 25.0);
}

#[tokio::test]
async fn fallback_respects_category_scope() {
    let payload = interactive(&locator(), &[("location", "Trinidad, CO")], &["retail"]).await;
    assert!(payload.closest);
    assert_eq!(ids(&payload), vec![1]);
}

#[tokio::test]
async fn identical_searches_are_idempotent() {
    let locator = locator();
    let first = interactive(&locator, &[("location", "Trinidad, CO")], &[]).await;
    let second = interactive(&locator, &[("location", "Trinidad, CO")], &[]).await;
    assert_eq!(first, second);

    let first = interactive(&locator, &[("location", "Denver, CO"), ("radius", "500")], &[]).await;
    let second = interactive(&locator, &[("location", "Denver, CO"), ("radius", "500")], &[]).await;
    assert_eq!(ids(&first), ids(&second));
}

// ---------------------------------------------------------------------------
// Roadshows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn roadshow_november_matches_boundary_months_in_locality() {
    let payload = interactive(
        &locator(),
        &[("location", "Seattle"), ("date", "2023-11-01")],
        &["costco-roadshow"],
    )
    .await;

    // Everett spans November without starting or ending in it.
    assert_eq!(ids(&payload), vec![20, 21]);
    assert!(!payload.closest);
    assert!(payload.stores.iter().all(|s| s.distance_km.is_some()));
    // Store order, not distance order: Seattle is nearer than Tukwila.
    assert!(payload.stores[0].distance_km > payload.stores[1].distance_km);
    assert_eq!(
        payload.stores[0].start_date,
        NaiveDate::from_ymd_opt(2023, 11, 1)
    );
}

#[tokio::test]
async fn roadshow_locality_parameter_scopes_listing() {
    let payload = interactive(&locator(), &[("locality", "2")], &["costco-roadshow"]).await;
    assert!(!payload.success);
    assert_eq!(ids(&payload), vec![23]);
    assert!(payload.stores[0].distance_km.is_none());
}

#[tokio::test]
async fn roadshow_page_lists_dates_and_localities() {
    let context = page(&locator(), &[("date", "2023-11-01")], &["costco-roadshow"]).await;

    let roadshow = context.roadshow.expect("roadshow context");
    let months: Vec<(i32, u32)> = roadshow.dates.iter().map(|d| (d.year, d.month)).collect();
    assert_eq!(months, vec![(2023, 10), (2023, 11), (2023, 12)]);
    assert_eq!(roadshow.date, "2023-11-01");
    assert_eq!(
        roadshow
            .localities
            .iter()
            .map(|l| (l.name.as_str(), l.id))
            .collect::<Vec<_>>(),
        vec![("Washington", 1), ("Oregon", 2)]
    );
    assert_eq!(roadshow.locality, 1);
    assert_eq!(
        context.category.map(|c| c.slug),
        Some("costco-roadshow".to_string())
    );
}

#[tokio::test]
async fn invalid_roadshow_date_is_not_found() {
    let err = locator()
        .handle(
            &raw(&[("date", "2023-11-31")]),
            PathSlugs::from_segments(&["costco-roadshow"]),
            true,
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ---------------------------------------------------------------------------
// Geocoder degradation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn quota_exceeded_degrades_to_unlocated_search() {
    let payload = interactive(&locator(), &[("location", "overloaded")], &[]).await;

    assert!(!payload.success);
    assert!((payload.location.lat - 39.8282).abs() < 1e-9);
    assert!((payload.location.lng + 98.5795).abs() < 1e-9);
    assert_eq!(payload.warnings, vec![QUOTA_WARNING.to_string()]);
    assert_eq!(payload.query, "overloaded");
    assert!(payload.stores.is_empty());
    assert!(!payload.closest);
}

#[tokio::test]
async fn quota_exceeded_lists_all_active_stores_when_configured() {
    let settings = LocatorSettings {
        always_load_all_stores: true,
        ..LocatorSettings::default()
    };
    let (locator, _) = locator_with(fixture_store(), settings);
    let payload = interactive(&locator, &[("location", "overloaded")], &[]).await;

    assert!(!payload.success);
    assert_eq!(ids(&payload), vec![1, 2, 3, 4, 5, 21, 22, 23, 24]);
    assert!(payload.stores.iter().all(|s| s.distance_km.is_none()));
}

#[tokio::test]
async fn unknown_location_records_warning() {
    let payload = interactive(&locator(), &[("location", "nowhere")], &[]).await;
    assert!(!payload.success);
    assert_eq!(payload.warnings, vec![NOT_FOUND_WARNING.to_string()]);
}

#[tokio::test]
async fn other_geocoder_failures_are_fatal() {
    let err = locator()
        .handle(
            &raw(&[("location", "denied")]),
            PathSlugs::default(),
            true,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "geocoder_error");
}

#[tokio::test]
async fn geocoder_is_called_once_and_skipped_for_empty_query() {
    let (locator, geocoder) = locator_with(fixture_store(), LocatorSettings::default());

    interactive(&locator, &[], &[]).await;
    assert_eq!(geocoder.calls(), 0);

    interactive(&locator, &[("location", "Denver, CO")], &[]).await;
    assert_eq!(geocoder.calls(), 1);
}

// ---------------------------------------------------------------------------
// Product path and facets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_variation_redirects_to_product_url() {
    assert_eq!(
        redirect(&locator(), &["retail", "trail-mix", "smoked"]).await,
        "/store-finder/retail/trail-mix/"
    );
}

#[tokio::test]
async fn missing_product_and_item_redirect_one_level_up() {
    let locator = locator();
    assert_eq!(
        redirect(&locator, &["retail", "granola"]).await,
        "/store-finder/retail/"
    );
    assert_eq!(
        redirect(&locator, &["retail", "trail-mix", "salted", "48oz"]).await,
        "/store-finder/retail/trail-mix/salted/"
    );
}

#[tokio::test]
async fn product_path_restricts_to_stocking_stores() {
    let context = page(
        &locator(),
        &[("location", "Denver, CO"), ("radius", "500")],
        &["retail", "trail-mix", "salted", "12oz"],
    )
    .await;

    assert_eq!(
        context.stores.iter().map(|s| s.store.id).collect::<Vec<_>>(),
        vec![1]
    );
    assert_eq!(context.product.map(|p| p.slug), Some("trail-mix".to_string()));
    assert_eq!(context.variation.map(|v| v.slug), Some("salted".to_string()));
    assert_eq!(context.item.map(|i| i.slug), Some("12oz".to_string()));
}

#[tokio::test]
async fn product_path_with_no_stock_nearby_has_no_fallback() {
    let payload = interactive(
        &locator(),
        &[("location", "Trinidad, CO")],
        &["retail", "trail-mix"],
    )
    .await;
    assert!(payload.stores.is_empty());
    assert!(!payload.closest);
}

#[tokio::test]
async fn facet_filters_restrict_to_matching_inventory() {
    let context = page(
        &locator(),
        &[
            ("location", "Denver, CO"),
            ("radius", "500"),
            ("filters", "flavor:sweet/"),
        ],
        &[],
    )
    .await;
    assert_eq!(
        context.stores.iter().map(|s| s.store.id).collect::<Vec<_>>(),
        vec![4]
    );
    assert_eq!(context.filters, Some(vec!["flavor:sweet".to_string()]));
}

#[tokio::test]
async fn unknown_facet_drops_filters() {
    let context = page(
        &locator(),
        &[("location", "Denver, CO"), ("filters", "color:red")],
        &[],
    )
    .await;
    assert_eq!(
        context.stores.iter().map(|s| s.store.id).collect::<Vec<_>>(),
        vec![2, 1]
    );
    assert!(context.filters.is_none());
}

#[tokio::test]
async fn slash_filter_means_no_filters() {
    let context = page(
        &locator(),
        &[("location", "Denver, CO"), ("filters", "/")],
        &[],
    )
    .await;
    assert!(context.filters.is_none());
    assert_eq!(context.stores.len(), 2);
}

#[tokio::test]
async fn filters_are_ignored_under_product_path_or_when_disabled() {
    let context = page(
        &locator(),
        &[("location", "Denver, CO"), ("filters", "flavor:sweet")],
        &["retail", "trail-mix"],
    )
    .await;
    assert!(context.filters.is_none());

    let settings = LocatorSettings {
        include_filters: false,
        ..LocatorSettings::default()
    };
    let (disabled, _) = locator_with(fixture_store(), settings);
    let context = page(
        &disabled,
        &[("location", "Denver, CO"), ("filters", "flavor:sweet")],
        &[],
    )
    .await;
    assert!(context.filters.is_none());
    assert_eq!(context.stores.len(), 2);
}

// ---------------------------------------------------------------------------
// Categories, page context, and failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_or_inactive_category_is_not_found() {
    let locator = locator();
    for slug in ["nope", "retired"] {
        let err = locator
            .handle(&RawParams::default(), PathSlugs::from_segments(&[slug]), true)
            .await
            .unwrap_err();
        assert!(err.is_not_found(), "category {slug}");
    }
}

#[tokio::test]
async fn page_context_carries_tree_online_stores_and_whole_miles() {
    let context = page(&locator(), &[("location", "Denver, CO")], &[]).await;

    assert_eq!(
        context
            .categories
            .iter()
            .map(|c| c.slug.as_str())
            .collect::<Vec<_>>(),
        vec!["retail", "grocery", "outdoor", "costco-roadshow", "gift-shops/east"]
    );
    assert_eq!(context.categories[1].depth, 1);
    assert_eq!(context.category.map(|c| c.slug), Some("retail".to_string()));
    assert_eq!(
        context.online_stores.iter().map(|s| s.id).collect::<Vec<_>>(),
        vec![24, 5]
    );
    assert!(context.roadshow.is_none());

    for store in &context.stores {
        let miles = store.store.distance_miles.expect("miles");
        assert_eq!(store.distance, Some(miles.trunc() as i64));
    }
}

#[tokio::test]
async fn store_failures_surface_as_internal_errors() {
    let (locator, _) = locator_with(fixture_store().failing(), LocatorSettings::default());
    let err = locator
        .handle(&raw(&[("location", "Denver, CO")]), PathSlugs::default(), true)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "internal_error");
}

// ---------------------------------------------------------------------------
// URL resolver
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolver_dispatches_structured_path() {
    let outcome = resolve(&locator(), &RawParams::default(), "retail/trail-mix/smoked/", true)
        .await
        .expect("resolves");
    assert_eq!(
        outcome,
        Outcome::Redirect(Redirect::to(&["retail", "trail-mix"]))
    );
}

#[tokio::test]
async fn resolver_falls_back_to_opaque_category() {
    let outcome = resolve(&locator(), &RawParams::default(), "gift-shops/east/", true)
        .await
        .expect("opaque category resolves");
    assert!(matches!(outcome, Outcome::Interactive(_)));
}

#[tokio::test]
async fn resolver_not_found_after_both_attempts() {
    let err = resolve(&locator(), &RawParams::default(), "no/such/path/", true)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn resolver_does_not_retry_bad_requests() {
    let (locator, geocoder) = locator_with(fixture_store(), LocatorSettings::default());
    let err = resolve(
        &locator,
        &raw(&[("radius", "far"), ("location", "Denver, CO")]),
        "retail/",
        true,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "bad_request");
    assert_eq!(geocoder.calls(), 0);
}
