use super::*;
use crate::memory::location_at;
use crate::ranker::Distance;
use storefinder_core::RoadshowWindow;

fn result(point: Option<GeoPoint>, stores: Vec<RankedResult>) -> LocatorResult {
    LocatorResult {
        point,
        query: "Denver, CO, USA".to_string(),
        radius: 25,
        closest: false,
        stores,
        warnings: vec![],
        product: None,
        variation: None,
        item: None,
        filters: None,
        category: None,
        is_roadshow: false,
        raw_date: String::new(),
        locality: 1,
    }
}

fn ranked(id: i64, km: Option<f64>) -> RankedResult {
    RankedResult {
        location: location_at(id, "Basecamp", 39.75, -105.0),
        distance: km.map(Distance::from_km),
        is_fallback_closest: false,
    }
}

fn category(id: i64, slug: &str) -> Category {
    Category {
        id,
        parent_id: None,
        name: slug.to_string(),
        slug: slug.to_string(),
        depth: 0,
    }
}

#[test]
fn redirect_location_encodes_each_segment() {
    assert_eq!(Redirect::to(&[]).location(), "/store-finder/");
    assert_eq!(
        Redirect::to(&["retail", "trail-mix"]).location(),
        "/store-finder/retail/trail-mix/"
    );
    assert_eq!(
        Redirect::to(&["a b", "x/y", "50%"]).location(),
        "/store-finder/a%20b/x%2Fy/50%25/"
    );
}

#[test]
fn interactive_payload_without_point_uses_continental_center() {
    let payload = InteractivePayload::from(&result(None, vec![ranked(1, None)]));
    assert!(!payload.success);
    assert!((payload.location.lat - 39.8282).abs() < 1e-9);
    assert!((payload.location.lng + 98.5795).abs() < 1e-9);
    assert!(payload.stores[0].distance_km.is_none());
    assert!(payload.stores[0].distance_miles.is_none());
}

#[test]
fn interactive_payload_serializes_expected_keys() {
    let point = GeoPoint::new(39.7392, -104.9903);
    let payload = InteractivePayload::from(&result(Some(point), vec![ranked(7, Some(10.0))]));
    let json = serde_json::to_value(&payload).expect("serialize");

    assert_eq!(json["success"], true);
    assert_eq!(json["query"], "Denver, CO, USA");
    assert_eq!(json["radius"], 25);
    assert_eq!(json["closest"], false);
    let store = &json["stores"][0];
    assert_eq!(store["id"], 7);
    assert_eq!(store["distance_km"], 10.0);
    assert!((store["distance_miles"].as_f64().unwrap() - 6.213_71).abs() < 1e-9);
    assert!(store.get("start_date").is_none());
}

#[test]
fn roadshow_dates_appear_on_store_payload() {
    let mut location = location_at(3, "Costco Seattle", 47.6, -122.3);
    location.roadshow = Some(RoadshowWindow {
        start_date: NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2023, 11, 12).unwrap(),
    });
    let json = serde_json::to_value(StorePayload::from(&location)).unwrap();
    assert_eq!(json["start_date"], "2023-11-01");
    assert_eq!(json["end_date"], "2023-11-12");
}

#[test]
fn page_context_truncates_distance_to_whole_miles() {
    let point = GeoPoint::new(39.7392, -104.9903);
    let page = PageContext::build(
        result(Some(point), vec![ranked(1, Some(10.0)), ranked(2, None)]),
        PageExtras::default(),
    );
    assert_eq!(page.stores[0].distance, Some(6));
    assert_eq!(page.stores[1].distance, None);
}

#[test]
fn page_context_defaults_category_to_first_active() {
    let extras = PageExtras {
        categories: vec![category(1, "retail"), category(2, "outdoor")],
        ..PageExtras::default()
    };
    let page = PageContext::build(result(None, vec![]), extras.clone());
    assert_eq!(page.category.as_ref().map(|c| c.slug.as_str()), Some("retail"));

    let mut chosen = result(None, vec![]);
    chosen.category = Some(category(2, "outdoor"));
    let page = PageContext::build(chosen, extras);
    assert_eq!(page.category.map(|c| c.slug), Some("outdoor".to_string()));
}

#[test]
fn roadshow_context_is_flattened_into_page() {
    let extras = PageExtras {
        roadshow: Some(RoadshowContext {
            dates: vec![
                DateBucket {
                    year: 2023,
                    month: 10,
                },
                DateBucket {
                    year: 2023,
                    month: 11,
                },
            ],
            date: "2023-11-01".to_string(),
            localities: vec![Locality {
                name: "Washington".to_string(),
                id: 1,
            }],
            locality: 1,
        }),
        ..PageExtras::default()
    };
    let json = serde_json::to_value(PageContext::build(result(None, vec![]), extras)).unwrap();
    assert_eq!(json["dates"], serde_json::json!(["2023-10-01", "2023-11-01"]));
    assert_eq!(json["date"], "2023-11-01");
    assert_eq!(json["localities"][0]["name"], "Washington");
    assert_eq!(json["locality"], 1);

    let plain = serde_json::to_value(PageContext::build(result(None, vec![]), PageExtras::default()))
        .unwrap();
    assert!(plain.get("dates").is_none());
}
