mod common;

use actix_web::{http::StatusCode, test};
use application::test_support::{fixture_time, TestHarness};
use chrono::{Duration, NaiveTime};
use serde_json::{json, Value};
use vantrack_core::entities::{child_van_assignments, van_assignments};

use common::{bearer, login, test_app};

const DRIVER: &str = "+919876543210";
const PARENT: &str = "+919876543211";

async fn assign_child(h: &TestHarness) {
    let driver = h.ctx.users.find_by_phone_number(DRIVER).await.unwrap().unwrap();
    let parent = h.ctx.users.find_by_phone_number(PARENT).await.unwrap().unwrap();
    let van = h
        .store
        .insert_van(van_assignments::Model {
            id: 0,
            driver_id: driver.user_id,
            van_number: "DPS-001".to_string(),
            van_model: "Tata Winger".to_string(),
            capacity: 20,
            route_name: "Sector 15 to DPS School".to_string(),
            is_active: true,
            created_at: fixture_time().into(),
            updated_at: fixture_time().into(),
        })
        .unwrap();
    h.store
        .insert_child(child_van_assignments::Model {
            id: 0,
            parent_id: parent.user_id,
            child_name: "Arjun Sharma".to_string(),
            child_grade: "5th".to_string(),
            school_name: "Delhi Public School".to_string(),
            admission_number: "DPS2024001".to_string(),
            van_assignment_id: van.id,
            pickup_time: NaiveTime::from_hms_opt(7, 30, 0),
            dropoff_time: NaiveTime::from_hms_opt(14, 30, 0),
            is_active: true,
            created_at: fixture_time().into(),
            updated_at: fixture_time().into(),
        })
        .unwrap();
}

fn push(token: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/locations/update-location")
        .insert_header(bearer(token))
        .set_json(body)
}

fn get(token: &str, uri: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .insert_header(bearer(token))
}

#[actix_web::test]
async fn push_then_read_back() {
    let h = TestHarness::new();
    let token = login(&h, DRIVER, "driver").await;
    let app = test_app!(h.ctx.clone());

    let resp = test::call_service(&app, push(&token, json!({ "latitude": 12.97, "longitude": 77.59 })).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Location updated successfully");
    assert_eq!(body["location"]["driver_phone"], DRIVER);

    h.clock.advance(Duration::seconds(10));
    let resp = test::call_service(
        &app,
        push(&token, json!({ "latitude": "12.98", "longitude": "77.60", "speed": 25.5 })).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::call_and_read_body_json(&app, get(&token, "/api/locations/driver-location").to_request()).await;
    assert_eq!(body["location"]["coordinates"], json!([12.98, 77.6]));
    assert_eq!(body["location"]["speed"], 25.5);
    assert_eq!(body["location"]["is_active"], true);

    let body: Value =
        test::call_and_read_body_json(&app, get(&token, "/api/locations/location-history").to_request()).await;
    let rows = body["locations"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["coordinates"], json!([12.98, 77.6]));
    assert_eq!(rows[1]["coordinates"], json!([12.97, 77.59]));
    assert_eq!(rows[1]["is_active"], false);
}

#[actix_web::test]
async fn out_of_range_coordinates_are_rejected() {
    let h = TestHarness::new();
    let token = login(&h, DRIVER, "driver").await;
    let app = test_app!(h.ctx.clone());

    let resp = test::call_service(&app, push(&token, json!({ "latitude": 91, "longitude": 0 })).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(&app, push(&token, json!({ "latitude": 12.97 })).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn driver_without_location_gets_404() {
    let h = TestHarness::new();
    let token = login(&h, DRIVER, "driver").await;
    let app = test_app!(h.ctx.clone());

    let resp = test::call_service(&app, get(&token, "/api/locations/driver-location").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn roles_gate_location_routes() {
    let h = TestHarness::new();
    let parent = login(&h, PARENT, "parent").await;
    let driver = login(&h, DRIVER, "driver").await;
    let app = test_app!(h.ctx.clone());

    let resp = test::call_service(&app, push(&parent, json!({ "latitude": 1, "longitude": 1 })).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_code"], "FORBIDDEN");

    let resp = test::call_service(&app, get(&parent, "/api/locations/location-history").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(&app, get(&driver, "/api/locations/van-location").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn parent_sees_van_location() {
    let h = TestHarness::new();
    let driver = login(&h, DRIVER, "driver").await;
    let parent = login(&h, PARENT, "parent").await;
    let app = test_app!(h.ctx.clone());

    let resp = test::call_service(&app, get(&parent, "/api/locations/van-location").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assign_child(&h).await;
    let resp = test::call_service(&app, get(&parent, "/api/locations/van-location").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    test::call_service(&app, push(&driver, json!({ "latitude": 28.6139, "longitude": 77.209 })).to_request()).await;
    let resp = test::call_service(&app, get(&parent, "/api/locations/van-location").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["van_assignment"]["van_number"], "DPS-001");
    assert_eq!(body["van_assignment"]["driver_phone"], DRIVER);
    assert_eq!(body["location"]["coordinates"], json!([28.6139, 77.209]));
    assert_eq!(body["children"][0]["child_name"], "Arjun Sharma");
    assert_eq!(body["children"][0]["pickup_time"], "07:30:00");
}

#[actix_web::test]
async fn toggle_gps_round_trips_through_profile() {
    let h = TestHarness::new();
    let token = login(&h, DRIVER, "driver").await;
    let app = test_app!(h.ctx.clone());

    let req = test::TestRequest::post()
        .uri("/api/locations/toggle-gps")
        .insert_header(bearer(&token))
        .set_json(json!({ "enabled": true }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "message": "GPS tracking enabled", "enabled": true }));

    let body: Value = test::call_and_read_body_json(&app, get(&token, "/api/auth/profile").to_request()).await;
    assert_eq!(body["gps_tracking_enabled"], true);
}
