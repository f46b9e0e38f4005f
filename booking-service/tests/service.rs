use std::time::Duration;

use abi::{AdminConfig, Config, DbConfig, ServerConfig};
use booking_service::serve_with_pool;
use serde_json::json;
use tokio::time;

const ADMIN_PASSWORD: &str = "segreto";

fn test_config(port: u16) -> Config {
    Config {
        db: DbConfig {
            // the pool is injected; the url is never dialed in tests
            url: "postgres://unused".to_string(),
            max_connections: 5,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
        },
        admin: AdminConfig {
            password: Some(ADMIN_PASSWORD.to_string()),
        },
        mail: None,
        frontend_url: "http://127.0.0.1:5502".to_string(),
    }
}

#[sqlx_database_tester::test(pool(variable = "migrated_pool", migrations = "../migrations"))]
async fn http_server_should_work() {
    let config = test_config(18008);
    let server_config = config.clone();
    let pool = migrated_pool.clone();
    tokio::spawn(async move {
        serve_with_pool(&server_config, pool).await.unwrap();
    });
    time::sleep(Duration::from_millis(100)).await;

    let client = reqwest::Client::new();
    let base = config.server.url();

    // the service is alive
    let res = client.get(&base).send().await.unwrap();
    assert!(res.status().is_success());

    // the catalog offers the eight generated brunch sundays
    let events: Vec<serde_json::Value> = client
        .get(format!("{base}/api/bookable-events"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(events.len() >= 8);
    assert!(events.iter().any(|e| e["type"] == "brunch"));

    // first we make a booking for a brunch turn
    let booking: serde_json::Value = client
        .post(format!("{base}/api/bookings"))
        .json(&json!({
            "name": "Mario Rossi",
            "email": "mario@example.com",
            "phone": "3331234567",
            "booking_date": "2026-08-09",
            "booking_time": "12:00:00",
            "guests": 20
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = booking["cancellation_token"].as_str().unwrap().to_string();
    assert!(booking["id"].as_i64().unwrap() > 0);

    // the same email for the same turn is a duplicate
    let res = client
        .post(format!("{base}/api/bookings"))
        .json(&json!({
            "name": "Mario Rossi",
            "email": "mario@example.com",
            "phone": "3331234567",
            "booking_date": "2026-08-09",
            "booking_time": "12:00:00",
            "guests": 2
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("già una prenotazione"));

    // the turn holds 25: ten more guests do not fit, five remain
    let res = client
        .post(format!("{base}/api/bookings"))
        .json(&json!({
            "name": "Lucia Bianchi",
            "email": "lucia@example.com",
            "phone": "3457654321",
            "booking_date": "2026-08-09",
            "booking_time": "12:00:00",
            "guests": 10
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("Posti rimasti: 5"));

    // admin endpoints fail without credentials, work with them
    let res = client
        .get(format!("{base}/api/admin/bookings"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
    assert_eq!(res.headers()["www-authenticate"], "Basic");

    let res = client
        .get(format!("{base}/api/admin/bookings"))
        .basic_auth("admin", Some("sbagliata"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let page: serde_json::Value = client
        .get(format!("{base}/api/admin/bookings"))
        .basic_auth("admin", Some(ADMIN_PASSWORD))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["bookings"][0]["email"], "mario@example.com");

    // special event lifecycle: create, book it, delete it with its bookings
    let event: serde_json::Value = client
        .post(format!("{base}/api/admin/special-events"))
        .basic_auth("admin", Some(ADMIN_PASSWORD))
        .json(&json!({
            "display_name": "Serata Jazz",
            "booking_date": "2026-09-04",
            "booking_time": "21:00:00"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let event_id = event["id"].as_i64().unwrap();

    let res = client
        .post(format!("{base}/api/bookings"))
        .json(&json!({
            "event_id": event_id,
            "name": "Lucia Bianchi",
            "email": "lucia@example.com",
            "phone": "3457654321",
            "booking_date": "2026-09-04",
            "booking_time": "21:00:00",
            "guests": 3
        }))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());

    // the export is a downloadable pdf
    let res = client
        .get(format!("{base}/api/bookings/pdf?event_id={event_id}"))
        .basic_auth("admin", Some(ADMIN_PASSWORD))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    assert_eq!(res.headers()["content-type"], "application/pdf");
    assert!(res.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .starts_with("attachment; filename=prenotazioni_Serata_Jazz_"));
    assert!(res.bytes().await.unwrap().starts_with(b"%PDF"));

    let res = client
        .delete(format!("{base}/api/admin/special-events/{event_id}"))
        .basic_auth("admin", Some(ADMIN_PASSWORD))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());

    let page: serde_json::Value = client
        .get(format!("{base}/api/admin/bookings"))
        .basic_auth("admin", Some(ADMIN_PASSWORD))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 1, "the event booking went with the event");

    // self-service cancellation is single use
    let res = client
        .get(format!("{base}/api/bookings/cancel/{token}"))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());

    let res = client
        .get(format!("{base}/api/bookings/cancel/{token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[sqlx_database_tester::test(pool(variable = "migrated_pool", migrations = "../migrations"))]
async fn admin_endpoints_fail_closed_without_password() {
    let mut config = test_config(18009);
    config.admin.password = None;
    let server_config = config.clone();
    let pool = migrated_pool.clone();
    tokio::spawn(async move {
        serve_with_pool(&server_config, pool).await.unwrap();
    });
    time::sleep(Duration::from_millis(100)).await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/api/admin/bookings", config.server.url()))
        .basic_auth("admin", Some("qualsiasi"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("ADMIN_PASSWORD non configurata"));
}
