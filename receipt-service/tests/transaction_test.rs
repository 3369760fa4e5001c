mod common;

use common::{corner_shop_transaction, TestApp};
use reqwest::StatusCode;
use serde_json::{json, Value};

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn create_transaction_computes_totals() {
    let app = TestApp::spawn().await;

    let response = app.create_transaction(&corner_shop_transaction()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["type"], "outbound");
    assert_eq!(body["storeName"], "Corner Shop");
    assert_eq!(body["total"].as_f64(), Some(20.0));
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
    assert!(body["items"][0].is_string());
}

#[tokio::test]
async fn create_transaction_with_no_items() {
    let app = TestApp::spawn().await;

    let response = app
        .create_transaction(&json!({
            "type": "inbound",
            "storeName": "Corner Shop",
            "user": "alice",
            "items": []
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"].as_f64(), Some(0.0));
    assert_eq!(body["total"].to_string(), "0.0");
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn create_transaction_accepts_storefront_type_labels() {
    let app = TestApp::spawn().await;

    let response = app
        .create_transaction(&json!({
            "type": "girdi",
            "storeName": "Corner Shop",
            "user": "alice",
            "items": []
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["type"], "inbound");
}

#[tokio::test]
async fn create_transaction_rejects_missing_store_name() {
    let app = TestApp::spawn().await;

    let response = app
        .create_transaction(&json!({
            "type": "outbound",
            "storeName": "",
            "items": []
        }))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Validation error");
    assert_eq!(app.repository.transaction_count(), 0);
}

#[tokio::test]
async fn create_transaction_rejects_malformed_body() {
    let app = TestApp::spawn().await;

    let response = app
        .create_transaction(&json!({ "type": "sideways", "storeName": "Corner Shop" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn create_transaction_rejects_overflowing_amounts() {
    let app = TestApp::spawn().await;

    let response = app
        .create_transaction(&json!({
            "type": "outbound",
            "storeName": "Corner Shop",
            "items": [
                { "productName": "Widget", "quantity": 1e200, "unitPrice": 1e200 }
            ]
        }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.repository.line_item_count(), 0);
    assert_eq!(app.repository.transaction_count(), 0);
}

#[tokio::test]
async fn storage_failure_surfaces_as_storage_error() {
    let app = TestApp::spawn().await;
    app.repository.fail_after_writes(1);

    let response = app
        .create_transaction(&json!({
            "type": "outbound",
            "storeName": "Corner Shop",
            "user": "alice",
            "items": [
                { "productName": "Widget", "quantity": 1, "unitPrice": 1 },
                { "productName": "Gadget", "quantity": 1, "unitPrice": 1 }
            ]
        }))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Storage error");
    assert_eq!(app.repository.transaction_count(), 0);
}

// =============================================================================
// Fetch & list
// =============================================================================

#[tokio::test]
async fn get_transaction_expands_items_in_order() {
    let app = TestApp::spawn().await;

    let created: Value = app
        .create_transaction(&json!({
            "type": "outbound",
            "storeName": "Corner Shop",
            "user": "alice",
            "description": "weekly restock",
            "items": [
                { "productName": "Widget", "quantity": 2, "unitPrice": 10.0 },
                { "productName": "Gadget", "quantity": 3, "unitPrice": 1.5 },
                { "productName": "Gizmo", "quantity": 1, "unitPrice": 7.25 }
            ]
        }))
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let id = created["id"].as_str().expect("id is a string");

    let response = app.get_transaction(id).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["description"], "weekly restock");
    assert_eq!(body["total"].as_f64(), Some(31.75));

    let items = body["items"].as_array().expect("items is an array");
    let names: Vec<&str> = items
        .iter()
        .map(|item| item["productName"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["Widget", "Gadget", "Gizmo"]);
    assert_eq!(items[1]["totalPrice"].as_f64(), Some(4.5));
    assert!(items.iter().all(|item| item["transactionId"] == id));
}

#[tokio::test]
async fn get_unknown_transaction_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app.get_transaction("does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].as_str().unwrap_or_default().contains("not found"));
}

#[tokio::test]
async fn list_transactions_returns_expanded_records() {
    let app = TestApp::spawn().await;

    let north_body = json!({
        "type": "outbound",
        "storeName": "North Store",
        "user": "alice",
        "items": [
            { "productName": "Widget", "quantity": 2, "unitPrice": 10.0 },
            { "productName": "Gadget", "quantity": 1, "unitPrice": 5.0 }
        ]
    });
    let south_body = json!({
        "type": "inbound",
        "storeName": "South Store",
        "user": "bob",
        "items": [
            { "productName": "Gizmo", "quantity": 4, "unitPrice": 2.5 }
        ]
    });

    let (north, south) = tokio::join!(
        app.create_transaction(&north_body),
        app.create_transaction(&south_body),
    );
    assert_eq!(north.status(), StatusCode::CREATED);
    assert_eq!(south.status(), StatusCode::CREATED);

    let response = app
        .client
        .get(format!("{}/transactions", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert_eq!(body.len(), 2);

    let north = body
        .iter()
        .find(|tx| tx["storeName"] == "North Store")
        .expect("north store transaction");
    let south = body
        .iter()
        .find(|tx| tx["storeName"] == "South Store")
        .expect("south store transaction");

    assert_eq!(north["total"].as_f64(), Some(25.0));
    assert_eq!(north["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(south["total"].as_f64(), Some(10.0));
    assert_eq!(south["items"][0]["productName"], "Gizmo");
}
