//! API integration tests
//!
//! These run against a live server and database:
//! `cargo test -- --ignored`

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:3000/api";

/// Unique suffix so repeated runs do not collide on unique columns
fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

async fn create_book(client: &Client, total_copies: i32) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": unique("Test Book"),
            "author": "Test Author",
            "isbn": unique("isbn"),
            "total_copies": total_copies
        }))
        .send()
        .await
        .expect("Failed to create book");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    body["data"].clone()
}

async fn create_user(client: &Client) -> Value {
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "full_name": "Test User",
            "email": format!("{}@example.com", unique("user")),
            "phone": "999888777"
        }))
        .send()
        .await
        .expect("Failed to create user");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    body["data"].clone()
}

async fn get_book(client: &Client, id: i64) -> Value {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to fetch book");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"].clone()
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_unmatched_route_returns_enveloped_404() {
    let client = Client::new();

    let response = client
        .get(format!("{}/nonexistent", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Route not found");
    assert!(body["path"].as_str().unwrap().contains("/nonexistent"));
}

#[tokio::test]
#[ignore]
async fn test_create_book_requires_core_fields() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({ "title": "Orphan Title" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("required"));
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_conflicts() {
    let client = Client::new();
    let isbn = unique("isbn");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "First Copy",
            "author": "Some Author",
            "isbn": isbn
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "Second Copy",
            "author": "Some Author",
            "isbn": isbn
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore]
async fn test_search_requires_term() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books/search", BASE_URL))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore]
async fn test_search_finds_by_substring() {
    let client = Client::new();
    let marker = unique("Needle");

    client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": format!("The {} Chronicle", marker),
            "author": "Case Author",
            "isbn": unique("isbn")
        }))
        .send()
        .await
        .expect("Failed to create book");

    let response = client
        .post(format!("{}/books/search", BASE_URL))
        .json(&json!({ "search": marker.to_lowercase() }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["count"].as_u64().unwrap(), 1);
    assert_eq!(body["search"], marker.to_lowercase());
}

#[tokio::test]
#[ignore]
async fn test_update_book_rejects_available_above_total() {
    let client = Client::new();
    let book = create_book(&client, 3).await;
    let book_id = book["id"].as_i64().expect("No book ID");

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .json(&json!({ "available_copies": 5 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    // No mutation happened
    let current = get_book(&client, book_id).await;
    assert_eq!(current["available_copies"], 3);
    assert_eq!(current["total_copies"], 3);
}

#[tokio::test]
#[ignore]
async fn test_update_book_requires_some_field() {
    let client = Client::new();
    let book = create_book(&client, 1).await;
    let book_id = book["id"].as_i64().expect("No book ID");

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_get_unknown_book_is_404() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books/999999999", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore]
async fn test_create_user_rejects_malformed_email() {
    let client = Client::new();

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "full_name": "Bad Email",
            "email": "not-an-email",
            "phone": "999888777"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("Email"));
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_conflicts() {
    let client = Client::new();
    let email = format!("{}@example.com", unique("dup"));

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "full_name": "First User",
            "email": email,
            "phone": "111222333"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "full_name": "Second User",
            "email": email,
            "phone": "444555666"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_loan_days_bounds() {
    let client = Client::new();
    let book = create_book(&client, 1).await;
    let user = create_user(&client).await;
    let book_id = book["id"].as_i64().unwrap();
    let user_id = user["id"].as_i64().unwrap();

    for days in [0, 31] {
        let response = client
            .post(format!("{}/loans", BASE_URL))
            .json(&json!({
                "user_id": user_id,
                "book_id": book_id,
                "loan_days": days
            }))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), 400, "loan_days = {} must be rejected", days);
    }
}

#[tokio::test]
#[ignore]
async fn test_return_rejects_non_numeric_id() {
    let client = Client::new();

    let response = client
        .post(format!("{}/loans/abc/return", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore]
async fn test_return_unknown_loan_is_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/loans/999999999/return", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle() {
    let client = Client::new();
    let book = create_book(&client, 1).await;
    let user = create_user(&client).await;
    let book_id = book["id"].as_i64().unwrap();
    let user_id = user["id"].as_i64().unwrap();

    // Borrow the only copy
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "user_id": user_id,
            "book_id": book_id,
            "loan_days": 7
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    let loan_id = body["data"]["id"].as_i64().expect("No loan ID");
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["user_name"], "Test User");

    // Availability dropped to zero
    let current = get_book(&client, book_id).await;
    assert_eq!(current["available_copies"], 0);

    // A second loan against the same book is rejected
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "user_id": user_id,
            "book_id": book_id
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    // The loan shows up with its creation history
    let response = client
        .get(format!("{}/loans/{}", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    let history = body["data"]["history"].as_array().expect("No history");
    assert!(history.iter().any(|h| h["action"] == "created"));

    // Return the book
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["loan"]["status"], "returned");
    assert_eq!(body["data"]["return_info"]["days_late"], 0);

    // Availability restored
    let current = get_book(&client, book_id).await;
    assert_eq!(current["available_copies"], 1);

    // A second return is rejected, no double fine
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Loan has already been returned");
}

#[tokio::test]
#[ignore]
async fn test_deactivation_guard_and_idempotency() {
    let client = Client::new();
    let book = create_book(&client, 1).await;
    let user = create_user(&client).await;
    let book_id = book["id"].as_i64().unwrap();
    let user_id = user["id"].as_i64().unwrap();

    // Open a loan, deactivation must be rejected
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["data"]["id"].as_i64().unwrap();

    let response = client
        .delete(format!("{}/users/{}/deactivate", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    // Still active
    let response = client
        .get(format!("{}/users/{}", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["user"]["is_active"], true);
    assert_eq!(body["data"]["active_loans"].as_array().unwrap().len(), 1);

    // Return the loan, then deactivation succeeds
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let response = client
        .delete(format!("{}/users/{}/deactivate", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // Deactivating again is idempotent
    let response = client
        .delete(format!("{}/users/{}/deactivate", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{}/users/{}", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["user"]["is_active"], false);

    // An inactive user cannot borrow
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_list_users_filter_is_validated() {
    let client = Client::new();

    let response = client
        .get(format!("{}/users?active=maybe", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let response = client
        .get(format!("{}/users?active=true", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert!(body["data"].is_array());
    assert!(body["count"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_list_loans_filters_combine() {
    let client = Client::new();
    let book = create_book(&client, 2).await;
    let user = create_user(&client).await;
    let book_id = book["id"].as_i64().unwrap();
    let user_id = user["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .get(format!(
            "{}/loans?status=active&user_id={}",
            BASE_URL, user_id
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    assert_eq!(body["filters"]["status"], "active");
    assert_eq!(body["filters"]["user_id"], user_id);

    // Bad status value is rejected inside the envelope
    let response = client
        .get(format!("{}/loans?status=overdue", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}
