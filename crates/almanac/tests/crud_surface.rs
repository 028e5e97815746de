//! End-to-end tests of the CRUD surface through the in-process client.

use almanac::{build_server, AppConfig};
use almanac_test::TestClient;
use http::StatusCode;
use serde_json::{json, Value};

fn client() -> TestClient {
    TestClient::new(build_server(&AppConfig::default()))
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let response = client().get("/health").send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let response = client().get("/api/unknown").as_user("u").send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["type"], "NotFoundException");
}

#[tokio::test]
async fn book_create_get_list_round_trip() {
    let client = client();

    let created = client
        .post("/api/book/post?title=IT&author=Stephen+King&genre=Horror")
        .as_admin("editor")
        .send()
        .await;
    assert_eq!(created.status(), StatusCode::OK);
    let book: Value = created.json();
    assert_eq!(book["id"], 1);
    assert_eq!(book["title"], "IT");
    assert_eq!(book["author"], "Stephen King");
    assert_eq!(book["genre"], "Horror");

    let fetched = client.get("/api/book?id=1").as_user("reader").send().await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(fetched.json::<Value>(), book);

    let listed = client.get("/api/book/all").as_user("reader").send().await;
    assert_eq!(listed.status(), StatusCode::OK);
    let all: Vec<Value> = listed.json();
    assert_eq!(all, vec![book]);
}

#[tokio::test]
async fn list_is_empty_on_fresh_store() {
    let response = client().get("/api/park/all").as_user("reader").send().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Vec<Value>>(), Vec::<Value>::new());
}

#[tokio::test]
async fn ids_are_assigned_sequentially_per_kind() {
    let client = client();
    for title in ["First", "Second", "Third"] {
        client
            .post(&format!("/api/book/post?title={title}&author=A&genre=G"))
            .as_admin("editor")
            .send()
            .await;
    }
    // Kinds do not share a counter.
    let park = client
        .post("/api/park/post?name=Green&address=1+Elm&rating=4.5")
        .as_admin("editor")
        .send()
        .await;
    assert_eq!(park.json::<Value>()["id"], 1);

    let books: Vec<Value> = client
        .get("/api/book/all")
        .as_user("reader")
        .send()
        .await
        .json();
    let ids: Vec<i64> = books.iter().map(|b| b["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, [1, 2, 3]);
}

#[tokio::test]
async fn get_absent_book_is_404_with_exact_envelope() {
    let response = client().get("/api/book?id=7").as_user("reader").send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.text(),
        r#"{"type":"EntityNotFoundException","message":"Book with id 7 not found"}"#
    );
}

#[tokio::test]
async fn delete_absent_park_is_404_with_exact_envelope() {
    let response = client()
        .delete("/api/park?id=15")
        .as_admin("editor")
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.text(),
        r#"{"type":"EntityNotFoundException","message":"Park with id 15 not found"}"#
    );
}

#[tokio::test]
async fn create_restaurant_from_query_args() {
    let response = client()
        .post(
            "/api/restaurant/post?name=Freebirds&address=879+Embarcadero+del+Norte&city=Isla+Vista&state=CA&zip=93117&description=Burritos",
        )
        .as_admin("editor")
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let restaurant: Value = response.json();
    assert_eq!(restaurant["id"], 1);
    assert_eq!(restaurant["name"], "Freebirds");
    assert_eq!(restaurant["address"], "879 Embarcadero del Norte");
    assert_eq!(restaurant["city"], "Isla Vista");
    assert_eq!(restaurant["state"], "CA");
    assert_eq!(restaurant["zip"], "93117");
}

#[tokio::test]
async fn create_with_missing_field_is_400() {
    let response = client()
        .post("/api/book/post?title=OnlyTitle")
        .as_admin("editor")
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["type"], "BadRequestException");
}

#[tokio::test]
async fn update_park_replaces_fields_and_keeps_id() {
    let client = client();
    client
        .post("/api/park/post?name=Old+Park&address=1+Old+Rd&rating=2.0")
        .as_admin("editor")
        .send()
        .await;

    let updated = client
        .put("/api/park?id=1")
        .as_admin("editor")
        .json(&json!({
            "name": "Changed Park",
            "address": "1234 Fake Ave",
            "rating": "4.0",
        }))
        .send()
        .await;

    assert_eq!(updated.status(), StatusCode::OK);
    let park: Value = updated.json();
    assert_eq!(park["id"], 1);
    assert_eq!(park["name"], "Changed Park");
    assert_eq!(park["address"], "1234 Fake Ave");
    assert_eq!(park["rating"], "4.0");

    // Update replaces in place, it never appends.
    let all: Vec<Value> = client
        .get("/api/park/all")
        .as_user("reader")
        .send()
        .await
        .json();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn update_is_idempotent() {
    let client = client();
    client
        .post("/api/park/post?name=Old+Park&address=1+Old+Rd&rating=2.0")
        .as_admin("editor")
        .send()
        .await;

    let payload = json!({
        "name": "Changed Park",
        "address": "1234 Fake Ave",
        "rating": "4.0",
    });
    let first = client
        .put("/api/park?id=1")
        .as_admin("editor")
        .json(&payload)
        .send()
        .await;
    let second = client
        .put("/api/park?id=1")
        .as_admin("editor")
        .json(&payload)
        .send()
        .await;

    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(first.json::<Value>(), second.json::<Value>());

    let all: Vec<Value> = client
        .get("/api/park/all")
        .as_user("reader")
        .send()
        .await
        .json();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn update_absent_park_is_404() {
    let response = client()
        .put("/api/park?id=67")
        .as_admin("editor")
        .json(&json!({
            "name": "Changed Park",
            "address": "1234 Fake Ave",
            "rating": "4.0",
        }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["message"], "Park with id 67 not found");
}

#[tokio::test]
async fn update_with_missing_field_is_400() {
    let client = client();
    client
        .post("/api/park/post?name=P&address=A&rating=1.0")
        .as_admin("editor")
        .send()
        .await;

    let response = client
        .put("/api/park?id=1")
        .as_admin("editor")
        .json(&json!({"name": "Changed Park"}))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_tolerates_stray_id_in_body() {
    let client = client();
    client
        .post("/api/book/post?title=T&author=A&genre=G")
        .as_admin("editor")
        .send()
        .await;

    let response = client
        .put("/api/book?id=1")
        .as_admin("editor")
        .json(&json!({
            "id": 999,
            "title": "T2",
            "author": "A2",
            "genre": "G2",
        }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    // The query-string id wins; the body id is ignored.
    assert_eq!(response.json::<Value>()["id"], 1);
}

#[tokio::test]
async fn delete_book_confirms_and_removes() {
    let client = client();
    client
        .post("/api/book/post?title=T&author=A&genre=G")
        .as_admin("editor")
        .send()
        .await;

    let deleted = client.delete("/api/book?id=1").as_admin("editor").send().await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(deleted.text(), r#"{"message":"Book with id 1 deleted"}"#);

    let gone = client.get("/api/book?id=1").as_user("reader").send().await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_integer_id_is_400() {
    let client = client();
    for request in [
        client.get("/api/book?id=abc").as_user("reader"),
        client.delete("/api/book?id=abc").as_admin("editor"),
    ] {
        let response = request.send().await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["type"], "BadRequestException");
    }
}

#[tokio::test]
async fn missing_id_is_400() {
    let response = client().get("/api/book").as_user("reader").send().await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
