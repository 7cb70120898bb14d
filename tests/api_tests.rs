mod common;

use axum::http::StatusCode;
use common::spawn_app;
use serde_json::json;
use yamdb::constants::messages;
use yamdb::domain::Role;

#[tokio::test]
async fn test_category_permissions() {
    let app = spawn_app().await;
    let user = app.login("reader").await;
    let admin = app.login_as("root", Role::Admin).await;
    let payload = json!({"name": "Films", "slug": "films"});

    let (status, body) = app.get("/categories/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let (status, _) = app.post("/categories/", None, payload.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/categories/", Some(&user), payload.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post("/categories/", Some(&admin), payload).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"name": "Films", "slug": "films"}));

    let (status, body) = app.get("/categories/films/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Films");
}

#[tokio::test]
async fn test_term_slug_rules() {
    let app = spawn_app().await;
    let admin = app.login_as("root", Role::Admin).await;

    let (status, _) = app
        .post("/genres/", Some(&admin), json!({"name": "Drama", "slug": "drama"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post("/genres/", Some(&admin), json!({"name": "Other", "slug": "drama"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["slug"][0], messages::SLUG_TAKEN);

    let (status, body) = app
        .post("/genres/", Some(&admin), json!({"name": "Bad", "slug": "not a slug"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["slug"].is_array());

    let (status, body) = app
        .patch("/genres/drama/", Some(&admin), json!({"slug": "tragedy"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["slug"][0], messages::SLUG_IMMUTABLE);

    let (status, body) = app
        .patch("/genres/drama/", Some(&admin), json!({"name": "Drama & Tragedy"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"name": "Drama & Tragedy", "slug": "drama"}));

    let (status, _) = app.delete("/genres/drama/", Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/genres/drama/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_put_is_not_routed() {
    let app = spawn_app().await;
    let (status, _) = app
        .send("PUT", "/categories/", None, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_search_and_pagination() {
    let app = spawn_app().await;
    let admin = app.login_as("root", Role::Admin).await;

    for (name, slug) in [
        ("Rock", "rock"),
        ("Jazz", "jazz"),
        ("Punk rock", "punk-rock"),
    ] {
        let (status, _) = app
            .post("/genres/", Some(&admin), json!({"name": name, "slug": slug}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.get("/genres/?search=rock", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (status, body) = app.get("/genres/?page_size=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["next"], "/api/v1/genres/?page_size=2&page=2");
    assert!(body["previous"].is_null());

    let (status, body) = app.get("/genres/?page_size=2&page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert!(body["next"].is_null());
    assert_eq!(body["previous"], "/api/v1/genres/?page_size=2");

    let (status, _) = app.get("/genres/?page_size=2&page=3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_huge_page_numbers_are_not_found() {
    let app = spawn_app().await;

    for path in [
        "/categories/?page=18446744073709551615",
        "/genres/?page=18446744073709551615&page_size=100",
        "/titles/?page=9223372036854775807",
    ] {
        let (status, body) = app.get(path, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(body["detail"], "Invalid page.");
    }

    let (status, _) = app.get("/categories/", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_title_representation_and_validation() {
    let app = spawn_app().await;
    let admin = app.login_as("root", Role::Admin).await;
    let id = app.seed_catalog(&admin).await;

    let (status, body) = app.get(&format!("/titles/{id}/"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "War and Peace");
    assert_eq!(body["year"], 1869);
    assert!(body["rating"].is_null());
    assert_eq!(body["category"], json!({"name": "Books", "slug": "books"}));
    assert_eq!(body["genre"], json!([{"name": "Drama", "slug": "drama"}]));

    let (status, body) = app
        .post(
            "/titles/",
            Some(&admin),
            json!({"name": "Future", "year": 9999, "category": "books", "genre": ["drama"]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["year"].is_array());

    let (status, body) = app
        .post(
            "/titles/",
            Some(&admin),
            json!({"name": "Ghost", "year": 2000, "category": "books", "genre": ["horror"]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["genre"].is_array());

    let (status, body) = app
        .post(
            "/titles/",
            Some(&admin),
            json!({"name": "Empty", "year": 2000, "category": "books", "genre": []}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["genre"].is_array());

    let (status, body) = app
        .post(
            "/titles/",
            Some(&admin),
            json!({"name": "War and Peace", "year": 1869, "category": "books", "genre": ["drama"]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["non_field_errors"][0], messages::DUPLICATE_TITLE);
}

#[tokio::test]
async fn test_title_update_and_delete() {
    let app = spawn_app().await;
    let admin = app.login_as("root", Role::Admin).await;
    let id = app.seed_catalog(&admin).await;

    let (status, body) = app
        .patch(
            &format!("/titles/{id}/"),
            Some(&admin),
            json!({"genre": ["drama", "comedy"], "description": "Long."}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["genre"].as_array().unwrap().len(), 2);
    assert_eq!(body["description"], "Long.");
    assert_eq!(body["name"], "War and Peace");

    let (status, _) = app.delete(&format!("/titles/{id}/"), Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/titles/{id}/"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/titles/not-a-number/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_title_filters_combine() {
    let app = spawn_app().await;
    let admin = app.login_as("root", Role::Admin).await;
    app.seed_catalog(&admin).await;

    let (status, _) = app
        .post("/categories/", Some(&admin), json!({"name": "Films", "slug": "films"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    app.create_title(&admin, "Anna Karenina", 1878, "books", &["drama"])
        .await;
    app.create_title(&admin, "Anna Karenina", 2012, "films", &["drama"])
        .await;
    app.create_title(&admin, "Dead Souls", 1842, "books", &["comedy"])
        .await;

    let (_, body) = app.get("/titles/?genre=drama", None).await;
    assert_eq!(body["count"], 3);

    let (_, body) = app.get("/titles/?genre=drama&category=books", None).await;
    assert_eq!(body["count"], 2);

    let (_, body) = app
        .get("/titles/?name=anna&category=films", None)
        .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["year"], 2012);

    let (_, body) = app.get("/titles/?year=1842&genre=drama", None).await;
    assert_eq!(body["count"], 0);

    let (status, _) = app.get("/titles/?year=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = spawn_app().await;
    let user = app.login("reader").await;
    let admin = app.login_as("root", Role::Admin).await;

    let (status, body) = app.get("/system/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");

    let (status, body) = app.get("/system/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);

    let (status, _) = app.get("/system/metrics", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/system/metrics", Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/system/metrics", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
}
