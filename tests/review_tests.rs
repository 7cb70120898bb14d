mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::spawn_app;
use serde_json::json;
use yamdb::api::ApiError;
use yamdb::constants::messages;
use yamdb::db::is_unique_violation;
use yamdb::db::repositories::title::NewTitle;
use yamdb::domain::Role;
use yamdb::services::{CatalogError, ReviewError};

#[tokio::test]
async fn test_rating_is_rounded_mean_of_scores() {
    let app = spawn_app().await;
    let admin = app.login_as("root", Role::Admin).await;
    let id = app.seed_catalog(&admin).await;
    let alice = app.login("alice").await;
    let bob = app.login("bob").await;
    let reviews = format!("/titles/{id}/reviews/");

    let (_, body) = app.get(&format!("/titles/{id}/"), None).await;
    assert!(body["rating"].is_null());

    let (status, body) = app
        .post(&reviews, Some(&alice), json!({"text": "Great", "score": 10}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author"], "alice");
    assert_eq!(body["score"], 10);
    assert!(body["pub_date"].is_string());

    let (status, _) = app
        .post(&reviews, Some(&bob), json!({"text": "Good", "score": 8}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app.get(&format!("/titles/{id}/"), None).await;
    assert_eq!(body["rating"], 9);

    let (_, body) = app.get("/titles/", None).await;
    assert_eq!(body["results"][0]["rating"], 9);

    let (status, body) = app.get(&reviews, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_second_review_by_same_author_is_rejected() {
    let app = spawn_app().await;
    let admin = app.login_as("root", Role::Admin).await;
    let id = app.seed_catalog(&admin).await;
    let alice = app.login("alice").await;
    let reviews = format!("/titles/{id}/reviews/");

    let (status, _) = app
        .post(&reviews, Some(&alice), json!({"text": "First", "score": 7}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(&reviews, Some(&alice), json!({"text": "Again", "score": 3}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["non_field_errors"][0], messages::DUPLICATE_REVIEW);
}

#[tokio::test]
async fn test_review_validation_and_anonymous_post() {
    let app = spawn_app().await;
    let admin = app.login_as("root", Role::Admin).await;
    let id = app.seed_catalog(&admin).await;
    let alice = app.login("alice").await;
    let reviews = format!("/titles/{id}/reviews/");

    let (status, _) = app
        .post(&reviews, None, json!({"text": "Anon", "score": 5}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    for score in [0, 11] {
        let (status, body) = app
            .post(&reviews, Some(&alice), json!({"text": "Bad", "score": score}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["score"].is_array());
    }

    let (status, body) = app
        .post(&reviews, Some(&alice), json!({"text": "a".repeat(257), "score": 5}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["text"].is_array());

    let (status, _) = app
        .post("/titles/9999/reviews/", Some(&alice), json!({"text": "x", "score": 5}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_edit_permissions() {
    let app = spawn_app().await;
    let admin = app.login_as("root", Role::Admin).await;
    let id = app.seed_catalog(&admin).await;
    let author = app.login("author").await;
    let other = app.login("other").await;
    let moderator = app.login_as("mod", Role::Moderator).await;

    let (_, body) = app
        .post(
            &format!("/titles/{id}/reviews/"),
            Some(&author),
            json!({"text": "Mine", "score": 6}),
        )
        .await;
    let review = format!("/titles/{id}/reviews/{}/", body["id"]);

    let (status, _) = app.patch(&review, None, json!({"score": 1})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.patch(&review, Some(&other), json!({"score": 1})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.patch(&review, Some(&author), json!({"score": 9})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 9);
    assert_eq!(body["text"], "Mine");

    let (status, body) = app
        .patch(&review, Some(&moderator), json!({"text": "Edited"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Edited");
    assert_eq!(body["author"], "author");

    let (status, _) = app.delete(&review, Some(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&review, Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_comments_lifecycle() {
    let app = spawn_app().await;
    let admin = app.login_as("root", Role::Admin).await;
    let id = app.seed_catalog(&admin).await;
    let alice = app.login("alice").await;
    let bob = app.login("bob").await;

    let (_, body) = app
        .post(
            &format!("/titles/{id}/reviews/"),
            Some(&alice),
            json!({"text": "Review", "score": 5}),
        )
        .await;
    let comments = format!("/titles/{id}/reviews/{}/comments/", body["id"]);

    let (status, body) = app
        .post(&comments, Some(&bob), json!({"text": "Disagree"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author"], "bob");
    let comment = format!("{comments}{}/", body["id"]);

    let (status, body) = app.get(&comments, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, _) = app.patch(&comment, Some(&alice), json!({"text": "x"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .patch(&comment, Some(&bob), json!({"text": "Agree"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Agree");

    let (status, body) = app.post(&comments, Some(&bob), json!({"text": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["text"].is_array());

    let (status, _) = app.delete(&comment, Some(&bob)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&comment, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nested_resources_must_match_parent() {
    let app = spawn_app().await;
    let admin = app.login_as("root", Role::Admin).await;
    let first = app.seed_catalog(&admin).await;
    let second = app
        .create_title(&admin, "Resurrection", 1899, "books", &["drama"])
        .await;
    let alice = app.login("alice").await;

    let (_, body) = app
        .post(
            &format!("/titles/{first}/reviews/"),
            Some(&alice),
            json!({"text": "One", "score": 5}),
        )
        .await;
    let first_review = body["id"].as_i64().unwrap();

    let (_, body) = app
        .post(
            &format!("/titles/{second}/reviews/"),
            Some(&alice),
            json!({"text": "Two", "score": 6}),
        )
        .await;
    let second_review = body["id"].as_i64().unwrap();

    let (status, _) = app
        .get(&format!("/titles/{second}/reviews/{first_review}/"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post(
            &format!("/titles/{first}/reviews/{first_review}/comments/"),
            Some(&alice),
            json!({"text": "Note"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment = body["id"].as_i64().unwrap();

    let (status, _) = app
        .get(
            &format!("/titles/{second}/reviews/{second_review}/comments/{comment}/"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .get(
            &format!("/titles/{second}/reviews/{first_review}/comments/"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_own_profile_cannot_change_role() {
    let app = spawn_app().await;
    let alice = app.login("alice").await;

    let (status, _) = app.get("/users/me/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .patch(
            "/users/me/",
            Some(&alice),
            json!({"role": "admin", "bio": "Reader of long novels"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
    assert_eq!(body["bio"], "Reader of long novels");

    let (status, _) = app.get("/users/", Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_manages_users() {
    let app = spawn_app().await;
    let admin = app.login_as("root", Role::Admin).await;

    let (status, body) = app
        .post(
            "/users/",
            Some(&admin),
            json!({"username": "eve", "email": "eve@example.com", "role": "moderator"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "moderator");

    let (status, body) = app
        .post(
            "/users/",
            Some(&admin),
            json!({"username": "eve", "email": "eve2@example.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["username"][0], messages::USERNAME_TAKEN);

    let (status, body) = app
        .post(
            "/users/",
            Some(&admin),
            json!({"username": "frank", "email": "frank@example.com", "role": "king"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["role"].is_array());

    let (status, body) = app.get("/users/?search=ev", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, body) = app
        .patch("/users/eve/", Some(&admin), json!({"role": "user"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");

    let (status, _) = app.delete("/users/eve/", Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/users/eve/", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/users/me/", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "root");
}

#[tokio::test]
async fn test_unique_indexes_reject_duplicates_past_the_checks() {
    let app = spawn_app().await;
    let admin = app.login_as("root", Role::Admin).await;
    let id = app.seed_catalog(&admin).await;
    let title_id = i32::try_from(id).unwrap();
    app.login("alice").await;
    let store = &app.shared.store;

    let alice = store
        .user_repo()
        .get_by_username("alice")
        .await
        .unwrap()
        .unwrap();
    let reviews = store.review_repo();
    reviews.create(title_id, alice.id, "First", 7).await.unwrap();

    let err = reviews
        .create(title_id, alice.id, "Second", 3)
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err));
    let err = ReviewError::from(err);
    assert!(matches!(err, ReviewError::Conflict(_)));
    let response = ApiError::from(err).into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let existing = store.title_repo().get(title_id).await.unwrap().unwrap();
    let err = store
        .title_repo()
        .create(NewTitle {
            name: existing.name.clone(),
            year: 1900,
            description: String::new(),
            category_id: existing.category_id,
            genre_ids: Vec::new(),
        })
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err));
    assert!(matches!(CatalogError::from(err), CatalogError::Conflict(_)));

    let (_, body) = app.get(&format!("/titles/{id}/reviews/"), None).await;
    assert_eq!(body["count"], 1);
    let (_, body) = app.get("/titles/", None).await;
    assert_eq!(body["count"], 1);
}
