use chrono::Duration;
use serde_json::json;

use profile_api::authentication::encode_token;

use crate::helpers::{TestUser, spawn_app};

#[actix_web::test]
async fn protected_routes_reject_requests_without_a_token() {
    // Arrange
    let app = spawn_app().await;
    let url = format!("{}/profile", &app.address);

    let requests = vec![
        (app.api_client.get(&url), "GET /profile"),
        (
            app.api_client.post(&url).json(&json!({ "status": "Developer" })),
            "POST /profile",
        ),
    ];

    for (request, description) in requests {
        // Act
        let response = request.send().await.expect("Failed to execute request.");

        // Assert
        assert_eq!(
            401,
            response.status().as_u16(),
            "{} was not rejected without a token.",
            description
        );
        assert_eq!("Bearer", response.headers()["WWW-Authenticate"]);
    }
}

#[actix_web::test]
async fn malformed_authorization_headers_are_rejected() {
    // Arrange
    let app = spawn_app().await;
    let test_cases = vec![
        ("Bearer not-a-jwt", "a garbage token"),
        ("Basic YWRhOnBhc3N3b3Jk", "basic credentials"),
        ("Bearer", "an empty bearer header"),
    ];

    for (header, description) in test_cases {
        // Act
        let response = app
            .api_client
            .get(&format!("{}/profile", &app.address))
            .header("Authorization", header)
            .send()
            .await
            .expect("Failed to execute request.");

        // Assert
        assert_eq!(
            401,
            response.status().as_u16(),
            "The API did not return a 401 Unauthorized for {}.",
            description
        );
    }
}

#[actix_web::test]
async fn expired_tokens_are_rejected() {
    // Arrange
    let app = spawn_app().await;
    let token = encode_token(app.test_user.user_id, &app.jwt_secret, Duration::hours(-2))
        .expect("Failed to issue a test token.");

    // Act
    let response = app
        .api_client
        .post(&format!("{}/profile", &app.address))
        .bearer_auth(token)
        .json(&json!({ "status": "Developer" }))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(401, response.status().as_u16());
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[actix_web::test]
async fn public_routes_do_not_need_a_token() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.get_all_profiles().await;

    // Assert
    assert_eq!(200, response.status().as_u16());
}

#[actix_web::test]
async fn tokens_for_users_not_on_record_are_rejected() {
    // Arrange
    let app = spawn_app().await;
    let unknown_user = TestUser::generate();
    let token = app.token_for(&unknown_user);
    let url = format!("{}/profile", &app.address);

    let requests = vec![
        (app.api_client.get(&url), "GET /profile"),
        (
            app.api_client.post(&url).json(&json!({ "status": "Developer" })),
            "POST /profile",
        ),
    ];

    for (request, description) in requests {
        // Act
        let response = request
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to execute request.");

        // Assert
        assert_eq!(
            401,
            response.status().as_u16(),
            "{} accepted a token for an unknown user.",
            description
        );
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
