//! Integration tests for meeting endpoints and meeting questions.
//!
//! Tests cover:
//! - POST /meetings
//! - GET /meetings (keyword and category search)
//! - GET /meetings/:id
//! - PATCH /meetings/:id/close
//! - GET /mypage/meetings/hosts and /mypage/meetings/participants (paging)
//! - POST/GET /meetings/:id/questions

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_authenticated_user, create_meeting, create_test_app, create_test_pool,
    days_from_today, empty_request, free_meeting_body, get_request, json_request,
    parse_response_body, run_migrations, send, test_config,
};
use serde_json::json;

// =============================================================================
// POST /meetings
// =============================================================================

#[tokio::test]
async fn test_create_and_fetch_meeting() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool);

    let host = create_authenticated_user(&app).await;
    let body = free_meeting_body(days_from_today(7), days_from_today(14), 10_000, 2);
    let meeting_id = create_meeting(&app, &host, &body).await;

    let response = send(&app, get_request(&format!("/meetings/{}", meeting_id), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let detail = parse_response_body(response).await;
    assert_eq!(detail["meetingId"], meeting_id.as_str());
    assert_eq!(detail["title"], body["title"]);
    assert_eq!(detail["category"], "MENTORING");
    assert_eq!(detail["meetingState"], "OPEN");
    assert_eq!(detail["isOpen"], true);
    assert_eq!(detail["datePolicy"], "FREE");
    assert_eq!(detail["price"], 10_000);
    assert_eq!(detail["personnel"], 2);
    assert_eq!(detail["host"]["userId"], host.user_id.as_str());
    assert_eq!(detail["address"]["addressIds"], json!([1, 2]));
    assert_eq!(detail["dateTimeInfo"]["maxTime"], 3);
}

#[tokio::test]
async fn test_create_meeting_requires_token() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool);

    let body = free_meeting_body(days_from_today(7), days_from_today(14), 10_000, 2);
    let response = send(&app, json_request(Method::POST, "/meetings", None, &body)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_meeting_rejects_reversed_dates() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool);

    let host = create_authenticated_user(&app).await;
    let body = free_meeting_body(days_from_today(14), days_from_today(7), 10_000, 2);
    let response = send(
        &app,
        json_request(Method::POST, "/meetings", Some(&host.access_token), &body),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_get_unknown_meeting_is_not_found() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool);

    let uri = format!("/meetings/{}", uuid::Uuid::new_v4());
    let response = send(&app, get_request(&uri, None)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// GET /meetings
// =============================================================================

#[tokio::test]
async fn test_search_by_keyword_and_category() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool);

    let host = create_authenticated_user(&app).await;
    let body = free_meeting_body(days_from_today(7), days_from_today(14), 10_000, 2);
    let meeting_id = create_meeting(&app, &host, &body).await;
    let title = body["title"].as_str().unwrap();
    let keyword = title.rsplit(' ').next().unwrap();

    let uri = format!("/meetings?keyword={}&category=MENTORING&page=1&size=10", keyword);
    let response = send(&app, get_request(&uri, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = parse_response_body(response).await;
    assert_eq!(page["pageInfo"]["totalElements"], 1);
    assert_eq!(page["content"][0]["meetingId"], meeting_id.as_str());

    let uri = format!("/meetings?keyword={}&category=STUDY", keyword);
    let page = parse_response_body(send(&app, get_request(&uri, None)).await).await;
    assert_eq!(page["pageInfo"]["totalElements"], 0);
    assert_eq!(page["content"], json!([]));
}

// =============================================================================
// PATCH /meetings/:id/close
// =============================================================================

#[tokio::test]
async fn test_close_meeting() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool);

    let host = create_authenticated_user(&app).await;
    let other = create_authenticated_user(&app).await;
    let body = free_meeting_body(days_from_today(7), days_from_today(14), 10_000, 2);
    let meeting_id = create_meeting(&app, &host, &body).await;
    let uri = format!("/meetings/{}/close", meeting_id);

    let response = send(
        &app,
        empty_request(Method::PATCH, &uri, Some(&other.access_token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        empty_request(Method::PATCH, &uri, Some(&host.access_token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let detail = parse_response_body(
        send(&app, get_request(&format!("/meetings/{}", meeting_id), None)).await,
    )
    .await;
    assert_eq!(detail["meetingState"], "CLOSE");
    assert_eq!(detail["isOpen"], false);

    let response = send(
        &app,
        empty_request(Method::PATCH, &uri, Some(&host.access_token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "meeting_closed");
}

// =============================================================================
// GET /mypage/meetings/hosts
// =============================================================================

#[tokio::test]
async fn test_hosted_meetings_without_applications() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool);

    let host = create_authenticated_user(&app).await;
    let body = free_meeting_body(days_from_today(7), days_from_today(14), 10_000, 2);
    let meeting_id = create_meeting(&app, &host, &body).await;

    let response = send(
        &app,
        get_request("/mypage/meetings/hosts", Some(&host.access_token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let hosted = parse_response_body(response).await;
    assert_eq!(hosted["pageInfo"]["totalElements"], 1);
    assert_eq!(hosted["pageInfo"]["page"], 1);
    let content = hosted["content"].as_array().unwrap();
    assert_eq!(content.len(), 1);
    assert_eq!(content[0]["meetingId"], meeting_id.as_str());
    assert_eq!(content[0]["applications"]["requests"], json!([]));
    assert_eq!(content[0]["applications"]["confirmed"], json!([]));
}

#[tokio::test]
async fn test_hosted_meetings_are_paged() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool);

    let host = create_authenticated_user(&app).await;
    let mut ids = Vec::new();
    for _ in 0..3 {
        let body = free_meeting_body(days_from_today(7), days_from_today(14), 10_000, 2);
        ids.push(create_meeting(&app, &host, &body).await);
    }

    let response = send(
        &app,
        get_request(
            "/mypage/meetings/hosts?page=2&size=2",
            Some(&host.access_token),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = parse_response_body(response).await;
    assert_eq!(page["pageInfo"]["page"], 2);
    assert_eq!(page["pageInfo"]["size"], 2);
    assert_eq!(page["pageInfo"]["totalElements"], 3);
    assert_eq!(page["pageInfo"]["totalPages"], 2);
    // Newest first: the second page holds the oldest meeting.
    let content = page["content"].as_array().unwrap();
    assert_eq!(content.len(), 1);
    assert_eq!(content[0]["meetingId"], ids[0].as_str());
}

#[tokio::test]
async fn test_participated_meetings_empty_page() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool);

    let guest = create_authenticated_user(&app).await;
    let response = send(
        &app,
        get_request("/mypage/meetings/participants", Some(&guest.access_token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = parse_response_body(response).await;
    assert_eq!(page["content"], json!([]));
    assert_eq!(page["pageInfo"]["totalElements"], 0);
    assert_eq!(page["pageInfo"]["totalPages"], 0);
}

// =============================================================================
// /meetings/:id/questions
// =============================================================================

#[tokio::test]
async fn test_ask_and_list_questions() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool);

    let host = create_authenticated_user(&app).await;
    let guest = create_authenticated_user(&app).await;
    let body = free_meeting_body(days_from_today(7), days_from_today(14), 10_000, 2);
    let meeting_id = create_meeting(&app, &host, &body).await;
    let uri = format!("/meetings/{}/questions", meeting_id);

    for content in ["Is parking available?", "Can I bring a friend?"] {
        let response = send(
            &app,
            json_request(
                Method::POST,
                &uri,
                Some(&guest.access_token),
                &json!({"content": content}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(&app, get_request(&uri, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = parse_response_body(response).await;
    assert_eq!(page["pageInfo"]["totalElements"], 2);
    assert_eq!(page["content"][0]["content"], "Can I bring a friend?");
    assert_eq!(page["content"][0]["writer"]["userId"], guest.user_id.as_str());
}

#[tokio::test]
async fn test_question_on_unknown_meeting_is_not_found() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool);

    let guest = create_authenticated_user(&app).await;
    let uri = format!("/meetings/{}/questions", uuid::Uuid::new_v4());
    let response = send(
        &app,
        json_request(
            Method::POST,
            &uri,
            Some(&guest.access_token),
            &json!({"content": "Anyone there?"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_with_huge_page_is_empty() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool);

    let response = send(
        &app,
        get_request("/meetings?page=9223372036854775807&size=100", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = parse_response_body(response).await;
    assert_eq!(page["content"], json!([]));
    assert_eq!(page["pageInfo"]["page"], 9223372036854775807i64);
}
