// Integration tests for Profile Scout: GitHub client and routes against a mock server

use actix_web::{http::StatusCode, test, web, App};
use mockito::{Matcher, Mock, Server, ServerGuard};
use profile_scout::config::{GitHubSettings, ReportSettings, UploadSettings};
use profile_scout::core::ProfileAggregator;
use profile_scout::error::handle_json_payload_error;
use profile_scout::models::Repository;
use profile_scout::routes::{configure_routes, AppState};
use profile_scout::services::{GitHubClient, PlatformError};
use serde_json::{json, Value};
use std::sync::Arc;

fn settings(server: &ServerGuard, token: Option<&str>) -> GitHubSettings {
    GitHubSettings {
        api_base: server.url(),
        graphql_url: format!("{}/graphql", server.url()),
        token: token.map(str::to_string),
        ..GitHubSettings::default()
    }
}

fn aggregator(server: &ServerGuard, token: Option<&str>) -> ProfileAggregator {
    let client = GitHubClient::new(&settings(server, token)).unwrap();
    ProfileAggregator::new(Arc::new(client), 4)
}

fn app_state(server: &ServerGuard, upload: UploadSettings) -> AppState {
    AppState {
        aggregator: aggregator(server, None),
        upload,
        report: ReportSettings::default(),
    }
}

fn user_body(login: &str) -> String {
    json!({
        "login": login,
        "name": "Mona Octocat",
        "bio": "Builds things",
        "followers": 20,
        "following": 2,
        "public_repos": 3,
        "avatar_url": null,
    })
    .to_string()
}

fn repo_json(name: &str, stars: u64, language: Option<&str>, fork: bool) -> Value {
    json!({
        "name": name,
        "description": null,
        "html_url": format!("https://github.com/octocat/{}", name),
        "stargazers_count": stars,
        "forks_count": 1,
        "language": language,
        "fork": fork,
    })
}

async fn mock_user(server: &mut ServerGuard, login: &str) -> Mock {
    server
        .mock("GET", format!("/users/{}", login).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(user_body(login))
        .create_async()
        .await
}

async fn mock_repo_page(server: &mut ServerGuard, login: &str, page: u32, repos: Vec<Value>) -> Mock {
    server
        .mock("GET", format!("/users/{}/repos", login).as_str())
        .match_query(Matcher::UrlEncoded("page".into(), page.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(Value::Array(repos).to_string())
        .create_async()
        .await
}

async fn mock_languages(server: &mut ServerGuard, login: &str, repo: &str, status: usize, body: &str) -> Mock {
    server
        .mock("GET", format!("/repos/{}/{}/languages", login, repo).as_str())
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

fn multipart_body(filename: &str, content: &str) -> (String, String) {
    let boundary = "profile-scout-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n{c}\r\n--{b}--\r\n",
        b = boundary,
        f = filename,
        c = content
    );
    (format!("multipart/form-data; boundary={}", boundary), body)
}

#[tokio::test]
async fn test_unknown_user_is_not_found_without_further_calls() {
    let mut server = Server::new_async().await;
    let _user = server
        .mock("GET", "/users/ghost")
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create_async()
        .await;
    let repos = server
        .mock("GET", "/users/ghost/repos")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let result = aggregator(&server, Some("token")).aggregate("ghost").await;

    assert!(matches!(result, Err(PlatformError::NotFound(name)) if name == "ghost"));
    repos.assert_async().await;
}

#[tokio::test]
async fn test_repository_listing_pages_until_empty() {
    let mut server = Server::new_async().await;
    let _page1 = mock_repo_page(
        &mut server,
        "octocat",
        1,
        vec![
            repo_json("forked", 50, Some("C"), true),
            repo_json("small", 5, Some("Go"), false),
            repo_json("popular", 9, Some("Rust"), false),
        ],
    )
    .await;
    let _page2 = mock_repo_page(&mut server, "octocat", 2, vec![repo_json("also-popular", 9, None, false)]).await;
    let _page3 = mock_repo_page(&mut server, "octocat", 3, vec![]).await;

    let repositories = aggregator(&server, None).list_repositories("octocat").await;

    let names: Vec<&str> = repositories.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["popular", "also-popular", "small"]);
}

#[tokio::test]
async fn test_failed_page_keeps_collected_repositories() {
    let mut server = Server::new_async().await;
    let _page1 = mock_repo_page(&mut server, "octocat", 1, vec![repo_json("kept", 1, None, false)]).await;
    let _failed_page = server
        .mock("GET", "/users/octocat/repos")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(500)
        .create_async()
        .await;

    let repositories = aggregator(&server, None).list_repositories("octocat").await;

    assert_eq!(repositories.len(), 1);
    assert_eq!(repositories[0].name, "kept");
}

#[tokio::test]
async fn test_language_failure_falls_back_to_primary_language() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "octocat").await;
    let _page1 = mock_repo_page(
        &mut server,
        "octocat",
        1,
        vec![
            repo_json("engine", 10, Some("Rust"), false),
            repo_json("scripts", 2, Some("Python"), false),
        ],
    )
    .await;
    let _page2 = mock_repo_page(&mut server, "octocat", 2, vec![]).await;
    let _engine_languages = mock_languages(&mut server, "octocat", "engine", 200, r#"{"Rust":300,"Go":100}"#).await;
    let _scripts_languages = mock_languages(&mut server, "octocat", "scripts", 500, "{}").await;
    let graphql = server.mock("POST", "/graphql").expect(0).create_async().await;

    let profile = aggregator(&server, None).aggregate("octocat").await.unwrap();

    let languages: Vec<(&str, f64)> = profile
        .languages
        .iter()
        .map(|share| (share.language.as_str(), share.percentage))
        .collect();
    assert_eq!(languages, vec![("Rust", 74.8), ("Go", 24.9), ("Python", 0.2)]);

    assert_eq!(profile.contributions.total, 0);
    assert_eq!(profile.contributions.current_streak, 0);
    graphql.assert_async().await;
}

#[tokio::test]
async fn test_fail_open_aggregator_calls() {
    let mut server = Server::new_async().await;
    let _tool_languages = mock_languages(&mut server, "octocat", "tool", 404, "{}").await;
    let scout = aggregator(&server, None);

    let calendar = scout.contribution_calendar("octocat").await;
    assert_eq!(calendar.total_contributions, 0);
    assert!(calendar.days.is_empty());

    let repository = Repository {
        name: "tool".to_string(),
        description: None,
        url: "https://github.com/octocat/tool".to_string(),
        stars: 0,
        forks: 0,
        primary_language: Some("Zig".to_string()),
    };
    let bytes = scout.language_bytes("octocat", &repository).await;
    assert_eq!(bytes, vec![("Zig".to_string(), 1)]);
}

#[tokio::test]
async fn test_contribution_calendar_from_graphql() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "octocat").await;
    let _page1 = mock_repo_page(&mut server, "octocat", 1, vec![]).await;
    let _calendar = server
        .mock("POST", "/graphql")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": {
                    "user": {
                        "contributionsCollection": {
                            "contributionCalendar": {
                                "totalContributions": 7,
                                "weeks": [
                                    {"contributionDays": [
                                        {"date": "2024-05-01", "contributionCount": 1},
                                        {"date": "2024-05-02", "contributionCount": 2}
                                    ]},
                                    {"contributionDays": [
                                        {"date": "2024-05-03", "contributionCount": 0},
                                        {"date": "2024-05-04", "contributionCount": 4}
                                    ]}
                                ]
                            }
                        }
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let profile = aggregator(&server, Some("test-token")).aggregate("octocat").await.unwrap();

    assert_eq!(profile.contributions.total, 7);
    assert_eq!(profile.contributions.longest_streak, 2);
    assert_eq!(profile.contributions.current_streak, 1);
    assert_eq!(profile.contributions.days.len(), 4);
    assert!(profile.repositories.is_empty());
    assert!(profile.languages.is_empty());
}

#[tokio::test]
async fn test_graphql_server_error_gives_empty_calendar() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "octocat").await;
    let _page1 = mock_repo_page(&mut server, "octocat", 1, vec![]).await;
    let _calendar = server
        .mock("POST", "/graphql")
        .with_status(502)
        .with_body("Bad Gateway")
        .expect_at_least(1)
        .create_async()
        .await;
    let scout = aggregator(&server, Some("test-token"));

    let result = scout.client().fetch_contribution_calendar("octocat").await;
    assert!(matches!(result, Err(PlatformError::UnexpectedStatus { status: 502, .. })));

    let profile = scout.aggregate("octocat").await.unwrap();
    assert_eq!(profile.contributions.total, 0);
    assert_eq!(profile.contributions.longest_streak, 0);
    assert!(profile.contributions.days.is_empty());
}

#[tokio::test]
async fn test_graphql_errors_without_user_give_empty_calendar() {
    let mut server = Server::new_async().await;
    let _calendar = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": { "user": null },
                "errors": [{ "message": "Could not resolve to a User with the login of 'octocat'." }]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let scout = aggregator(&server, Some("test-token"));

    match scout.client().fetch_contribution_calendar("octocat").await {
        Err(PlatformError::InvalidResponse(message)) => assert!(message.contains("Could not resolve")),
        other => panic!("expected an invalid response, got {:?}", other),
    }

    let calendar = scout.contribution_calendar("octocat").await;
    assert_eq!(calendar.total_contributions, 0);
    assert!(calendar.days.is_empty());
}

#[tokio::test]
async fn test_graphql_transport_failure_gives_empty_calendar() {
    let server = Server::new_async().await;
    let unreachable = GitHubSettings {
        graphql_url: "http://127.0.0.1:1/graphql".to_string(),
        ..settings(&server, Some("test-token"))
    };
    let scout = ProfileAggregator::new(Arc::new(GitHubClient::new(&unreachable).unwrap()), 4);

    let result = scout.client().fetch_contribution_calendar("octocat").await;
    assert!(matches!(result, Err(PlatformError::Network(_))));

    let calendar = scout.contribution_calendar("octocat").await;
    assert_eq!(calendar.total_contributions, 0);
    assert!(calendar.days.is_empty());
}

#[tokio::test]
async fn test_aggregation_is_idempotent() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "octocat").await;
    let _page1 = mock_repo_page(
        &mut server,
        "octocat",
        1,
        vec![repo_json("a", 3, Some("Go"), false), repo_json("b", 3, Some("Rust"), false)],
    )
    .await;
    let _page2 = mock_repo_page(&mut server, "octocat", 2, vec![]).await;
    let _a_languages = mock_languages(&mut server, "octocat", "a", 200, r#"{"Go":50}"#).await;
    let _b_languages = mock_languages(&mut server, "octocat", "b", 200, r#"{"Rust":50}"#).await;

    let scout = aggregator(&server, None);
    let first = scout.aggregate("octocat").await.unwrap();
    let second = scout.aggregate("octocat").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.languages[0].language, "Go");
}

#[actix_web::test]
async fn test_health_route() {
    let server = Server::new_async().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server, UploadSettings::default())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_invalid_username_is_rejected_before_fetch() {
    let mut server = Server::new_async().await;
    let any = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server, UploadSettings::default())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/profile/bad.name").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    any.assert_async().await;
}

#[actix_web::test]
async fn test_analyze_routes() {
    let server = Server::new_async().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server, UploadSettings::default())))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/analyze")
        .set_json(json!({"text": "Backend engineer, no links here"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "No GitHub profile found");

    let req = test::TestRequest::post()
        .uri("/api/analyze")
        .set_json(json!({"text": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/analyze")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[actix_web::test]
async fn test_upload_resolves_and_verifies_username() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "octocat").await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server, UploadSettings::default())))
            .configure(configure_routes),
    )
    .await;

    let (content_type, body) = multipart_body("resume.txt", "Portfolio: https://github.com/octocat");
    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["githubUsername"], "octocat");
}

#[actix_web::test]
async fn test_upload_rejections() {
    let server = Server::new_async().await;
    let upload = UploadSettings {
        max_bytes: 16,
        ..UploadSettings::default()
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server, upload)))
            .configure(configure_routes),
    )
    .await;

    let (content_type, body) = multipart_body("resume.exe", "hello");
    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let (content_type, body) = multipart_body("resume.txt", &"x".repeat(64));
    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[actix_web::test]
async fn test_export_returns_pdf_attachment() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "octocat").await;
    let _page1 = mock_repo_page(&mut server, "octocat", 1, vec![repo_json("engine", 4, Some("Rust"), false)]).await;
    let _page2 = mock_repo_page(&mut server, "octocat", 2, vec![]).await;
    let _engine_languages = mock_languages(&mut server, "octocat", "engine", 200, r#"{"Rust":1000}"#).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server, UploadSettings::default())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/profile/octocat/export").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-disposition").unwrap(),
        "attachment; filename=octocat_profile.pdf"
    );
    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"%PDF"));
}

#[actix_web::test]
async fn test_export_of_unknown_user_is_json_not_found() {
    let mut server = Server::new_async().await;
    let _user = server
        .mock("GET", "/users/ghost")
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create_async()
        .await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server, UploadSettings::default())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/profile/ghost/export").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.headers().get("content-disposition").is_none());
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap().to_string();
    assert!(content_type.starts_with("application/json"));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "GitHub user not found: ghost");
}

#[actix_web::test]
async fn test_oversized_json_body_is_payload_too_large() {
    let server = Server::new_async().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server, UploadSettings::default())))
            .app_data(
                web::JsonConfig::default()
                    .limit(64)
                    .error_handler(handle_json_payload_error),
            )
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/analyze")
        .set_json(json!({ "text": "x".repeat(256) }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Request body too large. Maximum size is 64 bytes");
}
