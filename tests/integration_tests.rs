//! Integration tests for the HTTP transport using wiremock servers.

use safecall::metadata::RequestMetadata;
use safecall::{ApiError, Client, Error, ErrorCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestData {
    id: u32,
    name: String,
}

fn client_for(mock_server: &MockServer) -> Client {
    Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_successful_get_request() {
    let mock_server = MockServer::start().await;

    let response_data = TestData {
        id: 1,
        name: "Test".to_string(),
    };

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_data))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.get::<TestData>("/test").await.unwrap();

    assert_eq!(response.data, response_data);
    assert_eq!(response.status.as_u16(), 200);
    assert!(response.raw_body.contains("\"Test\""));
}

#[tokio::test]
async fn test_successful_post_request() {
    let mock_server = MockServer::start().await;

    let request_data = TestData {
        id: 0,
        name: "New".to_string(),
    };

    let response_data = TestData {
        id: 1,
        name: "New".to_string(),
    };

    Mock::given(method("POST"))
        .and(path("/test"))
        .and(body_json(&request_data))
        .respond_with(ResponseTemplate::new(201).set_body_json(&response_data))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .post::<TestData, TestData>("/test", &request_data)
        .await
        .unwrap();

    assert_eq!(response.data, response_data);
    assert_eq!(response.status.as_u16(), 201);
}

#[tokio::test]
async fn test_http_error_4xx() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.get::<TestData>("/test").await;

    match result {
        Err(Error::HttpError {
            status,
            raw_response,
            ..
        }) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(raw_response, "Not found");
        }
        _ => panic!("Expected HttpError, got {:?}", result),
    }
}

#[tokio::test]
async fn test_http_errors_are_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.get::<TestData>("/test").await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
    assert_eq!(err.raw_response(), Some("Server error"));
}

#[tokio::test]
async fn test_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.get::<TestData>("/test").await;

    match result {
        Err(Error::DeserializationFailed {
            raw_response,
            serde_error,
            status,
        }) => {
            assert_eq!(status.as_u16(), 200);
            assert_eq!(raw_response, "invalid json");
            assert!(serde_error.contains("expected"));
        }
        _ => panic!("Expected DeserializationFailed, got {:?}", result),
    }
}

#[tokio::test]
async fn test_empty_body_decodes_as_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/test/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.delete::<Option<TestData>>("/test/1").await.unwrap();

    assert_eq!(response.data, None);
    assert_eq!(response.status.as_u16(), 204);
}

#[tokio::test]
async fn test_timeout_is_reported_as_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let err = client.get::<serde_json::Value>("/slow").await.unwrap_err();
    assert!(matches!(err, Error::Timeout), "got {:?}", err);

    let resolved = ApiError::from(err);
    assert_eq!(resolved.status(), 408);
    assert_eq!(resolved.code(), Some(&ErrorCode::RequestTimeout));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Nothing listens on a port released right after binding.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = Client::builder().base_url(uri).unwrap().build().unwrap();
    let err = client.get::<serde_json::Value>("/test").await.unwrap_err();
    assert!(matches!(err, Error::Network(_)), "got {:?}", err);

    let resolved = ApiError::from(err);
    assert_eq!(resolved.status(), 0);
    assert_eq!(resolved.code(), Some(&ErrorCode::FetchError));
}

#[tokio::test]
async fn test_default_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .and(header("authorization", "Bearer secret"))
        .and(header("x-client", "safecall-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .bearer_auth("secret")
        .unwrap()
        .default_header("X-Client", "safecall-tests")
        .unwrap()
        .build()
        .unwrap();

    client.get::<serde_json::Value>("/test").await.unwrap();
}

#[tokio::test]
async fn test_request_headers_and_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("email", "a@example.com"))
        .and(header("x-trace", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<TestData>::new()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let metadata = RequestMetadata::new(http::Method::GET, "/search")
        .with_query_param("email", "a@example.com")
        .with_header("X-Trace", "abc")
        .unwrap();

    let response = client
        .call::<(), Vec<TestData>>(metadata, None)
        .await
        .unwrap();
    assert!(response.data.is_empty());
}

#[tokio::test]
async fn test_base_url_path_is_preserved() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/test/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(TestData {
            id: 3,
            name: "Put".to_string(),
        }))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(format!("{}/api/v1", mock_server.uri()))
        .unwrap()
        .build()
        .unwrap();

    let response = client
        .put::<_, TestData>("test/3", &serde_json::json!({ "name": "Put" }))
        .await
        .unwrap();
    assert_eq!(response.data.id, 3);
    assert_eq!(response.header("content-type"), Some("application/json"));
}
