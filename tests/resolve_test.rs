//! Wiremock integration tests for the object resolver cache decisions.
//!
//! Covers the cache hit/miss branches: idempotent hits, refresh bypass,
//! resource-key disambiguation, the collection-to-resource
//! short-circuit, and error routing through the hook.

use std::sync::{Arc, Mutex};

use muninn::{Muninn, MuninnError, ObjectRequest};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn index_body(server_uri: &str) -> serde_json::Value {
    json!({
        "data": [],
        "links": {
            "node--recipe": format!("{server_uri}/jsonapi/node/recipe"),
            "node--page": {"href": format!("{server_uri}/jsonapi/node/page")},
            "node--broken": {"meta": "no href here"}
        }
    })
}

async fn mount_index(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/jsonapi/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(index_body(&server.uri())))
        .mount(server)
        .await;
}

fn recipe_doc(id: &str, title: &str) -> serde_json::Value {
    json!({
        "data": {"type": "node--recipe", "id": id, "attributes": {"title": title}}
    })
}

fn client_for(server: &MockServer) -> Muninn {
    Muninn::builder()
        .api_base(server.uri())
        .build()
        .expect("client should build")
}

/// Number of requests whose path starts with the given prefix.
async fn requests_to(server: &MockServer, prefix: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().starts_with(prefix))
        .count()
}

#[tokio::test]
async fn second_resolve_is_served_from_state() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    Mock::given(method("GET"))
        .and(path("/jsonapi/node/recipe/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recipe_doc("abc", "Chili")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let req = ObjectRequest::new("node--recipe").id("abc");

    let first = client.get_object(&req).await.unwrap();
    let second = client.get_object(&req).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first["title"], "Chili");
    assert_eq!(requests_to(&server, "/jsonapi/node/recipe").await, 1);
}

#[tokio::test]
async fn refresh_bypasses_cached_resource() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    Mock::given(method("GET"))
        .and(path("/jsonapi/node/recipe/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recipe_doc("abc", "Chili")))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .get_object(&ObjectRequest::new("node--recipe").id("abc"))
        .await
        .unwrap();
    client
        .get_object(&ObjectRequest::new("node--recipe").id("abc").refresh(true))
        .await
        .unwrap();

    assert_eq!(requests_to(&server, "/jsonapi/node/recipe").await, 2);
}

#[tokio::test]
async fn differing_params_get_distinct_cache_entries() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    Mock::given(method("GET"))
        .and(path("/jsonapi/node/recipe/abc"))
        .and(query_param("include", "field_media_image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recipe_doc("abc", "With image")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jsonapi/node/recipe/abc"))
        .and(query_param("include", "field_tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recipe_doc("abc", "With tags")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let with_image = ObjectRequest::new("node--recipe")
        .id("abc")
        .params("include=field_media_image");
    let with_tags = ObjectRequest::new("node--recipe")
        .id("abc")
        .params("include=field_tags");

    let first = client.get_object(&with_image).await.unwrap();
    let second = client.get_object(&with_tags).await.unwrap();
    assert_eq!(first["title"], "With image");
    assert_eq!(second["title"], "With tags");

    // Both keys stay cached independently: repeats are hits
    assert_eq!(client.get_object(&with_image).await.unwrap()["title"], "With image");
    assert_eq!(client.get_object(&with_tags).await.unwrap()["title"], "With tags");
    assert_eq!(requests_to(&server, "/jsonapi/node/recipe").await, 2);
}

#[tokio::test]
async fn cached_collection_short_circuits_resource_fetch() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    Mock::given(method("GET"))
        .and(path("/jsonapi/node/recipe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"type": "node--recipe", "id": "r1", "attributes": {"title": "First"}},
                {"type": "node--recipe", "id": "r2", "attributes": {"title": "Second"}}
            ],
            "links": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .get_object(&ObjectRequest::new("node--recipe"))
        .await
        .unwrap();

    // Served out of the cached collection: no resource endpoint mock exists
    let resource = client
        .get_object(&ObjectRequest::new("node--recipe").id("r2"))
        .await
        .unwrap();
    assert_eq!(resource["title"], "Second");
    assert_eq!(requests_to(&server, "/jsonapi/node/recipe").await, 1);
}

#[tokio::test]
async fn projection_query_invalidates_collection_short_circuit() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    Mock::given(method("GET"))
        .and(path("/jsonapi/node/recipe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"type": "node--recipe", "id": "r2", "attributes": {"title": "Second", "difficulty": "easy"}}
            ],
            "links": {}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jsonapi/node/recipe/r2"))
        .and(query_param("fields[node--recipe]", "title,id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recipe_doc("r2", "Second")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .get_object(&ObjectRequest::new("node--recipe"))
        .await
        .unwrap();

    // The query must force a fetch even though the collection holds r2
    let projected = client
        .get_object(
            &ObjectRequest::new("node--recipe")
                .id("r2")
                .query("{ title id }"),
        )
        .await
        .unwrap();
    assert_eq!(projected, json!({"id": "r2", "title": "Second"}));
    assert_eq!(requests_to(&server, "/jsonapi/node/recipe/r2").await, 1);
}

#[tokio::test]
async fn unknown_object_type_reaches_hook_once() {
    let server = MockServer::start().await;
    mount_index(&server).await;

    let errors = Arc::new(Mutex::new(Vec::new()));
    let seen = errors.clone();
    let client = Muninn::builder()
        .api_base(server.uri())
        .on_error(move |err| seen.lock().unwrap().push(err.to_string()))
        .build()
        .unwrap();

    let err = client
        .get_object(&ObjectRequest::new("node--event"))
        .await
        .unwrap_err();
    assert!(matches!(err, MuninnError::UnknownObjectType(name) if name == "node--event"));

    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("node--event"));
}

#[tokio::test]
async fn invalid_params_report_without_side_effects() {
    let server = MockServer::start().await;
    mount_index(&server).await;

    let hook_count = Arc::new(Mutex::new(0));
    let count = hook_count.clone();
    let client = Muninn::builder()
        .api_base(server.uri())
        .on_error(move |_| *count.lock().unwrap() += 1)
        .build()
        .unwrap();

    let err = client
        .get_object(&ObjectRequest::new("node--recipe").params("?include=field_media_image"))
        .await
        .unwrap_err();
    assert!(matches!(err, MuninnError::InvalidParams(_)));
    assert_eq!(*hook_count.lock().unwrap(), 1);

    // Rejected before any fetch or cache write
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!client.store().has_object_data("node--recipe"));
}

#[tokio::test]
async fn unusable_index_entry_is_invalid_index_entry() {
    let server = MockServer::start().await;
    mount_index(&server).await;

    let hook_count = Arc::new(Mutex::new(0));
    let count = hook_count.clone();
    let client = Muninn::builder()
        .api_base(server.uri())
        .on_error(move |_| *count.lock().unwrap() += 1)
        .build()
        .unwrap();

    let err = client
        .get_object(&ObjectRequest::new("node--broken"))
        .await
        .unwrap_err();
    assert!(matches!(err, MuninnError::InvalidIndexEntry(_)));
    assert_eq!(*hook_count.lock().unwrap(), 1);
}

#[tokio::test]
async fn failed_resource_fetch_reaches_hook_once() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    Mock::given(method("GET"))
        .and(path("/jsonapi/node/recipe/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let hook_count = Arc::new(Mutex::new(0));
    let count = hook_count.clone();
    let client = Muninn::builder()
        .api_base(server.uri())
        .on_error(move |_| *count.lock().unwrap() += 1)
        .build()
        .unwrap();

    let err = client
        .get_object(&ObjectRequest::new("node--recipe").id("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, MuninnError::Fetch { status: 404, .. }));
    assert_eq!(*hook_count.lock().unwrap(), 1);
}

#[tokio::test]
async fn unreachable_index_is_index_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jsonapi/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_object(&ObjectRequest::new("node--recipe"))
        .await
        .unwrap_err();
    assert!(matches!(err, MuninnError::IndexFetch { status: 500, .. }));
}
