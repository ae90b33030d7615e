#![allow(clippy::unwrap_used)]
// Integration tests for `CatalogClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalog_api::{CatalogApi, CatalogClient, Error, ErrorClass, ListQuery, LookupList, Resource};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CatalogClient) {
    let server = MockServer::start().await;
    let client =
        CatalogClient::from_reqwest(&format!("{}/api", server.uri()), reqwest::Client::new())
            .unwrap();
    (server, client)
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_sign_in_returns_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "admin", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "accessToken": "tok-123", "user": { "id": 1 } }
        })))
        .mount(&server)
        .await;

    let secret = SecretString::from("hunter2".to_string());
    let resp = client.sign_in("admin", &secret).await.unwrap();
    assert_eq!(resp.token, "tok-123");
}

#[tokio::test]
async fn test_bearer_token_attached_after_set_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": [], "totalCount": 0 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.set_token(Some(SecretString::from("tok-abc".to_string())));
    assert!(client.has_token());
    client.list(Resource::Tags, &ListQuery::default()).await.unwrap();
}

#[tokio::test]
async fn test_unauthorized_is_classified() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "expired" })))
        .mount(&server)
        .await;

    let err = client
        .list(Resource::Categories, &ListQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Unauthorized);
    assert!(err.is_unauthorized());
}

// ── List tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_sends_page_and_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/games"))
        .and(query_param("page", "3"))
        .and(query_param("pageSize", "10"))
        .and(query_param("search", "dragon"))
        .and(query_param("tagIds", "2,5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": 1, "name": "Dragon Gold" }],
            "totalCount": 21
        })))
        .mount(&server)
        .await;

    let mut query = ListQuery::new(3, 10);
    query.search = Some("dragon".into());
    query.tag_ids = vec![2, 5];

    let page = client.list(Resource::StoreGames, &query).await.unwrap();
    assert_eq!(page.total_count, 21);
    assert_eq!(page.items[0]["name"], "Dragon Gold");
}

// ── Mutation tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_update_returns_canonical_entity() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/providers/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": 7, "name": "NetEnt", "slug": "netent" }
        })))
        .mount(&server)
        .await;

    let out = client
        .update(Resource::Providers, 7, &json!({ "id": 7, "name": "netent" }))
        .await
        .unwrap();
    assert_eq!(out["name"], "NetEnt");
    assert_eq!(out["slug"], "netent");
}

#[tokio::test]
async fn test_delete_conflict_carries_linked_count() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/categories/4"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "Category has linked games",
            "linkedGames": 3
        })))
        .mount(&server)
        .await;

    let result = client.delete(Resource::Categories, 4).await;
    assert!(
        matches!(
            result,
            Err(Error::Conflict {
                linked_games: Some(3),
                ..
            })
        ),
        "expected Conflict error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_probe_delete() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/providers/2/deletable"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "deletable": false, "linkedGames": 12 })),
        )
        .mount(&server)
        .await;

    let probe = client.probe_delete(Resource::Providers, 2).await.unwrap();
    assert!(!probe.deletable);
    assert_eq!(probe.linked_games, Some(12));
}

#[tokio::test]
async fn test_set_membership_add_and_remove() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/manager/games/9"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/manager/games/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_membership(Resource::ManagerGames, 9, true)
        .await
        .unwrap();
    client
        .set_membership(Resource::ManagerGames, 9, false)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_server_error_and_bad_payload() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/lookups/categories"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/lookups/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.lookups(LookupList::Categories).await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::ServerError);
    assert!(err.is_transient());

    let err = client.lookups(LookupList::Providers).await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let client =
        CatalogClient::from_reqwest("http://127.0.0.1:9/api", reqwest::Client::new()).unwrap();
    let err = client.sign_out().await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::NetworkError);
}
