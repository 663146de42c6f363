use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use oms_client::{
    Block, BlockFieldUpdate, Credentials, Error, MultiLangText, ObjectMemoryStore,
    OwnerCredentials, RestOmsClient,
};

#[tokio::test]
async fn test_memory_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/mgmt/memoryList"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"["alpha","beta"]"#))
        .mount(&server)
        .await;

    let uri = server.uri();
    let names = tokio::task::spawn_blocking(move || {
        let client = RestOmsClient::new(&uri).unwrap();
        client.memory_names().unwrap()
    })
    .await
    .unwrap();

    assert_eq!(names, vec!["alpha", "beta"]);
}

#[tokio::test]
async fn test_blocks_are_decoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/alpha/blocks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "1",
                "title": { "en": "Hello" },
                "creator": { "type": "email", "value": "a@b.c", "date": "2024-05-01T10:00:00Z" },
                "payload": { "type": "text/plain", "value": "42" }
            },
            {
                "id": "2",
                "link": { "type": "url", "url": "http://example.com/big.bin" }
            }
        ])))
        .mount(&server)
        .await;

    let uri = server.uri();
    let blocks = tokio::task::spawn_blocking(move || {
        let client = RestOmsClient::new(&uri).unwrap();
        client.blocks("alpha").unwrap()
    })
    .await
    .unwrap();

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].title.get("en"), Some("Hello"));
    assert!(blocks[0].last_modified().is_some());
    assert!(blocks[1].is_link_block());
}

#[tokio::test]
async fn test_missing_block_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/alpha/blocks/9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let uri = server.uri();
    let block = tokio::task::spawn_blocking(move || {
        let client = RestOmsClient::new(&uri).unwrap();
        client.block("alpha", "9").unwrap()
    })
    .await
    .unwrap();

    assert!(block.is_none());
}

#[tokio::test]
async fn test_create_memory_sends_owner_with_basic_auth() {
    let server = MockServer::start().await;
    let primary_id = format!("{}/rest/alpha", server.uri());

    Mock::given(method("POST"))
        .and(path("/mgmt/createMemory"))
        .and(header("Authorization", "Basic YWxpY2U6cHc="))
        .and(body_json(json!({
            "header": { "primaryId": primary_id },
            "owner": { "name": "Alice", "username": "alice", "password": "pw" }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = RestOmsClient::new(&uri).unwrap();
        client
            .create_memory(
                "alpha",
                &OwnerCredentials::new("Alice", "alice", "pw"),
                Some(&Credentials::new("alice", "pw")),
            )
            .unwrap();
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_create_block_posts_block_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/alpha/blocks"))
        .and(body_json(json!({ "id": "3", "title": { "en": "Hello" } })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = RestOmsClient::new(&uri).unwrap();
        let mut block = Block::new("3");
        block.title = MultiLangText::single("en", "Hello");
        client.create_block("alpha", &block, None).unwrap();
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_acl_is_put_as_text() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/rest/alpha/mgmt/acl"))
        .and(body_string("<acl><entry/></acl>"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = RestOmsClient::new(&uri).unwrap();
        client.set_acl("alpha", "<acl><entry/></acl>", None).unwrap();
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_title_update_puts_to_field_path() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/rest/alpha/blocks/1/title"))
        .and(body_json(json!({ "en": "Renamed" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = RestOmsClient::new(&uri).unwrap();
        client
            .update_block_field(
                "alpha",
                "1",
                BlockFieldUpdate::Title(MultiLangText::single("en", "Renamed")),
                None,
            )
            .unwrap();
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_delete_rejection_carries_status() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/alpha"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        let client = RestOmsClient::new(&uri).unwrap();
        client.delete_memory("alpha", None).unwrap_err()
    })
    .await
    .unwrap();

    assert_eq!(
        err,
        Error::Rejected {
            status: 403,
            message: "forbidden".to_string()
        }
    );
}

#[tokio::test]
async fn test_unreachable_server() {
    // Nothing listens on the discard port.
    let err = tokio::task::spawn_blocking(|| {
        let client = RestOmsClient::new("http://127.0.0.1:9").unwrap();
        client.memory_names().unwrap_err()
    })
    .await
    .unwrap();

    assert!(err.is_unreachable());
}
