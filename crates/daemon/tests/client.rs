//! The typed API client against a live server on an ephemeral port.

use std::net::SocketAddr;

use url::Url;

use common::bin::Bin;
use common::crypto::SecretKey;
use common::version::BuildInfo;
use minibin_daemon::http_server::api::client::ApiClient;
use minibin_daemon::http_server::health::{LivezRequest, ReadyzRequest, VersionRequest};
use minibin_daemon::{start_service, RunningService, ServiceConfig};

async fn start() -> (RunningService, ApiClient) {
    let config = ServiceConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        ..ServiceConfig::default()
    };
    let service = start_service(&config).await.unwrap();

    let remote = Url::parse(&format!("http://{}", service.local_addr)).unwrap();
    let client = ApiClient::new(&remote).unwrap();

    (service, client)
}

#[tokio::test]
async fn test_create_get_and_redirect() {
    let (service, client) = start().await;

    let bin = Bin::new("U2FsdGVkX1+abc", "python", "MDEyMzQ1Njc4OWFi");
    let id = client.create_bin(bin.clone()).await.unwrap();
    assert_eq!(client.get_bin(id.as_str()).await.unwrap(), bin);

    let link = client
        .create_bin(Bin::new("https://example.com/docs", "none", ""))
        .await
        .unwrap();
    let target = client.resolve_redirect(link.as_str()).await.unwrap();
    assert_eq!(target, "https://example.com/docs");

    assert_eq!(service.state.database().count_bins().await.unwrap(), 2);

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_encrypted_bin_through_share_link() {
    let (service, client) = start().await;
    let plaintext = "DATABASE_URL=postgres://admin:hunter2@db/prod";

    let key = SecretKey::generate();
    let id = client
        .create_bin(Bin::encrypt(plaintext, "bash", &key).unwrap())
        .await
        .unwrap();

    // The service holds ciphertext only
    let stored = service
        .state
        .database()
        .get_bin(id.as_str())
        .await
        .unwrap()
        .bin;
    assert!(stored.is_encrypted());
    assert!(!stored.content.contains("hunter2"));

    // A reader with nothing but the share link recovers the plaintext
    let link = client.page_link(id.as_str(), Some(&key));
    assert_eq!(link.path(), format!("/{}", id));
    let key_param = link
        .query_pairs()
        .find(|(name, _)| name == "key")
        .map(|(_, value)| value.into_owned())
        .unwrap();

    let fetched = client.get_bin(id.as_str()).await.unwrap();
    assert_eq!(fetched, stored);
    let shared_key = SecretKey::from_link_param(&key_param).unwrap();
    assert_eq!(fetched.decrypt(&shared_key).unwrap(), plaintext);

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_missing_bin_is_reported_as_not_found() {
    let (service, client) = start().await;

    let err = client.get_bin("Zz9Zz9Zz").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");

    let err = client.resolve_redirect("Zz9Zz9Zz").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_status_endpoints() {
    let (service, client) = start().await;

    assert_eq!(client.call(LivezRequest {}).await.unwrap().status, "ok");
    assert_eq!(client.call(ReadyzRequest {}).await.unwrap().status, "ok");

    let info: BuildInfo = client.call(VersionRequest {}).await.unwrap();
    assert_eq!(info.name, "minibin-daemon");

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_links_are_built_from_the_remote() {
    let client = ApiClient::new(&Url::parse("https://bins.example.org").unwrap()).unwrap();

    assert_eq!(
        client.short_link("AbC12345").as_str(),
        "https://bins.example.org/r/AbC12345"
    );
    assert_eq!(
        client.bin_url("AbC12345").as_str(),
        "https://bins.example.org/bin/AbC12345"
    );
    assert_eq!(
        client.page_link("AbC12345", None).as_str(),
        "https://bins.example.org/AbC12345"
    );

    let key = SecretKey::from_bytes([0xfb; 32]);
    assert_eq!(
        client.page_link("AbC12345", Some(&key)).as_str(),
        format!(
            "https://bins.example.org/AbC12345?key={}",
            key.to_link_param()
        )
    );
}
