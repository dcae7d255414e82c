//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every facade
//! operation over real HTTP through the default ureq transport. This covers
//! query encoding, headers and multipart bodies, which the build/parse unit
//! tests cannot see.

use std::net::SocketAddr;
use std::time::Duration;

use catapi_core::{
    BreedFacts, BreedInfo, CatApiClient, CatApiError, ClientConfig, FetchImages, KeyTier,
    ListUploadedImages, ListVotes, RandomFacts, UreqTransport,
};
use mock_server::{TEST_API_KEY, TEST_PREMIUM_KEY};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn client(addr: SocketAddr, key: Option<&str>) -> CatApiClient {
    let config = ClientConfig::new()
        .with_base_url(&format!("http://{addr}"))
        .unwrap();
    match key {
        Some(key) => CatApiClient::from_config(config.with_api_key(key)),
        None => CatApiClient::from_config(config),
    }
}

#[test]
fn public_operations() {
    let addr = start_server();
    let client = client(addr, None);

    // Step 1: version is the service root.
    let version = client.get_version().unwrap();
    assert_eq!(version["message"], "The Cat API");

    // Step 2: all breeds.
    let breeds = client.list_breeds().unwrap();
    assert_eq!(breeds.len(), 4);
    assert_eq!(breeds[0].id.as_deref(), Some("abys"));
    assert_eq!(
        breeds[0].weight.as_ref().and_then(|w| w.metric.as_deref()),
        Some("3 - 5")
    );
    // The seed omits most fields; they come back as None.
    assert!(breeds[0].cfa_url.is_none());

    // Step 3: breed search, hit and miss.
    let bengal = client.search_breed("bengal").unwrap().unwrap();
    assert_eq!(bengal.id.as_deref(), Some("beng"));
    assert_eq!(bengal.hypoallergenic, Some(1));
    assert!(client.search_breed("nonexistent").unwrap().is_none());

    // Step 4: ten images is the public maximum.
    let cats = client
        .fetch_images(&FetchImages::default().limit(10).has_breeds(false))
        .unwrap();
    assert_eq!(cats.len(), 10);
    assert!(matches!(&cats[0].breed_info, BreedInfo::Many(b) if b.len() == 1));
    assert!(cats[3].breed_info.is_none());
    assert_eq!(cats[0].image_info.width, Some(640));

    // Step 5: breed filter passes through the query string.
    let cats = client
        .fetch_images(&FetchImages::default().limit(5).breed_ids("sibe"))
        .unwrap();
    assert_eq!(cats.len(), 3);
    assert!(cats.iter().all(|cat| cat.breed_info.len() == 2));

    // Step 6: keyed operations fail locally.
    let err = client.fetch_images(&FetchImages::default().limit(11)).unwrap_err();
    assert!(matches!(err, CatApiError::Credential { .. }));
    let err = client.delete_image("img000").unwrap_err();
    assert!(matches!(err, CatApiError::Credential { .. }));
}

#[test]
fn upload_vote_lifecycle() {
    let addr = start_server();
    let client = client(addr, Some(TEST_API_KEY));

    // Step 1: keyed search can exceed ten and filter on breeds.
    let cats = client
        .fetch_images(&FetchImages::default().limit(20).has_breeds(true))
        .unwrap();
    assert_eq!(cats.len(), 9);
    assert!(cats.iter().all(|cat| !cat.breed_info.is_none()));

    // Step 2: upload a file from disk.
    let path = std::env::temp_dir().join(format!("catapi-it-{}.jpg", unique_suffix()));
    std::fs::write(&path, b"\xFF\xD8\xFF\xE0fake-jpeg").unwrap();
    let image = client
        .upload_image(&path, Some("it-user"), Some("beng"))
        .unwrap();
    std::fs::remove_file(&path).unwrap();
    let image_id = image.id.clone().unwrap();
    assert!(image.url.as_deref().unwrap().ends_with(".jpg"));
    assert!(image.width.is_none());

    // Step 3: the upload is listed under its sub_id.
    let uploads = client
        .list_uploaded_images(&ListUploadedImages::default().sub_id("it-user"))
        .unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].id.as_deref(), Some(image_id.as_str()));

    // Step 4: vote on it.
    let vote = client.vote(&image_id, Some("it-user"), -1).unwrap();
    assert_eq!(vote.value, Some(-1));
    let vote_id = vote.id.unwrap();

    // Step 5: list votes with the image attached.
    let votes = client
        .list_votes(&ListVotes::default().attach_image(true).sub_id("it-user"))
        .unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(
        votes[0].image.as_ref().unwrap()["id"],
        serde_json::Value::String(image_id.clone())
    );

    // Step 6: fetch by id.
    let fetched = client.get_vote(vote_id).unwrap();
    assert_eq!(fetched.image_id.as_deref(), Some(image_id.as_str()));
    assert_eq!(fetched.sub_id.as_deref(), Some("it-user"));

    // Step 7: delete the vote; the confirmation is passed through.
    let confirmation = client.delete_vote(vote_id).unwrap();
    assert_eq!(confirmation["message"], "SUCCESS");

    // Step 8: the vote is gone.
    let err = client.get_vote(vote_id).unwrap_err();
    assert_eq!(err.status(), Some(404));

    // Step 9: delete the image, then again.
    assert!(client.delete_image(&image_id).unwrap());
    let err = client.delete_image(&image_id).unwrap_err();
    assert!(matches!(err, CatApiError::Request { status: 404, .. }));

    // Step 10: facts are premium; the server refuses a standard key.
    let err = client.random_facts(&RandomFacts::default()).unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[test]
fn premium_facts() {
    let addr = start_server();
    let client = client(addr, Some(TEST_PREMIUM_KEY));

    let facts = client.random_facts(&RandomFacts::default().limit(3)).unwrap();
    assert_eq!(facts.len(), 3);
    assert!(facts.iter().all(|f| f.fact.is_some()));

    let facts = client
        .breed_facts("beng", &BreedFacts::default().limit(10))
        .unwrap();
    assert_eq!(facts.len(), 2);
    assert!(facts.iter().all(|f| f.breed_id.as_deref() == Some("beng")));

    let err = client
        .breed_facts("nope", &BreedFacts::default())
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[test]
fn free_tier_key_is_rejected_before_sending() {
    // Nothing listens on this client's address; a credential error proves no
    // request went out.
    let config = ClientConfig::new()
        .with_base_url("http://127.0.0.1:9")
        .unwrap()
        .with_api_key(TEST_API_KEY)
        .with_key_tier(KeyTier::Free);
    let client = CatApiClient::from_config(config);
    let err = client.random_facts(&RandomFacts::default()).unwrap_err();
    assert!(matches!(err, CatApiError::Credential { .. }));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr, None).list_breeds().unwrap_err();
    assert!(matches!(err, CatApiError::Transport(_)), "got {err:?}");
    assert!(err.status().is_none());
}

#[test]
fn caller_supplied_agent() {
    let addr = start_server();
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(Duration::from_secs(5)))
        .build()
        .new_agent();
    let config = ClientConfig::new()
        .with_base_url(&format!("http://{addr}"))
        .unwrap()
        .with_api_key(TEST_API_KEY);
    let client = CatApiClient::with_transport(config, UreqTransport::with_agent(agent));

    assert_eq!(client.list_breeds().unwrap().len(), 4);
    // Non-2xx statuses still come back as data through the caller's agent.
    let err = client.get_vote(999_999).unwrap_err();
    assert!(matches!(err, CatApiError::Request { status: 404, .. }), "got {err:?}");
}

fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}
