use crate::{mount_page, mount_page_with, mount_probe_ok, recording_sinks, test_config};
use nodrift::{CrawlState, SessionStore};
use std::time::Duration;
use wiremock::{MockServer, ResponseTemplate};

#[tokio::test]
async fn test_session_lifecycle() {
    let server = MockServer::start().await;

    mount_probe_ok(&server).await;
    mount_page(&server, "/", &["/a"]).await;
    mount_page(&server, "/a", &[]).await;

    let store = SessionStore::new();
    let (_recorder, sinks) = recording_sinks();
    let id = store.start(&server.uri(), test_config(2), sinks).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.ids(), vec![id]);

    let handle = store.get(&id).unwrap();
    assert_eq!(handle.seed().as_str(), server.uri());

    let final_status = handle.wait().await;
    assert_eq!(final_status.state, CrawlState::Completed);

    let polled = store.status(&id).unwrap();
    assert_eq!(polled.state, CrawlState::Completed);
    assert_eq!(polled.pages_crawled, 2);

    assert!(store.remove(&id).is_some());
    assert!(store.is_empty());
    assert!(store.status(&id).is_none());
}

#[tokio::test]
async fn test_stop_through_store() {
    let server = MockServer::start().await;

    mount_probe_ok(&server).await;
    mount_page(&server, "/", &["/slow1", "/slow2", "/slow3"]).await;
    for slow in ["/slow1", "/slow2", "/slow3"] {
        mount_page_with(
            &server,
            slow,
            &[],
            ResponseTemplate::new(200).set_delay(Duration::from_millis(200)),
        )
        .await;
    }

    let store = SessionStore::new();
    let (_recorder, sinks) = recording_sinks();
    let id = store.start(&server.uri(), test_config(1), sinks).unwrap();

    assert!(store.stop(&id));
    let status = store.get(&id).unwrap().wait().await;

    assert_eq!(status.state, CrawlState::Stopped);
    assert!(status.pages_crawled <= 1);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    for server in [&first, &second] {
        mount_probe_ok(server).await;
    }
    mount_page(&first, "/", &["/x", "/y"]).await;
    mount_page(&first, "/x", &[]).await;
    mount_page(&first, "/y", &[]).await;
    mount_page(&second, "/", &[]).await;

    let store = SessionStore::new();
    let a = store
        .start(&first.uri(), test_config(2), recording_sinks().1)
        .unwrap();
    let b = store
        .start(&second.uri(), test_config(2), recording_sinks().1)
        .unwrap();
    assert_ne!(a, b);

    let status_a = store.get(&a).unwrap().wait().await;
    let status_b = store.get(&b).unwrap().wait().await;

    assert_eq!(status_a.pages_crawled, 3);
    assert_eq!(status_b.pages_crawled, 1);
    assert_eq!(store.len(), 2);
}
