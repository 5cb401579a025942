use crate::{
    mount_page, mount_page_with, mount_probe_ok, recording_sinks, test_config, wait_until,
};
use nodrift::output::CrawlEvent;
use nodrift::{crawl, start_crawl, CrawlState};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_probe_ok(&server).await;
    mount_page(
        &server,
        "/",
        &[
            "/page1",
            &format!("{}/page2/", base),
            "https://other.com/c",
            "mailto:x@example.com",
            "#top",
        ],
    )
    .await;
    mount_page(&server, "/page1", &["/page2", "/", "../page1?utm=1"]).await;
    mount_page(&server, "/page2", &[]).await;

    let (recorder, sinks) = recording_sinks();
    let handle = start_crawl(&base, test_config(4), sinks).unwrap();
    let status = handle.wait().await;

    assert_eq!(status.state, CrawlState::Completed);
    assert_eq!(status.pages_crawled, 3);
    assert_eq!(status.error_count, 0);
    assert_eq!(status.total_discovered, 3);
    assert_eq!(status.frontier_size, 0);
    assert_eq!(status.in_flight, 0);
    assert!(handle.is_finished());

    let mut crawled: Vec<String> = handle
        .pages()
        .iter()
        .map(|page| page.url().to_string())
        .collect();
    crawled.sort();
    assert_eq!(
        crawled,
        vec![base.clone(), format!("{}/page1", base), format!("{}/page2", base)]
    );

    let root = handle
        .pages()
        .into_iter()
        .find(|page| page.url().as_str() == base)
        .unwrap();
    let links: Vec<String> = root.links().iter().map(|l| l.to_string()).collect();
    assert_eq!(
        links,
        vec![base.clone(), format!("{}/page1", base), format!("{}/page2", base)]
    );

    assert!(matches!(
        recorder.events().first(),
        Some(CrawlEvent::CrawlStarted { .. })
    ));
    assert_eq!(
        recorder.count(|e| matches!(e, CrawlEvent::PageCrawled { .. })),
        3
    );
}

#[tokio::test]
async fn test_http_error_counts_once() {
    let server = MockServer::start().await;

    mount_probe_ok(&server).await;
    mount_page(&server, "/", &["/missing"]).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (recorder, sinks) = recording_sinks();
    let status = crawl(&server.uri(), test_config(2), sinks).await.unwrap();

    assert_eq!(status.state, CrawlState::Completed);
    assert_eq!(status.pages_crawled, 1);
    assert_eq!(status.error_count, 1);
    assert_eq!(status.total_discovered, 2);

    let errors: Vec<CrawlEvent> = recorder
        .events()
        .into_iter()
        .filter(|e| matches!(e, CrawlEvent::Error { .. }))
        .collect();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        CrawlEvent::Error { url, detail } => {
            assert_eq!(url.as_str(), format!("{}/missing", server.uri()));
            assert!(detail.contains("404"));
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_server_error_does_not_abort_crawl() {
    let server = MockServer::start().await;

    mount_probe_ok(&server).await;
    mount_page(&server, "/", &["/broken", "/fine"]).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/fine", &["/deeper"]).await;
    mount_page(&server, "/deeper", &[]).await;

    let (_recorder, sinks) = recording_sinks();
    let status = crawl(&server.uri(), test_config(2), sinks).await.unwrap();

    assert_eq!(status.state, CrawlState::Completed);
    assert_eq!(status.pages_crawled, 3);
    assert_eq!(status.error_count, 1);
}

#[tokio::test]
async fn test_page_timeout_counts_one_error() {
    let server = MockServer::start().await;

    mount_probe_ok(&server).await;
    mount_page(&server, "/", &["/slow", "/fast"]).await;
    mount_page_with(
        &server,
        "/slow",
        &["/behind-slow"],
        ResponseTemplate::new(200).set_delay(Duration::from_secs(3)),
    )
    .await;
    mount_page(&server, "/fast", &[]).await;
    Mock::given(method("GET"))
        .and(path("/behind-slow"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(2);
    config.crawler.request_timeout_ms = 300;

    let (recorder, sinks) = recording_sinks();
    let status = crawl(&server.uri(), config, sinks).await.unwrap();

    assert_eq!(status.state, CrawlState::Completed);
    assert_eq!(status.pages_crawled, 2);
    assert_eq!(status.error_count, 1);
    assert_eq!(
        recorder.count(|e| matches!(
            e,
            CrawlEvent::Error { url, detail }
                if url.as_str().ends_with("/slow") && detail.as_str() == "request timed out"
        )),
        1
    );
}

#[tokio::test]
async fn test_non_html_is_skipped_not_failed() {
    let server = MockServer::start().await;

    mount_probe_ok(&server).await;
    mount_page(&server, "/", &["/data.json"]).await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"a": 1}"#, "application/json"))
        .mount(&server)
        .await;

    let (recorder, sinks) = recording_sinks();
    let status = crawl(&server.uri(), test_config(2), sinks).await.unwrap();

    assert_eq!(status.state, CrawlState::Completed);
    assert_eq!(status.pages_crawled, 1);
    assert_eq!(status.error_count, 0);
    assert_eq!(status.pages_skipped, 1);

    let skipped = recorder
        .events()
        .into_iter()
        .find(|e| matches!(e, CrawlEvent::PageSkipped { .. }));
    match skipped {
        Some(CrawlEvent::PageSkipped { reason, status, .. }) => {
            assert!(reason.contains("application/json"));
            assert_eq!(status, Some(200));
        }
        other => panic!("expected a skipped event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_probe_timeout_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(2);
    config.crawler.probe_timeout_ms = 200;

    let (recorder, sinks) = recording_sinks();
    let status = crawl(&server.uri(), config, sinks).await.unwrap();

    assert_eq!(status.state, CrawlState::Invalid);
    assert_eq!(status.pages_crawled, 0);
    assert_eq!(status.reason.as_deref(), Some("timed out"));
    assert_eq!(
        recorder.count(|e| matches!(e, CrawlEvent::InvalidSeed { .. })),
        1
    );
}

#[tokio::test]
async fn test_probe_rejects_not_found_seed() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (recorder, sinks) = recording_sinks();
    let status = crawl(&server.uri(), test_config(2), sinks).await.unwrap();

    assert_eq!(status.state, CrawlState::Invalid);
    assert!(status.reason.unwrap().contains("404"));

    let summaries: Vec<CrawlEvent> = recorder
        .events()
        .into_iter()
        .filter(|e| matches!(e, CrawlEvent::Summary { .. }))
        .collect();
    assert_eq!(summaries.len(), 1);
    assert!(matches!(
        summaries[0],
        CrawlEvent::Summary {
            final_state: CrawlState::Invalid,
            pages_crawled: 0,
            ..
        }
    ));
}

#[tokio::test]
async fn test_redirecting_seed_is_crawled_at_requested_url() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "https://elsewhere.invalid/"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", &["/next"]).await;
    mount_page(&server, "/next", &[]).await;

    let (_recorder, sinks) = recording_sinks();
    let status = crawl(&server.uri(), test_config(2), sinks).await.unwrap();

    assert_eq!(status.state, CrawlState::Completed);
    assert_eq!(status.pages_crawled, 2);
}

#[tokio::test]
async fn test_duplicate_links_fetched_once() {
    let server = MockServer::start().await;

    mount_probe_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            crate::html_with_links(&["/dup", "/dup/", "/dup?x=1", "/dup#part", "/other"]),
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dup"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(crate::html_with_links(&["/", "/other"]), "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/other"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(crate::html_with_links(&["/dup/"]), "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (_recorder, sinks) = recording_sinks();
    let status = crawl(&server.uri(), test_config(3), sinks).await.unwrap();

    assert_eq!(status.state, CrawlState::Completed);
    assert_eq!(status.pages_crawled, 3);
    assert_eq!(status.total_discovered, 3);
    // Mock expectations are verified when the server is dropped
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_bound_respected() {
    let server = MockServer::start().await;
    let limit = 3;

    let children: Vec<String> = (0..12).map(|i| format!("/child{}", i)).collect();
    let hrefs: Vec<&str> = children.iter().map(String::as_str).collect();

    mount_probe_ok(&server).await;
    mount_page(&server, "/", &hrefs).await;
    for child in &children {
        mount_page_with(
            &server,
            child,
            &[],
            ResponseTemplate::new(200).set_delay(Duration::from_millis(100)),
        )
        .await;
    }

    let (_recorder, sinks) = recording_sinks();
    let handle = start_crawl(&server.uri(), test_config(limit), sinks).unwrap();

    let mut observed_max = 0;
    while !handle.is_finished() {
        let status = handle.status();
        observed_max = observed_max.max(status.in_flight);
        assert!(status.in_flight <= limit);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let status = handle.wait().await;
    assert_eq!(status.state, CrawlState::Completed);
    assert_eq!(status.pages_crawled, 13);
    assert!(observed_max <= limit);
    assert!(status.peak_in_flight <= limit);
    assert!(status.peak_in_flight >= 2, "fetches never overlapped");
}

#[tokio::test]
async fn test_stop_ends_in_stopped_state() {
    let server = MockServer::start().await;

    let children: Vec<String> = (0..10).map(|i| format!("/slow{}", i)).collect();
    let hrefs: Vec<&str> = children.iter().map(String::as_str).collect();

    mount_probe_ok(&server).await;
    mount_page(&server, "/", &hrefs).await;
    for child in &children {
        mount_page_with(
            &server,
            child,
            &["/never"],
            ResponseTemplate::new(200).set_delay(Duration::from_millis(300)),
        )
        .await;
    }
    Mock::given(method("GET"))
        .and(path("/never"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (recorder, sinks) = recording_sinks();
    let handle = start_crawl(&server.uri(), test_config(2), sinks).unwrap();

    let started = wait_until(Duration::from_secs(5), || handle.status().pages_crawled >= 1).await;
    assert!(started, "seed page was never crawled");

    handle.stop();
    handle.stop();
    let status = handle.wait().await;

    assert_eq!(status.state, CrawlState::Stopped);
    assert!(status.pages_crawled < 11);
    assert_eq!(status.in_flight, 0);
    assert_eq!(
        recorder.count(|e| matches!(e, CrawlEvent::Summary { .. })),
        1
    );

    // Stopping a finished crawl changes nothing
    handle.stop();
    assert_eq!(handle.status().state, CrawlState::Stopped);
}

#[tokio::test]
async fn test_summary_emitted_once_on_completion() {
    let server = MockServer::start().await;

    mount_probe_ok(&server).await;
    mount_page(&server, "/", &["/a"]).await;
    mount_page(&server, "/a", &["/"]).await;

    let (recorder, sinks) = recording_sinks();
    let status = crawl(&server.uri(), test_config(2), sinks).await.unwrap();

    let summaries: Vec<CrawlEvent> = recorder
        .events()
        .into_iter()
        .filter(|e| matches!(e, CrawlEvent::Summary { .. }))
        .collect();
    assert_eq!(summaries.len(), 1);
    assert_eq!(
        summaries[0],
        CrawlEvent::Summary {
            pages_crawled: 2,
            total_found: 2,
            error_count: 0,
            final_state: CrawlState::Completed,
            elapsed: status.elapsed,
        }
    );
    assert!(matches!(recorder.events().last(), Some(CrawlEvent::Summary { .. })));
    assert!(recorder.count(|e| matches!(e, CrawlEvent::Progress { .. })) >= 2);
}

#[tokio::test]
async fn test_invalid_seed_never_touches_network() {
    let (recorder, sinks) = recording_sinks();

    let result = start_crawl("no-tld", test_config(2), sinks);

    assert!(matches!(
        result,
        Err(nodrift::CrawlError::Url(nodrift::UrlError::InvalidDomain(_)))
    ));
    assert_eq!(
        recorder.count(|e| matches!(e, CrawlEvent::InvalidSeed { .. })),
        1
    );
}

#[tokio::test]
async fn test_transcript_written() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_probe_ok(&server).await;
    mount_page(&server, "/", &["/a"]).await;
    mount_page(&server, "/a", &[]).await;

    let transcript =
        nodrift::output::TranscriptSink::create(dir.path(), &server.uri()).unwrap();
    let transcript_path = transcript.path().to_path_buf();
    let sinks = nodrift::output::SinkSet::new().with(std::sync::Arc::new(transcript));

    let status = crawl(&server.uri(), test_config(2), sinks).await.unwrap();
    assert_eq!(status.state, CrawlState::Completed);

    let text = std::fs::read_to_string(transcript_path).unwrap();
    assert!(text.contains(&format!("CRAWLED: {} (Status: 200)", server.uri())));
    assert!(text.contains(&format!("• {}/a", server.uri())));
    assert!(text.contains("Final Status: COMPLETED"));
    assert!(text.contains("Pages Successfully Crawled: 2"));
}
