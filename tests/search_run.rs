//! Integration tests for a full search run: fan-out, fallback, failure
//! isolation and channel shutdown.
//!
//! Every run is wrapped in a timeout so a channel that never closes fails
//! the test instead of hanging it. Result counts catch a channel that
//! closed too early.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sift::feed::{Feed, JsonFeedFile};
use sift::search::{
    run, MatchError, Matcher, Registry, RssMatcher, RunOptions, RunSummary, SearchContext,
    SearchResult, TextSink,
};

const RUN_DEADLINE: Duration = Duration::from_secs(10);

/// Answers from a fixed table keyed by feed name. Feeds missing from the
/// table fail.
struct TableMatcher {
    table: HashMap<String, Vec<SearchResult>>,
}

impl TableMatcher {
    fn new(entries: &[(&str, Vec<SearchResult>)]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(name, results)| (name.to_string(), results.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl Matcher for TableMatcher {
    async fn search(
        &self,
        feed: &Feed,
        _term: &str,
        _ctx: &SearchContext,
    ) -> Result<Vec<SearchResult>, MatchError> {
        tokio::task::yield_now().await;
        self.table
            .get(&feed.name)
            .cloned()
            .ok_or_else(|| MatchError::MissingUri(feed.name.clone()))
    }
}

/// Never finishes unless cancelled or timed out by the worker.
struct StuckMatcher;

#[async_trait]
impl Matcher for StuckMatcher {
    async fn search(
        &self,
        _feed: &Feed,
        _term: &str,
        _ctx: &SearchContext,
    ) -> Result<Vec<SearchResult>, MatchError> {
        std::future::pending().await
    }
}

fn feed(name: &str, feed_type: &str) -> Feed {
    Feed::new(name, format!("https://example.com/{name}"), feed_type)
}

fn title(content: &str) -> SearchResult {
    SearchResult::new("Title", content)
}

fn description(content: &str) -> SearchResult {
    SearchResult::new("Description", content)
}

async fn run_collect(
    feeds: Vec<Feed>,
    registry: &Registry,
    options: &RunOptions,
) -> (RunSummary, Vec<SearchResult>) {
    let mut sink: Vec<SearchResult> = Vec::new();
    let summary = tokio::time::timeout(
        RUN_DEADLINE,
        run(&feeds, registry, "president", options, &mut sink),
    )
    .await
    .expect("run did not finish: result channel never closed")
    .expect("run failed");
    (summary, sink)
}

fn sorted(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    results.sort_by(|a, b| (&a.field, &a.content).cmp(&(&b.field, &b.content)));
    results
}

// ============================================================================
// Fallback and fan-out
// ============================================================================

#[tokio::test]
async fn test_rss_feed_and_unregistered_feed() {
    let registry = Registry::builder()
        .register(
            "rss",
            TableMatcher::new(&[("A", vec![title("President signs new bill")])]),
        )
        .unwrap()
        .build();
    let feeds = vec![feed("A", "rss"), feed("B", "unregistered")];

    let (summary, results) = run_collect(feeds, &registry, &RunOptions::default()).await;

    // "B" falls back to the default matcher, which finds nothing
    assert_eq!(results, vec![title("President signs new bill")]);
    assert_eq!(
        summary,
        RunSummary {
            feeds: 2,
            rendered: 1,
            panicked: 0
        }
    );
}

#[tokio::test]
async fn test_rss_feed_fetched_over_http() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>A</title>
    <item><guid>1</guid><title>Senate confirms the president's nominee</title><description>Vote was 51 to 49</description></item>
    <item><guid>2</guid><title>Local weather</title><description>Rain expected</description></item>
</channel></rss>"#,
        ))
        .mount(&mock_server)
        .await;

    let registry = Registry::builder()
        .register("rss", RssMatcher::default())
        .unwrap()
        .build();
    let feeds = vec![
        Feed::new("A", format!("{}/a.rss", mock_server.uri()), "rss"),
        Feed::new("B", "https://example.com/b", "unregistered"),
    ];

    let (_, results) = run_collect(feeds, &registry, &RunOptions::default()).await;

    assert_eq!(results, vec![title("Senate confirms the president's nominee")]);
}

#[tokio::test]
async fn test_all_feeds_contribute() {
    let registry = Registry::builder()
        .register(
            "table",
            TableMatcher::new(&[
                ("a", vec![title("a1")]),
                ("b", vec![title("b1"), description("b2")]),
                ("c", vec![]),
                ("d", vec![description("d1")]),
            ]),
        )
        .unwrap()
        .build();
    let feeds = ["a", "b", "c", "d"].iter().map(|n| feed(n, "table")).collect();

    let (summary, results) = run_collect(feeds, &registry, &RunOptions::default()).await;

    assert_eq!(summary.rendered, 4);
    assert_eq!(
        sorted(results),
        sorted(vec![title("a1"), title("b1"), description("b2"), description("d1")])
    );
}

// ============================================================================
// Failure isolation
// ============================================================================

#[tokio::test]
async fn test_one_failing_feed_does_not_affect_others() {
    let registry = Registry::builder()
        .register(
            "table",
            TableMatcher::new(&[
                ("a", vec![title("from a")]),
                ("c", vec![title("from c")]),
                ("d", vec![title("from d")]),
            ]),
        )
        .unwrap()
        .build();
    // "b" is not in the table, so its search fails
    let feeds = ["a", "b", "c", "d"].iter().map(|n| feed(n, "table")).collect();

    let (summary, results) = run_collect(feeds, &registry, &RunOptions::default()).await;

    assert_eq!(summary.feeds, 4);
    assert_eq!(
        sorted(results),
        vec![title("from a"), title("from c"), title("from d")]
    );
}

#[tokio::test]
async fn test_http_failure_is_isolated() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok.rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<rss version="2.0"><channel><item><title>The president arrives</title></item></channel></rss>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/down.rss"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let registry = Registry::builder()
        .register("rss", RssMatcher::default())
        .unwrap()
        .build();
    let feeds = vec![
        Feed::new("ok", format!("{}/ok.rss", mock_server.uri()), "rss"),
        Feed::new("down", format!("{}/down.rss", mock_server.uri()), "rss"),
        Feed::new("empty-uri", "", "rss"),
    ];

    let (_, results) = run_collect(feeds, &registry, &RunOptions::default()).await;

    assert_eq!(results, vec![title("The president arrives")]);
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_results_from_one_feed_keep_their_order() {
    let registry = Registry::builder()
        .register(
            "table",
            TableMatcher::new(&[
                ("a", vec![title("a-1"), description("a-2"), title("a-3")]),
                ("b", vec![title("b-1"), description("b-2"), title("b-3")]),
                ("c", vec![title("c-1"), description("c-2"), title("c-3")]),
            ]),
        )
        .unwrap()
        .build();
    let feeds = ["a", "b", "c"].iter().map(|n| feed(n, "table")).collect();

    let (_, results) = run_collect(feeds, &registry, &RunOptions::default()).await;
    assert_eq!(results.len(), 9);

    for prefix in ["a-", "b-", "c-"] {
        let from_feed: Vec<&str> = results
            .iter()
            .filter(|r| r.content.starts_with(prefix))
            .map(|r| r.content.as_str())
            .collect();
        let expected: Vec<String> = (1..=3).map(|i| format!("{prefix}{i}")).collect();
        assert_eq!(from_feed, expected);
    }
}

// ============================================================================
// Channel shutdown
// ============================================================================

#[tokio::test]
async fn test_no_feeds_completes() {
    let registry = Registry::builder().build();
    let (summary, results) = run_collect(Vec::new(), &registry, &RunOptions::default()).await;
    assert!(results.is_empty());
    assert_eq!(summary.feeds, 0);
}

#[tokio::test]
async fn test_larger_channel_capacity_delivers_everything() {
    let many: Vec<SearchResult> = (0..50).map(|i| title(&format!("item {i}"))).collect();
    let registry = Registry::builder()
        .register("table", TableMatcher::new(&[("a", many.clone()), ("b", many)]))
        .unwrap()
        .build();
    let options = RunOptions {
        channel_capacity: 16,
        ..RunOptions::default()
    };

    let (summary, _) = run_collect(vec![feed("a", "table"), feed("b", "table")], &registry, &options).await;
    assert_eq!(summary.rendered, 100);
}

#[tokio::test(start_paused = true)]
async fn test_feed_deadline_unblocks_stuck_feed() {
    let registry = Registry::builder()
        .register("stuck", StuckMatcher)
        .unwrap()
        .register("table", TableMatcher::new(&[("fast", vec![title("fast result")])]))
        .unwrap()
        .build();
    let options = RunOptions {
        feed_timeout: Some(Duration::from_secs(5)),
        ..RunOptions::default()
    };

    let (_, results) = run_collect(
        vec![feed("slow", "stuck"), feed("fast", "table")],
        &registry,
        &options,
    )
    .await;

    assert_eq!(results, vec![title("fast result")]);
}

#[tokio::test]
async fn test_cancellation_unblocks_stuck_feed() {
    let registry = Registry::builder()
        .register("stuck", StuckMatcher)
        .unwrap()
        .build();
    let options = RunOptions::default();
    let cancel = options.cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let (summary, results) = run_collect(
        vec![feed("x", "stuck"), feed("y", "stuck")],
        &registry,
        &options,
    )
    .await;

    assert!(results.is_empty());
    assert_eq!(summary.feeds, 2);
}

// ============================================================================
// End to end from a feed list file
// ============================================================================

#[tokio::test]
async fn test_json_feed_list_to_text_output() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news.rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<rss version="2.0"><channel>
    <item><title>Vote delayed</title><description>The president will decide</description></item>
</channel></rss>"#,
        ))
        .mount(&mock_server)
        .await;

    let dir = std::env::temp_dir().join("sift_search_run_json");
    std::fs::create_dir_all(&dir).unwrap();
    let list = dir.join("feeds.json");
    std::fs::write(
        &list,
        format!(
            r#"[{{"site": "news", "link": "{}/news.rss", "type": "rss"}},
               {{"site": "misc", "link": "https://example.com/misc", "type": "json"}}]"#,
            mock_server.uri()
        ),
    )
    .unwrap();

    let registry = Registry::builder()
        .register("rss", RssMatcher::default())
        .unwrap()
        .build();
    let mut sink = TextSink::new(Vec::new());

    let summary = tokio::time::timeout(
        RUN_DEADLINE,
        run(
            &JsonFeedFile::new(&list),
            &registry,
            "president",
            &RunOptions::default(),
            &mut sink,
        ),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(summary.rendered, 1);
    assert_eq!(
        String::from_utf8(sink.into_inner()).unwrap(),
        "Description:\nThe president will decide\n\n"
    );

    std::fs::remove_dir_all(&dir).ok();
}

// ============================================================================
// Property: every run closes the channel exactly when all workers are done
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_run_always_finishes_with_every_result(
        failing in proptest::collection::vec(any::<bool>(), 0..12),
        per_feed in 0usize..4,
    ) {
        let names: Vec<String> = (0..failing.len()).map(|i| format!("feed-{i}")).collect();
        let entries: Vec<(&str, Vec<SearchResult>)> = names
            .iter()
            .zip(&failing)
            .filter(|(_, fails)| !**fails)
            .map(|(name, _)| {
                let results = (0..per_feed).map(|j| title(&format!("{name}/{j}"))).collect();
                (name.as_str(), results)
            })
            .collect();
        let expected = entries.len() * per_feed;

        let registry = Registry::builder()
            .register("table", TableMatcher::new(&entries))
            .unwrap()
            .build();
        let feeds: Vec<Feed> = names.iter().map(|n| feed(n, "table")).collect();

        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let (summary, results) =
            rt.block_on(run_collect(feeds, &registry, &RunOptions::default()));

        prop_assert_eq!(summary.feeds, failing.len());
        prop_assert_eq!(results.len(), expected);
        prop_assert_eq!(summary.panicked, 0);
    }
}
