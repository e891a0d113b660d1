//! HTTP existence oracle against a mock CDN
use std::sync::Arc;

use basket_scout::application::BasketRangeMapper;
use basket_scout::domain::{Article, BasketLabel, ExistenceOracle, VolumeCatalog, VolumeId};
use basket_scout::infrastructure::config::ProbeConfig;
use basket_scout::infrastructure::{HttpBasketOracle, HttpClient, HttpClientConfig, NoDelay, RetryPolicy};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: u64 = 1_234_567;
const PROBE_PATH: &str = "/basket-03/vol12/part1234/1234567/images/big/1.webp";

fn probe_config(host_pattern: String, max_retries: u32) -> ProbeConfig {
    ProbeConfig {
        host_pattern,
        timeout_seconds: 2,
        delay_ms: 0,
        retry: RetryPolicy {
            max_retries,
            base_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
            jitter: false,
        },
        ..ProbeConfig::default()
    }
}

fn oracle_for(articles: &[u64], probe: &ProbeConfig) -> HttpBasketOracle<NoDelay> {
    let catalog = Arc::new(VolumeCatalog::from_articles(articles.iter().copied().map(Article::new)));
    let client = HttpClient::new(HttpClientConfig::for_probes(probe)).unwrap();
    HttpBasketOracle::new(catalog, client, NoDelay, probe)
}

fn mock_pattern(server: &MockServer) -> String {
    format!("{}/basket-{{basket}}", server.uri())
}

fn basket(value: u8) -> BasketLabel {
    BasketLabel::new(value).unwrap()
}

#[tokio::test]
async fn ok_response_means_basket_serves_volume() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path(PROBE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = oracle_for(&[ARTICLE], &probe_config(mock_pattern(&server), 0));

    assert!(oracle.probe(0, basket(3)).await);
    assert!(!oracle.probe(0, basket(2)).await);
}

#[tokio::test]
async fn server_error_is_a_miss_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path(PROBE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let oracle = oracle_for(&[ARTICLE], &probe_config(mock_pattern(&server), 2));

    assert!(!oracle.probe(0, basket(3)).await);
}

#[tokio::test]
async fn server_error_without_retries_is_single_request() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path(PROBE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = oracle_for(&[ARTICLE], &probe_config(mock_pattern(&server), 0));

    assert!(!oracle.probe(0, basket(3)).await);
}

#[tokio::test]
async fn throttled_probe_recovers_on_retry() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path(PROBE_PATH))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path(PROBE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(2)
        .mount(&server)
        .await;

    let oracle = oracle_for(&[ARTICLE], &probe_config(mock_pattern(&server), 1));

    assert!(oracle.probe(0, basket(3)).await);
}

#[tokio::test]
async fn unreachable_host_is_a_miss() {
    let probe = probe_config("http://127.0.0.1:1/basket-{basket}".to_string(), 0);
    let oracle = oracle_for(&[ARTICLE], &probe);

    assert!(!oracle.probe(0, basket(3)).await);
}

#[tokio::test]
async fn out_of_bounds_index_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let oracle = oracle_for(&[ARTICLE], &probe_config(mock_pattern(&server), 0));

    assert!(!oracle.probe(1, basket(3)).await);
    assert!(!oracle.probe(usize::MAX, basket(3)).await);
}

#[tokio::test]
async fn mapper_resolves_volumes_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path_regex(r"^/basket-02/vol1[23]/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let probe = probe_config(mock_pattern(&server), 0);
    let catalog = Arc::new(VolumeCatalog::from_articles([
        Article::new(ARTICLE),
        Article::new(1_300_001),
    ]));
    let client = HttpClient::new(HttpClientConfig::for_probes(&probe)).unwrap();
    let oracle = HttpBasketOracle::new(Arc::clone(&catalog), client, NoDelay, &probe);

    let report = BasketRangeMapper::new(&catalog, &oracle)
        .with_max_basket(basket(4))
        .run()
        .await;

    assert_eq!(report.mapping.get(VolumeId::new(12)), Some(basket(2)));
    assert_eq!(report.mapping.get(VolumeId::new(13)), Some(basket(2)));
    assert_eq!(report.probes, 3);
}
