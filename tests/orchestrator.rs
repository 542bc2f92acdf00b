//! Tests driven through the public [`llmrouter::Orchestrator`] entry point,
//! covering config loading, dev-mode mock substitution, and status
//! reporting end to end.

use llmrouter::Orchestrator;
use llmrouter_config::{AdaptorKind, BackendEntry, BackendKindEntry, CacheSection, ConfigFile, RouterSection, TimeoutSection};
use llmrouter_core::RequestOptions;

fn backend_entry(name: &str, adaptor: AdaptorKind, enabled: bool) -> BackendEntry {
    BackendEntry {
        name: name.to_string(),
        kind: BackendKindEntry::SelfHosted,
        priority: 0,
        cost_per_output_token: 0.0,
        endpoint: None,
        model: None,
        api_key_env: None,
        adaptor,
        default_timeout_ms: 1_000,
        enabled,
    }
}

fn config_file(backends: Vec<BackendEntry>, dev_mode: bool) -> ConfigFile {
    ConfigFile {
        backends,
        cache: CacheSection { max_size: 10, ttl_secs: 60 },
        router: RouterSection::default(),
        timeouts: TimeoutSection::default(),
        dev_mode,
    }
}

#[tokio::test]
async fn completes_a_request_against_a_single_mock_backend() {
    let config = llmrouter_config::canonicalize(config_file(vec![backend_entry("mock", AdaptorKind::Mock, true)], false));
    let orchestrator = Orchestrator::new(config).unwrap();
    orchestrator.initialise().await;

    let response = orchestrator.complete("hello there", vec![], RequestOptions::default()).await.unwrap();
    assert_eq!(response.backend_used, "mock");

    let status = orchestrator.status().await;
    assert_eq!(status.backends.len(), 1);
    assert!(status.cache.entries >= 1);

    orchestrator.cleanup().await;
}

#[tokio::test]
async fn dev_mode_substitutes_a_mock_backend_and_reports_a_warning() {
    // A hosted backend with no credential is disabled at canonicalisation;
    // with no other backend configured and dev_mode on, the orchestrator
    // must fall back to a mock rather than leave no healthy backend at all.
    let config = llmrouter_config::canonicalize(config_file(vec![backend_entry("hosted", AdaptorKind::Hosted, true)], true));
    assert!(!config.backends[0].enabled, "a hosted backend with no credential must be disabled");

    let orchestrator = Orchestrator::new(config).unwrap();
    orchestrator.initialise().await;

    let response = orchestrator.complete("ping", vec![], RequestOptions::default()).await.unwrap();
    assert_eq!(response.backend_used, "dev-mock");

    let report = orchestrator.config_validation_report();
    assert!(report.iter().any(|line| line.contains("dev-mock")), "substitution must be reported, never silent");

    orchestrator.cleanup().await;
}

#[tokio::test]
async fn without_dev_mode_no_enabled_backend_is_a_hard_error() {
    let config = llmrouter_config::canonicalize(config_file(vec![backend_entry("hosted", AdaptorKind::Hosted, true)], false));
    let orchestrator = Orchestrator::new(config).unwrap();
    orchestrator.initialise().await;

    let err = orchestrator.complete("ping", vec![], RequestOptions::default()).await.unwrap_err();
    assert!(matches!(err, llmrouter_core::RouterError::NoHealthyBackend { .. }));

    orchestrator.cleanup().await;
}
