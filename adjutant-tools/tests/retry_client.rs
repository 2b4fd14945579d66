use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde_json::{Value, json};

use adjutant_tools::client::{RetryPolicy, ToolClient, Transport};
use adjutant_tools::error::ToolError;

/// Fails transiently a fixed number of times, then succeeds.
struct FlakyTransport {
    calls: AtomicU32,
    failures_before_success: u32,
}

impl FlakyTransport {
    fn new(failures_before_success: u32) -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures_before_success,
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for FlakyTransport {
    async fn call(&self, _operation: &str, _arguments: &Value) -> Result<Value, ToolError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.failures_before_success {
            Err(ToolError::Server(format!("flaky failure {n}")))
        } else {
            Ok(json!({"attempt": n}))
        }
    }
}

/// Always fails with a non-retryable kind.
struct RejectingTransport {
    calls: AtomicU32,
}

impl Transport for RejectingTransport {
    async fn call(&self, _operation: &str, _arguments: &Value) -> Result<Value, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ToolError::InvalidArguments("missing summary".to_string()))
    }
}

/// Never answers within the client's call timeout.
struct StalledTransport {
    calls: AtomicU32,
}

impl Transport for StalledTransport {
    async fn call(&self, _operation: &str, _arguments: &Value) -> Result<Value, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Value::Null)
    }
}

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        jitter: false,
        call_timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn transient_failures_then_success_uses_k_plus_one_attempts() {
    let client = ToolClient::new(FlakyTransport::new(2), fast_policy(5));
    let result = client.invoke("search_docs", json!({"query": "grep"})).await;
    assert_eq!(result.unwrap()["attempt"], 3);
    assert_eq!(client.transport().calls(), 3);
}

#[tokio::test]
async fn always_transient_exhausts_exactly_max_attempts() {
    let client = ToolClient::new(FlakyTransport::new(u32::MAX), fast_policy(3));
    let err = client
        .invoke("search_docs", json!({"query": "grep"}))
        .await
        .unwrap_err();
    match err {
        ToolError::RetriesExhausted {
            operation,
            attempts,
            last,
        } => {
            assert_eq!(operation, "search_docs");
            assert_eq!(attempts, 3);
            assert!(last.is_transient());
        }
        other => panic!("expected retries exhausted, got {other:?}"),
    }
    assert_eq!(client.transport().calls(), 3);
}

#[tokio::test]
async fn permanent_failure_is_not_retried() {
    let client = ToolClient::new(
        RejectingTransport {
            calls: AtomicU32::new(0),
        },
        fast_policy(5),
    );
    let err = client
        .invoke("create_event", json!({"user_id": 1}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));
    assert_eq!(client.transport().calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn timeouts_are_transient_and_bounded() {
    let mut policy = fast_policy(2);
    policy.call_timeout = Duration::from_millis(10);
    let client = ToolClient::new(
        StalledTransport {
            calls: AtomicU32::new(0),
        },
        policy,
    );

    let err = client.invoke("list_today", json!({"user_id": 1})).await.unwrap_err();
    match err {
        ToolError::RetriesExhausted { attempts, last, .. } => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, ToolError::Timeout(_)));
        }
        other => panic!("expected retries exhausted, got {other:?}"),
    }
    assert_eq!(client.transport().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn dry_run_never_touches_the_transport() {
    let client = ToolClient::new(FlakyTransport::new(0), fast_policy(3)).with_dry_run(true);
    let result = client
        .invoke(
            "create_event",
            json!({"user_id": 42, "summary": "Team sync"}),
        )
        .await
        .unwrap();

    let line = result.as_str().unwrap();
    assert!(line.contains("create_event"));
    assert!(line.contains("42"));
    assert!(line.contains("Team sync"));
    assert_eq!(client.transport().calls(), 0);
}

#[tokio::test]
async fn concurrent_invokes_back_off_independently() {
    let a = ToolClient::new(FlakyTransport::new(2), fast_policy(5));
    let b = ToolClient::new(FlakyTransport::new(1), fast_policy(5));

    let (ra, rb) = tokio::join!(
        a.invoke("search_docs", json!({"query": "tar"})),
        b.invoke("search_docs", json!({"query": "git"})),
    );
    assert!(ra.is_ok());
    assert!(rb.is_ok());
    assert_eq!(a.transport().calls(), 3);
    assert_eq!(b.transport().calls(), 2);
}
