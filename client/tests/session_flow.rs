//! End-to-end session lifecycle against scripted adapters.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use eraiiz_client::domain::auth::Role;
use eraiiz_client::domain::ports::{ApiRequest, ApiResponse, RedirectTarget, SessionPersistence};
use eraiiz_client::domain::session_monitor::{SessionMonitor, SessionMonitorConfig};
use eraiiz_client::domain::{AuthHttpClient, SessionStore};
use eraiiz_client::outbound::persistence::FileStateStore;
use eraiiz_client::test_support::api::{ScriptedAuthApi, ScriptedGateway};
use eraiiz_client::test_support::auth::{
    sample_profile, test_now, token_pair_expiring_in_secs,
};
use eraiiz_client::test_support::clock::MutableClock;
use eraiiz_client::test_support::nav::RecordingNavigator;
use eraiiz_client::test_support::storage::temp_state_dir;
use eraiiz_client::test_support::sync::ImmediateSleeper;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn restored_session_recovers_from_expiry_and_persists_fresh_tokens() {
    init_tracing();
    let dir = temp_state_dir();

    // A previous run left credentials behind.
    {
        let seed_store = FileStateStore::open(dir.path()).expect("store opens");
        let pair = token_pair_expiring_in_secs(60);
        seed_store
            .store(&eraiiz_client::domain::ports::PersistedSession {
                access_token: pair.access.as_str().to_owned(),
                refresh_token: pair.refresh.as_str().to_owned(),
                user: sample_profile(Role::Seller),
            })
            .await
            .expect("seed persisted session");
    }

    let persistence = Arc::new(FileStateStore::open(dir.path()).expect("store opens"));
    let auth = Arc::new(ScriptedAuthApi::with_refreshes(vec![Ok(
        token_pair_expiring_in_secs(7_200),
    )]));
    let navigator = Arc::new(RecordingNavigator::default());
    let store = Arc::new(SessionStore::new(
        auth.clone(),
        persistence.clone(),
        navigator.clone(),
    ));

    let profile = store
        .initialise()
        .await
        .expect("initialise succeeds")
        .expect("session restored");
    assert_eq!(profile.role(), Role::Seller);

    // The stale token earns a 401, then the replay succeeds.
    let gateway = Arc::new(ScriptedGateway::with_responses(vec![
        Ok(ApiResponse {
            status: 401,
            body: Vec::new(),
        }),
        Ok(ApiResponse {
            status: 200,
            body: br#"[]"#.to_vec(),
        }),
    ]));
    let client = AuthHttpClient::new(gateway.clone(), store.clone());

    let response = client
        .execute(ApiRequest::get("/api/orders"))
        .await
        .expect("replay succeeds");
    assert_eq!(response.status, 200);
    assert_eq!(auth.refresh_calls(), 1);
    assert_eq!(gateway.calls(), 2);
    assert!(navigator.redirects().is_empty());

    // The renewed pair reached the state file.
    let persisted = persistence
        .load()
        .await
        .expect("load persisted")
        .expect("still logged in");
    let current = store.snapshot().expect("session live");
    assert_eq!(persisted.access_token, current.tokens().access.as_str());
}

#[tokio::test]
async fn idle_monitor_ends_the_session_and_redirects_once() {
    init_tracing();
    let clock = Arc::new(MutableClock::new(test_now()));
    let navigator = Arc::new(RecordingNavigator::default());
    let persistence = Arc::new(eraiiz_client::domain::ports::InMemoryStateStore::default());
    let store = Arc::new(SessionStore::new(
        Arc::new(ScriptedAuthApi::default()),
        persistence.clone(),
        navigator.clone(),
    ));
    store
        .login(
            token_pair_expiring_in_secs(24 * 3_600),
            sample_profile(Role::Buyer),
        )
        .await
        .expect("login succeeds");

    let monitor = Arc::new(SessionMonitor::with_runtime(
        store.clone(),
        clock.clone(),
        Arc::new(ImmediateSleeper),
        SessionMonitorConfig::default(),
    ));
    clock.advance(Duration::from_secs(30 * 60));
    let handle = monitor.clone().spawn();

    // The monitor ends itself after forcing the logout.
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if store.snapshot().is_none() {
                break;
            }
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("logout observed");
    handle.stopped().await;

    assert_eq!(persistence.snapshot(), None);
    assert_eq!(navigator.redirects(), vec![RedirectTarget::Login]);
}
