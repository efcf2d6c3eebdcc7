//! Integration tests for the user API service and polling client.
//!
//! Each test starts the real router on an ephemeral loopback port and drives
//! it with the real `reqwest` client.
//! Run with: cargo test --test integration

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use url::Url;

use user_api::api::{self, AppState};
use user_api::error::ClientError;
use user_api::poller::{Action, PollSession, UserApi, UserApiClient};
use user_api::store::{NewUser, UserStore};

/// Start a store server; dropping the returned sender stops it.
async fn spawn_store(store: UserStore) -> (Url, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    tokio::spawn(api::serve(listener, AppState::with_store(store), async move {
        let _ = stop_rx.await;
    }));

    (Url::parse(&format!("http://{}", addr)).unwrap(), stop_tx)
}

/// A loopback URL nothing is listening on.
async fn closed_port_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}", addr)).unwrap()
}

fn client(base: Url) -> UserApiClient {
    UserApiClient::with_timeout(base, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn client_speaks_the_store_contract() {
    let (base, _stop) = spawn_store(UserStore::seeded()).await;
    let client = client(base);

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "user-api-backend");

    let list = client.list_users().await.unwrap();
    assert_eq!(list.count, 3);
    assert_eq!(list.users[0].name, "Alice Johnson");

    let created = client
        .create_user(&NewUser {
            name: Some("X".to_string()),
            email: Some("x@x.com".to_string()),
            role: None,
        })
        .await
        .unwrap();
    assert_eq!(created.id, 4);
    assert_eq!(created.role, "User");

    let rejected = client.create_user(&NewUser::default()).await;
    assert!(
        matches!(rejected, Err(ClientError::Status { status: 400, .. })),
        "{:?}",
        rejected
    );

    assert_eq!(client.list_users().await.unwrap().count, 4);
}

#[tokio::test]
async fn session_ticks_mutate_the_real_store() {
    let store = UserStore::seeded();
    let (base, _stop) = spawn_store(store.clone()).await;
    let mut session = PollSession::new(client(base), Duration::from_secs(10));

    let mut plans = Vec::new();
    for _ in 0..5 {
        plans.push(session.tick().await);
    }

    assert_eq!(plans[2].as_slice(), &[Action::Create]);
    assert_eq!(plans[4].as_slice(), &[Action::Fetch, Action::HealthCheck]);
    assert_eq!(session.cycle(), 5);
    assert_eq!(session.requests(), 6);

    let users = store.list().await;
    assert_eq!(users.len(), 4);
    assert!(users[3].name.starts_with("Demo User"));
}

#[tokio::test]
async fn unreachable_store_is_logged_and_tolerated() {
    let base = closed_port_url().await;
    let api = client(base);

    let result = api.list_users().await;
    assert!(matches!(result, Err(ClientError::Transport(_))), "{:?}", result);

    let mut session = PollSession::new(api, Duration::from_secs(10));
    for _ in 0..5 {
        session.tick().await;
    }
    assert_eq!(session.cycle(), 5);
    assert_eq!(session.requests(), 6);
}

#[tokio::test]
async fn run_keeps_ticking_until_cancelled() {
    let store = UserStore::seeded();
    let (base, _stop) = spawn_store(store.clone()).await;
    let mut session = PollSession::new(client(base), Duration::from_millis(50));

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::join!(session.run(token), async move {
        tokio::time::sleep(Duration::from_millis(400)).await;
        canceller.cancel();
    });

    assert!(session.cycle() >= 3, "cycles: {}", session.cycle());
    // Startup health check plus at least one call per cycle.
    assert!(session.requests() > session.cycle());
    assert!(store.count().await >= 4);
}
