//! # Runtime Integration Tests
//!
//! Demo-mode runtime: restore, refresh, write, shutdown.

use dashboard_runtime::{DashboardConfig, DashboardRuntime};
use st_01_wallet_session::WalletSessionApi;
use st_02_chain_sync::{ChainSyncApi, MarkerKind};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_demo_runtime_restores_and_refreshes() {
    let runtime = DashboardRuntime::new(DashboardConfig::for_testing()).unwrap();
    runtime.start().await.unwrap();
    let container = runtime.container();

    assert!(container.session.session().is_connected());

    let mut snapshots = container.synchronizer.watch();
    timeout(Duration::from_secs(2), snapshots.wait_for(|s| s.generation >= 1))
        .await
        .expect("no snapshot published")
        .unwrap();

    let markers = container.synchronizer.snapshot().markers();
    assert_eq!(markers.len(), 4);
    assert_eq!(markers[0].kind, MarkerKind::User);
    assert!(matches!(markers[3].kind, MarkerKind::Carrier { .. }));

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_write_triggers_refresh() {
    let runtime = DashboardRuntime::new(DashboardConfig::for_testing()).unwrap();
    runtime.start().await.unwrap();
    let sync = runtime.container().synchronizer.clone();

    let mut snapshots = sync.watch();
    timeout(Duration::from_secs(2), snapshots.wait_for(|s| s.generation >= 1))
        .await
        .unwrap()
        .unwrap();

    sync.decline_order_request("ORD-1002").await.unwrap();
    timeout(Duration::from_secs(2), snapshots.wait_for(|s| s.generation >= 2))
        .await
        .expect("write did not trigger a refresh")
        .unwrap();

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_releases_wallet_subscription() {
    let runtime = DashboardRuntime::new(DashboardConfig::for_testing()).unwrap();
    let provider = runtime.container().demo_provider().unwrap();

    runtime.start().await.unwrap();
    assert_eq!(provider.active_listeners(), 1);

    runtime.shutdown().await;
    assert_eq!(provider.active_listeners(), 0);
}
