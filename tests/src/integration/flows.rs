//! # Integration Test Flows
//!
//! The wallet session (st-01) owns who is connected; the chain synchronizer
//! (st-02) reads that through a watch channel and owns the snapshot.
//!
//! ## Flows Tested
//!
//! 1. Connect → refresh → map markers
//! 2. Disconnect, revoke and account switches as seen by the synchronizer
//! 3. Writes that fail before confirmation leave the snapshot untouched
//! 4. Confirmed patches agree with what the next full read returns
//! 5. Confirmed writes announce `LedgerUpdated` on the event bus
//! 6. Repeated mount/unmount leaves no provider subscriptions behind

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use shared_bus::{DashboardEvent, EventFilter, EventTopic, InMemoryEventBus};
    use shared_types::{Coordinates, RequestStatus, ShipmentStatus, TransportType, WalletAddress};
    use st_01_wallet_session::{
        InMemoryWalletProvider, WalletProvider, WalletSessionApi, WalletSessionConfig,
        WalletSessionManager,
    };
    use st_02_chain_sync::{
        CarbonEstimate, CarbonService, ChainSyncApi, ChainSynchronizer, InMemoryLedger,
        LedgerFault, MarkerKind, NewOrder, OrderResponse, SyncConfig, SyncError,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn account(byte: &str) -> WalletAddress {
        WalletAddress::parse(&format!("0x{}", byte.repeat(20))).unwrap()
    }

    struct Harness {
        provider: Arc<InMemoryWalletProvider>,
        session: Arc<WalletSessionManager>,
        ledger: Arc<InMemoryLedger>,
        sync: ChainSynchronizer<InMemoryLedger>,
    }

    fn harness() -> Harness {
        let provider = Arc::new(
            InMemoryWalletProvider::new(1)
                .with_account(account("11"))
                .with_account(account("22")),
        );
        let session = Arc::new(WalletSessionManager::new(
            WalletSessionConfig::for_testing(),
            Some(provider.clone() as Arc<dyn WalletProvider>),
        ));
        let ledger = Arc::new(InMemoryLedger::with_demo_data());
        ledger.set_location(account("11"), 40_712_800, -74_006_000);
        ledger.set_location(account("22"), 51_507_400, -127_800);

        let sync =
            ChainSynchronizer::new(SyncConfig::for_testing(), ledger.clone(), session.watch());
        Harness {
            provider,
            session,
            ledger,
            sync,
        }
    }

    /// Carbon calculator that is down for one order.
    struct FlakyCarbon {
        down_for: &'static str,
    }

    #[async_trait]
    impl CarbonService for FlakyCarbon {
        async fn calculate(&self, order_id: &str) -> Result<CarbonEstimate, SyncError> {
            if order_id == self.down_for {
                return Err(SyncError::ServiceUnavailable {
                    service: "carbon",
                    status: Some(503),
                    message: "HTTP 503".into(),
                });
            }
            Ok(CarbonEstimate {
                order_id: order_id.to_string(),
                emissions: 12.345,
                distance: 120.0,
                transport_type: "truck".into(),
            })
        }
    }

    // =========================================================================
    // SESSION → SNAPSHOT
    // =========================================================================

    #[tokio::test]
    async fn test_connect_refresh_markers() {
        let h = harness();
        assert_eq!(h.sync.refresh().await.unwrap_err(), SyncError::NotConnected);

        h.session.connect_wallet().await.unwrap();
        let snapshot = h.sync.refresh().await.unwrap();

        let kinds: Vec<_> = snapshot.markers().into_iter().map(|m| m.kind).collect();
        assert_eq!(kinds.len(), 4);
        assert_eq!(kinds[0], MarkerKind::User);
        assert!(matches!(kinds[1], MarkerKind::Partner { .. }));
        assert!(matches!(kinds[2], MarkerKind::Partner { .. }));
        assert_eq!(
            kinds[3],
            MarkerKind::Carrier {
                order_id: "ORD-1001".into()
            }
        );

        let summary = snapshot.summary();
        assert_eq!(summary.active, 1);
        assert_eq!(summary.requests, 1);
    }

    #[tokio::test]
    async fn test_disconnect_keeps_snapshot_but_blocks_sync() {
        let h = harness();
        h.session.connect_wallet().await.unwrap();
        let before = h.sync.refresh().await.unwrap();

        h.session.disconnect_wallet();
        assert_eq!(h.sync.refresh().await.unwrap_err(), SyncError::NotConnected);
        assert_eq!(
            h.sync.complete_shipment("ORD-1001").await.unwrap_err(),
            SyncError::NotConnected
        );
        assert!(Arc::ptr_eq(&h.sync.snapshot(), &before));
        assert!(h.ledger.submitted_calls().is_empty());
    }

    #[tokio::test]
    async fn test_account_switch_follows_session() {
        let h = harness();
        let listener = h.session.mount().await.unwrap();
        h.session.connect_wallet().await.unwrap();

        let first = h.sync.refresh().await.unwrap();
        assert!((first.user_location.unwrap().lat - 40.7128).abs() < 1e-9);

        h.provider
            .change_accounts(vec![account("22"), account("11")])
            .await;
        let mut session = h.session.watch();
        timeout(
            Duration::from_secs(1),
            session.wait_for(|s| s.address() == Some(&account("22"))),
        )
        .await
        .expect("session did not follow the provider")
        .unwrap();

        let second = h.sync.refresh().await.unwrap();
        assert!((second.user_location.unwrap().lat - 51.5074).abs() < 1e-9);

        listener.stop().await;
    }

    #[tokio::test]
    async fn test_revoke_blocks_writes() {
        let h = harness();
        let listener = h.session.mount().await.unwrap();
        h.session.connect_wallet().await.unwrap();

        h.provider.revoke().await;
        let mut session = h.session.watch();
        timeout(Duration::from_secs(1), session.wait_for(|s| !s.is_connected()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            h.sync
                .update_user_location(Coordinates::new(1.0, 1.0).unwrap())
                .await
                .unwrap_err(),
            SyncError::NotConnected
        );
        listener.stop().await;
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    #[tokio::test]
    async fn test_write_failure_leaves_snapshot_untouched() {
        let h = harness();
        h.session.connect_wallet().await.unwrap();
        let before = h.sync.refresh().await.unwrap();

        for fault in [LedgerFault::Submit, LedgerFault::Confirmation] {
            h.ledger.inject_fault(fault);
            assert!(h.sync.complete_shipment("ORD-1001").await.is_err());
            h.ledger.clear_fault(fault);

            let order = h.sync.snapshot().order("ORD-1001").cloned().unwrap();
            assert_eq!(order.shipment_status, ShipmentStatus::InTransit);
            assert!(!order.is_paid);
        }
        assert!(Arc::ptr_eq(&h.sync.snapshot(), &before));

        h.sync.complete_shipment("ORD-1001").await.unwrap();
        assert!(h.sync.snapshot().order("ORD-1001").unwrap().is_paid);
    }

    #[tokio::test]
    async fn test_order_lifecycle_patches_match_ledger() {
        let h = harness();
        h.session.connect_wallet().await.unwrap();
        h.sync.refresh().await.unwrap();

        let order = NewOrder::new("SUPP-001", "PROD-X", TransportType::Ship);
        let id = order.id.clone();
        h.sync.create_order(order).await.unwrap();
        h.sync
            .respond_to_order_request(
                &id,
                OrderResponse::Accept {
                    price: "2.25".into(),
                    delivery_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
                },
            )
            .await
            .unwrap();
        h.sync.start_shipment(&id, "CARR-07").await.unwrap();

        let patched = h.sync.snapshot().order(&id).cloned().unwrap();
        assert_eq!(patched.request_status, RequestStatus::Approved);
        assert_eq!(patched.shipment_status, ShipmentStatus::InTransit);
        assert_eq!(patched.carrier_id.as_deref(), Some("CARR-07"));

        let refreshed = h.sync.refresh().await.unwrap();
        assert_eq!(refreshed.order(&id), Some(&patched));
        assert_eq!(refreshed.markers().len(), 5);
    }

    #[tokio::test]
    async fn test_emissions_batch_skips_failures() {
        let h = harness();
        h.session.connect_wallet().await.unwrap();
        let sync = ChainSynchronizer::new(
            SyncConfig::for_testing(),
            h.ledger.clone(),
            h.session.watch(),
        )
        .with_carbon_service(Arc::new(FlakyCarbon {
            down_for: "ORD-1001",
        }));

        let order = NewOrder::new("SUPP-001", "PROD-Y", TransportType::Truck).with_id("ORD-2001");
        sync.create_order(order).await.unwrap();
        sync.accept_order_request("ORD-2001", "1", NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
            .await
            .unwrap();
        sync.start_shipment("ORD-2001", "CARR-09").await.unwrap();
        sync.refresh().await.unwrap();

        assert_eq!(sync.calculate_emissions_for_active_shipments().await.unwrap(), 1);
        let snapshot = sync.refresh().await.unwrap();
        assert!(snapshot.emission_for("ORD-1001").is_none());
        let recorded = snapshot.emission_for("ORD-2001").unwrap();
        assert!((recorded.emissions - 12.345).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_confirmed_write_is_announced_on_bus() {
        let h = harness();
        h.session.connect_wallet().await.unwrap();
        let bus = Arc::new(InMemoryEventBus::new());
        let sync = ChainSynchronizer::new(
            SyncConfig::for_testing(),
            h.ledger.clone(),
            h.session.watch(),
        )
        .with_event_bus(bus.clone());
        let mut ledger_events = bus.subscribe(EventFilter::topics(vec![EventTopic::Ledger]));

        // A failed write announces nothing.
        h.ledger.inject_fault(LedgerFault::Submit);
        assert!(sync.decline_order_request("ORD-1002").await.is_err());
        h.ledger.clear_fault(LedgerFault::Submit);

        let tx = sync.decline_order_request("ORD-1002").await.unwrap();
        let event = timeout(Duration::from_secs(1), ledger_events.recv())
            .await
            .expect("no ledger event");
        assert_eq!(
            event,
            Some(DashboardEvent::LedgerUpdated {
                tx_hash: tx,
                method: "declineOrderRequest",
            })
        );
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_remount_leaves_no_dangling_subscriptions() {
        let h = harness();
        for _ in 0..3 {
            let listener = h.session.mount().await.unwrap();
            assert_eq!(h.provider.active_listeners(), 1);
            listener.stop().await;
            assert_eq!(h.provider.active_listeners(), 0);
        }

        // Dropping without stop also releases, once the task is torn down.
        let listener = h.session.mount().await.unwrap();
        drop(listener);
        timeout(Duration::from_secs(1), async {
            while h.provider.active_listeners() != 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("subscription outlived its listener");
    }
}
