//! # Session State Machine
//!
//! The wallet session as an explicit tagged state plus the network id.
//!
//! `connected` implies an address and `connecting`/`connected` are mutually
//! exclusive: both hold by construction because only `Connected` carries an
//! address and each variant is exactly one of the four statuses.

use serde::{Deserialize, Serialize};
use shared_types::{ChainId, WalletAddress};

/// Connection status of the session.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// Initial state; no address.
    #[default]
    Disconnected,
    /// Account access requested, awaiting the wallet.
    Connecting,
    /// Address known.
    Connected {
        /// The selected account.
        address: WalletAddress,
    },
    /// The last attempt failed.
    Error {
        /// User-facing message.
        message: String,
    },
}

/// Transitions over the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionAction {
    /// A connection attempt started.
    ConnectStart,
    /// The wallet granted access.
    ConnectSuccess {
        /// Granted account.
        address: WalletAddress,
        /// Network the wallet is on.
        chain_id: ChainId,
    },
    /// The attempt failed.
    ConnectError(String),
    /// Local, UI-only disconnect.
    Disconnect,
    /// Provider switched networks.
    ChainChanged(ChainId),
    /// Provider's selected account changed; `None` when the list is empty.
    AccountChanged(Option<WalletAddress>),
}

/// The wallet session.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Session {
    status: ConnectionStatus,
    chain_id: Option<ChainId>,
}

impl Session {
    /// The all-empty initial value.
    pub fn initial() -> Self {
        Self::default()
    }

    /// Current status.
    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    /// Connected account, if any.
    pub fn address(&self) -> Option<&WalletAddress> {
        match &self.status {
            ConnectionStatus::Connected { address } => Some(address),
            _ => None,
        }
    }

    /// Last known network.
    pub fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    /// Awaiting the wallet.
    pub fn is_connecting(&self) -> bool {
        matches!(self.status, ConnectionStatus::Connecting)
    }

    /// Address known.
    pub fn is_connected(&self) -> bool {
        matches!(self.status, ConnectionStatus::Connected { .. })
    }

    /// Error from the last failed attempt.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ConnectionStatus::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Compute the next session. Pure and total: every action is defined
    /// for every state.
    pub fn apply(&self, action: SessionAction) -> Session {
        match action {
            SessionAction::ConnectStart => Session {
                status: ConnectionStatus::Connecting,
                chain_id: self.chain_id,
            },
            SessionAction::ConnectSuccess { address, chain_id } => Session {
                status: ConnectionStatus::Connected { address },
                chain_id: Some(chain_id),
            },
            SessionAction::ConnectError(message) => Session {
                status: ConnectionStatus::Error { message },
                chain_id: self.chain_id,
            },
            SessionAction::Disconnect => Session::initial(),
            SessionAction::ChainChanged(chain_id) => Session {
                status: self.status.clone(),
                chain_id: Some(chain_id),
            },
            SessionAction::AccountChanged(Some(address)) => Session {
                status: ConnectionStatus::Connected { address },
                chain_id: self.chain_id,
            },
            // Empty account list: address-level disconnect only. The chain id
            // survives, unlike `Disconnect`.
            SessionAction::AccountChanged(None) => match self.status {
                ConnectionStatus::Connected { .. } => Session {
                    status: ConnectionStatus::Disconnected,
                    chain_id: self.chain_id,
                },
                _ => self.clone(),
            },
        }
    }

    /// Flat, serializable view for display widgets.
    pub fn view(&self) -> SessionView {
        SessionView {
            address: self.address().cloned(),
            chain_id: self.chain_id,
            is_connecting: self.is_connecting(),
            is_connected: self.is_connected(),
            error: self.error().map(str::to_string),
        }
    }
}

/// The session as display widgets consume it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// Connected account.
    pub address: Option<WalletAddress>,
    /// Last known network.
    pub chain_id: Option<ChainId>,
    /// Awaiting the wallet.
    pub is_connecting: bool,
    /// Address known.
    pub is_connected: bool,
    /// Error from the last failed attempt.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn addr(n: u8) -> WalletAddress {
        WalletAddress::parse(&format!("0x{:040x}", n)).unwrap()
    }

    fn connected(n: u8, chain_id: ChainId) -> Session {
        Session::initial()
            .apply(SessionAction::ConnectStart)
            .apply(SessionAction::ConnectSuccess {
                address: addr(n),
                chain_id,
            })
    }

    #[test]
    fn test_initial_session() {
        let s = Session::initial();
        assert!(!s.is_connected());
        assert!(!s.is_connecting());
        assert!(s.address().is_none());
        assert!(s.chain_id().is_none());
        assert!(s.error().is_none());
    }

    #[test]
    fn test_connect_start_clears_error() {
        let s = Session::initial()
            .apply(SessionAction::ConnectError("boom".into()))
            .apply(SessionAction::ConnectStart);
        assert!(s.is_connecting());
        assert!(s.error().is_none());
    }

    #[test]
    fn test_connect_success() {
        let s = connected(1, 11155111);
        assert!(s.is_connected());
        assert!(!s.is_connecting());
        assert_eq!(s.address(), Some(&addr(1)));
        assert_eq!(s.chain_id(), Some(11155111));
    }

    #[test]
    fn test_connect_error_leaves_disconnected_semantics() {
        let s = Session::initial()
            .apply(SessionAction::ConnectStart)
            .apply(SessionAction::ConnectError("User rejected".into()));
        assert!(!s.is_connected());
        assert!(!s.is_connecting());
        assert_eq!(s.error(), Some("User rejected"));
    }

    #[test]
    fn test_chain_changed_only_touches_chain_id() {
        let s = connected(1, 1).apply(SessionAction::ChainChanged(137));
        assert!(s.is_connected());
        assert_eq!(s.chain_id(), Some(137));

        let s = Session::initial().apply(SessionAction::ChainChanged(5));
        assert!(!s.is_connected());
        assert_eq!(s.chain_id(), Some(5));
    }

    #[test]
    fn test_account_changed_to_none_keeps_chain_id() {
        let s = connected(1, 10).apply(SessionAction::AccountChanged(None));
        assert!(!s.is_connected());
        assert!(s.address().is_none());
        assert_eq!(s.chain_id(), Some(10));
        assert_ne!(s, Session::initial());
    }

    #[test]
    fn test_account_changed_switches_address() {
        let s = connected(1, 10).apply(SessionAction::AccountChanged(Some(addr(2))));
        assert_eq!(s.address(), Some(&addr(2)));
        assert_eq!(s.chain_id(), Some(10));
    }

    #[test]
    fn test_account_changed_while_connecting_settles_connected() {
        let s = Session::initial()
            .apply(SessionAction::ConnectStart)
            .apply(SessionAction::AccountChanged(Some(addr(3))));
        assert!(s.is_connected());
        assert!(!s.is_connecting());
    }

    #[test]
    fn test_account_changed_none_keeps_error() {
        let s = Session::initial()
            .apply(SessionAction::ConnectError("nope".into()))
            .apply(SessionAction::AccountChanged(None));
        assert_eq!(s.error(), Some("nope"));
    }

    #[test]
    fn test_disconnect_resets() {
        let s = connected(1, 10).apply(SessionAction::Disconnect);
        assert_eq!(s, Session::initial());
    }

    #[test]
    fn test_view_is_flat() {
        let view = connected(1, 1).view();
        assert!(view.is_connected);
        assert!(!view.is_connecting);
        assert_eq!(view.address, Some(addr(1)));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["isConnected"], true);
        assert_eq!(json["chainId"], 1);
    }

    fn arb_address() -> impl Strategy<Value = WalletAddress> {
        (1u8..5).prop_map(addr)
    }

    fn arb_action() -> impl Strategy<Value = SessionAction> {
        prop_oneof![
            Just(SessionAction::ConnectStart),
            (arb_address(), any::<u64>())
                .prop_map(|(address, chain_id)| SessionAction::ConnectSuccess { address, chain_id }),
            "[a-z ]{1,16}".prop_map(SessionAction::ConnectError),
            Just(SessionAction::Disconnect),
            any::<u64>().prop_map(SessionAction::ChainChanged),
            proptest::option::of(arb_address()).prop_map(SessionAction::AccountChanged),
        ]
    }

    fn run(actions: &[SessionAction]) -> Session {
        actions
            .iter()
            .cloned()
            .fold(Session::initial(), |s, a| s.apply(a))
    }

    proptest! {
        #[test]
        fn prop_connected_and_connecting_are_exclusive(actions in prop::collection::vec(arb_action(), 0..32)) {
            let s = run(&actions);
            prop_assert!(!(s.is_connected() && s.is_connecting()));
            prop_assert_eq!(s.is_connected(), s.address().is_some());
        }

        #[test]
        fn prop_start_then_success_is_connected(
            prefix in prop::collection::vec(arb_action(), 0..16),
            address in arb_address(),
            chain_id in any::<u64>(),
        ) {
            let mut actions = prefix;
            actions.push(SessionAction::ConnectStart);
            actions.push(SessionAction::ConnectSuccess { address, chain_id });
            let s = run(&actions);
            prop_assert!(s.is_connected());
            prop_assert!(!s.is_connecting());
            prop_assert!(s.error().is_none());
        }

        #[test]
        fn prop_ending_in_disconnect_is_initial(prefix in prop::collection::vec(arb_action(), 0..32)) {
            let mut actions = prefix;
            actions.push(SessionAction::Disconnect);
            prop_assert_eq!(run(&actions), Session::initial());
        }

        #[test]
        fn prop_account_changed_none_is_never_connected(prefix in prop::collection::vec(arb_action(), 0..32)) {
            let mut actions = prefix;
            actions.push(SessionAction::AccountChanged(None));
            prop_assert!(!run(&actions).is_connected());
        }
    }
}
