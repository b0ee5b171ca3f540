//! Integration test: SimulatedMarket fills reconciled into AgentState and
//! persisted through JsonFileStore.

use hermes_core::{AgentState, Trade, TradeAction};
use hermes_gateway::{JsonFileStore, SimulatedMarket};
use hermes_ports::{MarketGateway, StateStore, TradeStore};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_fill_reconcile_persist_reload() {
    let _ = env_logger::try_init();

    let root = std::env::temp_dir().join(format!("hermes-paper-{}", uuid::Uuid::new_v4()));
    let store = JsonFileStore::new(&root);
    let market = SimulatedMarket::new();
    market.set_price("XYZ", dec!(50.00));
    market.open_account("alice", dec!(1000.00));

    let mut state = AgentState::new("alice", dec!(1000.00));

    // Buy 200.00 of XYZ at 50.00
    let mut trade = Trade::buy("alice", "XYZ", dec!(200.00));
    state.validate(&trade).unwrap();
    market.place_order(&mut trade).await.unwrap();
    state.apply_fill(&trade).unwrap();
    store.save_trade(&trade).await.unwrap();
    store.save_state(&state).await.unwrap();

    // Local state agrees with the brokerage after reconciliation
    let account = market.account("alice").await.unwrap();
    assert_eq!(state.account.cash, account.cash);
    assert_eq!(state.available_quantity("XYZ"), dec!(4));

    // Refresh from the brokerage is a no-op on a reconciled state
    let positions = market.positions("alice").await.unwrap();
    let mut refreshed = state.clone();
    refreshed.refresh(account, positions);
    assert_eq!(refreshed.holding("XYZ"), state.holding("XYZ"));

    // Reload from disk
    let loaded = store.load_state("alice").await.unwrap();
    assert_eq!(loaded, state);
    let history = store.load_trades().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, TradeAction::Buy);
    assert_eq!(history[0].price, Some(dec!(50.00)));

    // A restarted market seeded from the snapshot keeps the holdings
    let restarted = SimulatedMarket::new();
    restarted.set_price("XYZ", dec!(50.00));
    restarted.seed_account("alice", loaded.account.cash, loaded.holdings());
    let mut sell = Trade::sell("alice", "XYZ", dec!(4));
    restarted.place_order(&mut sell).await.unwrap();
    assert_eq!(restarted.account("alice").await.unwrap().cash, dec!(1000.00));

    let _ = std::fs::remove_dir_all(root);
}
