//! # Tableside Terminal Demo
//!
//! Walks one table through a full sitting against the in-memory backend:
//! device setup, browsing, ordering, the kitchen and waiter boards moving
//! the order along, and settling the bill. Run with `RUST_LOG=info` to
//! watch the whole exchange.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use tableside_sync::backend::PaymentMethod;
use tableside_sync::bridge::PushEvent;
use tableside_sync::device::DeviceStore;
use tableside_sync::model::{MenuItem, MenuItemId, TableNumber};
use tableside_sync::tracing::setup_tracing;
use tableside_terminal::config::Config;
use tableside_terminal::kitchen::KitchenBoard;
use tableside_terminal::memory::InMemoryBackend;
use tableside_terminal::session::TableSession;
use tableside_terminal::waiter::WaiterBoard;

fn demo_menu() -> Vec<MenuItem> {
    vec![
        MenuItem {
            id: MenuItemId(1),
            name: "Spring Rolls".to_string(),
            category: "Starters".to_string(),
            price: 9.50,
            available: true,
            discount_percentage: 0.0,
            best_seller: true,
        },
        MenuItem {
            id: MenuItemId(2),
            name: "Pho Bo".to_string(),
            category: "Mains".to_string(),
            price: 14.00,
            available: true,
            discount_percentage: 10.0,
            best_seller: false,
        },
        MenuItem {
            id: MenuItemId(3),
            name: "Lemonade".to_string(),
            category: "Drinks".to_string(),
            price: 3.00,
            available: true,
            discount_percentage: 0.0,
            best_seller: false,
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    info!("Starting tableside terminal demo");

    let config = Config::load();
    let backend = Arc::new(InMemoryBackend::new(demo_menu()));
    let device = Arc::new(DeviceStore::open(&config.device_state_path));
    if device.table_number().is_none() {
        device.assign_table(TableNumber(5));
    }

    let mut session = TableSession::start(&config, backend.clone(), device.clone())
        .await
        .map_err(|e| e.to_string())?;

    // Browse and fill the cart.
    let menu = session.catalog.snapshot().await.map_err(|e| e.to_string())?;
    info!(items = menu.items.len(), "Menu loaded");
    let starters = menu.items[0].clone();
    let main_course = menu.items[1].clone();
    session.cart.add(starters, 2).await.map_err(|e| e.to_string())?;
    let cart = session
        .cart
        .add(main_course, 1)
        .await
        .map_err(|e| e.to_string())?;
    info!(lines = cart.lines.len(), total = cart.total, "Cart ready");

    // Place the order.
    let order = session.checkout.submit_order().await.map_err(|e| e.to_string())?;

    // The kitchen cooks it, the waiter delivers it.
    let mut kitchen = KitchenBoard::new(backend.clone());
    kitchen.load(None).await.map_err(|e| e.to_string())?;
    kitchen.start_cooking(order.id).await.map_err(|e| e.to_string())?;
    kitchen.mark_ready(order.id).await.map_err(|e| e.to_string())?;

    let mut waiter = WaiterBoard::new(backend.clone());
    waiter.load(None).await.map_err(|e| e.to_string())?;
    waiter.mark_delivered(order.id).await.map_err(|e| e.to_string())?;

    // A push notification nudges the session to pick up the new status.
    session
        .push_sender()
        .send(PushEvent::OrderUpdated { order_id: Some(order.id) })
        .await
        .map_err(|e| e.to_string())?;

    // Settle the bill.
    session
        .checkout
        .select_method(PaymentMethod::Cash)
        .await
        .map_err(|e| e.to_string())?;
    let receipt = session.checkout.confirm().await.map_err(|e| e.to_string())?;
    info!(%receipt, "Bill settled");
    session.checkout.acknowledge().map_err(|e| e.to_string())?;

    // Let the fire-and-forget completion updates land before tearing down.
    tokio::time::sleep(Duration::from_millis(50)).await;

    session.shutdown().await?;
    info!("Demo completed");
    Ok(())
}
