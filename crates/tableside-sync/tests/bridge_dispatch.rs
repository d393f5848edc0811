use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tableside_sync::backend::mock::MockBackend;
use tableside_sync::backend::Backend;
use tableside_sync::bridge::{EventBridge, PushEvent};
use tableside_sync::device::DeviceStore;
use tableside_sync::model::{MenuItem, MenuItemId, Order, OrderId, OrderStatus, TableNumber};
use tableside_sync::stores::catalog::{CatalogClient, CatalogContext, CatalogStore};
use tableside_sync::stores::orders::{OrdersClient, OrdersContext, OrdersStore};
use tableside_sync::stores::{ViewEvent, ViewReceiver};
use tokio::sync::mpsc;

const TABLE: TableNumber = TableNumber(2);

fn menu_item(id: u32, name: &str, available: bool) -> MenuItem {
    MenuItem {
        id: MenuItemId(id),
        name: name.to_string(),
        category: "Drinks".to_string(),
        price: 4.0,
        available,
        discount_percentage: 0.0,
        best_seller: false,
    }
}

fn pending_order(id: u32) -> Order {
    Order {
        id: OrderId(id),
        table_number: TABLE,
        status: OrderStatus::Pending,
        items: Vec::new(),
        total_amount: 4.0,
        created_at: Utc::now(),
    }
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tableside-bridge-{name}-{}.json", std::process::id()))
}

struct Fixture {
    bridge: EventBridge,
    orders: OrdersClient,
    catalog: CatalogClient,
    device: Arc<DeviceStore>,
    views: ViewReceiver,
}

fn wire(backend: Arc<dyn Backend>, device_file: &str) -> Fixture {
    let (views_tx, views_rx) = mpsc::unbounded_channel();
    let device = Arc::new(DeviceStore::open(temp_path(device_file)));

    let (orders_store, orders) = OrdersStore::new(8);
    tokio::spawn(orders_store.run(OrdersContext {
        backend: backend.clone(),
        table: TABLE,
        views: views_tx.clone(),
    }));

    let (catalog_store, catalog) = CatalogStore::new(8);
    tokio::spawn(catalog_store.run(CatalogContext {
        backend,
        views: views_tx.clone(),
    }));

    let bridge = EventBridge::new(orders.clone(), catalog.clone(), device.clone(), views_tx);
    Fixture {
        bridge,
        orders,
        catalog,
        device,
        views: views_rx,
    }
}

fn drain(views: &mut ViewReceiver) -> Vec<ViewEvent> {
    let mut events = Vec::new();
    while let Ok(event) = views.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn availability_event_for_an_unknown_item_is_a_warning_not_a_crash() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_fetch_menu().return_ok(vec![menu_item(1, "Lemonade", true)]);

    let mut fx = wire(mock.clone(), "unknown-item");
    fx.catalog.refresh().await.unwrap();
    drain(&mut fx.views);

    fx.bridge
        .handle(PushEvent::ItemAvailability {
            item_id: MenuItemId(99),
            available: false,
        })
        .await;

    // No snapshot was published and the cache is untouched.
    assert!(drain(&mut fx.views).is_empty());
    let view = fx.catalog.snapshot().await.unwrap();
    assert!(view.items[0].available);
    mock.verify();
}

#[tokio::test]
async fn availability_event_patches_the_cached_item() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_fetch_menu().return_ok(vec![
        menu_item(1, "Lemonade", true),
        menu_item(2, "Iced Tea", true),
    ]);

    let fx = wire(mock.clone(), "patch");
    fx.catalog.refresh().await.unwrap();

    // Dispatching the same event twice is harmless: the patch sets an
    // absolute value.
    let event = PushEvent::ItemAvailability {
        item_id: MenuItemId(2),
        available: false,
    };
    fx.bridge.handle(event.clone()).await;
    fx.bridge.handle(event).await;

    let view = fx.catalog.snapshot().await.unwrap();
    assert!(view.items[0].available);
    assert!(!view.items[1].available);
    mock.verify();
}

#[tokio::test]
async fn menu_updated_refetches_the_catalog_wholesale() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_fetch_menu().return_ok(vec![menu_item(1, "Lemonade", true)]);
    mock.expect_fetch_menu().return_ok(vec![
        menu_item(1, "Lemonade", true),
        menu_item(2, "Iced Tea", true),
    ]);

    let fx = wire(mock.clone(), "menu-updated");
    fx.catalog.refresh().await.unwrap();

    fx.bridge.handle(PushEvent::MenuUpdated).await;

    let view = fx.catalog.snapshot().await.unwrap();
    assert_eq!(view.items.len(), 2);
    mock.verify();
}

#[tokio::test]
async fn order_events_trigger_a_refresh() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_fetch_table_orders().return_ok(vec![pending_order(1)]);
    mock.expect_fetch_table_orders().return_ok(vec![pending_order(1), pending_order(2)]);
    mock.expect_fetch_table_orders().return_ok(Vec::new());

    let fx = wire(mock.clone(), "order-events");

    fx.bridge.handle(PushEvent::NewOrder).await;
    assert_eq!(fx.orders.snapshot().await.unwrap().orders.len(), 1);

    fx.bridge
        .handle(PushEvent::OrderUpdated { order_id: Some(OrderId(2)) })
        .await;
    assert_eq!(fx.orders.snapshot().await.unwrap().orders.len(), 2);

    fx.bridge
        .handle(PushEvent::OrderPaid { table_number: Some(TABLE) })
        .await;
    assert!(fx.orders.snapshot().await.unwrap().orders.is_empty());
    mock.verify();
}

#[tokio::test]
async fn refresh_failure_from_a_push_event_is_swallowed() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_fetch_table_orders().return_ok(vec![pending_order(1)]);
    mock.expect_fetch_table_orders()
        .return_err(tableside_sync::ApiError::Transport("down".to_string()));

    let fx = wire(mock.clone(), "push-failure");
    fx.orders.refresh().await.unwrap();

    // The handler logs and moves on; the previous list survives.
    fx.bridge.handle(PushEvent::NewOrder).await;
    let view = fx.orders.snapshot().await.unwrap();
    assert_eq!(view.orders.len(), 1);
    assert!(view.last_refresh_failed);
    mock.verify();
}

#[tokio::test]
async fn reset_device_clears_the_assignment_and_signals_the_ui() {
    let mock = Arc::new(MockBackend::new());
    let mut fx = wire(mock.clone(), "reset");
    fx.device.assign_table(TABLE);
    drain(&mut fx.views);

    fx.bridge.handle(PushEvent::ResetDevice).await;

    assert_eq!(fx.device.table_number(), None);
    let events = drain(&mut fx.views);
    assert!(matches!(events.as_slice(), [ViewEvent::DeviceReset]));

    // Idempotent: a replayed reset changes nothing further.
    fx.bridge.handle(PushEvent::ResetDevice).await;
    assert_eq!(fx.device.table_number(), None);
    mock.verify();
}
