use std::sync::Arc;

use chrono::{Duration, Utc};
use tableside_sync::backend::mock::MockBackend;
use tableside_sync::backend::{ApiError, Backend, PaymentMethod, ReceiptNumber, Settlement};
use tableside_sync::model::{Order, OrderId, OrderStatus, TableNumber};
use tableside_sync::stores::orders::{OrdersClient, OrdersContext, OrdersStore};
use tableside_sync::stores::ViewReceiver;
use tokio::sync::mpsc;

const TABLE: TableNumber = TableNumber(4);

fn order(id: u32, status: OrderStatus, total: f64, age_secs: i64) -> Order {
    Order {
        id: OrderId(id),
        table_number: TABLE,
        status,
        items: Vec::new(),
        total_amount: total,
        created_at: Utc::now() - Duration::seconds(age_secs),
    }
}

fn settlement() -> Settlement {
    Settlement {
        method: PaymentMethod::Cash,
        receipt: ReceiptNumber("RCP-123456".to_string()),
    }
}

fn spawn_orders(backend: Arc<dyn Backend>) -> (OrdersClient, ViewReceiver) {
    let (views_tx, views_rx) = mpsc::unbounded_channel();
    let (store, client) = OrdersStore::new(8);
    tokio::spawn(store.run(OrdersContext {
        backend,
        table: TABLE,
        views: views_tx,
    }));
    (client, views_rx)
}

#[tokio::test]
async fn refresh_drops_terminal_orders_and_sorts_newest_first() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_fetch_table_orders().return_ok(vec![
        order(1, OrderStatus::Completed, 10.0, 300),
        order(2, OrderStatus::Pending, 15.0, 120),
        order(3, OrderStatus::Ready, 8.0, 30),
        order(4, OrderStatus::Cancelled, 5.0, 10),
    ]);

    let (orders, _views) = spawn_orders(mock.clone());
    let view = orders.refresh().await.unwrap();

    let ids: Vec<OrderId> = view.orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![OrderId(3), OrderId(2)]);
    assert!(!view.last_refresh_failed);
    mock.verify();
}

#[tokio::test]
async fn failed_refresh_keeps_the_previous_list() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_fetch_table_orders()
        .return_ok(vec![order(1, OrderStatus::Pending, 15.0, 60)]);
    mock.expect_fetch_table_orders()
        .return_err(ApiError::Transport("connection refused".to_string()));

    let (orders, _views) = spawn_orders(mock.clone());

    orders.refresh().await.unwrap();
    let err = orders.refresh().await.unwrap_err();
    assert!(matches!(err, tableside_sync::SyncError::Api(_)));

    let view = orders.snapshot().await.unwrap();
    assert_eq!(view.orders.len(), 1);
    assert_eq!(view.orders[0].id, OrderId(1));
    assert!(view.last_refresh_failed);

    // A later successful refresh clears the flag.
    mock.expect_fetch_table_orders()
        .return_ok(vec![order(2, OrderStatus::Pending, 9.0, 5)]);
    let view = orders.refresh().await.unwrap();
    assert_eq!(view.orders[0].id, OrderId(2));
    assert!(!view.last_refresh_failed);
    mock.verify();
}

#[tokio::test]
async fn overlapping_refreshes_resolve_to_the_last_response() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_fetch_table_orders()
        .return_ok(vec![order(1, OrderStatus::Pending, 15.0, 60)]);
    mock.expect_fetch_table_orders()
        .return_ok(vec![order(2, OrderStatus::Pending, 9.0, 5)]);

    let (orders, _views) = spawn_orders(mock.clone());

    let (first, second) = tokio::join!(orders.refresh(), orders.refresh());
    first.unwrap();
    second.unwrap();

    // Wholesale replacement, no merging: only the later response remains.
    let view = orders.snapshot().await.unwrap();
    let ids: Vec<OrderId> = view.orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![OrderId(2)]);
    mock.verify();
}

#[tokio::test]
async fn settling_removes_orders_and_notifies_the_server() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_fetch_table_orders().return_ok(vec![
        order(1, OrderStatus::Delivered, 15.0, 60),
        order(2, OrderStatus::Delivered, 9.0, 5),
    ]);
    mock.expect_complete_order(OrderId(2)).return_ok(());
    mock.expect_complete_order(OrderId(1)).return_ok(());

    let (orders, _views) = spawn_orders(mock.clone());
    orders.refresh().await.unwrap();

    // Ids are passed in display order (newest first, as rendered).
    let view = orders
        .mark_paid_locally(vec![OrderId(2), OrderId(1)], settlement())
        .await
        .unwrap();
    assert!(view.orders.is_empty());

    // The completion updates run in the background; give them a beat.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    mock.verify();
}

#[tokio::test]
async fn failed_settle_notification_is_swallowed() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_fetch_table_orders()
        .return_ok(vec![order(1, OrderStatus::Delivered, 15.0, 60)]);
    mock.expect_complete_order(OrderId(1))
        .return_err(ApiError::Status {
            status: 500,
            message: "server error".to_string(),
        });

    let (orders, _views) = spawn_orders(mock.clone());
    orders.refresh().await.unwrap();

    // The local settle succeeds regardless of the server's answer.
    let view = orders
        .mark_paid_locally(vec![OrderId(1)], settlement())
        .await
        .unwrap();
    assert!(view.orders.is_empty());

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    mock.verify();

    let view = orders.snapshot().await.unwrap();
    assert!(view.orders.is_empty());
}
