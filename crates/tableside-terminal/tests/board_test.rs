use std::sync::Arc;

use tableside_sync::auth::TableAuth;
use tableside_sync::backend::mock::MockBackend;
use tableside_sync::backend::{ApiError, Backend, OrderDraft};
use tableside_sync::model::{CartLine, MenuItem, MenuItemId, OrderId, OrderStatus, TableNumber};
use tableside_terminal::kitchen::{BoardError, KitchenBoard};
use tableside_terminal::memory::InMemoryBackend;
use tableside_terminal::waiter::WaiterBoard;

fn menu() -> Vec<MenuItem> {
    vec![MenuItem {
        id: MenuItemId(1),
        name: "Spring Rolls".to_string(),
        category: "Starters".to_string(),
        price: 9.50,
        available: true,
        discount_percentage: 0.0,
        best_seller: false,
    }]
}

async fn seeded_backend() -> (Arc<InMemoryBackend>, OrderId) {
    let backend = Arc::new(InMemoryBackend::new(menu()));
    let draft = OrderDraft {
        table_number: TableNumber(1),
        lines: vec![CartLine {
            menu_item_id: MenuItemId(1),
            display_name: "Spring Rolls".to_string(),
            unit_price: 9.50,
            quantity: 2,
            notes: String::new(),
        }],
    };
    let auth = TableAuth::issue(TableNumber(1));
    let order = backend.create_order(&draft, &auth).await.unwrap();
    (backend, order.id)
}

#[tokio::test]
async fn the_kitchen_walks_an_order_to_ready() {
    let (backend, order_id) = seeded_backend().await;
    let mut kitchen = KitchenBoard::new(backend.clone());

    kitchen.load(None).await.unwrap();
    assert_eq!(kitchen.orders().len(), 1);

    kitchen.start_cooking(order_id).await.unwrap();
    assert_eq!(kitchen.orders()[0].status, OrderStatus::InProgress);

    kitchen.mark_ready(order_id).await.unwrap();
    assert_eq!(kitchen.orders()[0].status, OrderStatus::Ready);
}

#[tokio::test]
async fn out_of_turn_kitchen_actions_are_rejected() {
    let (backend, order_id) = seeded_backend().await;
    let mut kitchen = KitchenBoard::new(backend.clone());
    kitchen.load(None).await.unwrap();

    // Cannot plate an order nobody started cooking.
    let err = kitchen.mark_ready(order_id).await.unwrap_err();
    assert!(matches!(err, BoardError::WrongStatus { .. }));

    kitchen.start_cooking(order_id).await.unwrap();

    // Cannot start a pan that is already on the stove.
    let err = kitchen.start_cooking(order_id).await.unwrap_err();
    assert!(matches!(err, BoardError::WrongStatus { .. }));

    let err = kitchen.start_cooking(OrderId(999)).await.unwrap_err();
    assert!(matches!(err, BoardError::UnknownOrder(_)));
}

#[tokio::test]
async fn item_check_off_locks_once_the_order_is_plated() {
    let (backend, order_id) = seeded_backend().await;
    let mut kitchen = KitchenBoard::new(backend.clone());
    kitchen.load(None).await.unwrap();

    let item_id = kitchen.orders()[0].items[0].id;
    kitchen.start_cooking(order_id).await.unwrap();
    kitchen.set_item_ready(order_id, item_id).await.unwrap();
    assert_eq!(kitchen.orders()[0].items[0].status, OrderStatus::Ready);

    kitchen.mark_ready(order_id).await.unwrap();
    let err = kitchen.set_item_ready(order_id, item_id).await.unwrap_err();
    assert!(matches!(err, BoardError::WrongStatus { .. }));
}

#[tokio::test]
async fn a_failed_availability_write_restores_the_cached_flag() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_fetch_menu().return_ok(menu());
    mock.expect_set_item_availability(MenuItemId(1))
        .return_err(ApiError::Transport("down".to_string()));

    let mut kitchen = KitchenBoard::new(mock.clone());
    kitchen.load_menu().await.unwrap();
    assert!(kitchen.menu()[0].available);

    let err = kitchen.toggle_availability(MenuItemId(1)).await.unwrap_err();
    assert!(matches!(err, BoardError::Api(_)));

    // The optimistic flip was rolled back to the server-confirmed value.
    assert!(kitchen.menu()[0].available);
    mock.verify();
}

#[tokio::test]
async fn a_successful_availability_toggle_sticks() {
    let backend = Arc::new(InMemoryBackend::new(menu()));
    let mut kitchen = KitchenBoard::new(backend.clone());
    kitchen.load_menu().await.unwrap();

    let now_available = kitchen.toggle_availability(MenuItemId(1)).await.unwrap();
    assert!(!now_available);
    assert!(!kitchen.menu()[0].available);
}

#[tokio::test]
async fn the_waiter_delivers_and_settles_in_order() {
    let (backend, order_id) = seeded_backend().await;

    let mut kitchen = KitchenBoard::new(backend.clone());
    kitchen.load(None).await.unwrap();
    kitchen.start_cooking(order_id).await.unwrap();

    let mut waiter = WaiterBoard::new(backend.clone());
    waiter.load(None).await.unwrap();

    // Food still on the stove cannot be delivered or settled.
    let err = waiter.mark_delivered(order_id).await.unwrap_err();
    assert!(matches!(err, BoardError::WrongStatus { .. }));
    let err = waiter.mark_paid(order_id).await.unwrap_err();
    assert!(matches!(err, BoardError::WrongStatus { .. }));

    kitchen.mark_ready(order_id).await.unwrap();
    waiter.load(None).await.unwrap();
    waiter.mark_delivered(order_id).await.unwrap();
    waiter.mark_paid(order_id).await.unwrap();

    // Settled orders leave the board and the filtered reload agrees.
    assert!(waiter.orders().is_empty());
    waiter.load(None).await.unwrap();
    assert!(waiter.orders().is_empty());

    let settled = backend.order(order_id).unwrap();
    assert_eq!(settled.status, OrderStatus::Completed);
}

#[tokio::test]
async fn status_filtered_loads_narrow_the_board() {
    let (backend, order_id) = seeded_backend().await;
    let mut kitchen = KitchenBoard::new(backend.clone());

    kitchen.load(Some(OrderStatus::Pending)).await.unwrap();
    assert_eq!(kitchen.orders().len(), 1);

    kitchen.start_cooking(order_id).await.unwrap();

    kitchen.load(Some(OrderStatus::Pending)).await.unwrap();
    assert!(kitchen.orders().is_empty());

    kitchen.load(Some(OrderStatus::InProgress)).await.unwrap();
    assert_eq!(kitchen.orders().len(), 1);
}
