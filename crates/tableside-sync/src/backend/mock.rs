//! # Mock Backend
//!
//! An in-memory [`Backend`] double for unit and integration tests. Instead
//! of spinning up a server (or even an in-memory simulation), tests queue
//! expectations with return values and the mock replays them in FIFO order:
//!
//! ```ignore
//! let mock = Arc::new(MockBackend::new());
//! mock.expect_fetch_menu().return_ok(vec![item]);
//! mock.expect_fetch_table_orders().return_err(ApiError::Transport("down".into()));
//!
//! // hand `mock.clone()` to the code under test as Arc<dyn Backend> ...
//!
//! mock.verify(); // all expectations consumed
//! ```
//!
//! This makes failure injection trivial (a network drop is one
//! `return_err`), keeps tests deterministic, and lets operation order be
//! asserted: a call with no matching expectation at the front of the queue
//! panics.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::auth::TableAuth;
use crate::model::{MenuItem, MenuItemId, Order, OrderId, OrderItemId, OrderStatus, TableNumber};

use super::{ApiError, Backend, OrderDraft, PaymentRequest, Settlement};

enum Expectation {
    FetchMenu(Result<Vec<MenuItem>, ApiError>),
    FetchTableOrders(Result<Vec<Order>, ApiError>),
    FetchOrders(Result<Vec<Order>, ApiError>),
    CreateOrder(Result<Order, ApiError>),
    CompleteOrder {
        order: OrderId,
        response: Result<(), ApiError>,
    },
    ProcessPayment(Result<(), ApiError>),
    UpdateOrderStatus {
        order: OrderId,
        response: Result<Order, ApiError>,
    },
    UpdateItemStatus {
        item: OrderItemId,
        response: Result<(), ApiError>,
    },
    SetItemAvailability {
        item: MenuItemId,
        response: Result<(), ApiError>,
    },
}

impl Expectation {
    fn name(&self) -> &'static str {
        match self {
            Self::FetchMenu(_) => "fetch_menu",
            Self::FetchTableOrders(_) => "fetch_table_orders",
            Self::FetchOrders(_) => "fetch_orders",
            Self::CreateOrder(_) => "create_order",
            Self::CompleteOrder { .. } => "complete_order",
            Self::ProcessPayment(_) => "process_payment",
            Self::UpdateOrderStatus { .. } => "update_order_status",
            Self::UpdateItemStatus { .. } => "update_item_status",
            Self::SetItemAvailability { .. } => "set_item_availability",
        }
    }
}

/// A [`Backend`] double with FIFO expectation tracking.
#[derive(Default)]
pub struct MockBackend {
    expectations: Mutex<VecDeque<Expectation>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, expectation: Expectation) {
        self.expectations.lock().unwrap().push_back(expectation);
    }

    fn next(&self, op: &str) -> Expectation {
        self.expectations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected {op} call, no expectations left"))
    }

    /// Panics unless every queued expectation was consumed.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }

    pub fn expect_fetch_menu(&self) -> ExpectationBuilder<'_, Vec<MenuItem>> {
        ExpectationBuilder {
            mock: self,
            build: Box::new(Expectation::FetchMenu),
        }
    }

    pub fn expect_fetch_table_orders(&self) -> ExpectationBuilder<'_, Vec<Order>> {
        ExpectationBuilder {
            mock: self,
            build: Box::new(Expectation::FetchTableOrders),
        }
    }

    pub fn expect_fetch_orders(&self) -> ExpectationBuilder<'_, Vec<Order>> {
        ExpectationBuilder {
            mock: self,
            build: Box::new(Expectation::FetchOrders),
        }
    }

    pub fn expect_create_order(&self) -> ExpectationBuilder<'_, Order> {
        ExpectationBuilder {
            mock: self,
            build: Box::new(Expectation::CreateOrder),
        }
    }

    pub fn expect_complete_order(&self, order: OrderId) -> ExpectationBuilder<'_, ()> {
        ExpectationBuilder {
            mock: self,
            build: Box::new(move |response| Expectation::CompleteOrder { order, response }),
        }
    }

    pub fn expect_process_payment(&self) -> ExpectationBuilder<'_, ()> {
        ExpectationBuilder {
            mock: self,
            build: Box::new(Expectation::ProcessPayment),
        }
    }

    pub fn expect_update_order_status(&self, order: OrderId) -> ExpectationBuilder<'_, Order> {
        ExpectationBuilder {
            mock: self,
            build: Box::new(move |response| Expectation::UpdateOrderStatus { order, response }),
        }
    }

    pub fn expect_update_item_status(&self, item: OrderItemId) -> ExpectationBuilder<'_, ()> {
        ExpectationBuilder {
            mock: self,
            build: Box::new(move |response| Expectation::UpdateItemStatus { item, response }),
        }
    }

    pub fn expect_set_item_availability(&self, item: MenuItemId) -> ExpectationBuilder<'_, ()> {
        ExpectationBuilder {
            mock: self,
            build: Box::new(move |response| Expectation::SetItemAvailability { item, response }),
        }
    }
}

/// Fluent terminal step of an expectation: pick the outcome.
pub struct ExpectationBuilder<'a, T> {
    mock: &'a MockBackend,
    build: Box<dyn FnOnce(Result<T, ApiError>) -> Expectation + 'a>,
}

impl<'a, T> ExpectationBuilder<'a, T> {
    pub fn return_ok(self, value: T) {
        let expectation = (self.build)(Ok(value));
        self.mock.push(expectation);
    }

    pub fn return_err(self, error: ApiError) {
        let expectation = (self.build)(Err(error));
        self.mock.push(expectation);
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>, ApiError> {
        match self.next("fetch_menu") {
            Expectation::FetchMenu(response) => response,
            other => panic!("fetch_menu called but the next expectation is {}", other.name()),
        }
    }

    async fn fetch_table_orders(
        &self,
        _table: TableNumber,
        _auth: &TableAuth,
    ) -> Result<Vec<Order>, ApiError> {
        match self.next("fetch_table_orders") {
            Expectation::FetchTableOrders(response) => response,
            other => panic!(
                "fetch_table_orders called but the next expectation is {}",
                other.name()
            ),
        }
    }

    async fn fetch_orders(&self, _status: Option<OrderStatus>) -> Result<Vec<Order>, ApiError> {
        match self.next("fetch_orders") {
            Expectation::FetchOrders(response) => response,
            other => panic!(
                "fetch_orders called but the next expectation is {}",
                other.name()
            ),
        }
    }

    async fn create_order(&self, _draft: &OrderDraft, _auth: &TableAuth) -> Result<Order, ApiError> {
        match self.next("create_order") {
            Expectation::CreateOrder(response) => response,
            other => panic!(
                "create_order called but the next expectation is {}",
                other.name()
            ),
        }
    }

    async fn complete_order(
        &self,
        order: OrderId,
        _settlement: &Settlement,
        _auth: &TableAuth,
    ) -> Result<(), ApiError> {
        match self.next("complete_order") {
            Expectation::CompleteOrder { order: expected, response } => {
                assert_eq!(order, expected, "complete_order called with an unexpected order id");
                response
            }
            other => panic!(
                "complete_order called but the next expectation is {}",
                other.name()
            ),
        }
    }

    async fn process_payment(&self, _request: &PaymentRequest) -> Result<(), ApiError> {
        match self.next("process_payment") {
            Expectation::ProcessPayment(response) => response,
            other => panic!(
                "process_payment called but the next expectation is {}",
                other.name()
            ),
        }
    }

    async fn update_order_status(
        &self,
        order: OrderId,
        _status: OrderStatus,
    ) -> Result<Order, ApiError> {
        match self.next("update_order_status") {
            Expectation::UpdateOrderStatus { order: expected, response } => {
                assert_eq!(order, expected, "update_order_status called with an unexpected order id");
                response
            }
            other => panic!(
                "update_order_status called but the next expectation is {}",
                other.name()
            ),
        }
    }

    async fn update_item_status(
        &self,
        item: OrderItemId,
        _status: OrderStatus,
    ) -> Result<(), ApiError> {
        match self.next("update_item_status") {
            Expectation::UpdateItemStatus { item: expected, response } => {
                assert_eq!(item, expected, "update_item_status called with an unexpected item id");
                response
            }
            other => panic!(
                "update_item_status called but the next expectation is {}",
                other.name()
            ),
        }
    }

    async fn set_item_availability(
        &self,
        item: MenuItemId,
        _available: bool,
    ) -> Result<(), ApiError> {
        match self.next("set_item_availability") {
            Expectation::SetItemAvailability { item: expected, response } => {
                assert_eq!(item, expected, "set_item_availability called with an unexpected item id");
                response
            }
            other => panic!(
                "set_item_availability called but the next expectation is {}",
                other.name()
            ),
        }
    }
}
