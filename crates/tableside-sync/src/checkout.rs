//! # Checkout Flow
//!
//! The payment flow is an explicit state machine instead of a trail of
//! nested callbacks. All transitions run through one pure reducer
//! ([`PaymentFlow::apply`]), so an illegal move (confirming a payment twice,
//! acknowledging before anything was confirmed) is rejected as a value
//! rather than silently corrupting the flow.
//!
//! The [`Checkout`] orchestrator drives the reducer and the three network
//! calls around it. There is deliberately no transaction tying those calls
//! together: create-order, process-payment, and the per-order completion
//! updates can each fail independently, and a failure in the middle leaves a
//! server-side order for staff review. The engine's job is to keep the
//! LOCAL state honest at every step: the cart is cleared only after the
//! server confirmed the order, and the order list drops settled orders only
//! after the payment endpoint said yes.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::TableAuth;
use crate::backend::{
    ApiError, Backend, OrderDraft, PaymentMethod, PaymentRequest, ReceiptNumber, Settlement,
};
use crate::bridge::{OutboundEvent, OutboundSender};
use crate::error::SyncError;
use crate::model::{Order, OrderId, TableNumber};
use crate::stores::cart::CartClient;
use crate::stores::orders::OrdersClient;

/// Where one table's checkout currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentFlow {
    NoOrder,
    OrderCreated {
        order_id: OrderId,
    },
    PaymentSelected {
        order_ids: Vec<OrderId>,
        amount: f64,
        method: PaymentMethod,
    },
    PaymentConfirmed {
        receipt: ReceiptNumber,
    },
    Cleared,
}

impl PaymentFlow {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoOrder => "no-order",
            Self::OrderCreated { .. } => "order-created",
            Self::PaymentSelected { .. } => "payment-selected",
            Self::PaymentConfirmed { .. } => "payment-confirmed",
            Self::Cleared => "cleared",
        }
    }

    /// The reducer. Consumes the current state and an input, yields the next
    /// state or rejects the move.
    ///
    /// Placing an order restarts the flow from any state: guests keep
    /// ordering food throughout a sitting and each submit simply re-arms
    /// checkout. Every payment-side input is strict: selecting a method
    /// requires an order (or a previous selection to switch away from),
    /// confirmation outcomes only make sense while a method is selected, and
    /// acknowledgement only after a confirmation.
    pub fn apply(self, input: PaymentInput) -> Result<PaymentFlow, CheckoutError> {
        use PaymentFlow::*;
        use PaymentInput::*;

        match (self, input) {
            (_, OrderPlaced { order_id }) => Ok(OrderCreated { order_id }),
            (
                NoOrder | OrderCreated { .. } | PaymentSelected { .. } | Cleared,
                MethodSelected {
                    order_ids,
                    amount,
                    method,
                },
            ) => Ok(PaymentSelected {
                order_ids,
                amount,
                method,
            }),
            (PaymentSelected { .. }, ConfirmSucceeded { receipt }) => {
                Ok(PaymentConfirmed { receipt })
            }
            (state @ PaymentSelected { .. }, ConfirmFailed) => Ok(state),
            (PaymentConfirmed { .. }, Acknowledged) => Ok(Cleared),
            (state, input) => Err(CheckoutError::IllegalTransition {
                state: state.name(),
                input: input.name(),
            }),
        }
    }
}

/// Inputs the reducer understands.
#[derive(Debug, Clone)]
pub enum PaymentInput {
    OrderPlaced {
        order_id: OrderId,
    },
    MethodSelected {
        order_ids: Vec<OrderId>,
        amount: f64,
        method: PaymentMethod,
    },
    ConfirmSucceeded {
        receipt: ReceiptNumber,
    },
    ConfirmFailed,
    Acknowledged,
}

impl PaymentInput {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderPlaced { .. } => "place-order",
            Self::MethodSelected { .. } => "select-method",
            Self::ConfirmSucceeded { .. } => "confirm-success",
            Self::ConfirmFailed => "confirm-failure",
            Self::Acknowledged => "acknowledge",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("cart is empty, nothing to submit")]
    EmptyCart,
    #[error("no unpaid orders to settle")]
    NothingToPay,
    #[error("{input} is not allowed in the {state} state")]
    IllegalTransition {
        state: &'static str,
        input: &'static str,
    },
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("backend request failed: {0}")]
    Api(#[from] ApiError),
}

/// Drives one table's checkout against the cart store, the orders store,
/// and the backend.
pub struct Checkout {
    backend: Arc<dyn Backend>,
    table: TableNumber,
    cart: CartClient,
    orders: OrdersClient,
    outbound: OutboundSender,
    state: PaymentFlow,
}

impl Checkout {
    pub fn new(
        backend: Arc<dyn Backend>,
        table: TableNumber,
        cart: CartClient,
        orders: OrdersClient,
        outbound: OutboundSender,
    ) -> Self {
        Self {
            backend,
            table,
            cart,
            orders,
            outbound,
            state: PaymentFlow::NoOrder,
        }
    }

    pub fn state(&self) -> &PaymentFlow {
        &self.state
    }

    /// Submit the cart as a new order. The cart is cleared and the order
    /// list refreshed only after the server confirms; on failure the cart
    /// stays intact and the error is surfaced.
    pub async fn submit_order(&mut self) -> Result<Order, CheckoutError> {
        let cart = self.cart.snapshot().await?;
        if cart.lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let draft = OrderDraft {
            table_number: self.table,
            lines: cart.lines,
        };
        let auth = TableAuth::issue(self.table);
        let order = self.backend.create_order(&draft, &auth).await?;
        info!(order = %order.id, total = order.total_amount, "Order placed");

        self.state = self.state.clone().apply(PaymentInput::OrderPlaced {
            order_id: order.id,
        })?;

        // The order stands regardless of what happens below; both calls are
        // local housekeeping and the poller would repair a miss anyway.
        if let Err(error) = self.cart.clear().await {
            warn!(%error, "Cart clear after submit failed");
        }
        if let Err(error) = self.orders.refresh().await {
            warn!(%error, "Order list refresh after submit failed");
        }

        Ok(order)
    }

    /// Pick a payment method, capturing every currently unpaid order as the
    /// settlement set. Selecting again simply switches the method.
    pub async fn select_method(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        let view = self.orders.snapshot().await?;
        let unpaid: Vec<&Order> = view
            .orders
            .iter()
            .filter(|order| !order.status.is_terminal())
            .collect();
        if unpaid.is_empty() {
            return Err(CheckoutError::NothingToPay);
        }

        let order_ids: Vec<OrderId> = unpaid.iter().map(|order| order.id).collect();
        let amount: f64 = unpaid.iter().map(|order| order.total_amount).sum();
        info!(orders = order_ids.len(), amount, %method, "Payment method selected");

        self.state = self.state.clone().apply(PaymentInput::MethodSelected {
            order_ids,
            amount,
            method,
        })?;
        Ok(())
    }

    /// Run the payment. On success the captured orders are settled locally
    /// (their completion updates go out fire-and-forget), the cart is
    /// cleared, and the receipt is returned. On failure the flow rolls back
    /// to the selected method so the guest can retry.
    pub async fn confirm(&mut self) -> Result<ReceiptNumber, CheckoutError> {
        let (order_ids, amount, method) = match &self.state {
            PaymentFlow::PaymentSelected {
                order_ids,
                amount,
                method,
            } => (order_ids.clone(), *amount, *method),
            state => {
                return Err(CheckoutError::IllegalTransition {
                    state: state.name(),
                    input: "confirm-success",
                })
            }
        };

        let request = PaymentRequest {
            table_number: self.table,
            order_ids: order_ids.clone(),
            amount,
            method,
        };

        match self.backend.process_payment(&request).await {
            Ok(()) => {
                let receipt = ReceiptNumber::generate();
                let settlement = Settlement {
                    method,
                    receipt: receipt.clone(),
                };
                if let Err(error) = self
                    .orders
                    .mark_paid_locally(order_ids.clone(), settlement)
                    .await
                {
                    warn!(%error, "Local settle failed after payment success");
                }
                if let Err(error) = self.cart.clear().await {
                    warn!(%error, "Cart clear after payment failed");
                }
                let _ = self.outbound.send(OutboundEvent::OrderPaid {
                    table_number: self.table,
                    order_ids,
                });

                self.state = self
                    .state
                    .clone()
                    .apply(PaymentInput::ConfirmSucceeded {
                        receipt: receipt.clone(),
                    })?;
                info!(%receipt, amount, "Payment confirmed");
                Ok(receipt)
            }
            Err(error) => {
                self.state = self.state.clone().apply(PaymentInput::ConfirmFailed)?;
                warn!(%error, "Payment failed, returning to method selection");
                Err(CheckoutError::Api(error))
            }
        }
    }

    /// Dismiss the receipt screen.
    pub fn acknowledge(&mut self) -> Result<(), CheckoutError> {
        self.state = self.state.clone().apply(PaymentInput::Acknowledged)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt() -> ReceiptNumber {
        ReceiptNumber("RCP-000001".to_string())
    }

    fn selected() -> PaymentFlow {
        PaymentFlow::PaymentSelected {
            order_ids: vec![OrderId(1)],
            amount: 10.0,
            method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn happy_path_walks_every_state() {
        let state = PaymentFlow::NoOrder;
        let state = state
            .apply(PaymentInput::OrderPlaced { order_id: OrderId(1) })
            .unwrap();
        assert!(matches!(state, PaymentFlow::OrderCreated { .. }));

        let state = state
            .apply(PaymentInput::MethodSelected {
                order_ids: vec![OrderId(1)],
                amount: 10.0,
                method: PaymentMethod::Qr,
            })
            .unwrap();
        assert!(matches!(state, PaymentFlow::PaymentSelected { .. }));

        let state = state
            .apply(PaymentInput::ConfirmSucceeded { receipt: receipt() })
            .unwrap();
        assert!(matches!(state, PaymentFlow::PaymentConfirmed { .. }));

        let state = state.apply(PaymentInput::Acknowledged).unwrap();
        assert_eq!(state, PaymentFlow::Cleared);
    }

    #[test]
    fn confirming_twice_is_rejected() {
        let confirmed = selected()
            .apply(PaymentInput::ConfirmSucceeded { receipt: receipt() })
            .unwrap();
        let err = confirmed
            .apply(PaymentInput::ConfirmSucceeded { receipt: receipt() })
            .unwrap_err();
        assert!(matches!(err, CheckoutError::IllegalTransition { .. }));
    }

    #[test]
    fn failed_confirmation_stays_on_selection() {
        let state = selected().apply(PaymentInput::ConfirmFailed).unwrap();
        assert_eq!(state, selected());
    }

    #[test]
    fn selecting_without_an_order_context_is_allowed_but_confirm_needs_selection() {
        let err = PaymentFlow::NoOrder
            .apply(PaymentInput::ConfirmSucceeded { receipt: receipt() })
            .unwrap_err();
        assert!(matches!(err, CheckoutError::IllegalTransition { .. }));

        let err = PaymentFlow::NoOrder
            .apply(PaymentInput::Acknowledged)
            .unwrap_err();
        assert!(matches!(err, CheckoutError::IllegalTransition { .. }));
    }

    #[test]
    fn switching_methods_replaces_the_selection() {
        let state = selected()
            .apply(PaymentInput::MethodSelected {
                order_ids: vec![OrderId(1), OrderId(2)],
                amount: 25.0,
                method: PaymentMethod::Qr,
            })
            .unwrap();
        match state {
            PaymentFlow::PaymentSelected { order_ids, method, .. } => {
                assert_eq!(order_ids.len(), 2);
                assert_eq!(method, PaymentMethod::Qr);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn ordering_more_food_rearms_the_flow() {
        let cleared = PaymentFlow::Cleared;
        let state = cleared
            .apply(PaymentInput::OrderPlaced { order_id: OrderId(9) })
            .unwrap();
        assert!(matches!(state, PaymentFlow::OrderCreated { order_id } if order_id == OrderId(9)));
    }
}
