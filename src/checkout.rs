//! Checkout orchestration.
//!
//! `Idle → Submitting → {Succeeded, Failed} → Idle`. One submission per
//! orchestrator at a time, one collaborator call per submission, no
//! automatic retry. Only a successful submission clears the cart, and once
//! the backend has accepted the order the clear runs to completion even if
//! the caller goes away.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::api::{ApiError, OrderApi};
use crate::domain::{CheckoutEvent, CheckoutRequest, DomainEvent, Money, MoneyError, OrderItemRequest, SharedCart};

pub const CHECKOUT_SUCCESS_MESSAGE: &str = "Order created successfully!";
pub const CHECKOUT_FAILURE_MESSAGE: &str = "Order creation failed!";
pub const EMPTY_CART_MESSAGE: &str = "Please add products to the order.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    Idle,
    Submitting,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckoutReceipt {
    pub cart_id: Uuid,
    pub items: Vec<OrderItemRequest>,
    pub total: Money,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Succeeded(CheckoutReceipt),
    Failed { message: String },
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("{}", EMPTY_CART_MESSAGE)]
    EmptyCart,

    #[error("a checkout is already being submitted")]
    InProgress,

    #[error("order total cannot be computed: {0}")]
    Total(#[from] MoneyError),

    #[error("{message}")]
    Submission {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl CheckoutError {
    /// Whether the error was raised locally, before any network call.
    pub fn is_validation(&self) -> bool { matches!(self, Self::EmptyCart | Self::Total(_)) }
}

#[derive(Debug)]
struct Phase {
    state: CheckoutState,
    last_outcome: Option<CheckoutOutcome>,
    events: Vec<DomainEvent>,
}

pub struct CheckoutOrchestrator {
    orders: Arc<dyn OrderApi>,
    phase: Arc<Mutex<Phase>>,
}

impl std::fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutOrchestrator").field("phase", &*self.phase.lock()).finish_non_exhaustive()
    }
}

/// Holds the `Submitting` slot. Dropping it, including when the submission
/// future is cancelled, puts the orchestrator back to `Idle`.
struct Submission {
    phase: Arc<Mutex<Phase>>,
}

impl Submission {
    fn record(&self, outcome: CheckoutOutcome, event: CheckoutEvent) {
        let mut phase = self.phase.lock();
        phase.last_outcome = Some(outcome);
        phase.events.push(DomainEvent::Checkout(event));
    }
}

impl Drop for Submission {
    fn drop(&mut self) { self.phase.lock().state = CheckoutState::Idle; }
}

impl CheckoutOrchestrator {
    pub fn new(orders: Arc<dyn OrderApi>) -> Self {
        Self {
            orders,
            phase: Arc::new(Mutex::new(Phase { state: CheckoutState::Idle, last_outcome: None, events: vec![] })),
        }
    }

    pub fn state(&self) -> CheckoutState { self.phase.lock().state }
    pub fn is_submitting(&self) -> bool { self.state() == CheckoutState::Submitting }
    pub fn last_outcome(&self) -> Option<CheckoutOutcome> { self.phase.lock().last_outcome.clone() }
    pub fn take_events(&self) -> Vec<DomainEvent> { std::mem::take(&mut self.phase.lock().events) }

    fn begin(&self, cart_id: Uuid, lines: usize, total: Money) -> Result<Submission, CheckoutError> {
        let mut phase = self.phase.lock();
        if phase.state == CheckoutState::Submitting {
            return Err(CheckoutError::InProgress);
        }
        phase.state = CheckoutState::Submitting;
        phase.events.push(DomainEvent::Checkout(CheckoutEvent::Submitted { cart_id, lines, total }));
        Ok(Submission { phase: self.phase.clone() })
    }

    /// Submits the cart as an order.
    ///
    /// The cart lock is only held to take the snapshot and, on success, to
    /// clear it; it is never held across the network call. Any successful
    /// response counts as acceptance, whatever acknowledgement it carries.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: nothing to submit; no request is made.
    /// - [`CheckoutError::InProgress`]: another submission is in flight.
    /// - [`CheckoutError::Submission`]: the order was not accepted. The cart
    ///   is left exactly as it was.
    #[instrument(skip_all)]
    pub async fn checkout(&self, cart: &SharedCart) -> Result<CheckoutReceipt, CheckoutError> {
        let (cart_id, request) = {
            let cart = cart.lock().await;
            if cart.is_empty() {
                warn!("checkout attempted with an empty cart");
                return Err(CheckoutError::EmptyCart);
            }
            (cart.id(), CheckoutRequest::from_cart(&cart))
        };
        let total = request.total()?;

        let submission = self.begin(cart_id, request.items.len(), total)?;
        info!(%cart_id, lines = request.items.len(), %total, "submitting order");

        match self.orders.submit_order(&request).await {
            Ok(acknowledged) => {
                if !acknowledged {
                    warn!(%cart_id, "order accepted without acknowledgement");
                }
                let receipt = CheckoutReceipt { cart_id, items: request.items, total, submitted_at: Utc::now() };
                submission.record(CheckoutOutcome::Succeeded(receipt.clone()), CheckoutEvent::Succeeded { cart_id });
                // The clear owns the submission slot so it finishes even when
                // this future is dropped.
                let cart = cart.clone();
                let clearing = tokio::spawn(async move {
                    cart.lock().await.clear();
                    drop(submission);
                });
                if let Err(error) = clearing.await {
                    warn!(%cart_id, %error, "clearing the cart did not complete");
                }
                info!(%cart_id, "order accepted; cart cleared");
                Ok(receipt)
            }
            Err(source) => {
                let message = source.user_message(CHECKOUT_FAILURE_MESSAGE);
                warn!(%cart_id, error = %source, "order submission failed; cart kept");
                submission.record(
                    CheckoutOutcome::Failed { message: message.clone() },
                    CheckoutEvent::Failed { cart_id, message: message.clone() },
                );
                Err(CheckoutError::Submission { message, source })
            }
        }
    }
}
