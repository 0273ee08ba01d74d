//! What goes into a book, and how a submitter learns what happened.
//!
//! Each [`Submission`] may carry a `oneshot` reply. The book resolves it
//! after the order has been matched and every resulting settlement has
//! completed, so an [`OrderTicket`] is a per-order completion future with
//! no counter to pre-arm.

use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};
use tradebook_matchcore::MatchOutcome;
use tradebook_types::{
    AssetId, BookConfig, InvestorId, Order, OrderId, OrderSide, Result, TradebookError,
    Transaction,
};

/// Result of one submitted order.
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    /// The order after matching (pending shares, history, status).
    pub order: Order,
    /// Transactions its arrival produced, in execution order.
    pub transactions: Vec<Transaction>,
    /// Whether the order was left resting in the book.
    pub rested: bool,
}

impl From<MatchOutcome> for SubmissionReport {
    fn from(outcome: MatchOutcome) -> Self {
        Self {
            transactions: outcome.fills.into_iter().map(|f| f.transaction).collect(),
            order: outcome.order,
            rested: outcome.rested,
        }
    }
}

type Reply = oneshot::Sender<Result<SubmissionReport>>;

/// An order on its way into a book.
#[derive(Debug)]
pub struct Submission {
    pub order: Order,
    pub reply: Option<Reply>,
}

impl Submission {
    /// Fire-and-forget submission.
    #[must_use]
    pub fn new(order: Order) -> Self {
        Self { order, reply: None }
    }

    /// Submission plus the ticket that will receive its report.
    #[must_use]
    pub fn with_reply(order: Order) -> (Self, OrderTicket) {
        let (tx, rx) = oneshot::channel();
        let ticket = OrderTicket {
            order_id: order.id,
            rx,
        };
        (
            Self {
                order,
                reply: Some(tx),
            },
            ticket,
        )
    }

    /// Resolve the reply, if anyone is listening.
    pub(crate) fn respond(reply: Option<Reply>, result: Result<SubmissionReport>) {
        if let Some(reply) = reply {
            // The submitter may have dropped its ticket; that is fine.
            let _ = reply.send(result);
        }
    }
}

/// Completion future for one submitted order.
#[derive(Debug)]
pub struct OrderTicket {
    order_id: OrderId,
    rx: oneshot::Receiver<Result<SubmissionReport>>,
}

impl OrderTicket {
    #[must_use]
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Wait until the book has matched and settled this order.
    ///
    /// # Errors
    /// - the book's rejection, if the order was refused
    /// - `ReplyDropped` if the book stopped before handling it
    pub async fn wait(self) -> Result<SubmissionReport> {
        self.rx
            .await
            .map_err(|_| TradebookError::ReplyDropped(self.order_id))?
    }
}

/// Order as received from an outer boundary, before validation.
///
/// `side` is kept as text so that a bad value surfaces as an explicit
/// `InvalidSide` rejection instead of disappearing.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub investor_id: InvestorId,
    pub asset_id: AssetId,
    pub side: String,
    pub price: Decimal,
    pub shares: Decimal,
}

impl OrderRequest {
    #[must_use]
    pub fn new(
        investor_id: InvestorId,
        asset_id: impl Into<AssetId>,
        side: impl Into<String>,
        price: Decimal,
        shares: Decimal,
    ) -> Self {
        Self {
            investor_id,
            asset_id: asset_id.into(),
            side: side.into(),
            price,
            shares,
        }
    }

    /// Validate and turn into a fresh order with a new id.
    pub fn into_order(self) -> Result<Order> {
        let side: OrderSide = self.side.parse()?;
        let order = Order::new(self.investor_id, self.asset_id, side, self.price, self.shares);
        order.validate()?;
        Ok(order)
    }
}

/// Cloneable submitting end of a book's input.
///
/// The book stops once every handle (and any other sender) is dropped.
#[derive(Debug, Clone)]
pub struct BookHandle {
    tx: mpsc::Sender<Submission>,
}

impl BookHandle {
    #[must_use]
    pub fn new(tx: mpsc::Sender<Submission>) -> Self {
        Self { tx }
    }

    /// Validate a boundary request and submit it.
    ///
    /// Invalid requests are rejected here and never reach the book.
    pub async fn submit(&self, request: OrderRequest) -> Result<OrderTicket> {
        let order = request.into_order().inspect_err(|err| {
            tracing::warn!(error = %err, "Rejected order request");
        })?;
        self.submit_order(order).await
    }

    /// Submit an already-built order and get its completion ticket.
    pub async fn submit_order(&self, order: Order) -> Result<OrderTicket> {
        order.validate()?;
        let (submission, ticket) = Submission::with_reply(order);
        self.tx
            .send(submission)
            .await
            .map_err(|_| TradebookError::BookClosed)?;
        Ok(ticket)
    }

    /// Submit without waiting for a report.
    pub async fn send(&self, order: Order) -> Result<()> {
        order.validate()?;
        self.tx
            .send(Submission::new(order))
            .await
            .map_err(|_| TradebookError::BookClosed)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create a book input sized by `config`.
#[must_use]
pub fn channel(config: &BookConfig) -> (BookHandle, mpsc::Receiver<Submission>) {
    let (tx, rx) = mpsc::channel(config.input_capacity);
    (BookHandle::new(tx), rx)
}
