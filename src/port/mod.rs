//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams where the streaming client and the trade guard meet
//! the outside world: the stream transport, the on-chain ledger, the REST
//! execution endpoint, and whoever listens for notifications.
//!
//! ```text
//!            ┌──────────────────────────────┐
//!            │         Application          │
//!            │  StreamClient   TradeGuard   │
//!            └──────┬──────────────┬────────┘
//!                   │              │
//!        ┌──────────┴───┐   ┌──────┴─────────┐   ┌───────────┐
//!        │StreamTransport│  │ContractGateway │   │ Notifier  │
//!        └──────────────┘   └────────────────┘   └───────────┘
//! ```

pub mod outbound;

pub use outbound::execution::{ExecutionApi, ExecutionReport, ExecutionRequest};
pub use outbound::ledger::{ContractGateway, ContractRead, ContractWrite, PendingTx, TxReceipt};
pub use outbound::notifier::{Alert, Event, Notifier, NotifierRegistry, NullNotifier};
pub use outbound::stream::{
    ControlFrame, MessageKind, StreamMessage, StreamTransport, Subscription, TransportEvent,
};
