pub mod ledger;
pub mod order;

pub use ledger::LedgerKind;
pub use order::{DeliveryMethod, OrderStatus, PaymentMethod, Role, new_tracking_number};
