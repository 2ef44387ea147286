pub mod checkout;
pub mod fulfillment;
pub mod notifier;
pub mod reconciliation;
pub mod wallet;

pub use checkout::{CheckoutRequest, CheckoutService};
pub use fulfillment::{FulfillmentService, StatusUpdate};
pub use notifier::Notifier;
pub use wallet::WalletService;
