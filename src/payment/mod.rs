//! The three payment processor variants. Interchangeable behind
//! [`PaymentProcessor`](crate::domain::ports::PaymentProcessor): card
//! captures synchronously against a gateway, wallet waits on an external
//! approval, manual accepts the registration on trust.

pub mod card;
pub mod manual;
pub mod wallet;

pub use card::{CardGateway, CardProcessor, SandboxCardGateway};
pub use manual::ManualProcessor;
pub use wallet::WalletProcessor;
