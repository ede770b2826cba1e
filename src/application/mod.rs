//! Application layer containing the checkout orchestration.
//!
//! This module defines the `CheckoutOrchestrator`, the single entry point
//! for driving a draft order through payment to a confirmed, durably
//! recorded order.

pub mod orchestrator;

pub use orchestrator::CheckoutOrchestrator;
