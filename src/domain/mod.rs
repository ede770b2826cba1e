//! Domain layer: the order entity, its value objects, and the ports the
//! orchestrator drives (store, processors, notification, reconciliation).

pub mod attempt;
pub mod money;
pub mod order;
pub mod ports;
