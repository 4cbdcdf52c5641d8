//! Session orchestration.
//!
//! Owns the estimate lifecycle (normalize, exchange, record) and history
//! recall. Presentation layers only read the state container it manages.

mod controller;

pub use controller::SessionController;
