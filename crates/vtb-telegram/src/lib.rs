//! Telegram adapter (teloxide).
//!
//! Routes inbound updates into the `vtb-core` flow controllers and renders
//! their outcomes as Telegram messages and keyboards.

pub mod handlers;
pub mod keyboards;
pub mod router;
