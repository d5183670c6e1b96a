//! The durable order and its status state machine.

mod model;
mod status;

pub use model::{Order, OrderLine};
pub use status::{OrderStatus, ParseOrderStatusError};
