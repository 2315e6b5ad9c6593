//! Worker lifecycle.
//!
//! | Operation        | Legal from                 | Result                                 |
//! |------------------|----------------------------|----------------------------------------|
//! | initialize       | Uninitialized              | Ready                                  |
//! | compute          | anything but Running       | Built { can_start: true }              |
//! | settings changed | any                        | Built → Built { can_start: false };    |
//! |                  |                            | Running → deferred until stop          |
//! | start            | Built { can_start: true }  | Running                                |
//! | stop             | Running                    | Built { can_start: !deferred }         |
//!
//! - [`state`]: Pure transition rules
//! - [`controller`]: Owns the worker handle and applies the rules

mod controller;
mod state;

pub use controller::LifecycleController;
pub use state::{Lifecycle, LifecycleState, Operation};
