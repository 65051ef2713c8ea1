//! Cart container: the order in progress.

pub mod reducer;
pub mod types;

pub use reducer::{CartEnvironment, CartReducer};
pub use types::{CartAction, CartOp, CartResponse, CartState};
