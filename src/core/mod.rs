pub(crate) mod arith;
pub mod error;
pub mod execution;
pub mod orders;
pub mod pool;
pub mod request;
pub mod weights;
