pub mod audit;
pub mod error;
pub mod event;
pub mod id;
pub mod store;
pub mod stream;
