//! Application services.

pub mod audit;
pub mod notification;
pub mod storage;
