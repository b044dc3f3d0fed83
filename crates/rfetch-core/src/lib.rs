pub mod config;
pub mod logging;

pub mod control;
pub mod fetch;
pub mod retry;
pub mod source;
pub mod storage;
pub mod transport;
