pub mod http;
pub mod sweeper;
