pub mod errors;
pub mod events;
pub mod models;
pub mod ports;
pub mod qris;
pub mod service;
pub mod webhook;
