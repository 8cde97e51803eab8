pub mod auth;
pub mod clock;
pub mod course;
pub mod errors;
pub mod payment;
pub mod project;
pub mod user;
