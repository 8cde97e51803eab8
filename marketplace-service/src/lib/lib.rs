pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::auth;
pub use domain::course;
pub use domain::payment;
pub use domain::project;
pub use domain::user;
pub use outbound::repositories;
