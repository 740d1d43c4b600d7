pub mod handlers;
pub mod uploads;

pub use handlers::config;
