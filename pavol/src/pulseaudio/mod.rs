pub mod api;
pub mod connect;
pub mod error;
mod util;
