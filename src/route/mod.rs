pub mod client;
#[cfg(feature = "http")]
pub mod http;
pub mod model;
