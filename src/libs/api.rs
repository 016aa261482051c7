pub mod api_traits;
pub mod client;
pub mod oauth;
