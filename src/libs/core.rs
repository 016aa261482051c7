pub mod feed_builder;
pub mod index;
pub mod relative_time;
pub mod render;
pub mod session;
