pub mod api;
pub mod app;
pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod location;
pub mod logging;
pub mod map;
pub mod models;
pub mod quicklinks;
pub mod store;
pub mod sync;
pub mod ui;
