pub mod agent;
pub mod api;
pub mod draw;
pub mod i18n;
pub mod model;
pub mod poller;
pub mod snapshot;
pub mod terminal;
pub mod ui;
