pub mod app;
pub mod events;
pub mod surface;
pub mod theme;
pub mod ui;
