mod about;
mod blocklists;
mod dashboard;
mod settings;

pub use about::AboutView;
pub use blocklists::BlocklistsView;
pub use dashboard::{DashboardAreas, DashboardView};
pub use settings::SettingsView;
