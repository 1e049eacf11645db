//! Settings adapters

mod xdg;

pub use xdg::XdgSettingsStore;
