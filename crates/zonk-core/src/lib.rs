#![deny(warnings)]
pub mod catalog;
pub mod game;
pub mod model;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "zonk"
    }

    pub const fn codename() -> &'static str {
        "Six Dice"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
