pub mod audio;
pub mod config;
pub mod controller;
pub mod net;
pub mod protocol;
pub mod session;
pub mod ui;

pub use controller::Controller;
