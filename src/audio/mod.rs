pub mod capture;
pub mod forward;
pub mod playback;
