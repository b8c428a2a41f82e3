pub mod config;
pub mod events;
pub mod preview;
pub mod replay;
