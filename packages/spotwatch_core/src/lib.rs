// Spotwatch - IoT Spot Monitoring Client

pub mod config;
pub mod directory;
pub mod poller;
pub mod source;
pub mod timestamp;
pub mod types;
