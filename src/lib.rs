//! Bridge from ITS-G5 (802.11p) vehicle broadcasts to InfluxDB.
//!
//! Frames come from tshark (a capture file or a live interface) and every
//! usable CAM becomes one time-series point: station id, speed, position,
//! capture time.

pub mod app;
pub mod config;
pub mod its;
pub mod measurement;
pub mod sink;
pub mod source;
