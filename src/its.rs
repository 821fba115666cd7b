//! Field semantics of the dissected ITS layer.
//!
//! CAM speed and position fields arrive in fixed-point wire units: speed in
//! 0.01 m/s steps, coordinates in 1e-7 degree steps.

/// Reserved `speedValue` meaning the sender did not supply a measurement.
pub const SPEED_UNAVAILABLE: u16 = 16383;

/// A raw `speedValue` as found on the wire.
///
/// The reserved "unavailable" value gets its own variant so it cannot reach
/// the unit conversion by accident.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedValue {
    Value(u16),
    Unavailable,
}

impl SpeedValue {
    pub fn from_raw(raw: u16) -> Self {
        if raw == SPEED_UNAVAILABLE {
            Self::Unavailable
        }
        else {
            Self::Value(raw)
        }
    }

    /// Speed in km/h, or `None` for the unavailable sentinel.
    pub fn kmh(&self) -> Option<f64> {
        match self {
            Self::Value(raw) => Some(speed_kmh(*raw)),
            Self::Unavailable => None,
        }
    }
}

/// Converts a raw speed in 0.01 m/s units to km/h.
///
/// `1412` means 14.12 m/s, i.e. 50.832 km/h.
pub fn speed_kmh(raw: u16) -> f64 {
    f64::from(raw) * 60.0 * 60.0 / 1000.0 / 100.0
}

/// Converts a raw coordinate in 1e-7 degree units to decimal degrees.
pub fn coordinate_degrees(raw: i32) -> f64 {
    f64::from(raw) / 10_000_000.0
}
