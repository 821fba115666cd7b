//! The frame-to-measurement mapping at the heart of the bridge.

use crate::{
    its::{
        SpeedValue,
        coordinate_degrees,
    },
    source::DecodedFrame,
};

/// One speed/position sample extracted from a CAM.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedMeasurement {
    pub station_id: u32,
    /// Capture time in nanoseconds since epoch.
    pub timestamp: i64,
    /// km/h
    pub speed: f64,
    /// Decimal degrees.
    pub latitude: f64,
    /// Decimal degrees.
    pub longitude: f64,
}

/// A sample plus the station location it was recorded at.
///
/// The location names this receiver, not the sending vehicle. It is
/// configuration, set once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub location: String,
    pub value: SpeedMeasurement,
}

/// Maps one decoded frame to a measurement.
///
/// `None` is the normal outcome for anything that cannot be ingested: frames
/// without an ITS layer (non-ITS traffic on the same channel), frames whose
/// speed is the "unavailable" sentinel, and frames with missing or mangled
/// fields. Long captures routinely contain all three.
pub fn map_frame(frame: &DecodedFrame) -> Option<SpeedMeasurement> {
    let its = frame.its()?;

    let raw_speed: u16 = its.field("speedValue")?.parse().ok()?;
    let speed = SpeedValue::from_raw(raw_speed).kmh()?;

    let latitude = coordinate_degrees(its.field("latitude")?.parse().ok()?);
    let longitude = coordinate_degrees(its.field("longitude")?.parse().ok()?);
    let station_id = its.field("stationId")?.parse().ok()?;

    Some(SpeedMeasurement {
        station_id,
        timestamp: frame.timestamp_nanos(),
        speed,
        latitude,
        longitude,
    })
}
