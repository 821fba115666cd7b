//! Time-series sinks accepting measurements.

pub mod influx;

pub use influx::InfluxSink;

use crate::measurement::Measurement;

#[derive(Debug, thiserror::Error)]
#[error("point sink error")]
pub enum Error {
    Influx(#[from] influxdb::Error),
    UnexpectedResponse(#[from] serde_json::Error),
}

/// A sink accepting one structured point per measurement.
///
/// One call, one synchronous write. No batching, no retries. A failed write
/// is reported through the error and must not abort ingestion.
pub trait PointSink {
    type Error: std::error::Error;

    fn write_point(
        &self,
        measurement: &Measurement,
    ) -> impl Future<Output = Result<(), Self::Error>>;
}
