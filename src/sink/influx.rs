//! InfluxDB sink.
//!
//! Talks to InfluxDB 1.x through the `influxdb` client crate: database
//! management at startup, then one point per measurement.

use influxdb::{
    Client,
    InfluxDbWriteable,
    ReadQuery,
    Timestamp,
    WriteQuery,
};
use serde::Deserialize;

use crate::{
    config::InfluxConfig,
    measurement::Measurement,
    sink::{
        Error,
        PointSink,
    },
};

/// Measurement name every point is written under.
pub const MEASUREMENT_NAME: &'static str = "speed";

pub struct InfluxSink {
    client: Client,
    database: String,
}

impl InfluxSink {
    /// The client is bound to the configured database; every subsequent
    /// write targets it.
    pub fn new(config: &InfluxConfig) -> Self {
        let client = Client::new(config.url.as_str(), config.database.as_str())
            .with_auth(config.username.as_str(), config.password.as_str());
        Self {
            client,
            database: config.database.clone(),
        }
    }

    /// Makes sure the target database exists, optionally purging it first.
    ///
    /// Order matters: drop (when purging), then check, then create. Runs
    /// before any ingestion, so a failure here propagates to the caller.
    pub async fn ensure_database(&self, purge: bool) -> Result<(), Error> {
        if purge {
            tracing::info!(database = %self.database, "purging database");
            self.client
                .query(ReadQuery::new(format!(
                    "DROP DATABASE \"{}\"",
                    self.database
                )))
                .await?;
        }

        let response = self.client.query(ReadQuery::new("SHOW DATABASES")).await?;
        if !show_databases_contains(&response, &self.database)? {
            println!("Creating database {}", self.database);
            self.client
                .query(ReadQuery::new(format!(
                    "CREATE DATABASE \"{}\"",
                    self.database
                )))
                .await?;
        }

        Ok(())
    }
}

impl PointSink for InfluxSink {
    type Error = Error;

    async fn write_point(&self, measurement: &Measurement) -> Result<(), Error> {
        self.client.query(point_query(measurement)).await?;
        Ok(())
    }
}

/// Serializes a measurement into its point layout.
///
/// `station_id` goes in twice on purpose: as a tag so series can be filtered
/// per station, and as a field so the value itself can be selected.
pub fn point_query(measurement: &Measurement) -> WriteQuery {
    let value = &measurement.value;
    Timestamp::Nanoseconds(value.timestamp as u128)
        .into_query(MEASUREMENT_NAME)
        .add_tag("location", measurement.location.clone())
        .add_tag("station_id", value.station_id.to_string())
        .add_field("lat", value.latitude)
        .add_field("lon", value.longitude)
        .add_field("speed", value.speed)
        .add_field("station_id", i64::from(value.station_id))
}

/// Checks a `SHOW DATABASES` response for the given database name.
fn show_databases_contains(response: &str, database: &str) -> Result<bool, Error> {
    #[derive(Debug, Deserialize)]
    struct Response {
        #[serde(default)]
        results: Vec<StatementResult>,
    }
    #[derive(Debug, Deserialize)]
    struct StatementResult {
        #[serde(default)]
        series: Vec<Series>,
    }
    #[derive(Debug, Deserialize)]
    struct Series {
        #[serde(default)]
        values: Vec<(String,)>,
    }

    let response: Response = serde_json::from_str(response)?;
    Ok(response
        .results
        .iter()
        .flat_map(|result| &result.series)
        .flat_map(|series| &series.values)
        .any(|(name,)| name == database))
}
