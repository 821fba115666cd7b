//! The ingestion driver: pulls frames from a source, maps them, writes
//! points, keeps score.

use chrono::Local;

use crate::{
    measurement::{
        Measurement,
        map_frame,
    },
    sink::PointSink,
    source::FrameSource,
};

/// Counters for one file-mode run.
///
/// `error` counts everything that did not end in a successful write:
/// non-ITS frames, sentinel speeds, mangled fields and failed writes all
/// land in the same bucket, matching the summary line this tool has always
/// printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub success: u64,
    pub error: u64,
}

/// Drains a finite capture, writing one point per usable frame.
///
/// A source error ends the run early; whatever was counted until then is
/// returned.
pub async fn ingest_file<S, P>(source: &mut S, sink: &P, location: &str) -> IngestStats
where
    S: FrameSource,
    P: PointSink,
{
    let mut stats = IngestStats::default();

    loop {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(error) => {
                tracing::warn!(%error, "capture source failed, stopping early");
                break;
            }
        };

        match map_frame(&frame) {
            Some(value) => {
                let measurement = Measurement {
                    location: location.to_owned(),
                    value,
                };
                match sink.write_point(&measurement).await {
                    Ok(()) => stats.success += 1,
                    Err(error) => {
                        tracing::warn!(%error, "write failed");
                        stats.error += 1;
                    }
                }
            }
            None => stats.error += 1,
        }
    }

    stats
}

/// Ingests from a live capture until it ends or fails.
///
/// No counters here: the loop is open-ended and the arrival lines on stdout
/// are the feedback. Write failures are logged and skipped. A
/// permission-denied capture error turns into an operator diagnostic instead
/// of a crash; anything else simply ends the loop.
pub async fn ingest_live<S, P>(source: &mut S, sink: &P, location: &str, interface: &str)
where
    S: FrameSource,
    P: PointSink,
{
    loop {
        match source.next_frame() {
            Ok(Some(frame)) => {
                if let Some(value) = map_frame(&frame) {
                    let measurement = Measurement {
                        location: location.to_owned(),
                        value,
                    };
                    if let Err(error) = sink.write_point(&measurement).await {
                        tracing::warn!(%error, "write failed");
                    }
                }
                println!("Packet arrived: {}", Local::now());
            }
            Ok(None) => break,
            Err(error) if error.is_permission_denied() => {
                println!(
                    "Insufficient permissions to capture on interface {interface}. Try again with sudo."
                );
                break;
            }
            Err(error) => {
                tracing::warn!(%error, "capture source failed, stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        collections::VecDeque,
        io,
    };

    use crate::{
        app::{
            IngestStats,
            ingest_file,
            ingest_live,
        },
        measurement::Measurement,
        sink::PointSink,
        source::{
            DecodedFrame,
            FrameSource,
            ItsFields,
        },
    };

    struct ScriptedSource {
        steps: VecDeque<Result<Option<DecodedFrame>, crate::source::Error>>,
    }

    impl ScriptedSource {
        fn new(
            steps: impl IntoIterator<Item = Result<Option<DecodedFrame>, crate::source::Error>>,
        ) -> Self {
            Self {
                steps: steps.into_iter().collect(),
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<Option<DecodedFrame>, crate::source::Error> {
            self.steps.pop_front().unwrap_or(Ok(None))
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("sink unavailable")]
    struct SinkUnavailable;

    #[derive(Default)]
    struct RecordingSink {
        writes: RefCell<Vec<Measurement>>,
        fail: bool,
    }

    impl PointSink for RecordingSink {
        type Error = SinkUnavailable;

        async fn write_point(&self, measurement: &Measurement) -> Result<(), SinkUnavailable> {
            if self.fail {
                return Err(SinkUnavailable);
            }
            self.writes.borrow_mut().push(measurement.clone());
            Ok(())
        }
    }

    fn cam_frame(station_id: u32) -> DecodedFrame {
        let its: ItsFields = [
            ("stationId", station_id.to_string()),
            ("speedValue", "1412".to_owned()),
            ("latitude", "507896123".to_owned()),
            ("longitude", "73456789".to_owned()),
        ]
        .into_iter()
        .collect();
        DecodedFrame::new(1_700_000_000_500_000_000).with_its(its)
    }

    fn plain_frame() -> DecodedFrame {
        DecodedFrame::new(1_700_000_000_000_000_000)
    }

    #[tokio::test]
    async fn it_counts_written_and_skipped_frames() {
        let mut frames: Vec<_> = (0..7).map(|i| Ok(Some(cam_frame(i)))).collect();
        frames.extend((0..3).map(|_| Ok(Some(plain_frame()))));
        let mut source = ScriptedSource::new(frames);
        let sink = RecordingSink::default();

        let stats = ingest_file(&mut source, &sink, "bonn-west").await;

        assert_eq!(stats, IngestStats { success: 7, error: 3 });
        assert_eq!(sink.writes.borrow().len(), 7);
        assert!(
            sink.writes
                .borrow()
                .iter()
                .all(|measurement| measurement.location == "bonn-west")
        );
    }

    #[tokio::test]
    async fn it_never_writes_unusable_frames() {
        let mut source = ScriptedSource::new([Ok(Some(plain_frame()))]);
        let sink = RecordingSink::default();

        let stats = ingest_file(&mut source, &sink, "bonn-west").await;

        assert_eq!(stats, IngestStats { success: 0, error: 1 });
        assert!(sink.writes.borrow().is_empty());
    }

    #[tokio::test]
    async fn it_counts_failed_writes_as_errors() {
        let mut source = ScriptedSource::new([Ok(Some(cam_frame(1)))]);
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };

        let stats = ingest_file(&mut source, &sink, "bonn-west").await;

        assert_eq!(stats, IngestStats { success: 0, error: 1 });
    }

    #[tokio::test]
    async fn it_stops_at_the_first_source_error_and_keeps_counts() {
        let mut source = ScriptedSource::new([
            Ok(Some(cam_frame(1))),
            Err(io::Error::other("capture truncated").into()),
            Ok(Some(cam_frame(2))),
        ]);
        let sink = RecordingSink::default();

        let stats = ingest_file(&mut source, &sink, "bonn-west").await;

        assert_eq!(stats, IngestStats { success: 1, error: 0 });
        assert_eq!(sink.writes.borrow().len(), 1);
    }

    #[tokio::test]
    async fn live_mode_writes_without_counting() {
        let mut source = ScriptedSource::new([Ok(Some(cam_frame(1))), Ok(Some(plain_frame()))]);
        let sink = RecordingSink::default();

        ingest_live(&mut source, &sink, "bonn-west", "wlan0").await;

        assert_eq!(sink.writes.borrow().len(), 1);
    }

    #[tokio::test]
    async fn live_mode_reports_permission_denied_and_returns() {
        let mut source = ScriptedSource::new([Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "you can't",
        )
        .into())]);
        let sink = RecordingSink::default();

        ingest_live(&mut source, &sink, "bonn-west", "wlan0").await;

        assert!(sink.writes.borrow().is_empty());
    }
}
