//! Capture sources producing decoded frames.
//!
//! Packet dissection is tshark's job; this module only defines the shape of
//! a dissected frame as the rest of the pipeline consumes it, so the
//! pipeline can be driven by fakes in tests.

pub mod tshark;

use std::io;

pub use tshark::TsharkSource;

#[derive(Debug, thiserror::Error)]
#[error("capture source error")]
pub enum Error {
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this is the "not allowed to capture on this interface"
    /// condition, which gets a dedicated operator diagnostic in live mode.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Io(error) => {
                error.kind() == io::ErrorKind::PermissionDenied
                    || error.to_string().contains("Permission denied")
            }
        }
    }
}

/// A lazy sequence of decoded frames.
///
/// `Ok(None)` is exhaustion (the end of a capture file). Reading the next
/// frame may block until a packet arrives when capturing live.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<DecodedFrame>, Error>;
}

/// One dissected frame.
///
/// Only what the pipeline consumes survives dissection: the capture
/// timestamp, and the named ITS fields if the frame carried an ITS layer.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedFrame {
    timestamp_nanos: i64,
    its: Option<ItsFields>,
}

impl DecodedFrame {
    pub fn new(timestamp_nanos: i64) -> Self {
        Self {
            timestamp_nanos,
            its: None,
        }
    }

    pub fn with_its(mut self, its: ItsFields) -> Self {
        self.its = Some(its);
        self
    }

    /// Capture time in nanoseconds since epoch.
    pub fn timestamp_nanos(&self) -> i64 {
        self.timestamp_nanos
    }

    /// The ITS field group. Absent for non-ITS traffic.
    pub fn its(&self) -> Option<&ItsFields> {
        self.its.as_ref()
    }
}

/// The named fields of a dissected ITS layer, verbatim as the dissector
/// reports them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItsFields {
    fields: Vec<(String, String)>,
}

impl ItsFields {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Looks up a field by name.
    ///
    /// Names are matched case-insensitively: dissector versions disagree on
    /// the capitalization of e.g. `stationId`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for ItsFields {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Converts a capture timestamp in decimal seconds, e.g.
/// `"1700000000.500000000"`, to integer nanoseconds since epoch.
///
/// Stays in integer arithmetic: `f64` cannot represent current epoch values
/// at nanosecond resolution.
pub(crate) fn epoch_nanos(time_epoch: &str) -> Option<i64> {
    let (seconds, fraction) = match time_epoch.split_once('.') {
        Some(parts) => parts,
        None => (time_epoch, ""),
    };

    let seconds: u64 = seconds.parse().ok()?;

    let mut nanos: u64 = 0;
    let mut digits = 0;
    for c in fraction.chars().take(9) {
        nanos = nanos * 10 + u64::from(c.to_digit(10)?);
        digits += 1;
    }
    nanos *= 10u64.pow(9 - digits);

    i64::try_from(seconds.checked_mul(1_000_000_000)?.checked_add(nanos)?).ok()
}
