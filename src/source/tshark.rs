//! tshark-backed capture source.
//!
//! tshark does all the dissection work, for capture files and live
//! interfaces alike; this module only maps its per-packet output to
//! [`DecodedFrame`]s.

use std::path::Path;

use rtshark::{
    RTShark,
    RTSharkBuilder,
};

use crate::source::{
    DecodedFrame,
    Error,
    FrameSource,
    ItsFields,
    epoch_nanos,
};

/// Name of the dissected ITS layer.
const ITS_LAYER: &'static str = "its";

/// Name of tshark's synthetic per-packet layer carrying the capture
/// timestamp.
const FRAME_LAYER: &'static str = "frame";

const FRAME_TIME_EPOCH: &'static str = "frame.time_epoch";

pub struct TsharkSource {
    tshark: RTShark,
}

impl TsharkSource {
    /// Opens a capture file. The returned source is a finite sequence.
    pub fn open_file(path: &Path) -> Result<Self, Error> {
        let path = path.to_string_lossy();
        let tshark = RTSharkBuilder::builder().input_path(&path).spawn()?;
        Ok(Self { tshark })
    }

    /// Starts capturing on a network interface. The returned source blocks
    /// on each read until a packet arrives, and only ends when the capture
    /// child dies.
    pub fn open_live(interface: &str) -> Result<Self, Error> {
        let tshark = RTSharkBuilder::builder()
            .input_path(interface)
            .live_capture()
            .spawn()?;
        Ok(Self { tshark })
    }
}

impl FrameSource for TsharkSource {
    fn next_frame(&mut self) -> Result<Option<DecodedFrame>, Error> {
        while let Some(packet) = self.tshark.read()? {
            match decode_packet(&packet) {
                Some(frame) => return Ok(Some(frame)),
                None => {
                    tracing::debug!("skipping packet without a usable capture time");
                }
            }
        }
        Ok(None)
    }
}

impl Drop for TsharkSource {
    fn drop(&mut self) {
        self.tshark.kill();
    }
}

fn decode_packet(packet: &rtshark::Packet) -> Option<DecodedFrame> {
    let time_epoch = packet
        .layer_name(FRAME_LAYER)?
        .iter()
        .find(|metadata| metadata.name() == FRAME_TIME_EPOCH)?
        .value();
    let mut frame = DecodedFrame::new(epoch_nanos(time_epoch)?);

    if let Some(layer) = packet.layer_name(ITS_LAYER) {
        let mut its = ItsFields::default();
        for metadata in layer.iter() {
            let name = metadata.name();
            let name = name.strip_prefix("its.").unwrap_or(name);
            its.insert(name, metadata.value());
        }
        frame = frame.with_its(its);
    }

    Some(frame)
}
