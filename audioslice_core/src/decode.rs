//! Decoding arbitrary input bytes into a [`SampleBuffer`].
//!
//! The pipeline treats decoding as an opaque capability: bytes in, PCM out.
//! Symphonia supplies the container probing and codec support.

use std::io::Cursor;

use log::debug;
use symphonia::core::audio::SampleBuffer as InterleavedBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use crate::buffer::SampleBuffer;
use crate::SplitError;

/// Decode `input` into a planar sample buffer.
///
/// `format_hint` is the input file's extension, when known; it speeds up
/// container probing but is not required.
pub fn decode(input: &[u8], format_hint: Option<&str>) -> Result<SampleBuffer, SplitError> {
    let mut hint = Hint::new();
    if let Some(extension) = format_hint {
        hint.with_extension(extension);
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(input.to_vec())), Default::default());
    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|_| SplitError::UnsupportedFormat)?;
    let mut reader = probed.format;

    let track = reader
        .default_track()
        .ok_or(SplitError::MissingDefaultTrack)?;
    if track.codec_params.codec == CODEC_TYPE_NULL {
        return Err(SplitError::UnsupportedFormat);
    }
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(SplitError::MissingSampleRate)?;

    let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut channels: Vec<Vec<f32>> = Vec::new();
    let mut interleaved: Option<InterleavedBuffer<f32>> = None;

    while let Ok(packet) = reader.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let capacity = decoded.capacity() as u64;
                if channels.is_empty() {
                    channels = vec![Vec::new(); spec.channels.count()];
                }
                let buffer = interleaved
                    .get_or_insert_with(|| InterleavedBuffer::new(capacity, spec));
                buffer.copy_interleaved_ref(decoded);

                let channel_count = channels.len();
                for (position, sample) in buffer.samples().iter().enumerate() {
                    channels[position % channel_count].push(*sample);
                }
            }
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(err) => return Err(SplitError::from(err)),
        }
    }

    if channels.is_empty() || channels[0].is_empty() {
        return Err(SplitError::EmptyStream);
    }

    debug!(
        "decoded {} frames across {} channel(s) at {} Hz",
        channels[0].len(),
        channels.len(),
        sample_rate
    );

    Ok(SampleBuffer::new(sample_rate, channels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_input_is_reported_as_unsupported() {
        let err = decode(b"definitely not audio", None).unwrap_err();
        assert!(matches!(err, SplitError::UnsupportedFormat));
    }
}
