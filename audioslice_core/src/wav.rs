//! Fixed-format PCM container serialization.
//!
//! Each segment is written as a canonical 44-byte little-endian RIFF/WAVE
//! header followed by interleaved 16-bit signed samples. The header is
//! emitted with fixed-offset field writes and can be parsed back into its
//! fields, which the tests use to validate the layout.

use crate::buffer::SampleBuffer;

/// File extension matching the container bytes actually produced.
pub const EXTENSION: &str = "wav";

/// Size of the serialized header in bytes.
pub const HEADER_LEN: usize = 44;

const RIFF_MAGIC: &[u8; 4] = b"RIFF";
const WAVE_MAGIC: &[u8; 4] = b"WAVE";
const FMT_MAGIC: &[u8; 4] = b"fmt ";
const DATA_MAGIC: &[u8; 4] = b"data";
const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// The variable fields of a 16-bit linear-PCM RIFF header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WavHeader {
    pub channel_count: u16,
    pub sample_rate: u32,
    /// Length of the sample payload in bytes: `frames × channels × 2`.
    pub data_len: u32,
}

impl WavHeader {
    pub fn block_align(&self) -> u16 {
        self.channel_count * (BITS_PER_SAMPLE / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }

    /// Append the 44 header bytes to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(RIFF_MAGIC);
        out.extend_from_slice(&(36 + self.data_len).to_le_bytes());
        out.extend_from_slice(WAVE_MAGIC);
        out.extend_from_slice(FMT_MAGIC);
        out.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
        out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
        out.extend_from_slice(&self.channel_count.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&self.byte_rate().to_le_bytes());
        out.extend_from_slice(&self.block_align().to_le_bytes());
        out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
        out.extend_from_slice(DATA_MAGIC);
        out.extend_from_slice(&self.data_len.to_le_bytes());
    }

    /// Parse a serialized header back into its fields.
    ///
    /// Returns `None` when the magic values or the fixed PCM fields do not
    /// match what [`write_to`](Self::write_to) produces.
    pub fn parse(bytes: &[u8]) -> Option<WavHeader> {
        if bytes.len() < HEADER_LEN {
            return None;
        }
        if &bytes[0..4] != RIFF_MAGIC
            || &bytes[8..12] != WAVE_MAGIC
            || &bytes[12..16] != FMT_MAGIC
            || &bytes[36..40] != DATA_MAGIC
        {
            return None;
        }

        let u16_at = |offset: usize| u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
        let u32_at = |offset: usize| {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };

        if u32_at(16) != FMT_CHUNK_LEN
            || u16_at(20) != FORMAT_PCM
            || u16_at(34) != BITS_PER_SAMPLE
        {
            return None;
        }

        let header = WavHeader {
            channel_count: u16_at(22),
            sample_rate: u32_at(24),
            data_len: u32_at(40),
        };
        if u32_at(4) != 36 + header.data_len
            || u32_at(28) != header.byte_rate()
            || u16_at(32) != header.block_align()
        {
            return None;
        }
        Some(header)
    }
}

/// Serialize `buffer` into a self-contained PCM container.
pub fn encode(buffer: &SampleBuffer) -> Vec<u8> {
    let frames = buffer.frame_count() as usize;
    let channel_count = buffer.channel_count();
    let data_len = (frames * channel_count * 2) as u32;

    let mut out = Vec::with_capacity(HEADER_LEN + data_len as usize);
    WavHeader {
        channel_count: channel_count as u16,
        sample_rate: buffer.sample_rate(),
        data_len,
    }
    .write_to(&mut out);

    for frame in 0..frames {
        for channel in 0..channel_count {
            let quantized = quantize(buffer.channel(channel)[frame]);
            out.extend_from_slice(&quantized.to_le_bytes());
        }
    }
    out
}

/// Clamp to `[-1.0, 1.0]` and scale to a 16-bit signed integer, truncating
/// toward zero. The negative half-range scales by 32768, the positive one
/// by 32767.
fn quantize(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    let scaled = if clamped < 0.0 {
        clamped * 32_768.0
    } else {
        clamped * 32_767.0
    };
    scaled as i16
}
