use crate::segment::SegmentRange;

/// An immutable, in-memory block of decoded audio.
///
/// Samples are stored planar: one `Vec<f32>` per channel, all of equal
/// length. Values are nominally in `[-1.0, 1.0]`; the encoder clamps, so a
/// decoder that overshoots slightly does not corrupt the output.
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    /// Construct a buffer from planar channel data.
    ///
    /// # Panics
    ///
    /// Panics if `sample_rate` is zero, `channels` is empty, or the channel
    /// vectors differ in length.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        assert!(sample_rate > 0, "sample rate must be positive");
        assert!(!channels.is_empty(), "buffer needs at least one channel");
        let frames = channels[0].len();
        assert!(
            channels.iter().all(|channel| channel.len() == frames),
            "all channels must have the same length"
        );
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of sample positions shared by all channels.
    pub fn frame_count(&self) -> u64 {
        self.channels[0].len() as u64
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frame_count() as f64 / f64::from(self.sample_rate)
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Copy the frames in `range` into a new buffer with the same rate and
    /// channel layout. A hard cut: no resampling, no boundary fades.
    ///
    /// The range must already be validated against [`frame_count`]
    /// (see [`compute_ranges`](crate::compute_ranges)); slicing itself
    /// cannot fail.
    ///
    /// [`frame_count`]: Self::frame_count
    pub fn slice(&self, range: &SegmentRange) -> SampleBuffer {
        let start = range.start_frame as usize;
        let end = range.end_frame as usize;
        let channels = self
            .channels
            .iter()
            .map(|samples| samples[start..end].to_vec())
            .collect();
        SampleBuffer {
            sample_rate: self.sample_rate,
            channels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_copies_requested_frames_verbatim() {
        let left = vec![0.0, 0.1, 0.2, 0.3, 0.4];
        let right = vec![0.5, 0.6, 0.7, 0.8, 0.9];
        let buffer = SampleBuffer::new(8_000, vec![left, right]);

        let range = SegmentRange {
            start_frame: 1,
            end_frame: 4,
            index: 0,
        };
        let slice = buffer.slice(&range);

        assert_eq!(slice.sample_rate(), 8_000);
        assert_eq!(slice.channel_count(), 2);
        assert_eq!(slice.frame_count(), 3);
        assert_eq!(slice.channel(0), &[0.1, 0.2, 0.3]);
        assert_eq!(slice.channel(1), &[0.6, 0.7, 0.8]);
    }

    #[test]
    fn duration_reflects_frames_and_rate() {
        let buffer = SampleBuffer::new(4_000, vec![vec![0.0; 2_000]]);
        assert_eq!(buffer.duration_seconds(), 0.5);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn mismatched_channel_lengths_are_rejected() {
        SampleBuffer::new(8_000, vec![vec![0.0; 3], vec![0.0; 4]]);
    }
}
