//! Split one decoded audio recording into contiguous time-bounded segments,
//! each independently encoded as a self-contained PCM container, and bundle
//! the results into a single zip archive.
//!
//! The pipeline: decode the input bytes, compute sample-accurate frame
//! ranges from either an explicit time range or an even split count, slice
//! and encode each range (in parallel), then archive the encoded files.
//! [`run`] is the one-call entry point; [`run_with_progress`] additionally
//! reports stage transitions and per-segment completion.

mod archive;
mod buffer;
mod decode;
mod segment;
mod wav;

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info};
use rayon::prelude::*;
use thiserror::Error;

pub use archive::{build_archive, EncodedFile};
pub use buffer::SampleBuffer;
pub use decode::decode;
pub use segment::{compute_ranges, entry_name, SegmentRange, Selection, SplitMode};
pub use wav::{encode as encode_wav, WavHeader, EXTENSION, HEADER_LEN};

/// Fixed name of the archive delivered to the user.
pub const ARCHIVE_NAME: &str = "segments.zip";

/// Errors that can occur while splitting audio.
#[derive(Debug, Error)]
pub enum SplitError {
    /// No input bytes were supplied.
    #[error("no audio data was supplied")]
    MissingAudio,

    /// Neither a time range nor a segment count was provided.
    #[error("either start/end times or a segment count must be provided")]
    MissingSelection,

    /// A time bound and a segment count were provided together.
    #[error("start/end times and a segment count are mutually exclusive")]
    ConflictingSelection,

    /// A time bound is missing, negative, non-finite, or out of order.
    #[error("invalid start or end time")]
    InvalidTimeRange,

    /// The requested range reaches past the end of the audio.
    #[error("selected range ends at frame {end_frame} but the audio only has {frame_count} frames")]
    RangeOutOfBounds { end_frame: u64, frame_count: u64 },

    /// The requested range rounds to zero frames.
    #[error("selected range does not contain any samples")]
    EmptyRange,

    /// The segment count must be at least one.
    #[error("segment count must be greater than zero")]
    InvalidSegmentCount { count: u32 },

    /// The input could not be identified as audio.
    #[error("input is not in a recognized audio format")]
    UnsupportedFormat,

    /// Error returned when the container does not expose any default track.
    #[error("input stream does not provide a default track")]
    MissingDefaultTrack,

    /// Error returned when the decoder track lacks a sample rate.
    #[error("input stream does not advertise a sample rate")]
    MissingSampleRate,

    /// The input decoded successfully but produced no audio frames.
    #[error("input stream does not contain any audio frames")]
    EmptyStream,

    /// Wrapper around errors produced by the Symphonia decoding library.
    #[error(transparent)]
    Decode(#[from] symphonia::core::errors::Error),

    /// Wrapper around archive serialization errors.
    #[error(transparent)]
    Archive(#[from] zip::result::ZipError),

    /// Wrapper around IO errors raised while writing archive entries.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The encoding worker pool could not be started.
    #[error("failed to start the encoding worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Coarse classification of a [`SplitError`], for presentation layers that
/// only need to know whether the user can fix the request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Bad, missing, or conflicting user input; correct the request and
    /// retry.
    InvalidParameters,
    /// The input bytes were not decodable as audio; supply a different
    /// file.
    Decode,
    /// A fatal serialization or infrastructure fault; reported, not
    /// retried.
    Archive,
}

impl SplitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SplitError::MissingAudio
            | SplitError::MissingSelection
            | SplitError::ConflictingSelection
            | SplitError::InvalidTimeRange
            | SplitError::RangeOutOfBounds { .. }
            | SplitError::EmptyRange
            | SplitError::InvalidSegmentCount { .. } => ErrorKind::InvalidParameters,
            SplitError::UnsupportedFormat
            | SplitError::MissingDefaultTrack
            | SplitError::MissingSampleRate
            | SplitError::EmptyStream
            | SplitError::Decode(_) => ErrorKind::Decode,
            SplitError::Archive(_) | SplitError::Io(_) | SplitError::WorkerPool(_) => {
                ErrorKind::Archive
            }
        }
    }
}

/// Pipeline stage currently executing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    Validating,
    Decoding,
    Segmenting,
    Encoding,
    Archiving,
}

/// Progress notifications emitted by [`run_with_progress`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProgressEvent {
    /// The pipeline entered a new stage.
    StageChanged(Stage),
    /// One more segment finished encoding. Emitted from worker threads.
    SegmentEncoded { completed: usize, total: usize },
    /// The archive is complete.
    Finished,
}

/// Configuration for one split request.
#[derive(Clone, Debug)]
pub struct Config {
    base_name: String,
    mode: SplitMode,
    format_hint: Option<String>,
    threads: Option<NonZeroUsize>,
}

impl Config {
    /// Construct a [`Config`], validating `selection` eagerly so that a bad
    /// request fails before any decode work begins.
    pub fn new<S: Into<String>>(base_name: S, selection: Selection) -> Result<Self, SplitError> {
        Self::builder(base_name, selection).build()
    }

    pub fn builder<S: Into<String>>(base_name: S, selection: Selection) -> ConfigBuilder {
        ConfigBuilder {
            base_name: base_name.into(),
            selection,
            format_hint: None,
            threads: None,
        }
    }

    /// Base used for archive entry names, without any extension.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn mode(&self) -> &SplitMode {
        &self.mode
    }
}

/// Builder for [`Config`].
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    base_name: String,
    selection: Selection,
    format_hint: Option<String>,
    threads: Option<NonZeroUsize>,
}

impl ConfigBuilder {
    /// Extension of the original input file, passed to the decoder as a
    /// probing hint.
    pub fn format_hint<S: Into<String>>(mut self, extension: S) -> Self {
        self.format_hint = Some(extension.into());
        self
    }

    /// Bound the encoding worker pool instead of using the global one.
    pub fn threads(mut self, threads: NonZeroUsize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn build(self) -> Result<Config, SplitError> {
        let mode = self.selection.resolve()?;
        Ok(Config {
            base_name: self.base_name,
            mode,
            format_hint: self.format_hint,
            threads: self.threads,
        })
    }
}

/// Split `input` according to `config` and return the finished archive.
pub fn run(input: &[u8], config: &Config) -> Result<Vec<u8>, SplitError> {
    run_with_progress(input, config, |_| {})
}

/// Like [`run`], reporting progress through the supplied callback.
///
/// [`ProgressEvent::SegmentEncoded`] is emitted from the worker threads
/// doing the encoding, hence the `Send + Sync` bound. Any stage failure
/// aborts the whole request; no partial archive is ever returned.
pub fn run_with_progress<F>(
    input: &[u8],
    config: &Config,
    progress: F,
) -> Result<Vec<u8>, SplitError>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    progress(ProgressEvent::StageChanged(Stage::Validating));
    if input.is_empty() {
        return Err(SplitError::MissingAudio);
    }

    progress(ProgressEvent::StageChanged(Stage::Decoding));
    let source = decode::decode(input, config.format_hint.as_deref())?;
    info!(
        "decoded {} frames ({} channel(s) at {} Hz)",
        source.frame_count(),
        source.channel_count(),
        source.sample_rate()
    );

    progress(ProgressEvent::StageChanged(Stage::Segmenting));
    let ranges = segment::compute_ranges(source.frame_count(), source.sample_rate(), &config.mode)?;
    debug!("computed {} segment range(s)", ranges.len());

    progress(ProgressEvent::StageChanged(Stage::Encoding));
    let files = encode_ranges(&source, &ranges, config, &progress)?;

    progress(ProgressEvent::StageChanged(Stage::Archiving));
    let archive = archive::build_archive(&files)?;
    info!(
        "archived {} segment(s) into {} bytes",
        files.len(),
        archive.len()
    );

    progress(ProgressEvent::Finished);
    Ok(archive)
}

/// Compute the archive entry names for a request without encoding anything.
///
/// Decodes the input to learn its length, then applies the same range and
/// naming logic [`run`] uses.
pub fn plan(input: &[u8], config: &Config) -> Result<Vec<String>, SplitError> {
    if input.is_empty() {
        return Err(SplitError::MissingAudio);
    }
    let source = decode::decode(input, config.format_hint.as_deref())?;
    let ranges = segment::compute_ranges(source.frame_count(), source.sample_rate(), &config.mode)?;
    Ok(ranges
        .iter()
        .map(|range| segment::entry_name(&config.base_name, &config.mode, range))
        .collect())
}

/// Slice and encode every range in parallel. Each task owns its slice and
/// its output buffer; the only shared state is the progress counter.
fn encode_ranges<F>(
    source: &SampleBuffer,
    ranges: &[SegmentRange],
    config: &Config,
    progress: &F,
) -> Result<Vec<EncodedFile>, SplitError>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    let total = ranges.len();
    let completed = AtomicUsize::new(0);
    let encode_one = |range: &SegmentRange| {
        let slice = source.slice(range);
        let file = EncodedFile {
            name: segment::entry_name(&config.base_name, &config.mode, range),
            bytes: wav::encode(&slice),
        };
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        progress(ProgressEvent::SegmentEncoded {
            completed: done,
            total,
        });
        file
    };

    match config.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads.get())
                .build()?;
            Ok(pool.install(|| ranges.par_iter().map(encode_one).collect()))
        }
        None => Ok(ranges.par_iter().map(encode_one).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validates_selection_eagerly() {
        let err = Config::new("tone", Selection::default()).unwrap_err();
        assert!(matches!(err, SplitError::MissingSelection));

        let conflicting = Selection {
            start: Some(1.0),
            end: Some(2.0),
            count: Some(3),
        };
        let err = Config::new("tone", conflicting).unwrap_err();
        assert!(matches!(err, SplitError::ConflictingSelection));

        let out_of_order = Selection {
            start: Some(5.0),
            end: Some(2.0),
            count: None,
        };
        let err = Config::new("tone", out_of_order).unwrap_err();
        assert!(matches!(err, SplitError::InvalidTimeRange));
    }

    #[test]
    fn error_kinds_group_by_recovery_strategy() {
        assert_eq!(
            SplitError::MissingSelection.kind(),
            ErrorKind::InvalidParameters
        );
        assert_eq!(
            SplitError::InvalidSegmentCount { count: 0 }.kind(),
            ErrorKind::InvalidParameters
        );
        assert_eq!(SplitError::UnsupportedFormat.kind(), ErrorKind::Decode);
        assert_eq!(SplitError::EmptyStream.kind(), ErrorKind::Decode);
        assert_eq!(
            SplitError::Io(std::io::Error::other("boom")).kind(),
            ErrorKind::Archive
        );
    }

    #[test]
    fn empty_input_fails_validation_before_decoding() {
        let selection = Selection {
            count: Some(2),
            ..Selection::default()
        };
        let config = Config::new("tone", selection).unwrap();
        assert!(matches!(run(&[], &config), Err(SplitError::MissingAudio)));
        assert!(matches!(plan(&[], &config), Err(SplitError::MissingAudio)));
    }
}
