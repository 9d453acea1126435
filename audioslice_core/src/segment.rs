use crate::wav;
use crate::SplitError;

/// How the source audio is cut into segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SplitMode {
    /// A single excerpt between two points in time, in seconds.
    TimeRange { start: f64, end: f64 },
    /// `count` contiguous segments of equal duration covering the whole
    /// recording.
    EvenSplit { count: u32 },
}

/// The raw selection as supplied by the user: either a pair of time bounds
/// or a segment count, never a mixture.
#[derive(Clone, Copy, Debug, Default)]
pub struct Selection {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub count: Option<u32>,
}

impl Selection {
    /// Validate the selection and collapse it into a [`SplitMode`].
    ///
    /// Exactly one of the two forms must be present: supplying a time bound
    /// together with a count, or nothing at all, is rejected here before any
    /// decoding work starts.
    pub fn resolve(&self) -> Result<SplitMode, SplitError> {
        let has_time_bound = self.start.is_some() || self.end.is_some();
        match (has_time_bound, self.count) {
            (true, Some(_)) => Err(SplitError::ConflictingSelection),
            (false, None) => Err(SplitError::MissingSelection),
            (false, Some(count)) => {
                if count == 0 {
                    return Err(SplitError::InvalidSegmentCount { count });
                }
                Ok(SplitMode::EvenSplit { count })
            }
            (true, None) => match (self.start, self.end) {
                (Some(start), Some(end)) => {
                    validate_time_range(start, end)?;
                    Ok(SplitMode::TimeRange { start, end })
                }
                _ => Err(SplitError::InvalidTimeRange),
            },
        }
    }
}

fn validate_time_range(start: f64, end: f64) -> Result<(), SplitError> {
    if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
        return Err(SplitError::InvalidTimeRange);
    }
    Ok(())
}

/// A contiguous span of frames selected for independent export.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SegmentRange {
    pub start_frame: u64,
    /// Exclusive end frame; always `≤` the source buffer's frame count.
    pub end_frame: u64,
    /// Ordinal position within the request, starting at zero.
    pub index: usize,
}

impl SegmentRange {
    pub fn frame_count(&self) -> u64 {
        self.end_frame - self.start_frame
    }
}

/// Compute the ordered frame ranges selected by `mode` for a buffer of
/// `frame_count` frames at `sample_rate` Hz.
///
/// A time range produces exactly one range; an even split produces `count`
/// contiguous, ascending ranges whose union is the whole buffer. Adjacent
/// even-split ranges share one boundary value, so the cover has no gaps and
/// no overlaps.
pub fn compute_ranges(
    frame_count: u64,
    sample_rate: u32,
    mode: &SplitMode,
) -> Result<Vec<SegmentRange>, SplitError> {
    match *mode {
        SplitMode::TimeRange { start, end } => {
            validate_time_range(start, end)?;
            let start_frame = (start * f64::from(sample_rate)).round() as u64;
            let end_frame = (end * f64::from(sample_rate)).round() as u64;
            if end_frame > frame_count {
                return Err(SplitError::RangeOutOfBounds {
                    end_frame,
                    frame_count,
                });
            }
            if end_frame <= start_frame {
                return Err(SplitError::EmptyRange);
            }
            Ok(vec![SegmentRange {
                start_frame,
                end_frame,
                index: 0,
            }])
        }
        SplitMode::EvenSplit { count } => {
            if count == 0 {
                return Err(SplitError::InvalidSegmentCount { count });
            }
            // Boundary i rounds i/count of the buffer; exact at both ends.
            let boundary = |i: u32| -> u64 {
                (f64::from(i) * frame_count as f64 / f64::from(count)).round() as u64
            };
            Ok((0..count)
                .map(|i| SegmentRange {
                    start_frame: boundary(i),
                    end_frame: boundary(i + 1),
                    index: i as usize,
                })
                .collect())
        }
    }
}

/// Archive entry name for one segment.
///
/// An explicit time range keeps the user's second values in the name
/// (`tone_2.5-10.wav`); an even split numbers the entries from one
/// (`tone_1.wav`). Both carry the extension of the container actually
/// written.
pub fn entry_name(base_name: &str, mode: &SplitMode, range: &SegmentRange) -> String {
    match *mode {
        SplitMode::TimeRange { start, end } => {
            format!("{base_name}_{start}-{end}.{}", wav::EXTENSION)
        }
        SplitMode::EvenSplit { .. } => {
            format!("{base_name}_{}.{}", range.index + 1, wav::EXTENSION)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_split_covers_buffer_contiguously() {
        let ranges = compute_ranges(441_000, 44_100, &SplitMode::EvenSplit { count: 2 }).unwrap();

        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].start_frame, 0);
        assert_eq!(ranges[0].end_frame, 220_500);
        assert_eq!(ranges[1].start_frame, 220_500);
        assert_eq!(ranges[1].end_frame, 441_000);
    }

    #[test]
    fn even_split_with_awkward_count_stays_gapless() {
        let frame_count = 44_101;
        let ranges =
            compute_ranges(frame_count, 44_100, &SplitMode::EvenSplit { count: 7 }).unwrap();

        assert_eq!(ranges.len(), 7);
        assert_eq!(ranges[0].start_frame, 0);
        assert_eq!(ranges.last().unwrap().end_frame, frame_count);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end_frame, pair[1].start_frame);
        }
        for (i, range) in ranges.iter().enumerate() {
            assert_eq!(range.index, i);
            assert!(range.end_frame > range.start_frame);
        }
    }

    #[test]
    fn count_of_one_selects_the_whole_buffer() {
        let ranges = compute_ranges(8_192, 8_000, &SplitMode::EvenSplit { count: 1 }).unwrap();
        assert_eq!(
            ranges,
            vec![SegmentRange {
                start_frame: 0,
                end_frame: 8_192,
                index: 0,
            }]
        );
    }

    #[test]
    fn time_range_rounds_bounds_to_frames() {
        let mode = SplitMode::TimeRange {
            start: 0.25,
            end: 0.75,
        };
        let ranges = compute_ranges(44_100, 44_100, &mode).unwrap();
        assert_eq!(
            ranges,
            vec![SegmentRange {
                start_frame: 11_025,
                end_frame: 33_075,
                index: 0,
            }]
        );
    }

    #[test]
    fn time_range_spanning_the_whole_buffer_is_accepted() {
        let mode = SplitMode::TimeRange {
            start: 0.0,
            end: 1.0,
        };
        let ranges = compute_ranges(44_100, 44_100, &mode).unwrap();
        assert_eq!(ranges[0].start_frame, 0);
        assert_eq!(ranges[0].end_frame, 44_100);
    }

    #[test]
    fn time_range_past_the_end_is_rejected() {
        let mode = SplitMode::TimeRange {
            start: 0.0,
            end: 2.0,
        };
        let err = compute_ranges(44_100, 44_100, &mode).unwrap_err();
        assert!(matches!(
            err,
            SplitError::RangeOutOfBounds {
                end_frame: 88_200,
                frame_count: 44_100,
            }
        ));
    }

    #[test]
    fn out_of_order_time_range_is_rejected() {
        let mode = SplitMode::TimeRange {
            start: 5.0,
            end: 2.0,
        };
        assert!(matches!(
            compute_ranges(441_000, 44_100, &mode),
            Err(SplitError::InvalidTimeRange)
        ));
    }

    #[test]
    fn time_range_that_rounds_to_nothing_is_rejected() {
        let mode = SplitMode::TimeRange {
            start: 1e-9,
            end: 2e-9,
        };
        assert!(matches!(
            compute_ranges(44_100, 44_100, &mode),
            Err(SplitError::EmptyRange)
        ));
    }

    #[test]
    fn selection_requires_exactly_one_form() {
        let none = Selection::default();
        assert!(matches!(
            none.resolve(),
            Err(SplitError::MissingSelection)
        ));

        let both = Selection {
            start: Some(1.0),
            end: Some(2.0),
            count: Some(3),
        };
        assert!(matches!(
            both.resolve(),
            Err(SplitError::ConflictingSelection)
        ));

        let lone_start = Selection {
            start: Some(1.0),
            ..Selection::default()
        };
        assert!(matches!(
            lone_start.resolve(),
            Err(SplitError::InvalidTimeRange)
        ));
    }

    #[test]
    fn selection_rejects_zero_count() {
        let selection = Selection {
            count: Some(0),
            ..Selection::default()
        };
        assert!(matches!(
            selection.resolve(),
            Err(SplitError::InvalidSegmentCount { count: 0 })
        ));
    }

    #[test]
    fn selection_resolves_valid_forms() {
        let range = Selection {
            start: Some(0.0),
            end: Some(1.5),
            count: None,
        };
        assert_eq!(
            range.resolve().unwrap(),
            SplitMode::TimeRange {
                start: 0.0,
                end: 1.5,
            }
        );

        let split = Selection {
            count: Some(4),
            ..Selection::default()
        };
        assert_eq!(split.resolve().unwrap(), SplitMode::EvenSplit { count: 4 });
    }

    #[test]
    fn entry_names_follow_the_mode() {
        let range = SegmentRange {
            start_frame: 0,
            end_frame: 100,
            index: 2,
        };

        let time = SplitMode::TimeRange {
            start: 2.5,
            end: 10.0,
        };
        assert_eq!(entry_name("tone", &time, &range), "tone_2.5-10.wav");

        let split = SplitMode::EvenSplit { count: 5 };
        assert_eq!(entry_name("tone", &split, &range), "tone_3.wav");
    }
}
