// ============================================================================
// scrubber-core/src/remediation/video.rs
// ============================================================================
//
// VIDEO REMEDIATION: Blank overlays and cut+concat over censored segments
//
// Every segment resolves to a mode in three tiers:
//   1. the segment's own override, when it parses
//   2. the strongest category mode among its labels (None < Blank < Cut)
//   3. the global mode
//
// Blanking draws an opaque box over the frame while the segment plays and
// keeps the timeline intact. Cutting removes the segment from the timeline by
// extracting the kept intervals and concatenating them. When both apply,
// blanking runs first so its timestamps still refer to the original timeline.

use crate::config::VideoRemediationConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{MediaTransformer, VideoFilterChain};
use crate::media::VideoGeometry;
use crate::segments::Segment;
use crate::temp_files;
use crate::utils::extension_or;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Video remediation mode, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VideoMode {
    None,
    Blank,
    Cut,
}

impl FromStr for VideoMode {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(VideoMode::None),
            "blank" => Ok(VideoMode::Blank),
            "cut" => Ok(VideoMode::Cut),
            other => Err(CoreError::Config(format!(
                "invalid video mode '{other}' (expected blank, cut or none)"
            ))),
        }
    }
}

impl fmt::Display for VideoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoMode::None => write!(f, "none"),
            VideoMode::Blank => write!(f, "blank"),
            VideoMode::Cut => write!(f, "cut"),
        }
    }
}

/// A `[start, end)` span of the timeline in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl From<&Segment> for TimeRange {
    fn from(segment: &Segment) -> Self {
        Self::new(segment.start_time(), segment.end_time())
    }
}

/// Segments grouped by their resolved mode. `None` segments are dropped.
#[derive(Debug, Default)]
pub struct ModeGroups<'a> {
    pub cut: Vec<&'a Segment>,
    pub blank: Vec<&'a Segment>,
}

impl ModeGroups<'_> {
    pub fn is_empty(&self) -> bool {
        self.cut.is_empty() && self.blank.is_empty()
    }
}

/// What [`VideoRemediator::remediate`] did to the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoOutcome {
    /// Nothing to do; no output was written
    Unchanged,
    Blanked,
    Cut,
    BlankedAndCut,
}

impl VideoOutcome {
    /// Whether an output file was produced.
    pub fn wrote_output(self) -> bool {
        self != VideoOutcome::Unchanged
    }
}

/// Applies blank or cut remediation to a video file.
#[derive(Debug, Clone)]
pub struct VideoRemediator {
    enabled: bool,
    mode: VideoMode,
    category_modes: BTreeMap<String, VideoMode>,
    blank_color: String,
}

impl VideoRemediator {
    /// Validates `config` and builds the remediator.
    ///
    /// Every mode must be blank, cut or none, and `blank_color` must be a 3-
    /// or 6-digit hex colour with an optional leading `#`.
    pub fn new(config: &VideoRemediationConfig) -> CoreResult<Self> {
        let mode = config.mode.parse::<VideoMode>()?;
        let category_modes = config
            .category_modes
            .iter()
            .map(|(label, raw)| {
                raw.parse::<VideoMode>()
                    .map(|mode| (label.clone(), mode))
                    .map_err(|e| CoreError::Config(format!("category '{label}': {e}")))
            })
            .collect::<CoreResult<BTreeMap<_, _>>>()?;
        let blank_color = normalize_hex_color(&config.blank_color)?;

        Ok(Self {
            enabled: config.enabled,
            mode,
            category_modes,
            blank_color,
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn mode(&self) -> VideoMode {
        self.mode
    }

    /// Normalized six-digit colour, without prefix.
    pub fn blank_color(&self) -> &str {
        &self.blank_color
    }

    /// Resolves the mode applied to `segment`.
    pub fn resolve_segment_mode(&self, segment: &Segment) -> VideoMode {
        if let Some(raw) = segment.video_mode() {
            match raw.parse::<VideoMode>() {
                Ok(mode) => return mode,
                Err(_) => log::warn!(
                    "Ignoring invalid video mode override '{}' on segment at {:.3}s",
                    raw,
                    segment.start_time()
                ),
            }
        }

        segment
            .labels()
            .iter()
            .filter_map(|label| self.category_modes.get(label).copied())
            .max()
            .unwrap_or(self.mode)
    }

    /// Drops segments marked `allow`.
    pub fn filter_allowed_segments<'a>(&self, segments: &'a [Segment]) -> Vec<&'a Segment> {
        segments.iter().filter(|segment| !segment.allow()).collect()
    }

    /// Splits segments into cut and blank groups by resolved mode.
    ///
    /// Allowed segments are dropped before resolution, so `allow` outranks
    /// any override. Zero-length segments cover no frames and are dropped too.
    pub fn group_segments_by_mode<'a>(&self, segments: &'a [Segment]) -> ModeGroups<'a> {
        let mut groups = ModeGroups::default();
        for segment in self.filter_allowed_segments(segments) {
            if segment.end_time() <= segment.start_time() {
                log::debug!(
                    "Skipping zero-length segment at {:.3}s",
                    segment.start_time()
                );
                continue;
            }
            match self.resolve_segment_mode(segment) {
                VideoMode::Cut => groups.cut.push(segment),
                VideoMode::Blank => groups.blank.push(segment),
                VideoMode::None => {}
            }
        }
        groups
    }

    /// Builds a drawbox filter chain covering the frame during each segment.
    ///
    /// Returns `None` when there are no segments.
    pub fn build_blank_filter_chain(
        &self,
        segments: &[&Segment],
        width: u32,
        height: u32,
    ) -> Option<String> {
        let drawbox = format!(
            "drawbox=x=0:y=0:w={width}:h={height}:color=0x{}:t=fill",
            self.blank_color
        );
        segments
            .iter()
            .filter(|segment| segment.end_time() > segment.start_time())
            .fold(VideoFilterChain::new(), |chain, segment| {
                chain.add_timed_filter(&drawbox, segment.start_time(), segment.end_time())
            })
            .build()
    }

    /// Removes `cut_ranges` from `input`, writing the kept timeline to `output`.
    ///
    /// Each kept interval is extracted into `temp_dir` and the clips are
    /// concatenated in order. A single kept interval is extracted straight to
    /// `output`. Keeping nothing is a [`CoreError::FullyCensored`] error.
    pub fn apply_cut_mode<T: MediaTransformer>(
        &self,
        transformer: &T,
        input: &Path,
        output: &Path,
        cut_ranges: &[TimeRange],
        duration: f64,
        temp_dir: &Path,
    ) -> CoreResult<()> {
        let kept = extract_non_censored_segments(cut_ranges, duration);
        if kept.is_empty() {
            return Err(CoreError::FullyCensored { duration });
        }

        log::info!(
            "Cutting {} range(s), keeping {} interval(s)",
            cut_ranges.len(),
            kept.len()
        );

        if let [only] = kept.as_slice() {
            return transformer.extract_subclip(input, only.start, only.end, output);
        }

        let mut clips: Vec<PathBuf> = Vec::with_capacity(kept.len());
        let result = extract_and_concat(transformer, input, output, &kept, temp_dir, &mut clips);

        for clip in &clips {
            if clip.exists() {
                if let Err(e) = fs::remove_file(clip) {
                    log::warn!("Failed to remove clip {}: {}", clip.display(), e);
                }
            }
        }
        result
    }

    /// Applies blank then cut remediation to `input`, writing `output`.
    ///
    /// Allowed segments are ignored. When nothing resolves to blank or cut,
    /// or remediation is disabled, no output is written and
    /// [`VideoOutcome::Unchanged`] is returned.
    pub fn remediate<T: MediaTransformer>(
        &self,
        transformer: &T,
        input: &Path,
        output: &Path,
        segments: &[Segment],
        geometry: VideoGeometry,
        temp_dir: &Path,
    ) -> CoreResult<VideoOutcome> {
        if !self.enabled {
            log::debug!("Video remediation disabled");
            return Ok(VideoOutcome::Unchanged);
        }

        let groups = self.group_segments_by_mode(segments);
        if groups.is_empty() {
            log::info!("No segments require video remediation");
            return Ok(VideoOutcome::Unchanged);
        }

        log::info!(
            "Video remediation: {} blank, {} cut segment(s)",
            groups.blank.len(),
            groups.cut.len()
        );

        let blank_chain =
            self.build_blank_filter_chain(&groups.blank, geometry.width, geometry.height);
        let cut_ranges: Vec<TimeRange> = groups.cut.iter().map(|s| TimeRange::from(*s)).collect();

        match (blank_chain, cut_ranges.is_empty()) {
            (Some(chain), true) => {
                transformer.apply_filter(input, &chain, output)?;
                Ok(VideoOutcome::Blanked)
            }
            (None, false) => {
                self.apply_cut_mode(transformer, input, output, &cut_ranges, geometry.duration, temp_dir)?;
                Ok(VideoOutcome::Cut)
            }
            (Some(chain), false) => {
                let extension = extension_or(output, "mp4");
                let blanked = temp_files::create_temp_file_path(temp_dir, "blanked", &extension);
                transformer.apply_filter(input, &chain, &blanked)?;
                let result = self.apply_cut_mode(
                    transformer,
                    &blanked,
                    output,
                    &cut_ranges,
                    geometry.duration,
                    temp_dir,
                );
                if let Err(e) = fs::remove_file(&blanked) {
                    log::warn!("Failed to remove {}: {}", blanked.display(), e);
                }
                result?;
                Ok(VideoOutcome::BlankedAndCut)
            }
            (None, true) => Ok(VideoOutcome::Unchanged),
        }
    }
}

fn extract_and_concat<T: MediaTransformer>(
    transformer: &T,
    input: &Path,
    output: &Path,
    kept: &[TimeRange],
    temp_dir: &Path,
    clips: &mut Vec<PathBuf>,
) -> CoreResult<()> {
    let extension = extension_or(output, "mp4");
    for range in kept {
        let clip = temp_files::create_temp_file_path(temp_dir, "kept", &extension);
        clips.push(clip.clone());
        transformer.extract_subclip(input, range.start, range.end, &clip)?;
    }
    transformer.concat(clips, output)
}

/// Returns the parts of `[0, duration)` not covered by `ranges`.
///
/// Ranges are sorted first and may overlap; empty ranges are ignored.
pub fn extract_non_censored_segments(ranges: &[TimeRange], duration: f64) -> Vec<TimeRange> {
    let mut sorted: Vec<TimeRange> = ranges
        .iter()
        .filter(|r| r.end > r.start)
        .copied()
        .collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut kept = Vec::new();
    let mut cursor = 0.0_f64;
    for range in sorted {
        let start = range.start.clamp(0.0, duration);
        if start > cursor {
            kept.push(TimeRange::new(cursor, start));
        }
        cursor = cursor.max(range.end.min(duration));
    }
    if cursor < duration {
        kept.push(TimeRange::new(cursor, duration));
    }
    kept
}

fn normalize_hex_color(raw: &str) -> CoreResult<String> {
    let digits = raw.trim().trim_start_matches('#');
    let valid = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(CoreError::Config(format!(
            "invalid blank colour '{raw}' (expected 3- or 6-digit hex)"
        )));
    }

    let expanded = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect::<String>()
    } else {
        digits.to_string()
    };
    Ok(expanded.to_ascii_uppercase())
}
