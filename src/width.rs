//! Width-ratio computation for the focused window.
//!
//! A window's width is expressed as a fraction of its monitor's work area.
//! Three modes pick the next ratio:
//!
//! | Mode           | New ratio                                                        |
//! |----------------|------------------------------------------------------------------|
//! | `Set(r)`       | `r` if `0 < r ≤ 1`, otherwise the preferred ratio                |
//! | `Toggle(a, b)` | `b` if the current ratio is within the tolerance of `a`, else `a` |
//! | `Cycle`        | the preset after the one closest to the current ratio (wrapping) |
//!
//! Toggle and cycle read the current ratio from the window's geometry
//! rather than remembering what they did last, so a manual resize in
//! between is picked up.
//!
//! The resulting frame is centred horizontally in the work area and keeps
//! its height.  Its vertical position is kept, but clamped so the frame
//! starts no higher than the top of the work area and, when it fits, ends
//! no lower than the bottom.
//!
//! Toggle ratios are not range-checked.  Pixel values are computed in `f64`
//! and saturate into `i32`, so even an absurd ratio yields a well-defined
//! rect.

use crate::command::Rect;
use crate::util::round_half_up;
use serde::{Deserialize, Serialize};

/// How the new width ratio is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidthMode {
    Cycle,
    Set(f64),
    Toggle(f64, f64),
}

/// Why a preset list was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PresetError {
    #[error("preset list is empty")]
    Empty,
    #[error("preset {0} is outside (0, 1]")]
    OutOfRange(f64),
    #[error("presets must be strictly increasing ({0} is followed by {1})")]
    NotIncreasing(f64, f64),
    #[error("last preset must be 1.0, got {0}")]
    LastNotFull(f64),
}

/// Ordered width ratios visited by [`WidthMode::Cycle`].
///
/// Strictly increasing, each in `(0, 1]`, ending at `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct WidthPresets(Vec<f64>);

impl WidthPresets {
    pub fn new(ratios: Vec<f64>) -> Result<Self, PresetError> {
        let last = *ratios.last().ok_or(PresetError::Empty)?;
        if let Some(bad) = ratios.iter().find(|r| !(**r > 0.0 && **r <= 1.0)) {
            return Err(PresetError::OutOfRange(*bad));
        }
        if let Some(w) = ratios.windows(2).find(|w| w[0] >= w[1]) {
            return Err(PresetError::NotIncreasing(w[0], w[1]));
        }
        if last != 1.0 {
            return Err(PresetError::LastNotFull(last));
        }
        Ok(Self(ratios))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// The preset following the one closest to `current`, wrapping to the
    /// first after the last.  Ties go to the earlier preset.
    pub fn next_after(&self, current: f64) -> f64 {
        let mut closest = 0;
        let mut best = f64::INFINITY;
        for (i, preset) in self.0.iter().enumerate() {
            let d = (current - preset).abs();
            if d < best {
                best = d;
                closest = i;
            }
        }
        self.0[(closest + 1) % self.0.len()]
    }
}

impl Default for WidthPresets {
    fn default() -> Self {
        Self(vec![0.30, 0.45, 0.60, 0.75, 1.0])
    }
}

impl TryFrom<Vec<f64>> for WidthPresets {
    type Error = PresetError;

    fn try_from(v: Vec<f64>) -> Result<Self, PresetError> {
        Self::new(v)
    }
}

impl From<WidthPresets> for Vec<f64> {
    fn from(p: WidthPresets) -> Self {
        p.0
    }
}

/// Width-ratio tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidthConfig {
    /// Ratios visited by `ColumnWidthCycle`.  Default: `[0.3, 0.45, 0.6, 0.75, 1.0]`.
    pub presets: WidthPresets,
    /// Fallback for an out-of-range `ColumnWidthSet`.  Default: `0.8`.
    pub preferred: f64,
    /// How close the current ratio must be to `a` for `ColumnWidthToggle`
    /// to switch to `b`.  Default: `0.05`.
    pub toggle_tolerance: f64,
}

impl Default for WidthConfig {
    fn default() -> Self {
        Self {
            presets: WidthPresets::default(),
            preferred: 0.8,
            toggle_tolerance: 0.05,
        }
    }
}

/// Current width of `frame` as a fraction of the work area width.
pub fn current_ratio(frame: Rect, work_area: Rect) -> f64 {
    frame.width as f64 / work_area.width as f64
}

/// Pick the new ratio for `mode` given the window's current ratio.
pub fn select_ratio(mode: WidthMode, current: f64, config: &WidthConfig) -> f64 {
    match mode {
        WidthMode::Set(r) if r.is_finite() && r > 0.0 && r <= 1.0 => r,
        WidthMode::Set(_) => config.preferred,
        WidthMode::Toggle(a, b) => {
            if (current - a).abs() <= config.toggle_tolerance {
                b
            } else {
                a
            }
        }
        WidthMode::Cycle => config.presets.next_after(current),
    }
}

/// Frame for a window resized to `ratio` of the work area width.
///
/// A NaN ratio gives a zero width; values out of `i32` range saturate.
pub fn frame_for_ratio(ratio: f64, frame: Rect, work_area: Rect) -> Rect {
    // `as i32` saturates and maps NaN to 0.
    let width = round_half_up(work_area.width as f64 * ratio) as i32;
    let height = frame.height;
    let slack = work_area.width as f64 - width as f64;
    let x = (work_area.x as f64 + round_half_up(slack / 2.0)) as i32;
    let max_y = work_area.y.saturating_add(work_area.height.saturating_sub(height).max(0));
    let y = frame.y.min(max_y).max(work_area.y);
    Rect { x, y, width, height }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WA: Rect = Rect {
        x: 0,
        y: 32,
        width: 2000,
        height: 1000,
    };

    fn frame_with_width(width: i32) -> Rect {
        Rect::new(100, 200, width, 600)
    }

    #[test]
    fn set_uses_valid_ratio() {
        let cfg = WidthConfig::default();
        assert_eq!(select_ratio(WidthMode::Set(0.6), 0.3, &cfg), 0.6);
        assert_eq!(select_ratio(WidthMode::Set(1.0), 0.3, &cfg), 1.0);
    }

    #[test]
    fn set_out_of_range_falls_back_to_preferred() {
        let cfg = WidthConfig::default();
        for bad in [1.5, 0.0, -0.2, f64::NAN, f64::INFINITY] {
            assert_eq!(select_ratio(WidthMode::Set(bad), 0.3, &cfg), 0.8, "{}", bad);
        }
    }

    #[test]
    fn toggle_flips_between_two_states() {
        let cfg = WidthConfig::default();
        let mode = WidthMode::Toggle(0.5, 0.9);
        assert_eq!(select_ratio(mode, 0.5, &cfg), 0.9);
        assert_eq!(select_ratio(mode, 0.52, &cfg), 0.9);
        assert_eq!(select_ratio(mode, 0.9, &cfg), 0.5);
        assert_eq!(select_ratio(mode, 0.3, &cfg), 0.5);
    }

    #[test]
    fn toggle_round_trip_through_geometry() {
        let cfg = WidthConfig::default();
        let mode = WidthMode::Toggle(0.5, 0.9);
        let start = frame_with_width(1000);

        let r1 = select_ratio(mode, current_ratio(start, WA), &cfg);
        let f1 = frame_for_ratio(r1, start, WA);
        assert_eq!(r1, 0.9);
        assert_eq!(f1.width, 1800);

        let r2 = select_ratio(mode, current_ratio(f1, WA), &cfg);
        let f2 = frame_for_ratio(r2, f1, WA);
        assert_eq!(r2, 0.5);
        assert_eq!(f2.width, start.width);
    }

    #[test]
    fn cycle_steps_to_next_preset() {
        let cfg = WidthConfig::default();
        assert_eq!(select_ratio(WidthMode::Cycle, 0.3, &cfg), 0.45);
        assert_eq!(select_ratio(WidthMode::Cycle, 0.47, &cfg), 0.60);
        assert_eq!(select_ratio(WidthMode::Cycle, 0.8, &cfg), 1.0);
    }

    #[test]
    fn cycle_wraps_from_full_width() {
        let cfg = WidthConfig::default();
        assert_eq!(select_ratio(WidthMode::Cycle, 1.0, &cfg), 0.30);
        assert_eq!(select_ratio(WidthMode::Cycle, 0.95, &cfg), 0.30);
    }

    #[test]
    fn cycle_tie_goes_to_earlier_preset() {
        let presets = WidthPresets::new(vec![0.25, 0.5, 1.0]).unwrap();
        // 0.375 is equidistant from 0.25 and 0.5; the earlier one wins.
        assert_eq!(presets.next_after(0.375), 0.5);
    }

    #[test]
    fn frame_is_centred_and_keeps_height() {
        let f = frame_for_ratio(0.45, frame_with_width(500), WA);
        assert_eq!(f, Rect::new(550, 200, 900, 600));
    }

    #[test]
    fn frame_respects_work_area_offset() {
        let wa = Rect::new(1920, 30, 2560, 1410);
        let f = frame_for_ratio(0.3, Rect::new(2000, 100, 400, 800), wa);
        assert_eq!(f.width, 768);
        assert_eq!(f.x, 1920 + 896);
        assert_eq!(f.y, 100);
    }

    #[test]
    fn frame_y_is_clamped_into_work_area() {
        let above = frame_for_ratio(0.6, Rect::new(0, 0, 500, 600), WA);
        assert_eq!(above.y, 32);
        let below = frame_for_ratio(0.6, Rect::new(0, 900, 500, 600), WA);
        assert_eq!(below.y, 32 + 400);
        let too_tall = frame_for_ratio(0.6, Rect::new(0, 500, 500, 1200), WA);
        assert_eq!(too_tall.y, 32);
    }

    #[test]
    fn odd_remainder_rounds_half_up() {
        let wa = Rect::new(0, 0, 1001, 800);
        let f = frame_for_ratio(1.0, Rect::new(0, 0, 10, 10), wa);
        assert_eq!((f.x, f.width), (0, 1001));
        let f = frame_for_ratio(0.5, Rect::new(0, 0, 10, 10), wa);
        // 1001 * 0.5 = 500.5 -> 501; (1001 - 501) / 2 = 250.
        assert_eq!((f.x, f.width), (250, 501));
    }

    #[test]
    fn toggle_with_huge_negative_ratio_saturates() {
        let cfg = WidthConfig::default();
        let start = frame_with_width(1000);
        let r = select_ratio(WidthMode::Toggle(-1e10, 0.5), current_ratio(start, WA), &cfg);
        assert_eq!(r, -1e10);
        let f = frame_for_ratio(r, start, WA);
        assert_eq!(f.width, i32::MIN);
        // (2000 + 2^31) / 2
        assert_eq!(f.x, 1_073_742_824);
        assert_eq!((f.y, f.height), (200, 600));
    }

    #[test]
    fn toggle_with_nan_ratio_gives_zero_width() {
        let cfg = WidthConfig::default();
        let start = frame_with_width(1000);
        let r = select_ratio(WidthMode::Toggle(f64::NAN, 0.5), current_ratio(start, WA), &cfg);
        assert!(r.is_nan());
        assert_eq!(frame_for_ratio(r, start, WA), Rect::new(1000, 200, 0, 600));
    }

    #[test]
    fn extreme_ratios_never_overflow() {
        let wa = Rect::new(i32::MAX - 10, i32::MAX - 10, 2000, 1000);
        for ratio in [f64::INFINITY, f64::NEG_INFINITY, 1e300, -1e300, f64::NAN] {
            let _ = frame_for_ratio(ratio, Rect::new(0, 0, 100, 100), wa);
            let _ = frame_for_ratio(ratio, Rect::new(0, 0, 100, 100), WA);
        }
    }

    #[test]
    fn presets_are_validated() {
        assert_eq!(WidthPresets::new(vec![]), Err(PresetError::Empty));
        assert_eq!(WidthPresets::new(vec![0.5, 1.2]), Err(PresetError::OutOfRange(1.2)));
        assert_eq!(WidthPresets::new(vec![0.0, 1.0]), Err(PresetError::OutOfRange(0.0)));
        assert_eq!(
            WidthPresets::new(vec![0.6, 0.5, 1.0]),
            Err(PresetError::NotIncreasing(0.6, 0.5))
        );
        assert_eq!(WidthPresets::new(vec![0.3, 0.9]), Err(PresetError::LastNotFull(0.9)));
        assert!(WidthPresets::new(vec![1.0]).is_ok());
    }

    #[test]
    fn config_rejects_bad_presets() {
        let json = r#"{ "presets": [0.5, 0.4, 1.0] }"#;
        assert!(serde_json::from_str::<WidthConfig>(json).is_err());
        let json = r#"{ "presets": [0.5, 1.0], "preferred": 0.7 }"#;
        let cfg: WidthConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.presets.as_slice(), &[0.5, 1.0]);
        assert_eq!(cfg.preferred, 0.7);
        assert_eq!(cfg.toggle_tolerance, 0.05);
    }
}
