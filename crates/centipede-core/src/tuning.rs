//! Keyboard tuning of live parameters. Uppercase nudges a value up,
//! lowercase nudges it down; every value has a positive floor.

use crate::config::{SplineConfig, TrailConfig, MAX_SEGMENTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tunable {
    Segments,
    Frequency,
    Amplitude,
    SegmentLength,
    LegSpacing,
    Speed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Up,
    Down,
}

/// `N` segments, `F` frequency, `A` amplitude, `L` segment length,
/// `G` leg spacing, `V` speed.
pub fn binding(key: char) -> Option<(Tunable, Nudge)> {
    let tunable = match key.to_ascii_lowercase() {
        'n' => Tunable::Segments,
        'f' => Tunable::Frequency,
        'a' => Tunable::Amplitude,
        'l' => Tunable::SegmentLength,
        'g' => Tunable::LegSpacing,
        'v' => Tunable::Speed,
        _ => return None,
    };
    let nudge = if key.is_ascii_uppercase() {
        Nudge::Up
    } else {
        Nudge::Down
    };
    Some((tunable, nudge))
}

/// Returns whether the value moved.
fn nudge_f32(value: &mut f32, step: f32, floor: f32, nudge: Nudge) -> bool {
    let next = match nudge {
        Nudge::Up => *value + step,
        Nudge::Down => (*value - step).max(floor),
    };
    let moved = next != *value;
    *value = next;
    moved
}

fn nudge_usize(value: &mut usize, step: usize, floor: usize, ceiling: usize, nudge: Nudge) -> bool {
    let next = match nudge {
        Nudge::Up => value.saturating_add(step).min(ceiling),
        Nudge::Down => value.saturating_sub(step).max(floor),
    };
    let moved = next != *value;
    *value = next;
    moved
}

impl TrailConfig {
    /// Returns false when the value is already at its floor or ceiling.
    pub fn nudge(&mut self, tunable: Tunable, nudge: Nudge) -> bool {
        match tunable {
            Tunable::Segments => nudge_usize(&mut self.num_segments, 250, 50, MAX_SEGMENTS, nudge),
            Tunable::Frequency => nudge_f32(&mut self.frequency, 0.005, 0.001, nudge),
            Tunable::Amplitude => nudge_f32(&mut self.amplitude, 0.1, 0.1, nudge),
            Tunable::SegmentLength => nudge_f32(&mut self.segment_length, 5.0, 5.0, nudge),
            Tunable::LegSpacing => nudge_usize(&mut self.leg_spacing, 1, 1, usize::MAX, nudge),
            Tunable::Speed => nudge_f32(&mut self.speed, 0.25, 0.25, nudge),
        }
    }
}

impl SplineConfig {
    /// Only body shape applies to the path walker; other tunables and values
    /// already at a bound return false.
    pub fn nudge(&mut self, tunable: Tunable, nudge: Nudge) -> bool {
        match tunable {
            Tunable::Segments => nudge_usize(&mut self.segments, 4, 8, MAX_SEGMENTS, nudge),
            Tunable::SegmentLength => nudge_f32(&mut self.segment_length, 2.0, 2.0, nudge),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_selects_direction() {
        assert_eq!(binding('V'), Some((Tunable::Speed, Nudge::Up)));
        assert_eq!(binding('v'), Some((Tunable::Speed, Nudge::Down)));
        assert_eq!(binding('G'), Some((Tunable::LegSpacing, Nudge::Up)));
        assert_eq!(binding('x'), None);
        assert_eq!(binding(' '), None);
    }

    #[test]
    fn trail_values_never_reach_zero() {
        let mut trail = TrailConfig::default();
        for (tunable, _) in "nfalgv".chars().filter_map(binding) {
            for _ in 0..1000 {
                trail.nudge(tunable, Nudge::Down);
            }
        }
        assert_eq!(trail.num_segments, 50);
        assert!(trail.frequency > 0.0);
        assert!(trail.amplitude > 0.0);
        assert!(trail.segment_length > 0.0);
        assert_eq!(trail.leg_spacing, 1);
        assert!(trail.speed > 0.0);
        trail.validate().unwrap();
    }

    #[test]
    fn nudge_at_floor_reports_no_change() {
        let mut trail = TrailConfig {
            speed: 0.25,
            leg_spacing: 1,
            ..TrailConfig::default()
        };
        assert!(!trail.nudge(Tunable::Speed, Nudge::Down));
        assert!(!trail.nudge(Tunable::LegSpacing, Nudge::Down));
        assert!(trail.nudge(Tunable::Speed, Nudge::Up));
        assert_eq!(trail.speed, 0.5);

        let mut spline = SplineConfig {
            segments: 8,
            ..SplineConfig::default()
        };
        assert!(!spline.nudge(Tunable::Segments, Nudge::Down));
        assert_eq!(spline.segments, 8);
    }

    #[test]
    fn spline_ignores_trail_only_knobs() {
        let mut spline = SplineConfig::default();
        assert!(!spline.nudge(Tunable::Speed, Nudge::Up));
        assert!(spline.nudge(Tunable::Segments, Nudge::Up));
        assert_eq!(spline.segments, 52);
        for _ in 0..100 {
            spline.nudge(Tunable::Segments, Nudge::Down);
        }
        assert_eq!(spline.segments, 8);
    }
}
