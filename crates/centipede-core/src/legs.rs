//! Procedural legs: a root, joint and tip chained off one body segment.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::math::{normalize_or, rotate};

/// Left then right.
const SIDES: [f32; 2] = [-1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegPose {
    pub root: Vec2,
    pub joint: Vec2,
    pub tip: Vec2,
}

/// Oscillator constants for the small-jitter legs of the trail sketches.
///
/// The root swings on a slow sin/cos pair of global time, the joint on a
/// faster one phase-shifted by spine index, and the tip drifts on rates
/// scaled by the index itself. The x and y tip rates differ between variants
/// and are kept as separate knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterLegs {
    pub time_scale: f32,
    pub root_reach: f32,
    pub root_rate: f32,
    pub joint_rate: f32,
    pub joint_phase: f32,
    pub tip_reach: f32,
    pub tip_rate_x: f32,
    pub tip_rate_y: f32,
}

impl Default for JitterLegs {
    fn default() -> Self {
        Self {
            time_scale: 0.01,
            root_reach: 2.0,
            root_rate: 0.25,
            joint_rate: 0.5,
            joint_phase: FRAC_PI_4,
            tip_reach: 1.2,
            tip_rate_x: 0.0001,
            tip_rate_y: 0.0005,
        }
    }
}

/// Walking gait for the spline crawler: alternating swing per segment,
/// lengths shaped by the body envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitLegs {
    /// Radians of gait phase per time step.
    pub rate: f32,
    /// Radians of gait phase between neighbouring segments.
    pub phase_step: f32,
    pub swing: f32,
    pub lift: f32,
    pub knee_bend: f32,
    pub root_scale: f32,
    pub femur_scale: f32,
    pub tibia_scale: f32,
}

impl Default for GaitLegs {
    fn default() -> Self {
        Self {
            rate: 0.12,
            phase_step: 0.7,
            swing: 0.45,
            lift: 0.3,
            knee_bend: 0.7,
            root_scale: 0.2,
            femur_scale: 0.35,
            tibia_scale: 0.5,
        }
    }
}

impl GaitLegs {
    /// The two phase-shifted swing angles for segment `index` at `cursor`.
    pub fn angles(&self, cursor: usize, index: usize) -> (f32, f32) {
        let phase = cursor as f32 * self.rate + index as f32 * self.phase_step;
        (phase.sin() * self.swing, (phase + FRAC_PI_2).sin() * self.lift)
    }
}

/// Leg size along a body of `segments`: zero at both ends, 3 at the middle.
pub fn envelope(index: usize, segments: usize) -> f32 {
    let half = segments as f32 / 2.0;
    let u = (index as f32 - half) / half;
    3.0 * (1.0 - u * u).max(0.0).sqrt()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LegProfile {
    Jitter(JitterLegs),
    Gait(GaitLegs),
}

impl Default for LegProfile {
    fn default() -> Self {
        LegProfile::Jitter(JitterLegs::default())
    }
}

/// Per-segment oscillator inputs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegPhase {
    /// Global frame time, read by jitter legs.
    pub time: f32,
    pub index: usize,
    /// Envelope and swing angles, read by gait legs.
    pub lambda: f32,
    pub angle1: f32,
    pub angle2: f32,
}

impl LegPhase {
    pub fn at_time(time: f32, index: usize) -> Self {
        Self {
            time,
            index,
            lambda: 1.0,
            angle1: 0.0,
            angle2: 0.0,
        }
    }

    pub fn gait(index: usize, lambda: f32, (angle1, angle2): (f32, f32)) -> Self {
        Self {
            time: 0.0,
            index,
            lambda,
            angle1,
            angle2,
        }
    }
}

impl LegProfile {
    /// Both legs of the segment anchored at `anchor` moving along the unit `heading`.
    pub fn articulate(
        &self,
        anchor: Vec2,
        heading: Vec2,
        segment_length: f32,
        phase: &LegPhase,
    ) -> [LegPose; 2] {
        let perp = heading.perp();
        match self {
            LegProfile::Jitter(legs) => jitter(legs, anchor, perp, segment_length, phase),
            LegProfile::Gait(legs) => gait(legs, anchor, perp, segment_length, phase),
        }
    }
}

/// Legs for the spine point `center`, oriented by the step from `prev`.
pub fn leg_pose(
    profile: &LegProfile,
    center: Vec2,
    prev: Vec2,
    segment_length: f32,
    phase: &LegPhase,
) -> [LegPose; 2] {
    let heading = normalize_or(center - prev, Vec2::X);
    profile.articulate(center, heading, segment_length, phase)
}

fn jitter(
    legs: &JitterLegs,
    anchor: Vec2,
    perp: Vec2,
    segment_length: f32,
    phase: &LegPhase,
) -> [LegPose; 2] {
    let t = phase.time * legs.time_scale;
    let i = phase.index as f32;
    let sway = t * legs.root_rate;
    let knee = t * legs.joint_rate + legs.joint_phase * i;

    SIDES.map(|side| {
        let reach = side * segment_length * legs.root_reach;
        let root = anchor + perp * Vec2::new(reach * sway.sin(), reach * sway.cos());
        let joint = root + perp * Vec2::new(knee.sin(), knee.cos());
        let tip_reach = reach * legs.tip_reach;
        let tip = joint
            + perp
                * Vec2::new(
                    tip_reach * (t * legs.tip_rate_x * i).sin(),
                    tip_reach * (t * legs.tip_rate_y * i).cos(),
                );
        LegPose { root, joint, tip }
    })
}

fn gait(
    legs: &GaitLegs,
    anchor: Vec2,
    perp: Vec2,
    segment_length: f32,
    phase: &LegPhase,
) -> [LegPose; 2] {
    let alternate = if phase.index % 2 == 0 { 1.0 } else { -1.0 };
    let scale = segment_length * phase.lambda;

    SIDES.map(|side| {
        let outward = rotate(perp * side, alternate * phase.angle1);
        let root = anchor + outward * scale * legs.root_scale;
        let femur = rotate(outward, side * (legs.knee_bend + alternate * phase.angle2));
        let joint = root + femur * scale * legs.femur_scale;
        let tibia = rotate(femur, side * legs.knee_bend);
        let tip = joint + tibia * scale * legs.tibia_scale;
        LegPose { root, joint, tip }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEGMENT: f32 = 40.0;

    fn profiles() -> [LegProfile; 2] {
        [
            LegProfile::Jitter(JitterLegs::default()),
            LegProfile::Gait(GaitLegs::default()),
        ]
    }

    fn phase_for(profile: &LegProfile, frame: usize, index: usize) -> LegPhase {
        match profile {
            LegProfile::Jitter(_) => LegPhase::at_time(frame as f32, index),
            LegProfile::Gait(gait) => {
                LegPhase::gait(index, envelope(index, 48), gait.angles(frame, index))
            }
        }
    }

    #[test]
    fn straight_segment_roots_are_symmetric() {
        let center = Vec2::new(120.0, 80.0);
        let prev = Vec2::new(110.0, 80.0);
        for profile in profiles() {
            for frame in [0, 7, 130, 2048] {
                for index in [1, 2, 15, 40] {
                    let phase = phase_for(&profile, frame, index);
                    let [left, right] = leg_pose(&profile, center, prev, SEGMENT, &phase);
                    let l = left.root - center;
                    let r = right.root - center;
                    assert!(
                        (l.y + r.y).abs() < 1e-3,
                        "{profile:?} frame {frame}: {l:?} vs {r:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn legs_stay_within_a_few_segments() {
        let center = Vec2::new(0.0, 0.0);
        let prev = Vec2::new(-3.0, 4.0);
        for profile in profiles() {
            for frame in 0..2000 {
                for index in (1..46).step_by(5) {
                    let phase = phase_for(&profile, frame, index);
                    for pose in leg_pose(&profile, center, prev, SEGMENT, &phase) {
                        assert!(pose.tip.distance(center) <= 6.0 * SEGMENT);
                        assert!(pose.root.distance(center) <= 3.0 * SEGMENT);
                    }
                }
            }
        }
    }

    #[test]
    fn legs_move_smoothly_between_frames() {
        let center = Vec2::new(50.0, 50.0);
        let prev = Vec2::new(50.0, 40.0);
        for profile in profiles() {
            let index = 17;
            let pose_at = |frame| {
                leg_pose(&profile, center, prev, SEGMENT, &phase_for(&profile, frame, index))
            };
            let mut last = pose_at(0);
            for frame in 1..1500 {
                let next = pose_at(frame);
                for (a, b) in last.iter().zip(next.iter()) {
                    assert!(a.tip.distance(b.tip) < 0.3 * SEGMENT);
                }
                last = next;
            }
        }
    }

    #[test]
    fn envelope_peaks_mid_body() {
        assert_eq!(envelope(0, 48), 0.0);
        assert!((envelope(24, 48) - 3.0).abs() < 1e-6);
        assert!(envelope(12, 48) < envelope(20, 48));
        assert!(envelope(47, 48) < 1.0);
    }

    #[test]
    fn gait_alternates_swing_between_neighbours() {
        let profile = LegProfile::Gait(GaitLegs::default());
        let heading = Vec2::X;
        let phase_even = LegPhase::gait(10, 2.0, (0.3, 0.0));
        let phase_odd = LegPhase::gait(11, 2.0, (0.3, 0.0));
        let [_, even] = profile.articulate(Vec2::ZERO, heading, SEGMENT, &phase_even);
        let [_, odd] = profile.articulate(Vec2::ZERO, heading, SEGMENT, &phase_odd);
        assert!(even.root.x * odd.root.x < 0.0);
    }
}
