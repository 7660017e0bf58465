//! Scripted classifier output
//!
//! A scene is a list of segments (face visible or not, hand pose). The
//! simulator renders it at a fixed frame rate with seeded landmark jitter
//! and, optionally, frames where the classifier misses the face.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use studylens_core::{DetectionFrame, HandJoint, HandLandmarks, Point3, Timestamp};

/// What the student's hand is doing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandPose {
    Hidden,
    /// Resting near the bottom of the image
    Lowered,
    Raised,
    /// Classifier returns a truncated landmark set
    Malformed,
}

/// One stretch of the scene
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub duration: Duration,
    pub face: bool,
    pub hand: HandPose,
}

impl Segment {
    pub fn focused(duration: Duration) -> Self {
        Segment {
            duration,
            face: true,
            hand: HandPose::Hidden,
        }
    }

    pub fn away(duration: Duration) -> Self {
        Segment {
            duration,
            face: false,
            hand: HandPose::Hidden,
        }
    }

    pub fn hand_raised(duration: Duration) -> Self {
        Segment {
            duration,
            face: true,
            hand: HandPose::Raised,
        }
    }

    pub fn hand_lowered(duration: Duration) -> Self {
        Segment {
            duration,
            face: true,
            hand: HandPose::Lowered,
        }
    }

    pub fn malformed_hand(duration: Duration) -> Self {
        Segment {
            duration,
            face: true,
            hand: HandPose::Malformed,
        }
    }
}

/// Simulator settings
#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub frame_interval: Duration,
    /// Max landmark displacement per axis (normalized units)
    pub jitter: f32,
    /// Probability that a visible face is not detected (0.0 - 1.0)
    pub face_miss_rate: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            frame_interval: Duration::from_millis(33),
            jitter: 0.01,
            face_miss_rate: 0.0,
        }
    }
}

impl SceneConfig {
    /// Shaky landmarks and occasional missed faces
    pub fn noisy() -> Self {
        SceneConfig {
            frame_interval: Duration::from_millis(33),
            jitter: 0.03,
            face_miss_rate: 0.1,
        }
    }
}

/// Renders segments into detection frames
pub struct FrameSimulator {
    config: SceneConfig,
    rng: StdRng,
    now: Timestamp,
}

impl FrameSimulator {
    pub fn new(config: SceneConfig, seed: u64) -> Self {
        FrameSimulator {
            config,
            rng: StdRng::seed_from_u64(seed),
            now: Timestamp::ZERO,
        }
    }

    /// Start rendering at a given time
    pub fn starting_at(mut self, t: Timestamp) -> Self {
        self.now = t;
        self
    }

    /// Time of the next frame
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Render segments back to back, continuing from the last call
    pub fn render(&mut self, segments: &[Segment]) -> Vec<DetectionFrame> {
        let mut frames = Vec::new();
        for segment in segments {
            let end = self.now + segment.duration;
            while self.now < end {
                frames.push(self.frame(segment));
                self.now = self.now + self.config.frame_interval;
            }
        }
        frames
    }

    fn frame(&mut self, segment: &Segment) -> DetectionFrame {
        let mut frame = DetectionFrame::empty(self.now);

        let missed = self.rng.gen::<f64>() < self.config.face_miss_rate;
        if segment.face && !missed {
            frame = frame.with_face(self.face_mesh());
        }

        match segment.hand {
            HandPose::Hidden => frame,
            HandPose::Lowered => {
                let hand = self.hand(0.85, 0.75);
                frame.with_hand(hand)
            }
            HandPose::Raised => {
                let hand = self.hand(0.3, 0.15);
                frame.with_hand(hand)
            }
            HandPose::Malformed => {
                frame.with_hand(HandLandmarks::new(vec![Point3::planar(0.5, 0.2); 5]))
            }
        }
    }

    fn jitter(&mut self) -> f32 {
        let j = self.config.jitter;
        self.rng.gen_range(-j..=j)
    }

    /// Sparse face outline centered in the image
    fn face_mesh(&mut self) -> Vec<Point3> {
        (0..12)
            .map(|i| {
                let angle = i as f32 / 12.0 * std::f32::consts::TAU;
                let x = 0.5 + 0.12 * angle.cos() + self.jitter();
                let y = 0.45 + 0.16 * angle.sin() + self.jitter();
                Point3::planar(x, y)
            })
            .collect()
    }

    /// 21-point hand with fingers spread between the wrist and `tip_y`
    fn hand(&mut self, wrist_y: f32, tip_y: f32) -> HandLandmarks {
        let mut points = Vec::with_capacity(HandJoint::COUNT);
        points.push(Point3::planar(0.5 + self.jitter(), wrist_y + self.jitter()));

        for joint in 1..HandJoint::COUNT {
            let finger = (joint - 1) / 4;
            let knuckle = ((joint - 1) % 4 + 1) as f32 / 4.0;
            let x = 0.4 + finger as f32 * 0.05 + self.jitter();
            let y = wrist_y + (tip_y - wrist_y) * knuckle + self.jitter();
            points.push(Point3::planar(x, y));
        }
        HandLandmarks::new(points)
    }
}
