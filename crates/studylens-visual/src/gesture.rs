//! Gesture Mode Switch - raise a hand to ask a question
//!
//! Doubt mode follows the edges of the hand-raised signal, not its level:
//! holding a hand up for a hundred frames enters doubt mode once.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use studylens_core::{DetectionFrame, HandJoint, HandLandmarks, StudyResult};

/// Normalized y cutoffs for the hand-raise heuristic
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandRaiseThresholds {
    /// Wrist must be above this for the fingertip rules
    pub wrist_high: f32,
    /// A fingertip above this counts as raised
    pub tip_high: f32,
    /// Wrist must be above this for the relative rule
    pub wrist_relative: f32,
    /// A fingertip this far above the wrist counts as raised
    pub tip_above_wrist: f32,
}

impl Default for HandRaiseThresholds {
    fn default() -> Self {
        HandRaiseThresholds {
            wrist_high: 0.5,
            tip_high: 0.4,
            wrist_relative: 0.6,
            tip_above_wrist: 0.1,
        }
    }
}

/// Is this hand raised? Smaller y is higher in the frame.
pub fn hand_raised(hand: &HandLandmarks, thresholds: &HandRaiseThresholds) -> StudyResult<bool> {
    hand.validate()?;

    let y = |joint: HandJoint| hand.points[joint as usize].y;
    let wrist = y(HandJoint::Wrist);
    let thumb = y(HandJoint::ThumbTip);
    let index = y(HandJoint::IndexTip);
    let middle = y(HandJoint::MiddleTip);
    let pinky = y(HandJoint::PinkyTip);

    let t = thresholds;
    let fingers_up = wrist < t.wrist_high && (middle < t.tip_high || index < t.tip_high);
    let outer_up = wrist < t.wrist_high && (thumb < t.tip_high || pinky < t.tip_high);
    let above_wrist = wrist < t.wrist_relative
        && (middle < wrist - t.tip_above_wrist || index < wrist - t.tip_above_wrist);

    Ok(fingers_up || outer_up || above_wrist)
}

/// State owned by the switch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureState {
    pub hand_raised: bool,
    pub doubt_mode_active: bool,
}

/// Doubt mode edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubtTransition {
    Entered,
    Exited,
}

/// Gesture Mode Switch
#[derive(Debug, Clone, Default)]
pub struct GestureModeSwitch {
    state: GestureState,
    thresholds: HandRaiseThresholds,
    malformed_hands: u64,
}

impl GestureModeSwitch {
    pub fn new() -> Self {
        Self::with_thresholds(HandRaiseThresholds::default())
    }

    pub fn with_thresholds(thresholds: HandRaiseThresholds) -> Self {
        GestureModeSwitch {
            state: GestureState::default(),
            thresholds,
            malformed_hands: 0,
        }
    }

    /// Evaluate hands in one frame and report a doubt-mode edge, if any
    pub fn on_frame(&mut self, frame: &DetectionFrame) -> Option<DoubtTransition> {
        let mut raised = false;
        for hand in &frame.hands {
            match hand_raised(hand, &self.thresholds) {
                Ok(true) => raised = true,
                Ok(false) => {}
                Err(e) => {
                    self.malformed_hands += 1;
                    warn!(timestamp = ?frame.timestamp, "skipping hand: {}", e);
                }
            }
        }

        let was_raised = self.state.hand_raised;
        self.state.hand_raised = raised;

        match (was_raised, raised) {
            (false, true) => self.set_doubt_mode(true),
            (true, false) => self.set_doubt_mode(false),
            _ => None,
        }
    }

    /// Manual override; the hand level is left alone
    pub fn toggle(&mut self) -> DoubtTransition {
        let active = !self.state.doubt_mode_active;
        self.state.doubt_mode_active = active;
        debug!(active, "doubt mode toggled manually");
        if active {
            DoubtTransition::Entered
        } else {
            DoubtTransition::Exited
        }
    }

    /// Clear all gesture state; reports an exit if doubt mode was active
    pub fn reset(&mut self) -> Option<DoubtTransition> {
        let was_active = self.state.doubt_mode_active;
        self.state = GestureState::default();
        was_active.then_some(DoubtTransition::Exited)
    }

    fn set_doubt_mode(&mut self, active: bool) -> Option<DoubtTransition> {
        if self.state.doubt_mode_active == active {
            return None;
        }
        self.state.doubt_mode_active = active;
        debug!(active, "doubt mode edge from hand gesture");
        Some(if active {
            DoubtTransition::Entered
        } else {
            DoubtTransition::Exited
        })
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn hand_raised(&self) -> bool {
        self.state.hand_raised
    }

    pub fn doubt_mode_active(&self) -> bool {
        self.state.doubt_mode_active
    }

    /// Hand sets skipped for having too few landmarks
    pub fn malformed_hands(&self) -> u64 {
        self.malformed_hands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use studylens_core::{Point3, StudyError, Timestamp};

    /// Hand with every joint at `rest_y`, then the five key joints overridden
    fn hand(wrist: f32, thumb: f32, index: f32, middle: f32, pinky: f32) -> HandLandmarks {
        let mut hand = HandLandmarks::new(vec![Point3::planar(0.5, 0.9); HandJoint::COUNT]);
        hand.set_joint(HandJoint::Wrist, Point3::planar(0.5, wrist));
        hand.set_joint(HandJoint::ThumbTip, Point3::planar(0.4, thumb));
        hand.set_joint(HandJoint::IndexTip, Point3::planar(0.45, index));
        hand.set_joint(HandJoint::MiddleTip, Point3::planar(0.5, middle));
        hand.set_joint(HandJoint::PinkyTip, Point3::planar(0.6, pinky));
        hand
    }

    fn raised_hand() -> HandLandmarks {
        hand(0.3, 0.35, 0.25, 0.2, 0.3)
    }

    fn lowered_hand() -> HandLandmarks {
        hand(0.9, 0.88, 0.86, 0.85, 0.87)
    }

    fn frame_with(ms: i64, hands: Vec<HandLandmarks>) -> DetectionFrame {
        DetectionFrame {
            timestamp: Timestamp::from_millis(ms),
            face_landmarks: Vec::new(),
            hands,
        }
    }

    #[test]
    fn test_heuristic_examples() {
        let t = HandRaiseThresholds::default();

        // wrist 0.3, middle tip 0.2
        assert_eq!(hand_raised(&hand(0.3, 0.9, 0.9, 0.2, 0.9), &t), Ok(true));
        // wrist 0.9, middle tip 0.85
        assert_eq!(hand_raised(&hand(0.9, 0.9, 0.9, 0.85, 0.9), &t), Ok(false));
    }

    #[test]
    fn test_heuristic_rules() {
        let t = HandRaiseThresholds::default();

        // Thumb or pinky high with a high wrist
        assert_eq!(hand_raised(&hand(0.45, 0.35, 0.6, 0.6, 0.6), &t), Ok(true));
        assert_eq!(hand_raised(&hand(0.45, 0.6, 0.6, 0.6, 0.39), &t), Ok(true));
        // Relative rule: wrist 0.55, index tip 0.44 (> 0.1 above)
        assert_eq!(hand_raised(&hand(0.55, 0.6, 0.44, 0.6, 0.6), &t), Ok(true));
        // Relative rule fails when the wrist is too low
        assert_eq!(hand_raised(&hand(0.65, 0.6, 0.3, 0.6, 0.6), &t), Ok(false));
        // Fingertips high but wrist too low for the absolute rules
        assert_eq!(hand_raised(&hand(0.58, 0.35, 0.5, 0.5, 0.35), &t), Ok(false));
    }

    #[test]
    fn test_malformed_hand_is_rejected() {
        let short = HandLandmarks::new(vec![Point3::planar(0.1, 0.1); 9]);
        assert_eq!(
            hand_raised(&short, &HandRaiseThresholds::default()),
            Err(StudyError::MalformedFrame {
                expected: 21,
                actual: 9
            })
        );

        let mut switch = GestureModeSwitch::new();
        assert_eq!(switch.on_frame(&frame_with(0, vec![short])), None);
        assert!(!switch.hand_raised());
        assert_eq!(switch.malformed_hands(), 1);
    }

    #[test]
    fn test_no_hands_means_not_raised() {
        let mut switch = GestureModeSwitch::new();
        switch.on_frame(&frame_with(0, vec![raised_hand()]));
        assert!(switch.hand_raised());

        assert_eq!(switch.on_frame(&frame_with(33, vec![])), Some(DoubtTransition::Exited));
        assert!(!switch.hand_raised());
    }

    #[test]
    fn test_edge_triggered() {
        let mut switch = GestureModeSwitch::new();

        assert_eq!(
            switch.on_frame(&frame_with(0, vec![raised_hand()])),
            Some(DoubtTransition::Entered)
        );
        // Level unchanged: no edge
        assert_eq!(switch.on_frame(&frame_with(33, vec![raised_hand()])), None);
        assert_eq!(switch.on_frame(&frame_with(66, vec![raised_hand()])), None);
        assert!(switch.doubt_mode_active());

        assert_eq!(
            switch.on_frame(&frame_with(100, vec![lowered_hand()])),
            Some(DoubtTransition::Exited)
        );
        assert_eq!(switch.on_frame(&frame_with(133, vec![lowered_hand()])), None);
        assert!(!switch.doubt_mode_active());
    }

    #[test]
    fn test_any_hand_raised() {
        let mut switch = GestureModeSwitch::new();
        let transition = switch.on_frame(&frame_with(0, vec![raised_hand(), lowered_hand()]));
        assert_eq!(transition, Some(DoubtTransition::Entered));

        let transition = switch.on_frame(&frame_with(33, vec![lowered_hand(), raised_hand()]));
        assert_eq!(transition, None);
    }

    #[test]
    fn test_manual_toggle_and_edges() {
        let mut switch = GestureModeSwitch::new();

        assert_eq!(switch.toggle(), DoubtTransition::Entered);
        assert!(switch.doubt_mode_active());
        assert!(!switch.hand_raised());

        // Raising the hand while already active is not a new entry
        assert_eq!(switch.on_frame(&frame_with(0, vec![raised_hand()])), None);
        // Lowering it ends doubt mode
        assert_eq!(
            switch.on_frame(&frame_with(33, vec![lowered_hand()])),
            Some(DoubtTransition::Exited)
        );

        assert_eq!(switch.toggle(), DoubtTransition::Entered);
        assert_eq!(switch.toggle(), DoubtTransition::Exited);
    }

    #[test]
    fn test_reset() {
        let mut switch = GestureModeSwitch::new();
        assert_eq!(switch.reset(), None);

        switch.on_frame(&frame_with(0, vec![raised_hand()]));
        assert_eq!(switch.reset(), Some(DoubtTransition::Exited));
        assert_eq!(switch.state(), GestureState::default());
    }

    proptest! {
        #[test]
        fn prop_low_wrist_never_raised(
            wrist in 0.6f32..1.0,
            tips in proptest::array::uniform4(0.0f32..1.0),
        ) {
            let h = hand(wrist, tips[0], tips[1], tips[2], tips[3]);
            prop_assert_eq!(hand_raised(&h, &HandRaiseThresholds::default()), Ok(false));
        }

        #[test]
        fn prop_transitions_alternate(levels in proptest::collection::vec(any::<bool>(), 1..100)) {
            let mut switch = GestureModeSwitch::new();
            let mut last: Option<DoubtTransition> = None;
            let mut entries = 0u32;
            let mut rising_edges = 0u32;
            let mut previous = false;

            for (i, up) in levels.iter().enumerate() {
                let hands = if *up { vec![raised_hand()] } else { vec![lowered_hand()] };
                if *up && !previous {
                    rising_edges += 1;
                }
                previous = *up;

                if let Some(t) = switch.on_frame(&frame_with(i as i64 * 33, hands)) {
                    prop_assert_ne!(Some(t), last);
                    if t == DoubtTransition::Entered {
                        entries += 1;
                    }
                    last = Some(t);
                }
                prop_assert_eq!(switch.doubt_mode_active(), *up);
            }
            prop_assert_eq!(entries, rising_edges);
        }
    }
}
