use std::collections::HashMap;

use bbc_hal::Peripherals;
use bbc_types::{Action, RobotState, SensorFrame};
use tracing::{debug, info};

use super::Behavior;
use crate::config::BlobFollowConfig;

/// Reacts to a fresh blob detection with the audio cue mapped to its color
/// signature, then lowers the tracker's "new data" edge.
///
/// Only the state is written; the blob's position does not steer the robot.
pub struct BlobFollow {
    cues: HashMap<u8, u8>,
    show_detections: bool,
}

impl BlobFollow {
    pub fn new(config: &BlobFollowConfig) -> Self {
        Self {
            cues: config
                .cues
                .iter()
                .map(|c| (c.signature, c.sequence))
                .collect(),
            show_detections: config.show_detections,
        }
    }
}

impl Behavior for BlobFollow {
    fn name(&self) -> &'static str {
        "blob_follow"
    }

    fn evaluate(&mut self, action: &mut Action, frame: &SensorFrame, hw: &mut Peripherals) {
        if !(frame.blob_ready && hw.blob.has_new_data()) {
            return;
        }
        let blob = frame.blob;
        action.state = RobotState::BlobFollowing;

        if self.show_detections {
            hw.display.print_at(1, 0, &format!("sig#: {}", blob.signature));
            hw.display
                .print_at(2, 0, &format!("w: {}, h: {}", blob.width, blob.height));
            hw.display
                .print_at(3, 0, &format!("Cent = ( {}, {} )", blob.x, blob.y));
        }

        match self.cues.get(&blob.signature) {
            Some(&sequence) => {
                info!(signature = blob.signature, sequence, "Blob detected; playing cue");
                hw.audio.play_sequence(sequence);
            }
            None => debug!(signature = blob.signature, "Blob detected; no cue mapped"),
        }
        hw.blob.mark_processed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignatureCue;
    use bbc_hal::sim::{DisplayOp, SimWorld};
    use bbc_types::BlobReading;

    fn detection(signature: u8) -> BlobReading {
        BlobReading {
            x: 160,
            y: 100,
            width: 40,
            height: 25,
            signature,
        }
    }

    fn ready(reading: BlobReading) -> SensorFrame {
        SensorFrame {
            blob: reading,
            blob_ready: true,
            ..SensorFrame::default()
        }
    }

    #[test]
    fn fresh_detection_plays_cue_and_clears_edge() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut blob = BlobFollow::new(&BlobFollowConfig::default());
        let mut action = Action::default();

        world.publish_blob(detection(2));
        blob.evaluate(&mut action, &ready(detection(2)), &mut hw);

        assert_eq!(action.state, RobotState::BlobFollowing);
        assert_eq!((action.speed_left, action.speed_right), (0, 0));
        assert_eq!(world.cues(), vec![2]);
        assert!(!world.blob_pending());
    }

    #[test]
    fn stale_frame_is_ignored() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut blob = BlobFollow::new(&BlobFollowConfig::default());
        let mut action = Action::default();

        // Frame says ready, but the edge was already lowered.
        blob.evaluate(&mut action, &ready(detection(1)), &mut hw);
        assert_eq!(action, Action::default());
        assert!(world.cues().is_empty());

        // Edge raised but the frame has not caught up yet.
        world.publish_blob(detection(1));
        blob.evaluate(&mut action, &SensorFrame::default(), &mut hw);
        assert!(world.cues().is_empty());
        assert!(world.blob_pending());
    }

    #[test]
    fn unmapped_signature_still_processed() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut blob = BlobFollow::new(&BlobFollowConfig {
            cues: vec![SignatureCue {
                signature: 1,
                sequence: 7,
            }],
            show_detections: false,
            roam: false,
        });
        let mut action = Action::default();

        world.publish_blob(detection(5));
        blob.evaluate(&mut action, &ready(detection(5)), &mut hw);
        assert_eq!(action.state, RobotState::BlobFollowing);
        assert!(world.cues().is_empty());
        assert!(!world.blob_pending());
    }

    #[test]
    fn detections_can_be_shown() {
        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut blob = BlobFollow::new(&BlobFollowConfig {
            show_detections: true,
            ..BlobFollowConfig::default()
        });
        let mut action = Action::default();

        world.publish_blob(detection(3));
        blob.evaluate(&mut action, &ready(detection(3)), &mut hw);
        assert_eq!(
            world.display_ops()[0],
            DisplayOp::PrintAt {
                row: 1,
                col: 0,
                text: "sig#: 3".into()
            }
        );
        assert_eq!(world.display_ops().len(), 3);
        assert_eq!(world.cues(), vec![3]);
    }
}
