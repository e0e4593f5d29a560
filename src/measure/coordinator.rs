use tracing::debug;

use super::angle::shoulder_angle;
use super::filter::{JointFilter, JointSelection};
use super::stability::{AngleSample, StabilityState, StabilityTracker};
use super::status::Status;
use crate::config::MeasurementConfig;
use crate::pose::{JointSample, MeasurementSide};

/// 1セッションにつき最大1回だけ発行されるキャプチャ結果
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureEvent {
    pub angle_degrees: i32,
    pub joints: JointSample,
    pub side: MeasurementSide,
    /// 発火したフレーム番号
    pub frame_index: u64,
}

/// 1フレーム処理の結果（表示用の情報を含む）
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub drawable: JointSample,
    pub status: Status,
    pub capture: Option<CaptureEvent>,
}

/// 1計測セッション: フィルタ → 角度 → 静止判定 を順に回す
pub struct CaptureCoordinator {
    filter: JointFilter,
    tracker: StabilityTracker,
    frame_index: u64,
}

impl CaptureCoordinator {
    pub fn new(side: MeasurementSide) -> Self {
        Self::from_config(side, &MeasurementConfig::default())
    }

    pub fn from_config(side: MeasurementSide, config: &MeasurementConfig) -> Self {
        Self {
            filter: JointFilter::from_config(side, config),
            tracker: StabilityTracker::from_config(config),
            frame_index: 0,
        }
    }

    pub fn side(&self) -> MeasurementSide {
        self.filter.side()
    }

    /// キャプチャ済み。フレーム供給側はここで止めてよい
    pub fn is_complete(&self) -> bool {
        self.tracker.state().is_captured()
    }

    pub fn state(&self) -> StabilityState {
        self.tracker.state()
    }

    /// 処理したフレーム数
    pub fn frames_processed(&self) -> u64 {
        self.frame_index
    }

    /// キャプチャが発生したフレームでのみ Some を返す
    pub fn process(&mut self, frame: &JointSample) -> Option<CaptureEvent> {
        self.process_frame(frame).capture
    }

    pub fn process_frame(&mut self, frame: &JointSample) -> FrameOutcome {
        let drawable = self.filter.drawable(frame);

        if let StabilityState::Captured { angle_degrees } = self.tracker.state() {
            return FrameOutcome {
                drawable,
                status: Status::Captured { angle: angle_degrees },
                capture: None,
            };
        }

        self.frame_index += 1;
        let frame_index = self.frame_index;

        let (sample, status) = match self.filter.select(frame) {
            JointSelection::Ready(joints) => {
                let angle = shoulder_angle(
                    joints.hip.point(),
                    joints.shoulder.point(),
                    joints.wrist.point(),
                );
                (AngleSample::valid(angle, frame_index), None)
            }
            JointSelection::Insufficient(reason) => {
                debug!(frame = frame_index, reason = reason.as_str(), "insufficient joints");
                let status = Status::Searching {
                    side: self.side(),
                    reason: Some(reason),
                };
                (AngleSample::invalid(frame_index), Some(status))
            }
        };

        let snapshot = self.filter.snapshot(frame);
        let capture = self
            .tracker
            .update(&sample, &snapshot)
            .map(|signal| CaptureEvent {
                angle_degrees: signal.angle_degrees,
                joints: signal.joints,
                side: self.side(),
                frame_index: signal.frame_index,
            });

        let status = status.unwrap_or_else(|| {
            let angle = sample.angle_degrees.round() as i32;
            match self.tracker.state() {
                StabilityState::Captured { angle_degrees } => Status::Captured { angle: angle_degrees },
                StabilityState::Accumulating { stable_frames, .. } if stable_frames > 0 => {
                    Status::Holding { angle }
                }
                _ => Status::Measuring { angle },
            }
        });

        FrameOutcome {
            drawable,
            status,
            capture,
        }
    }
}
