//! 角度の静止判定と自動キャプチャの発火
//!
//! Searching → Accumulating → Captured の3状態。Captured は終端で、
//! 以降のフレームは状態を変えない。新しい計測は新しいトラッカーで行う。

use tracing::{debug, info};

use crate::config::MeasurementConfig;
use crate::pose::JointSample;

/// 1フレーム分の角度
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSample {
    pub angle_degrees: f32,
    /// フレーム番号（単調増加）
    pub frame_index: u64,
    /// 必要な関節が揃っていなければ false
    pub valid: bool,
}

impl AngleSample {
    pub fn valid(angle_degrees: f32, frame_index: u64) -> Self {
        Self {
            angle_degrees,
            frame_index,
            valid: true,
        }
    }

    pub fn invalid(frame_index: u64) -> Self {
        Self {
            angle_degrees: 0.0,
            frame_index,
            valid: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StabilityState {
    /// 有効な角度をまだ得ていない、または見失った
    Searching,
    /// 静止フレームを数えている
    Accumulating { last_angle: f32, stable_frames: u32 },
    /// 発火済み（終端）
    Captured { angle_degrees: i32 },
}

impl StabilityState {
    pub fn last_angle(&self) -> Option<f32> {
        match self {
            Self::Accumulating { last_angle, .. } => Some(*last_angle),
            _ => None,
        }
    }

    pub fn stable_frame_count(&self) -> u32 {
        match self {
            Self::Accumulating { stable_frames, .. } => *stable_frames,
            _ => 0,
        }
    }

    pub fn is_captured(&self) -> bool {
        matches!(self, Self::Captured { .. })
    }
}

/// キャプチャ可能になった瞬間に一度だけ出る信号
#[derive(Debug, Clone, PartialEq)]
pub struct StabilitySignal {
    pub angle_degrees: i32,
    pub frame_index: u64,
    pub joints: JointSample,
}

pub struct StabilityTracker {
    epsilon_deg: f32,
    required_frames: u32,
    min_angle_deg: f32,
    state: StabilityState,
}

impl StabilityTracker {
    pub fn new() -> Self {
        Self::from_config(&MeasurementConfig::default())
    }

    pub fn from_config(config: &MeasurementConfig) -> Self {
        Self {
            epsilon_deg: config.stability_epsilon_deg,
            required_frames: config.stability_frames,
            min_angle_deg: config.min_valid_angle_deg,
            state: StabilityState::Searching,
        }
    }

    pub fn state(&self) -> StabilityState {
        self.state
    }

    /// 1フレーム分の角度で状態を更新する
    ///
    /// 静止カウントは直前フレームとの差が epsilon 未満のとき増える。基準フレームは 0 から
    /// 始まるので、`required_frames` 回の静止遷移（= required_frames + 1 フレーム目）で発火する。
    /// 発火時の `joints` がそのまま信号に入る。
    pub fn update(&mut self, sample: &AngleSample, joints: &JointSample) -> Option<StabilitySignal> {
        if self.state.is_captured() {
            return None;
        }

        if !sample.valid {
            if self.state != StabilityState::Searching {
                debug!(frame = sample.frame_index, "pose lost, back to searching");
            }
            self.state = StabilityState::Searching;
            return None;
        }

        let angle = sample.angle_degrees;
        let stable_frames = match self.state {
            StabilityState::Accumulating { last_angle, stable_frames } => {
                if (angle - last_angle).abs() < self.epsilon_deg {
                    stable_frames + 1
                } else {
                    if stable_frames > 0 {
                        debug!(
                            frame = sample.frame_index,
                            from = last_angle,
                            to = angle,
                            "angle moved, stable count reset"
                        );
                    }
                    0
                }
            }
            _ => {
                debug!(frame = sample.frame_index, angle, "pose found");
                0
            }
        };
        // ドリフトしても基準は常に最新の角度に追従する
        self.state = StabilityState::Accumulating {
            last_angle: angle,
            stable_frames,
        };

        if stable_frames >= self.required_frames && angle > self.min_angle_deg {
            let angle_degrees = angle.round() as i32;
            info!(
                frame = sample.frame_index,
                angle = angle_degrees,
                stable_frames,
                "pose stable, capture"
            );
            self.state = StabilityState::Captured { angle_degrees };
            return Some(StabilitySignal {
                angle_degrees,
                frame_index: sample.frame_index,
                joints: joints.clone(),
            });
        }

        None
    }
}

impl Default for StabilityTracker {
    fn default() -> Self {
        Self::new()
    }
}
