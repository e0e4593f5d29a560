use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 計測する肩の左右
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSide {
    Left,
    Right,
}

impl MeasurementSide {
    /// 表示用ラベル ("Left" / "Right")
    pub fn label(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for MeasurementSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MeasurementSide {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            other => anyhow::bail!("unknown side: {}", other),
        }
    }
}

/// 左右を問わない関節の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointKind {
    Hip,
    Shoulder,
    Elbow,
    Wrist,
}

/// 計測で扱う関節ID（左右別）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointId {
    LeftHip,
    RightHip,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
}

impl JointId {
    pub const ALL: [JointId; 8] = [
        JointId::LeftHip,
        JointId::RightHip,
        JointId::LeftShoulder,
        JointId::RightShoulder,
        JointId::LeftElbow,
        JointId::RightElbow,
        JointId::LeftWrist,
        JointId::RightWrist,
    ];

    pub fn for_side(side: MeasurementSide, kind: JointKind) -> Self {
        use JointKind::*;
        match (side, kind) {
            (MeasurementSide::Left, Hip) => Self::LeftHip,
            (MeasurementSide::Left, Shoulder) => Self::LeftShoulder,
            (MeasurementSide::Left, Elbow) => Self::LeftElbow,
            (MeasurementSide::Left, Wrist) => Self::LeftWrist,
            (MeasurementSide::Right, Hip) => Self::RightHip,
            (MeasurementSide::Right, Shoulder) => Self::RightShoulder,
            (MeasurementSide::Right, Elbow) => Self::RightElbow,
            (MeasurementSide::Right, Wrist) => Self::RightWrist,
        }
    }

    pub fn side(&self) -> MeasurementSide {
        match self {
            Self::LeftHip | Self::LeftShoulder | Self::LeftElbow | Self::LeftWrist => {
                MeasurementSide::Left
            }
            _ => MeasurementSide::Right,
        }
    }

    pub fn kind(&self) -> JointKind {
        match self {
            Self::LeftHip | Self::RightHip => JointKind::Hip,
            Self::LeftShoulder | Self::RightShoulder => JointKind::Shoulder,
            Self::LeftElbow | Self::RightElbow => JointKind::Elbow,
            Self::LeftWrist | Self::RightWrist => JointKind::Wrist,
        }
    }
}

/// 単一の関節
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0)
    pub y: f32,
    /// 信頼度スコア (0.0〜1.0)
    pub confidence: f32,
}

impl Joint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// 信頼度が閾値を超えているか（閾値ちょうどは不可）
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.confidence > threshold
    }

    pub fn point(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

impl Default for Joint {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            confidence: 0.0,
        }
    }
}

/// 1フレーム分の関節検出結果
///
/// 検出器が見つけられなかった関節はマップに含まれない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointSample {
    #[serde(default)]
    pub joints: BTreeMap<JointId, Joint>,
}

impl JointSample {
    pub fn new() -> Self {
        Self::default()
    }

    /// ビルダー形式で関節を追加
    pub fn with(mut self, id: JointId, joint: Joint) -> Self {
        self.joints.insert(id, joint);
        self
    }

    pub fn insert(&mut self, id: JointId, joint: Joint) {
        self.joints.insert(id, joint);
    }

    pub fn get(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(&id)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// 指定IDのうち存在する関節だけを取り出す
    pub fn subset(&self, ids: &[JointId]) -> JointSample {
        let joints = ids
            .iter()
            .filter_map(|id| self.joints.get(id).map(|j| (*id, *j)))
            .collect();
        JointSample { joints }
    }
}
