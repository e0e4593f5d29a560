use std::fmt;

use super::filter::InsufficientReason;
use crate::pose::MeasurementSide;

/// 画面下部に出す計測ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Searching {
        side: MeasurementSide,
        reason: Option<InsufficientReason>,
    },
    /// 角度は取れているが静止していない
    Measuring { angle: i32 },
    /// 静止フレームを数えている最中
    Holding { angle: i32 },
    Captured { angle: i32 },
}

impl Status {
    pub fn searching(side: MeasurementSide) -> Self {
        Self::Searching { side, reason: None }
    }

    /// 姿勢を探している間のガイダンス ("position left shoulder")
    pub fn guidance(&self) -> Option<String> {
        match self {
            Self::Searching { side, .. } => Some(format!("position {} shoulder", side)),
            _ => None,
        }
    }

    pub fn angle(&self) -> Option<i32> {
        match self {
            Self::Searching { .. } => None,
            Self::Measuring { angle } | Self::Holding { angle } | Self::Captured { angle } => {
                Some(*angle)
            }
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Searching { .. } => f.write_str("searching for pose"),
            Self::Measuring { angle } => write!(f, "{}°", angle),
            Self::Holding { angle } => write!(f, "hold it… {}°", angle),
            Self::Captured { angle } => write!(f, "captured: {}°", angle),
        }
    }
}
