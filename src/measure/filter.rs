use std::fmt;

use crate::config::MeasurementConfig;
use crate::pose::{Joint, JointId, JointKind, JointSample, MeasurementSide};

/// 計測に使えなかった理由。ガイダンス表示に使う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsufficientReason {
    MissingHip,
    MissingShoulder,
    MissingWrist,
    LowConfidence,
}

impl InsufficientReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingHip => "missing-hip",
            Self::MissingShoulder => "missing-shoulder",
            Self::MissingWrist => "missing-wrist",
            Self::LowConfidence => "low-confidence",
        }
    }
}

impl fmt::Display for InsufficientReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 角度計算に使う 腰・肩・手首 の3点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementJoints {
    pub hip: Joint,
    pub shoulder: Joint,
    pub wrist: Joint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointSelection {
    Ready(MeasurementJoints),
    Insufficient(InsufficientReason),
}

impl JointSelection {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// 計測側の関節を取り出し、信頼度でふるいにかける
#[derive(Debug, Clone)]
pub struct JointFilter {
    side: MeasurementSide,
    confidence_threshold: f32,
}

impl JointFilter {
    pub fn new(side: MeasurementSide) -> Self {
        Self::from_config(side, &MeasurementConfig::default())
    }

    pub fn from_config(side: MeasurementSide, config: &MeasurementConfig) -> Self {
        Self {
            side,
            confidence_threshold: config.confidence_threshold,
        }
    }

    pub fn side(&self) -> MeasurementSide {
        self.side
    }

    fn id(&self, kind: JointKind) -> JointId {
        JointId::for_side(self.side, kind)
    }

    /// 腰・肩・手首が揃い、全て閾値を超えていれば Ready
    ///
    /// 欠損は 腰→肩→手首 の順に報告し、揃っている場合のみ信頼度を見る。
    pub fn select(&self, sample: &JointSample) -> JointSelection {
        let hip = match sample.get(self.id(JointKind::Hip)) {
            Some(j) => *j,
            None => return JointSelection::Insufficient(InsufficientReason::MissingHip),
        };
        let shoulder = match sample.get(self.id(JointKind::Shoulder)) {
            Some(j) => *j,
            None => return JointSelection::Insufficient(InsufficientReason::MissingShoulder),
        };
        let wrist = match sample.get(self.id(JointKind::Wrist)) {
            Some(j) => *j,
            None => return JointSelection::Insufficient(InsufficientReason::MissingWrist),
        };

        let threshold = self.confidence_threshold;
        if !hip.is_valid(threshold) || !shoulder.is_valid(threshold) || !wrist.is_valid(threshold) {
            return JointSelection::Insufficient(InsufficientReason::LowConfidence);
        }

        JointSelection::Ready(MeasurementJoints { hip, shoulder, wrist })
    }

    /// オーバーレイ描画用: 肩・肘・手首のうち検出できたものだけ
    ///
    /// 計測とは違い3点揃っている必要はない。
    pub fn drawable(&self, sample: &JointSample) -> JointSample {
        self.gated(
            sample,
            &[JointKind::Shoulder, JointKind::Elbow, JointKind::Wrist],
        )
    }

    /// キャプチャ時に保存する関節（腰を含む計測側の4点）
    pub fn snapshot(&self, sample: &JointSample) -> JointSample {
        self.gated(
            sample,
            &[JointKind::Hip, JointKind::Shoulder, JointKind::Elbow, JointKind::Wrist],
        )
    }

    fn gated(&self, sample: &JointSample, kinds: &[JointKind]) -> JointSample {
        let mut out = JointSample::new();
        for &kind in kinds {
            let id = self.id(kind);
            if let Some(joint) = sample.get(id) {
                if joint.is_valid(self.confidence_threshold) {
                    out.insert(id, *joint);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_left(confidence: f32) -> JointSample {
        JointSample::new()
            .with(JointId::LeftHip, Joint::new(0.5, 0.2, confidence))
            .with(JointId::LeftShoulder, Joint::new(0.5, 0.6, confidence))
            .with(JointId::LeftElbow, Joint::new(0.6, 0.5, confidence))
            .with(JointId::LeftWrist, Joint::new(0.7, 0.4, confidence))
    }

    #[test]
    fn test_ready_when_all_present() {
        let filter = JointFilter::new(MeasurementSide::Left);
        match filter.select(&full_left(0.9)) {
            JointSelection::Ready(j) => {
                assert_eq!(j.hip.point(), (0.5, 0.2));
                assert_eq!(j.shoulder.point(), (0.5, 0.6));
                assert_eq!(j.wrist.point(), (0.7, 0.4));
            }
            other => panic!("expected ready, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_side_is_missing() {
        let filter = JointFilter::new(MeasurementSide::Right);
        assert_eq!(
            filter.select(&full_left(0.9)),
            JointSelection::Insufficient(InsufficientReason::MissingHip)
        );
    }

    #[test]
    fn test_missing_reasons_in_order() {
        let filter = JointFilter::new(MeasurementSide::Left);
        let mut sample = full_left(0.9);
        sample.joints.remove(&JointId::LeftWrist);
        assert_eq!(
            filter.select(&sample),
            JointSelection::Insufficient(InsufficientReason::MissingWrist)
        );
        sample.joints.remove(&JointId::LeftShoulder);
        assert_eq!(
            filter.select(&sample),
            JointSelection::Insufficient(InsufficientReason::MissingShoulder)
        );
    }

    #[test]
    fn test_confidence_at_threshold_is_low() {
        let filter = JointFilter::new(MeasurementSide::Left);
        let mut sample = full_left(0.9);
        sample.insert(JointId::LeftWrist, Joint::new(0.7, 0.4, 0.1));
        assert_eq!(
            filter.select(&sample),
            JointSelection::Insufficient(InsufficientReason::LowConfidence)
        );
    }

    #[test]
    fn test_reason_tags() {
        assert_eq!(InsufficientReason::MissingHip.to_string(), "missing-hip");
        assert_eq!(InsufficientReason::LowConfidence.as_str(), "low-confidence");
    }

    #[test]
    fn test_drawable_is_partial() {
        let filter = JointFilter::new(MeasurementSide::Left);
        let mut sample = full_left(0.9);
        sample.joints.remove(&JointId::LeftHip);
        sample.insert(JointId::LeftElbow, Joint::new(0.6, 0.5, 0.05));

        // 腰が無くても描画対象は出る。低信頼の肘は除外
        let drawable = filter.drawable(&sample);
        assert_eq!(drawable.len(), 2);
        assert!(drawable.get(JointId::LeftShoulder).is_some());
        assert!(drawable.get(JointId::LeftWrist).is_some());
        assert!(drawable.get(JointId::LeftElbow).is_none());
        assert!(!filter.select(&sample).is_ready());
    }

    #[test]
    fn test_snapshot_includes_hip() {
        let filter = JointFilter::new(MeasurementSide::Left);
        let snapshot = filter.snapshot(&full_left(0.9));
        assert_eq!(snapshot.len(), 4);
        assert!(snapshot.get(JointId::LeftHip).is_some());
    }
}
