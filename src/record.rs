//! 計測履歴の1件分（保存は外部のストレージ側が行う）

use anyhow::{Context, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::measure::CaptureEvent;
use crate::pose::MeasurementSide;

/// 履歴JSONの1要素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRecord {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub side: MeasurementSide,
    pub angle: i32,
    pub image_file_name: String,
}

impl CaptureRecord {
    /// キャプチャ結果から履歴を作る。角度と左右はそのまま写す
    ///
    /// 画像ファイル名は記録IDとは別のUUIDから作る。
    /// 日時は秒単位（小数秒を含む ISO 8601 を読めない履歴リーダーがある）。
    pub fn from_event(event: &CaptureEvent, image_extension: &str) -> Self {
        Self::with_date(event, image_extension, Utc::now().trunc_subsecs(0))
    }

    pub fn with_date(event: &CaptureEvent, image_extension: &str, date: DateTime<Utc>) -> Self {
        let extension = image_extension.trim_start_matches('.');
        Self {
            id: Uuid::new_v4(),
            date,
            side: event.side,
            angle: event.angle_degrees,
            image_file_name: format!("{}.{}", Uuid::new_v4(), extension),
        }
    }
}

/// 新しい記録を先頭に追加
pub fn insert_newest(history: &mut Vec<CaptureRecord>, record: CaptureRecord) {
    history.insert(0, record);
}

pub fn records_to_json(history: &[CaptureRecord]) -> Result<String> {
    serde_json::to_string_pretty(history).context("Failed to encode history")
}

pub fn records_from_json(json: &str) -> Result<Vec<CaptureRecord>> {
    serde_json::from_str(json).context("Failed to decode history")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::JointSample;
    use chrono::TimeZone;

    fn event(angle: i32, side: MeasurementSide) -> CaptureEvent {
        CaptureEvent {
            angle_degrees: angle,
            joints: JointSample::new(),
            side,
            frame_index: 61,
        }
    }

    #[test]
    fn test_from_event_copies_angle_and_side() {
        let record = CaptureRecord::from_event(&event(45, MeasurementSide::Left), "jpg");
        assert_eq!(record.angle, 45);
        assert_eq!(record.side, MeasurementSide::Left);
        assert!(record.image_file_name.ends_with(".jpg"));
        assert_ne!(record.image_file_name, format!("{}.jpg", record.id));
    }

    #[test]
    fn test_from_event_date_has_whole_seconds() {
        let record = CaptureRecord::from_event(&event(45, MeasurementSide::Left), "jpg");
        assert_eq!(record.date.timestamp_subsec_nanos(), 0);

        let value: serde_json::Value = serde_json::to_value(&record).unwrap();
        let date = value["date"].as_str().unwrap();
        assert!(!date.contains('.'), "fractional seconds in {}", date);
        assert!(date.ends_with('Z'));
    }

    #[test]
    fn test_extension_leading_dot() {
        let record = CaptureRecord::from_event(&event(90, MeasurementSide::Right), ".png");
        assert!(record.image_file_name.ends_with(".png"));
        assert!(!record.image_file_name.contains(".."));
    }

    #[test]
    fn test_json_layout() {
        let date = Utc.with_ymd_and_hms(2025, 11, 11, 8, 30, 0).unwrap();
        let record = CaptureRecord::with_date(&event(120, MeasurementSide::Right), "jpg", date);
        let value: serde_json::Value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["side"], "right");
        assert_eq!(value["angle"], 120);
        assert_eq!(value["date"], "2025-11-11T08:30:00Z");
        assert_eq!(value["imageFileName"], record.image_file_name.as_str());
        assert_eq!(value["id"], record.id.to_string());
    }

    #[test]
    fn test_history_newest_first() {
        let mut history = Vec::new();
        let first = CaptureRecord::from_event(&event(30, MeasurementSide::Left), "jpg");
        let second = CaptureRecord::from_event(&event(60, MeasurementSide::Left), "jpg");
        insert_newest(&mut history, first.clone());
        insert_newest(&mut history, second.clone());

        let json = records_to_json(&history).unwrap();
        let decoded = records_from_json(&json).unwrap();
        assert_eq!(decoded, vec![second, first]);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(records_from_json("{not json").is_err());
    }
}
