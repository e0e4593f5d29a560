use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub measurement: MeasurementConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub record: RecordConfig,
}

/// 角度計測と自動キャプチャ判定のパラメータ
#[derive(Debug, Deserialize, Clone)]
pub struct MeasurementConfig {
    /// この値を超える信頼度の関節だけを使う
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// 前フレームとの差がこの値未満なら「静止」とみなす（度）
    #[serde(default = "default_stability_epsilon_deg")]
    pub stability_epsilon_deg: f32,
    /// キャプチャに必要な連続静止フレーム数（この数に達したら発火 = N+1 フレーム目）
    #[serde(default = "default_stability_frames")]
    pub stability_frames: u32,
    /// 腕を下ろした状態での誤発火を防ぐ最小角度（度）
    #[serde(default = "default_min_valid_angle_deg")]
    pub min_valid_angle_deg: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// フレームキューの深さ。満杯時の新フレームは破棄
    #[serde(default = "default_frame_queue")]
    pub frame_queue: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecordConfig {
    /// 保存画像の拡張子
    #[serde(default = "default_image_extension")]
    pub image_extension: String,
}

fn default_confidence_threshold() -> f32 { 0.1 }
fn default_stability_epsilon_deg() -> f32 { 2.0 }
fn default_stability_frames() -> u32 { 60 }
fn default_min_valid_angle_deg() -> f32 { 15.0 }
fn default_frame_queue() -> usize { 4 }
fn default_image_extension() -> String { "jpg".to_string() }

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            stability_epsilon_deg: default_stability_epsilon_deg(),
            stability_frames: default_stability_frames(),
            min_valid_angle_deg: default_min_valid_angle_deg(),
        }
    }
}

impl MeasurementConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.confidence_threshold) {
            anyhow::bail!(
                "confidence_threshold must be in [0, 1), got {}",
                self.confidence_threshold
            );
        }
        if !(self.stability_epsilon_deg > 0.0) {
            anyhow::bail!(
                "stability_epsilon_deg must be positive, got {}",
                self.stability_epsilon_deg
            );
        }
        if self.stability_frames == 0 {
            anyhow::bail!("stability_frames must be at least 1");
        }
        if !(0.0..180.0).contains(&self.min_valid_angle_deg) {
            anyhow::bail!(
                "min_valid_angle_deg must be in [0, 180), got {}",
                self.min_valid_angle_deg
            );
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_queue: default_frame_queue(),
        }
    }
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            image_extension: default_image_extension(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        config.measurement.validate()?;
        Ok(config)
    }

    /// 読み込みに失敗した場合はデフォルト値で続行
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }
}
