//! 計測セッションを専用スレッドで回す
//!
//! フレームは有界キューで1スレッドに直列に渡す。表示用の状態は最新値だけを保持し
//! （後勝ち）、キャプチャ結果は別チャネルで確実に1回だけ届ける。

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::measure::{CaptureCoordinator, CaptureEvent, Status};
use crate::pose::{JointSample, MeasurementSide};

/// 描画側に渡す最新の状態
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub drawable: JointSample,
    pub status: Status,
}

pub struct SessionWorker {
    side: MeasurementSide,
    frames: Option<SyncSender<JointSample>>,
    captures: Receiver<CaptureEvent>,
    latest: Arc<Mutex<Option<DisplayState>>>,
    display_id: Arc<AtomicU64>,
    complete: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SessionWorker {
    pub fn start(side: MeasurementSide, config: &Config) -> Result<Self> {
        let (frame_tx, frame_rx) = mpsc::sync_channel::<JointSample>(config.session.frame_queue.max(1));
        let (capture_tx, capture_rx) = mpsc::channel::<CaptureEvent>();

        let latest = Arc::new(Mutex::new(None::<DisplayState>));
        let latest_ref = latest.clone();
        let display_id = Arc::new(AtomicU64::new(0));
        let display_id_ref = display_id.clone();
        let complete = Arc::new(AtomicBool::new(false));
        let complete_ref = complete.clone();
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_ref = cancelled.clone();

        let mut coordinator = CaptureCoordinator::from_config(side, &config.measurement);

        let handle = thread::Builder::new()
            .name(format!("rom-session-{}", side))
            .spawn(move || {
                for frame in frame_rx {
                    if cancelled_ref.load(Ordering::Acquire) {
                        break;
                    }
                    let outcome = coordinator.process_frame(&frame);

                    if let Ok(mut guard) = latest_ref.lock() {
                        *guard = Some(DisplayState {
                            drawable: outcome.drawable,
                            status: outcome.status,
                        });
                    }
                    display_id_ref.fetch_add(1, Ordering::Release);

                    if let Some(event) = outcome.capture {
                        complete_ref.store(true, Ordering::Release);
                        if cancelled_ref.load(Ordering::Acquire) {
                            break;
                        }
                        info!(
                            side = %event.side,
                            angle = event.angle_degrees,
                            frame = event.frame_index,
                            "capture ready"
                        );
                        // 受信側が既に破棄されていれば届け先はない
                        let _ = capture_tx.send(event);
                        break;
                    }
                }
                debug!(frames = coordinator.frames_processed(), "session thread finished");
            })
            .context("Failed to spawn session thread")?;

        info!(%side, "measurement session started");

        Ok(Self {
            side,
            frames: Some(frame_tx),
            captures: capture_rx,
            latest,
            display_id,
            complete,
            cancelled,
            handle: Some(handle),
        })
    }

    pub fn side(&self) -> MeasurementSide {
        self.side
    }

    fn accepting(&self) -> Option<&SyncSender<JointSample>> {
        if self.is_complete() || self.cancelled.load(Ordering::Acquire) {
            return None;
        }
        self.frames.as_ref()
    }

    /// フレームを渡す（ブロックしない）。キューが満杯またはセッション終了なら捨てて false
    pub fn submit(&self, frame: JointSample) -> bool {
        let Some(tx) = self.accepting() else {
            return false;
        };
        match tx.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("frame queue full, frame dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// キューに空きが出るまで待ってフレームを渡す（録画の再生用）
    pub fn submit_wait(&self, frame: JointSample) -> bool {
        match self.accepting() {
            Some(tx) => tx.send(frame).is_ok(),
            None => false,
        }
    }

    /// 最新の表示状態。途中のフレームは上書きされる
    pub fn display(&self) -> Option<DisplayState> {
        self.latest.lock().ok().and_then(|guard| guard.clone())
    }

    /// 表示状態が更新されるたびにインクリメントされる
    pub fn display_frame_id(&self) -> u64 {
        self.display_id.load(Ordering::Acquire)
    }

    pub fn captures(&self) -> &Receiver<CaptureEvent> {
        &self.captures
    }

    pub fn recv_capture(&self, timeout: Duration) -> Option<CaptureEvent> {
        self.captures.recv_timeout(timeout).ok()
    }

    /// キャプチャ済み。カメラ側はフレーム供給を止めてよい
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    /// 入力を閉じ、キュー内のフレームを処理し終えるまで待つ。キャプチャがあれば返す
    pub fn finish(mut self) -> Option<CaptureEvent> {
        self.frames.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.captures.try_recv().ok()
    }

    /// セッションを破棄する。以降キャプチャは届かない
    pub fn cancel(&mut self) {
        if self.handle.is_none() {
            return;
        }
        self.cancelled.store(true, Ordering::Release);
        self.frames.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        while self.captures.try_recv().is_ok() {}
        info!(side = %self.side, "measurement session cancelled");
    }
}

impl Drop for SessionWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}
