//! Playback driver - steps frame indices and exports one frame per tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::animation::{ExportStats, FrameSink};
use crate::render::{RenderSurface, SceneFrame};
use crate::schema::Pacing;

use super::{ErrorKind, FrameCompositor, PlaybackError, PlaybackSession};

/// Shared stop flag, checked by the driver at the start of every tick.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that playback stop before its next tick.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lifecycle of a playback run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    /// `next` is the frame index of the tick in progress.
    Running { next: usize },
    /// Terminal: every tick exported and the sink finalized.
    Completed { frames: usize },
    /// Terminal: `frames` were exported before the failure.
    Failed { frames: usize, reason: ErrorKind },
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct PlaybackReport {
    pub frames: usize,
    pub stats: ExportStats,
    pub elapsed: Duration,
}

/// Drives a [`FrameCompositor`] over `0..total_ticks`, strictly in order.
#[derive(Debug)]
pub struct PlaybackDriver {
    compositor: FrameCompositor,
    state: DriverState,
    cancel: CancelToken,
    pacing: Pacing,
    export_retries: u32,
    frames_exported: usize,
}

impl PlaybackDriver {
    pub fn new(compositor: FrameCompositor) -> Self {
        Self {
            compositor,
            state: DriverState::Idle,
            cancel: CancelToken::new(),
            pacing: Pacing::Offline,
            export_retries: 0,
            frames_exported: 0,
        }
    }

    /// Use an externally owned cancellation flag.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Extra attempts per frame export before giving up.
    pub fn with_export_retries(mut self, retries: u32) -> Self {
        self.export_retries = retries;
        self
    }

    /// Handle that cancels this driver.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    pub fn frames_exported(&self) -> usize {
        self.frames_exported
    }

    /// Run ticks `0..total_ticks`, exporting one frame per tick.
    ///
    /// A driver runs once; both `Completed` and `Failed` are terminal.
    pub fn run<S, K>(
        &mut self,
        total_ticks: usize,
        tick_interval: Duration,
        session: &mut PlaybackSession<S>,
        sink: &mut K,
    ) -> Result<PlaybackReport, PlaybackError>
    where
        S: RenderSurface,
        K: FrameSink + ?Sized,
    {
        if self.state != DriverState::Idle {
            return Err(PlaybackError::DriverNotIdle);
        }

        log::info!(
            "Starting playback: {} ticks at {:?} ({:?})",
            total_ticks,
            tick_interval,
            self.pacing
        );
        let started = Instant::now();

        match self.run_ticks(total_ticks, tick_interval, session, sink) {
            Ok(stats) => {
                self.state = DriverState::Completed {
                    frames: self.frames_exported,
                };
                let elapsed = started.elapsed();
                log::info!("Playback completed in {:.2?}: {}", elapsed, stats);
                Ok(PlaybackReport {
                    frames: self.frames_exported,
                    stats,
                    elapsed,
                })
            }
            Err(err) => {
                self.state = DriverState::Failed {
                    frames: self.frames_exported,
                    reason: err.kind(),
                };
                match &err {
                    PlaybackError::Cancelled { frame } => {
                        log::warn!("Playback cancelled before frame {}", frame)
                    }
                    other => log::error!("Playback failed: {}", other),
                }
                Err(err)
            }
        }
    }

    fn run_ticks<S, K>(
        &mut self,
        total_ticks: usize,
        tick_interval: Duration,
        session: &mut PlaybackSession<S>,
        sink: &mut K,
    ) -> Result<ExportStats, PlaybackError>
    where
        S: RenderSurface,
        K: FrameSink + ?Sized,
    {
        let progress_every = (total_ticks / 10).max(1);

        for num in 0..total_ticks {
            self.state = DriverState::Running { next: num };
            if self.cancel.is_cancelled() {
                return Err(PlaybackError::Cancelled { frame: num });
            }
            let tick_start = Instant::now();

            self.compositor.apply(
                num,
                session.registry.bodies(),
                &session.store,
                &mut session.surface,
            )?;
            let frame = session.surface.snapshot();
            self.export(num, &frame, sink)?;
            self.frames_exported += 1;

            if (num + 1) % progress_every == 0 {
                log::debug!(
                    "Tick {}/{}: {} trail points",
                    num + 1,
                    total_ticks,
                    frame.trail_points()
                );
            }

            if self.pacing == Pacing::Realtime && num + 1 < total_ticks {
                thread::sleep(tick_interval.saturating_sub(tick_start.elapsed()));
            }
        }

        sink.finish().map_err(|source| PlaybackError::ExportFailure {
            frame: total_ticks,
            source,
        })
    }

    fn export<K: FrameSink + ?Sized>(
        &self,
        num: usize,
        frame: &SceneFrame,
        sink: &mut K,
    ) -> Result<(), PlaybackError> {
        let mut attempt = 0;
        loop {
            match sink.write_frame(num, frame) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.export_retries => {
                    attempt += 1;
                    log::warn!("Export of frame {} failed ({}), retrying", num, e);
                }
                Err(source) => return Err(PlaybackError::ExportFailure { frame: num, source }),
            }
        }
    }
}
