//! The single analysis worker
//!
//! Frames are handed over on a watch channel, so a frame that arrives while
//! a cycle is in flight replaces any frame still waiting. At most one cycle
//! runs at a time.

use crate::error::VisionError;
use crate::frame::Frame;
use crate::pipeline::{AnalysisPipeline, CycleOutcome};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Counters collected over the worker's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Frames picked up by the worker
    pub received: u64,
    pub throttled: u64,
    pub failed: u64,
    pub completed: u64,
}

impl WorkerStats {
    fn record(&mut self, outcome: &CycleOutcome) {
        self.received += 1;
        match outcome {
            CycleOutcome::Throttled => self.throttled += 1,
            CycleOutcome::DetectorFailed(_) => self.failed += 1,
            CycleOutcome::Completed { .. } => self.completed += 1,
        }
    }
}

/// Capture-side handle for offering frames to the worker
#[derive(Clone)]
pub struct FrameSender {
    sender: Arc<watch::Sender<Option<Arc<Frame>>>>,
}

impl FrameSender {
    /// Offer a frame, replacing any frame not yet picked up
    pub fn submit(&self, frame: Frame) -> Result<(), VisionError> {
        if self.sender.is_closed() {
            return Err(VisionError::Processing("Analysis worker stopped".to_string()));
        }
        self.sender.send_replace(Some(Arc::new(frame)));
        Ok(())
    }
}

/// Owner handle for a running worker
pub struct WorkerHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<WorkerStats>,
}

impl WorkerHandle {
    /// Stop taking new frames and wait for the in-flight cycle to finish
    pub async fn shutdown(self) -> Result<WorkerStats, VisionError> {
        let _ = self.shutdown.send(true);
        self.join
            .await
            .map_err(|e| VisionError::Processing(format!("Analysis worker panicked: {}", e)))
    }
}

pub struct AnalysisWorker;

impl AnalysisWorker {
    /// Start the processing loop on its own task.
    ///
    /// Dropping the `WorkerHandle` detaches the worker: it keeps running
    /// until every `FrameSender` clone is dropped.
    pub fn spawn(mut pipeline: AnalysisPipeline) -> (FrameSender, WorkerHandle) {
        let (frame_tx, mut frames) = watch::channel::<Option<Arc<Frame>>>(None);
        let (shutdown_tx, mut shutdown) = watch::channel(false);

        let join = tokio::spawn(async move {
            info!("Analysis worker started");
            let mut stats = WorkerStats::default();
            let mut attached = true;

            loop {
                tokio::select! {
                    biased;

                    signal = shutdown.changed(), if attached => {
                        match signal {
                            Ok(()) if *shutdown.borrow_and_update() => break,
                            Ok(()) => {}
                            Err(_) => {
                                info!("Worker handle dropped, running until the frame sender closes");
                                attached = false;
                            }
                        }
                    }
                    changed = frames.changed() => {
                        if changed.is_err() {
                            warn!("Frame sender closed, stopping processing loop");
                            break;
                        }
                        let frame = frames.borrow_and_update().clone();
                        if let Some(frame) = frame {
                            let outcome = pipeline.process_frame(frame).await;
                            stats.record(&outcome);
                        }
                    }
                }
            }

            info!(
                "Analysis worker stopped: {} received, {} completed, {} throttled, {} failed",
                stats.received, stats.completed, stats.throttled, stats.failed
            );
            stats
        });

        (
            FrameSender {
                sender: Arc::new(frame_tx),
            },
            WorkerHandle {
                shutdown: shutdown_tx,
                join,
            },
        )
    }
}
