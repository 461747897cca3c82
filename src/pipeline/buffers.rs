//! Pipeline buffers
//!
//! Buffer A (intake) is an unbounded FIFO so the producer is never
//! blocked by downstream pacing; its depth is the generation backlog.
//! Buffer B (output) is bounded to the lead-ahead cushion plus one slot;
//! its depth is the jitter cushion seen by playback, and a full buffer is
//! the backpressure that stops the pacer racing ahead of the consumer.
//!
//! Each end is a moved, non-clonable handle, which enforces the
//! single-writer/single-reader discipline by ownership instead of locks.
//! Depth gauges are shared atomics so diagnostics can observe occupancy
//! from outside the pipeline.

use crate::data::PipelineItem;
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Shared occupancy gauge for one buffer
#[derive(Debug, Clone, Default)]
pub struct BufferDepth(Arc<AtomicUsize>);

impl BufferDepth {
    /// Current number of items held by the buffer
    pub fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    fn inc(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    fn dec(&self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Create Buffer A: unbounded, producer write end / pacer read end
pub fn intake_channel() -> (IntakeSender, IntakeReceiver, BufferDepth) {
    let (tx, rx) = mpsc::unbounded_channel();
    let depth = BufferDepth::default();
    (
        IntakeSender {
            tx,
            depth: depth.clone(),
        },
        IntakeReceiver {
            rx,
            depth: depth.clone(),
        },
        depth,
    )
}

/// Create Buffer B: bounded to `capacity`, pacer write end / consumer
/// read end
pub fn output_channel(capacity: usize) -> (OutputSender, OutputReceiver, BufferDepth) {
    let (tx, rx) = mpsc::channel(capacity);
    let depth = BufferDepth::default();
    (
        OutputSender {
            tx,
            depth: depth.clone(),
        },
        OutputReceiver {
            rx,
            depth: depth.clone(),
        },
        depth,
    )
}

/// Write end of Buffer A. Never blocks.
pub struct IntakeSender {
    tx: mpsc::UnboundedSender<PipelineItem>,
    depth: BufferDepth,
}

impl IntakeSender {
    /// Enqueue an item; fails only if the pacer has hung up
    pub fn send(&self, item: PipelineItem) -> Result<()> {
        self.tx
            .send(item)
            .map_err(|_| Error::ChannelClosed("intake"))?;
        self.depth.inc();
        Ok(())
    }
}

/// Read end of Buffer A
pub struct IntakeReceiver {
    rx: mpsc::UnboundedReceiver<PipelineItem>,
    depth: BufferDepth,
}

impl IntakeReceiver {
    /// Dequeue the next item, waiting while the buffer is empty.
    /// `None` means the producer hung up without an end-of-stream
    /// sentinel.
    pub async fn recv(&mut self) -> Option<PipelineItem> {
        let item = self.rx.recv().await;
        if item.is_some() {
            self.depth.dec();
        }
        item
    }

    /// Dequeue without waiting; `Ok(None)` when the buffer is empty
    pub fn try_recv(&mut self) -> Result<Option<PipelineItem>> {
        match self.rx.try_recv() {
            Ok(item) => {
                self.depth.dec();
                Ok(Some(item))
            }
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(Error::ChannelClosed("intake")),
        }
    }
}

/// Write end of Buffer B
pub struct OutputSender {
    tx: mpsc::Sender<PipelineItem>,
    depth: BufferDepth,
}

impl OutputSender {
    /// Reserve a slot, waiting while the cushion is full. This wait is
    /// the pacer's backpressure point: it cannot race more than the
    /// buffer capacity ahead of the consumer.
    pub async fn reserve(&self) -> Result<OutputPermit<'_>> {
        let permit = self
            .tx
            .reserve()
            .await
            .map_err(|_| Error::ChannelClosed("output"))?;
        Ok(OutputPermit {
            permit,
            depth: self.depth.clone(),
        })
    }
}

/// A reserved Buffer B slot
pub struct OutputPermit<'a> {
    permit: mpsc::Permit<'a, PipelineItem>,
    depth: BufferDepth,
}

impl OutputPermit<'_> {
    /// Release an item into the reserved slot (never waits)
    pub fn send(self, item: PipelineItem) {
        self.permit.send(item);
        self.depth.inc();
    }
}

/// Read end of Buffer B
pub struct OutputReceiver {
    rx: mpsc::Receiver<PipelineItem>,
    depth: BufferDepth,
}

impl OutputReceiver {
    /// Dequeue the next item, waiting while the buffer is empty
    pub async fn recv(&mut self) -> Option<PipelineItem> {
        std::future::poll_fn(|cx| self.poll_recv(cx)).await
    }

    /// Poll variant of [`recv`](Self::recv), used by the consumer's
    /// `Stream` impl
    pub fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<PipelineItem>> {
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(item)) => {
                self.depth.dec();
                Poll::Ready(Some(item))
            }
            other => other,
        }
    }
}
