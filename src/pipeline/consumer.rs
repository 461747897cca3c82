//! Consumer: stage 3, the network-facing read side
//!
//! Pulled by the external transport once per its own frame tick. The
//! pull blocks while Buffer B is empty — that blocking is the mechanism
//! that holds the remote peer to 1x real time, so the consumer carries
//! no timing logic of its own and never buffers beyond the unit in hand.

use crate::data::{AvUnit, PipelineItem};
use crate::error::{Error, Result};
use crate::pipeline::buffers::OutputReceiver;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The transport-facing pull side of the pipeline
pub struct Consumer {
    output: OutputReceiver,
    samples_per_frame: usize,
    next_expected: u64,
    done: bool,
}

impl Consumer {
    pub(crate) fn new(output: OutputReceiver, samples_per_frame: usize) -> Self {
        Self {
            output,
            samples_per_frame,
            next_expected: 0,
            done: false,
        }
    }

    /// Pull the next due unit, waiting until the pacer releases it.
    /// Returns `Ok(None)` once the stream has completed; every call
    /// after that also returns `Ok(None)`.
    pub async fn pull_next_unit(&mut self) -> Result<Option<AvUnit>> {
        if self.done {
            return Ok(None);
        }
        match self.output.recv().await {
            Some(item) => self.admit(item),
            None => {
                self.done = true;
                Err(Error::ChannelClosed("output"))
            }
        }
    }

    /// Units handed to the transport so far
    pub fn units_pulled(&self) -> u64 {
        self.next_expected
    }

    fn admit(&mut self, item: PipelineItem) -> Result<Option<AvUnit>> {
        match item {
            PipelineItem::Unit(unit) => {
                unit.validate(self.next_expected, self.samples_per_frame)?;
                self.next_expected += 1;
                Ok(Some(unit))
            }
            PipelineItem::EndOfStream => {
                self.done = true;
                Ok(None)
            }
        }
    }
}

/// Stream view for transports that prefer `futures::Stream`; yields the
/// same units as [`Consumer::pull_next_unit`] and ends at end-of-stream.
impl Stream for Consumer {
    type Item = Result<AvUnit>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.output.poll_recv(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(item)) => match this.admit(item) {
                Ok(Some(unit)) => Poll::Ready(Some(Ok(unit))),
                Ok(None) => Poll::Ready(None),
                Err(e) => {
                    this.done = true;
                    Poll::Ready(Some(Err(e)))
                }
            },
            Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(Some(Err(Error::ChannelClosed("output"))))
            }
        }
    }
}
