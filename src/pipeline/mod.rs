//! The three-stage pacing pipeline
//!
//! Producer → Buffer A (unbounded) → Pacer → Buffer B (bounded) →
//! Consumer. The pacer is the sole clock; producer and consumer are
//! rate-agnostic, and ordering across the stages is enforced only
//! through the two FIFO buffers.

pub mod buffers;
pub mod consumer;
pub mod pacer;
pub mod producer;

pub use buffers::BufferDepth;
pub use consumer::Consumer;
pub use pacer::{Pacer, PacerReport};
pub use producer::{Producer, ProducerReport};
