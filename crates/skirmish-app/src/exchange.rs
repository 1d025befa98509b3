//! Two-slot frame exchange between the calc thread and the foreground.
//!
//! Exactly two `Frame` buffers exist. The calc thread owns one while it
//! writes a tick; the foreground owns the other while it reads. Buffers
//! change hands only by moving through the channels, so neither side can
//! ever hold the buffer the other is using.

use std::sync::mpsc::{self, Receiver, Sender};

use thiserror::Error;

use skirmish_core::state::Frame;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("the other side of the frame exchange hung up")]
    Disconnected,
}

/// Foreground end: holds the frame being read.
pub struct FrameExchange {
    current: Frame,
    filled: Receiver<Frame>,
    stale: Sender<Frame>,
}

/// Calc-thread end: borrows the spare buffer, fills it, hands it over.
pub struct CalcSlot {
    blank: Receiver<Frame>,
    filled: Sender<Frame>,
}

/// Create both ends with their buffers in place.
pub fn frame_exchange() -> (FrameExchange, CalcSlot) {
    let (filled_tx, filled_rx) = mpsc::channel();
    let (stale_tx, stale_rx) = mpsc::channel();
    // The spare buffer starts on the calc side's queue.
    let _ = stale_tx.send(Frame::with_capacity());
    (
        FrameExchange {
            current: Frame::with_capacity(),
            filled: filled_rx,
            stale: stale_tx,
        },
        CalcSlot {
            blank: stale_rx,
            filled: filled_tx,
        },
    )
}

impl FrameExchange {
    /// Block until the calc thread finishes a tick, take its frame, and
    /// hand the previous one back for reuse.
    pub fn swap(&mut self) -> Result<&Frame, ExchangeError> {
        let next = self.filled.recv().map_err(|_| ExchangeError::Disconnected)?;
        let stale = std::mem::replace(&mut self.current, next);
        self.stale
            .send(stale)
            .map_err(|_| ExchangeError::Disconnected)?;
        Ok(&self.current)
    }

    /// The most recently received frame.
    pub fn current(&self) -> &Frame {
        &self.current
    }
}

impl CalcSlot {
    /// Wait for the foreground to release a buffer.
    pub fn take(&self) -> Result<Frame, ExchangeError> {
        self.blank.recv().map_err(|_| ExchangeError::Disconnected)
    }

    pub fn publish(&self, frame: Frame) -> Result<(), ExchangeError> {
        self.filled
            .send(frame)
            .map_err(|_| ExchangeError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_alternate_between_sides() {
        let (mut front, calc) = frame_exchange();
        let front_buffer = front.current().draw.as_ptr();

        let mut frame = calc.take().unwrap();
        let calc_buffer = frame.draw.as_ptr();
        assert_ne!(front_buffer, calc_buffer);
        frame.time.tick = 1;
        calc.publish(frame).unwrap();

        assert_eq!(front.swap().unwrap().time.tick, 1);
        assert_eq!(front.current().draw.as_ptr(), calc_buffer);

        // The calc side now gets the buffer the foreground gave up.
        let frame = calc.take().unwrap();
        assert_eq!(frame.draw.as_ptr(), front_buffer);
        assert_ne!(frame.draw.as_ptr(), front.current().draw.as_ptr());
    }

    #[test]
    fn test_calc_waits_for_released_buffer() {
        let (_front, calc) = frame_exchange();
        let frame = calc.take().unwrap();
        calc.publish(frame).unwrap();
        // Both buffers are now on the foreground's side.
        assert!(calc.blank.try_recv().is_err());
    }

    #[test]
    fn test_hangup_is_reported() {
        let (mut front, calc) = frame_exchange();
        drop(calc);
        assert_eq!(front.swap().err(), Some(ExchangeError::Disconnected));

        let (front, calc) = frame_exchange();
        drop(front);
        // The spare buffer was queued before the hangup.
        let frame = calc.take().unwrap();
        assert_eq!(calc.publish(frame), Err(ExchangeError::Disconnected));
        assert_eq!(calc.take().err(), Some(ExchangeError::Disconnected));
    }
}
