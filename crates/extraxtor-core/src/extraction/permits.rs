//! Counting semaphore bounding simultaneous file copies.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;

/// A pool of copy slots backed by a bounded channel of tokens.
///
/// Each token in the channel is one free slot. [`acquire`](Self::acquire)
/// blocks until a token is available and the returned guard puts it back
/// when dropped, including on early returns and panics.
#[derive(Debug)]
pub struct CopyPermits {
    tokens_tx: Sender<()>,
    tokens_rx: Receiver<()>,
    slots: usize,
    in_use: AtomicUsize,
    peak: AtomicUsize,
}

impl CopyPermits {
    /// Creates a pool with `slots` permits. Zero is treated as one.
    #[must_use]
    pub fn new(slots: usize) -> Self {
        let slots = slots.max(1);
        let (tokens_tx, tokens_rx) = crossbeam_channel::bounded(slots);
        for _ in 0..slots {
            let _ = tokens_tx.try_send(());
        }
        Self {
            tokens_tx,
            tokens_rx,
            slots,
            in_use: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Blocks until a slot is free.
    pub fn acquire(&self) -> CopyPermit<'_> {
        // Both channel ends live in `self`, so `recv` cannot disconnect.
        let _ = self.tokens_rx.recv();
        let now = self.in_use.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        CopyPermit { pool: self }
    }

    /// Total number of slots.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Highest number of permits held at the same time so far.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// A held copy slot, released on drop.
#[derive(Debug)]
pub struct CopyPermit<'a> {
    pool: &'a CopyPermits,
}

impl Drop for CopyPermit<'_> {
    fn drop(&mut self) {
        self.pool.in_use.fetch_sub(1, Ordering::SeqCst);
        let _ = self.pool.tokens_tx.try_send(());
    }
}
