//! Live progress estimate across concurrently transferring segments.
//!
//! `progress = floor(R * (D*S + T*A) / (S*N))` where `D` is the number of
//! segments already downloaded at the last reset, `N` the expected total, `S`
//! the summed expected bytes of segments seen since reset (at least 1), `T`
//! their summed transferred bytes and `A` how many of them there are.
//!
//! The counters are independent atomics. Writers bump `S` before `A` and both
//! before any `T` that depends on them; [`AggregateProgress::compute`] reads in
//! the opposite order (`T`, `A`, `S`) so a torn snapshot can only
//! under-estimate. The published value is clamped to `[0, R]` and only moves
//! down on [`AggregateProgress::reset`].

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

#[derive(Debug)]
pub struct AggregateProgress {
    resolution: u64,
    total_parts: AtomicU64,
    downloaded_at_reset: AtomicU64,
    expected_bytes: AtomicI64,
    active: AtomicU64,
    transferred_bytes: AtomicI64,
    published: AtomicU64,
}

impl AggregateProgress {
    pub fn new(resolution: u64) -> Self {
        Self {
            resolution: resolution.max(1),
            total_parts: AtomicU64::new(0),
            downloaded_at_reset: AtomicU64::new(0),
            expected_bytes: AtomicI64::new(0),
            active: AtomicU64::new(0),
            transferred_bytes: AtomicI64::new(0),
            published: AtomicU64::new(0),
        }
    }

    pub fn resolution(&self) -> u64 {
        self.resolution
    }

    /// Starts a new run: `downloaded` of `total` parts are already complete.
    pub fn reset(&self, downloaded: u64, total: u64) {
        self.total_parts.store(total, Ordering::SeqCst);
        self.downloaded_at_reset.store(downloaded.min(total), Ordering::SeqCst);
        self.expected_bytes.store(0, Ordering::SeqCst);
        self.active.store(0, Ordering::SeqCst);
        self.transferred_bytes.store(0, Ordering::SeqCst);
        self.published.store(self.compute(), Ordering::SeqCst);
    }

    /// A segment's expected size changed by `delta`; `first_seen` registers it as active.
    pub fn add_expected(&self, delta: i64, first_seen: bool) {
        self.expected_bytes.fetch_add(delta, Ordering::SeqCst);
        if first_seen {
            self.active.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn add_transferred(&self, delta: i64) {
        self.transferred_bytes.fetch_add(delta, Ordering::SeqCst);
    }

    /// Current estimate from the raw counters, clamped to `[0, R]`.
    pub fn compute(&self) -> u64 {
        let t = self.transferred_bytes.load(Ordering::SeqCst).max(0) as u128;
        let a = self.active.load(Ordering::SeqCst) as u128;
        let s = self.expected_bytes.load(Ordering::SeqCst).max(1) as u128;
        let d = self.downloaded_at_reset.load(Ordering::SeqCst) as u128;
        let n = self.total_parts.load(Ordering::SeqCst) as u128;
        let r = self.resolution as u128;
        if n == 0 {
            return self.resolution;
        }
        let value = r * (d * s + t * a) / (s * n);
        value.min(r) as u64
    }

    /// Last published value.
    pub fn current(&self) -> u64 {
        self.published.load(Ordering::SeqCst)
    }

    /// Raises the published value to the current estimate.
    /// Returns the new value if it went up.
    pub fn publish(&self) -> Option<u64> {
        let value = self.compute();
        let prev = self.published.fetch_max(value, Ordering::SeqCst);
        (value > prev).then_some(value)
    }

    pub fn total_parts(&self) -> u64 {
        self.total_parts.load(Ordering::SeqCst)
    }
}
