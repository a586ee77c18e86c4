use crate::convert::EnumCache;
use crate::extension::record::RecordCache;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Shared flag a caller sets to stop a running read or write session.
///
/// The pipelines check it once per row, before the row is processed.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Receives the number of rows processed so far.
pub type ProgressFn<'a> = Box<dyn FnMut(usize) + 'a>;

/// Write sessions report progress every this many rows.
pub const WRITE_PROGRESS_INTERVAL: usize = 100;

/// Caches shared by every session of a host process.
///
/// Both caches are keyed by type identity and filled at most once per type,
/// so a context can be shared across threads behind an `Arc`.
#[derive(Debug, Default)]
pub struct BindContext {
    pub records: RecordCache,
    pub enums: EnumCache,
}

impl BindContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}
