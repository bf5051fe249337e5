use lasso::{Spur, ThreadedRodeo};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for element IDs: fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Monotonic counter shared by every allocated ID, so IDs are never reused
/// within a process (even across scene clears and reloads).
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A stable, interned identifier for a placed element.
///
/// The ID is carried by both the model record and every view derived from it,
/// so views are correlated to elements by lookup, never by position.
/// Internally a `Spur` index (4 bytes, Copy, O(1) Eq and Hash).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    /// Intern a string as an ElementId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Allocate a fresh ID with a kind prefix (e.g. `circle_0`, `arrow_7`).
    ///
    /// Interned strings are never freed, so each load of a layout grows the
    /// interner by one entry per element for the life of the process.
    pub fn with_prefix(prefix: &str) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }

    /// Look up an already-allocated ID without interning a new string.
    /// Used at the host boundary, where unknown strings must not grow the interner.
    pub fn lookup(s: &str) -> Option<Self> {
        INTERNER.get(s).map(ElementId)
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
