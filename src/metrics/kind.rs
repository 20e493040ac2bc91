/// Kinds of metric instruments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    /// A synchronous per-request part of a monotonic sum.
    Counter,
    /// A synchronous recorder of arbitrary values needing distribution stats.
    Measure,
    /// An asynchronous per-collection reporter of a monotonic sum.
    SumObserver,
    /// An asynchronous per-collection recorder of arbitrary values.
    ValueObserver,
}

impl InstrumentKind {
    /// Whether this is a synchronous kind of instrument.
    pub fn synchronous(&self) -> bool {
        matches!(self, InstrumentKind::Counter | InstrumentKind::Measure)
    }

    /// Whether this is an asynchronous kind of instrument.
    pub fn asynchronous(&self) -> bool {
        !self.synchronous()
    }

    /// Whether this kind of instrument exposes a non-decreasing sum.
    pub fn monotonic(&self) -> bool {
        matches!(
            self,
            InstrumentKind::Counter | InstrumentKind::SumObserver
        )
    }
}
