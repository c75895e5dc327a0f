//! Signals sent from the engine to the rendering surface.

use tabula_core::PageInfo;

/// One outbound signal, as delivered to a [`GridObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSignal {
    /// The visible window is stale; re-issue pulls.
    RowsChanged,
    /// Status-label information changed.
    PageInfoChanged(PageInfo),
}

/// Receiver of engine signals, typically the surface that pulls rows.
///
/// Observers are called after the engine has finished recomputing, once per
/// operation or batch. They cannot reenter the engine while it is notifying.
pub trait GridObserver {
    fn rows_changed(&mut self);

    fn page_info_changed(&mut self, info: PageInfo) {
        let _ = info;
    }

    fn deliver(&mut self, signal: GridSignal) {
        match signal {
            GridSignal::RowsChanged => self.rows_changed(),
            GridSignal::PageInfoChanged(info) => self.page_info_changed(info),
        }
    }
}

/// Handle returned by `GridEngine::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
