//! Grid engine: owns the record store and every piece of derived state.
//!
//! One `GridEngine` backs one grid surface. Each public operation runs the
//! whole chain (filter, sort, paginate, remap selection, notify) before it
//! returns, so observers and pulls never see a half-updated window.

use crate::adapter::ModelState;
use crate::observer::{GridObserver, GridSignal, SubscriptionId};
use crate::pagination::PaginationWindow;
use crate::pipeline;
use crate::selection::SelectionTracker;
use crate::store::RecordStore;
use std::fmt;
use tabula_core::{
    CellValue, GridConfig, GridResult, PageConfig, PageInfo, QueryState, Record, RecordId,
    Schema, SortDirection, SortKey,
};

pub struct GridEngine {
    pub(crate) schema: Schema,
    pub(crate) store: RecordStore,
    pub(crate) query: QueryState,
    pub(crate) view: Vec<RecordId>,
    pub(crate) window: PaginationWindow,
    pub(crate) selection: SelectionTracker,
    pub(crate) auto_advance_on_insert: bool,
    observers: Vec<(SubscriptionId, Box<dyn GridObserver>)>,
    next_subscription: u64,
    state: ModelState,
    batch_depth: usize,
    last_page_info: Option<PageInfo>,
}

impl GridEngine {
    /// Create an empty grid.
    pub fn new(schema: Schema, page: PageConfig) -> Self {
        Self {
            schema,
            store: RecordStore::new(),
            query: QueryState::default(),
            view: Vec::new(),
            window: PaginationWindow::new(page.page_size),
            selection: SelectionTracker::new(),
            auto_advance_on_insert: page.auto_advance_on_insert,
            observers: Vec::new(),
            next_subscription: 0,
            state: ModelState::Clean,
            batch_depth: 0,
            last_page_info: None,
        }
    }

    /// Create a grid described by a validated configuration.
    pub fn from_config(config: &GridConfig) -> GridResult<Self> {
        config.validate()?;
        let schema = config.schema()?;
        tracing::debug!(
            columns = schema.column_count(),
            page_size = config.page.page_size,
            "Grid engine configured"
        );
        Ok(Self::new(schema, config.page.clone()))
    }

    /// Create a grid pre-seeded with `rows`; identities are assigned 1..=n.
    pub fn with_records(
        schema: Schema,
        page: PageConfig,
        rows: Vec<Vec<CellValue>>,
    ) -> GridResult<Self> {
        let mut engine = Self::new(schema, page);
        engine.replace_all(rows)?;
        Ok(engine)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn query_state(&self) -> &QueryState {
        &self.query
    }

    pub fn model_state(&self) -> ModelState {
        self.state
    }

    pub fn auto_advance_on_insert(&self) -> bool {
        self.auto_advance_on_insert
    }

    pub fn set_auto_advance_on_insert(&mut self, enabled: bool) {
        self.auto_advance_on_insert = enabled;
    }

    pub fn page_size(&self) -> usize {
        self.window.page_size()
    }

    pub fn current_page(&self) -> usize {
        self.window.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.window.total_pages()
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo {
            current_page: self.window.current_page(),
            total_pages: self.window.total_pages(),
            total_count: self.view.len(),
            total_records: self.store.len(),
        }
    }

    /// Filtered and sorted identities, across all pages.
    pub fn view(&self) -> &[RecordId] {
        &self.view
    }

    /// Identities on the current page, in display order.
    pub fn visible_ids(&self) -> &[RecordId] {
        &self.view[self.window.range()]
    }

    pub fn visible_records(&self) -> impl Iterator<Item = &Record> {
        self.visible_ids()
            .iter()
            .filter_map(move |&id| self.store.get(id))
    }

    /// Window row at which `id` is currently displayed.
    pub fn window_row_of(&self, id: RecordId) -> Option<usize> {
        self.visible_ids().iter().position(|&candidate| candidate == id)
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.store.get(id)
    }

    /// All records in store order, ignoring filter and paging.
    pub fn records(&self) -> &[Record] {
        self.store.records()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // ------------------------------------------------------------------------
    // Query pipeline
    // ------------------------------------------------------------------------

    /// Keep records with any column containing `text` (case-insensitive).
    pub fn apply_filter(&mut self, text: &str) {
        tracing::debug!(filter = text, "Applying filter");
        self.query.filter_text = text.to_string();
        self.window.goto(1);
        self.rebuild_view();
        self.mark_changed();
    }

    pub fn clear_filter(&mut self) {
        self.apply_filter("");
    }

    /// Sort by `column`. Returns false (and changes nothing) for an unknown column.
    pub fn apply_sort(&mut self, column: usize, direction: SortDirection) -> bool {
        if column >= self.schema.column_count() {
            tracing::debug!(column, "Ignoring sort on unknown column");
            return false;
        }
        tracing::debug!(column, ?direction, "Applying sort");
        self.query.sort = Some(SortKey { column, direction });
        self.window.goto(1);
        self.rebuild_view();
        self.mark_changed();
        true
    }

    /// Flip the direction on the active column, or sort a new column ascending.
    pub fn toggle_sort(&mut self, column: usize) -> bool {
        if column >= self.schema.column_count() {
            tracing::debug!(column, "Ignoring sort toggle on unknown column");
            return false;
        }
        let key = self.query.toggled(column);
        self.apply_sort(key.column, key.direction)
    }

    /// Return to store order.
    pub fn clear_sort(&mut self) {
        if self.query.sort.take().is_none() {
            return;
        }
        self.window.goto(1);
        self.rebuild_view();
        self.mark_changed();
    }

    // ------------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------------

    pub fn goto_page(&mut self, page: usize) {
        if self.window.goto(page) {
            self.sync_selection();
            self.mark_changed();
        }
    }

    pub fn next_page(&mut self) {
        if self.window.next() {
            self.sync_selection();
            self.mark_changed();
        }
    }

    pub fn prev_page(&mut self) {
        if self.window.prev() {
            self.sync_selection();
            self.mark_changed();
        }
    }

    pub fn first_page(&mut self) {
        self.goto_page(1);
    }

    pub fn last_page(&mut self) {
        self.goto_page(self.window.total_pages());
    }

    /// Change rows per page. Zero is ignored.
    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 {
            tracing::debug!("Ignoring zero page size");
            return;
        }
        if self.window.set_page_size(page_size) {
            self.sync_selection();
            self.mark_changed();
        }
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Select the record at `window_row`. Out-of-range rows are ignored.
    pub fn select(&mut self, window_row: usize) -> bool {
        let range = self.window.range();
        let selected = self.selection.select(&self.view[range], window_row);
        if !selected {
            tracing::debug!(window_row, "Ignoring selection outside visible window");
        }
        selected
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.selection.window_row()
    }

    pub fn selected_id(&self) -> Option<RecordId> {
        self.selection.selected_id()
    }

    /// The selected record, or `None` if nothing is selected or it is gone.
    pub fn selected_record(&self) -> Option<&Record> {
        self.selection.selected_id().and_then(|id| self.store.get(id))
    }

    // ------------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------------

    pub fn subscribe(&mut self, observer: Box<dyn GridObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(candidate, _)| *candidate != id);
        self.observers.len() != before
    }

    /// Run several operations and notify observers once at the end.
    ///
    /// Nested batches notify when the outermost one finishes. Nothing is sent
    /// if no operation changed the window.
    ///
    /// If `f` panics the batch is still closed, but nothing is sent until the
    /// next operation.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mut scope = BatchScope::open(self);
        let result = f(&mut *scope.engine);
        drop(scope);
        result
    }

    // ------------------------------------------------------------------------
    // Recompute plumbing
    // ------------------------------------------------------------------------

    /// Rerun the pipeline and everything downstream of it.
    pub(crate) fn rebuild_view(&mut self) {
        self.view = pipeline::compute_view(&self.store, &self.query, self.schema.column_count());
        self.window.recompute(self.view.len());
        self.sync_selection();
        tracing::trace!(
            view_len = self.view.len(),
            page = self.window.current_page(),
            total_pages = self.window.total_pages(),
            "View recomputed"
        );
    }

    pub(crate) fn sync_selection(&mut self) {
        let range = self.window.range();
        self.selection.remap(&self.view[range]);
    }

    pub(crate) fn mark_changed(&mut self) {
        self.state = ModelState::Stale;
        if self.batch_depth == 0 {
            self.emit();
        }
    }

    fn emit(&mut self) {
        let info = self.page_info();
        let page_changed = self.last_page_info != Some(info);
        for (_, observer) in self.observers.iter_mut() {
            observer.deliver(GridSignal::RowsChanged);
            if page_changed {
                observer.deliver(GridSignal::PageInfoChanged(info));
            }
        }
        self.last_page_info = Some(info);
        self.state = ModelState::Clean;
    }
}

/// Holds one level of `batch_depth` and releases it on drop, unwinding included.
struct BatchScope<'a> {
    engine: &'a mut GridEngine,
}

impl<'a> BatchScope<'a> {
    fn open(engine: &'a mut GridEngine) -> Self {
        engine.batch_depth += 1;
        Self { engine }
    }
}

impl Drop for BatchScope<'_> {
    fn drop(&mut self) {
        self.engine.batch_depth -= 1;
        if std::thread::panicking() {
            tracing::warn!(depth = self.engine.batch_depth, "Batch closed by panic");
            return;
        }
        if self.engine.batch_depth == 0 && self.engine.state == ModelState::Stale {
            self.engine.emit();
        }
    }
}

impl fmt::Debug for GridEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridEngine")
            .field("columns", &self.schema.column_count())
            .field("records", &self.store.len())
            .field("query", &self.query)
            .field("page", &self.page_info())
            .field("selected", &self.selection.selected_id())
            .field("observers", &self.observers.len())
            .field("state", &self.state)
            .finish()
    }
}
