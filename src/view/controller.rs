//! View-state controller: one listing view from mount to unmount
//!
//! The controller owns the [`RecordStore`], the [`ListState`] and the
//! [`MutationCoordinator`] of a view and turns them into a [`DisplayState`].
//!
//! # Fetch generations
//!
//! Every fetch is issued with a [`FetchTicket`] carrying a generation number.
//! A response is applied only if its ticket is the latest one issued and the
//! view is still mounted; anything else is dropped and reported with
//! [`ViewEvent::StaleResponseDropped`].
//!
//! ```rust,ignore
//! let mut view = ViewController::new(api, ViewConfig::for_record::<User>(), session);
//! view.mount().await;
//!
//! view.search("jane").await;
//! view.sort_by("email");
//! view.toggle_flag(&id, "blocked", true).await?;
//!
//! match view.display() {
//!     DisplayState::Loaded { items, window, .. } => render(items, window),
//!     DisplayState::Errored { message } => show(message),
//!     DisplayState::Loading => spinner(),
//! }
//! ```

use crate::config::{PaginationMode, ViewConfig};
use crate::core::error::{FetchError, MutationError};
use crate::core::events::{EventBus, EventEnvelope, Notice, NoticeBoard, ViewEvent};
use crate::core::query::{ListQuery, Page, PageWindow, SortSpec};
use crate::core::record::{Record, RecordId};
use crate::core::service::{Ack, Fields, RecordApi};
use crate::core::session::SessionContext;
use crate::core::validation::FormRules;
use crate::view::mutation::{MutationCoordinator, Reconcile};
use crate::view::state::ListState;
use crate::view::store::RecordStore;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// What a view shows
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState<T> {
    Loading,
    Loaded {
        /// Records of the current page, filtered and sorted
        items: Vec<T>,
        window: PageWindow,
        /// No record left after filtering
        is_empty: bool,
    },
    Errored {
        message: String,
    },
}

/// Handle on one issued fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: ListQuery,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Page requested, in server-paginated views
    pub fn query(&self) -> ListQuery {
        self.query
    }
}

/// A collection as fetched
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    All(Vec<T>),
    Page(Page<T>),
}

/// What became of a fetch response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded,
    Failed,
    /// A newer fetch was issued in the meantime
    Stale,
    /// The view was unmounted in the meantime
    Unmounted,
}

/// Runs fetches without borrowing the controller
///
/// Several fetches may be in flight at once; the controller decides which
/// response wins when they are handed to [`ViewController::complete_fetch`].
pub struct Fetcher<T, A> {
    api: Arc<A>,
    mode: PaginationMode,
    timeout: Duration,
    _record: PhantomData<fn() -> T>,
}

impl<T, A> Clone for Fetcher<T, A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            mode: self.mode,
            timeout: self.timeout,
            _record: PhantomData,
        }
    }
}

impl<T: Record, A: RecordApi<T>> Fetcher<T, A> {
    /// Fetch what `ticket` asks for, within the configured timeout
    pub async fn run(&self, ticket: &FetchTicket) -> Result<Fetched<T>, FetchError> {
        let call = async {
            match self.mode {
                PaginationMode::Local => self.api.list().await.map(Fetched::All),
                PaginationMode::Server => self.api.list_page(ticket.query).await.map(Fetched::Page),
            }
        };

        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

/// Controller of one listing view
pub struct ViewController<T, A> {
    api: Arc<A>,
    config: ViewConfig,
    session: SessionContext,
    store: RecordStore<T>,
    list: ListState,
    mutations: MutationCoordinator<T, A>,
    bus: EventBus,
    generation: u64,
    mounted: bool,
}

impl<T, A> ViewController<T, A>
where
    T: Record,
    A: RecordApi<T>,
{
    pub fn new(api: Arc<A>, config: ViewConfig, session: SessionContext) -> Self {
        Self::with_event_bus(api, config, session, EventBus::default())
    }

    /// Controller publishing on an existing bus
    pub fn with_event_bus(
        api: Arc<A>,
        config: ViewConfig,
        session: SessionContext,
        bus: EventBus,
    ) -> Self {
        let search_fields = if config.search_fields.is_empty() {
            T::searchable_fields().iter().map(|f| f.to_string()).collect()
        } else {
            config.search_fields.clone()
        };
        let list = ListState::new(config.page_size, search_fields, config.default_sort.clone());
        let notices = NoticeBoard::new(config.notice_ttl(), bus.clone());
        let mutations = MutationCoordinator::new(Arc::clone(&api), &config, notices);

        Self {
            api,
            config,
            session,
            store: RecordStore::new(),
            list,
            mutations,
            bus,
            generation: 0,
            mounted: false,
        }
    }

    /// Validate create and update forms with `rules`
    pub fn with_rules(mut self, rules: FormRules) -> Self {
        self.mutations = self.mutations.with_rules(rules);
        self
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn store(&self) -> &RecordStore<T> {
        &self.store
    }

    pub fn list_state(&self) -> &ListState {
        &self.list
    }

    /// Coordinator shared with this view, for mutations run concurrently
    pub fn mutations(&self) -> &MutationCoordinator<T, A> {
        &self.mutations
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.bus.subscribe()
    }

    /// Notice currently on display
    pub fn notice(&self) -> Option<Notice> {
        self.mutations.notices().current()
    }

    /// Whether the controls of row `id` should be disabled
    pub fn in_flight(&self, id: &RecordId) -> bool {
        self.mutations.in_flight(id)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Generation of the latest fetch issued
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Show the view and load its collection
    pub async fn mount(&mut self) -> FetchOutcome {
        self.mounted = true;
        tracing::debug!(
            resource = %self.config.resource,
            profile = ?self.session.profile_id(),
            "View mounted"
        );
        self.refresh().await
    }

    /// Stop the view; responses still in flight will be discarded
    pub fn unmount(&mut self) {
        self.mounted = false;
        tracing::debug!(resource = %self.config.resource, "View unmounted");
    }

    /// Refetch the collection
    pub async fn refresh(&mut self) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let result = self.fetcher().run(&ticket).await;
        self.complete_fetch(ticket, result)
    }

    /// Enter the loading state and issue a new generation
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.store.begin_loading();
        tracing::debug!(
            resource = %self.config.resource,
            generation = self.generation,
            "Fetch started"
        );
        self.bus.publish(ViewEvent::LoadStarted {
            resource: self.config.resource.clone(),
            generation: self.generation,
        });

        FetchTicket {
            generation: self.generation,
            query: ListQuery::new(self.list.page(), self.list.page_size()),
        }
    }

    pub fn fetcher(&self) -> Fetcher<T, A> {
        Fetcher {
            api: Arc::clone(&self.api),
            mode: self.config.pagination,
            timeout: self.config.request_timeout(),
            _record: PhantomData,
        }
    }

    /// Apply a fetch response, unless it is stale
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Fetched<T>, FetchError>,
    ) -> FetchOutcome {
        let resource = self.config.resource.clone();

        if !self.mounted || ticket.generation != self.generation {
            tracing::debug!(
                resource = %resource,
                generation = ticket.generation,
                latest = self.generation,
                mounted = self.mounted,
                "Dropping stale response"
            );
            self.bus.publish(ViewEvent::StaleResponseDropped {
                resource,
                generation: ticket.generation,
            });
            return if self.mounted {
                FetchOutcome::Stale
            } else {
                FetchOutcome::Unmounted
            };
        }

        match result {
            Ok(fetched) => {
                let count = match fetched {
                    Fetched::All(records) => {
                        let count = records.len();
                        self.store.replace(records);
                        count
                    }
                    Fetched::Page(page) => {
                        let count = page.items.len();
                        self.store.replace_page(page.items, page.total, page.total_pages);
                        count
                    }
                };
                tracing::debug!(resource = %resource, generation = ticket.generation, count, "Fetch loaded");
                self.bus.publish(ViewEvent::Loaded {
                    resource,
                    generation: ticket.generation,
                    count,
                });
                FetchOutcome::Loaded
            }
            Err(error) => {
                tracing::warn!(
                    resource = %resource,
                    generation = ticket.generation,
                    code = error.error_code(),
                    "Fetch failed: {}",
                    error
                );
                self.bus.publish(ViewEvent::LoadFailed {
                    resource,
                    generation: ticket.generation,
                    code: error.error_code().to_string(),
                });
                self.store.fail(error);
                FetchOutcome::Failed
            }
        }
    }

    // =========================================================================
    // Display
    // =========================================================================

    /// Current display state
    pub fn display(&self) -> DisplayState<T> {
        match &self.store {
            RecordStore::Loading => DisplayState::Loading,
            RecordStore::Failed(_) => DisplayState::Errored {
                message: self.config.generic_error_message.clone(),
            },
            RecordStore::Loaded {
                records,
                total,
                total_pages,
            } => match (self.config.pagination, total_pages) {
                (PaginationMode::Server, Some(total_pages)) => {
                    let items = self.list.arrange(records);
                    let window = PageWindow::from_remote(
                        self.list.page(),
                        self.list.page_size(),
                        *total,
                        *total_pages,
                    );
                    DisplayState::Loaded {
                        is_empty: items.is_empty(),
                        items,
                        window,
                    }
                }
                _ => {
                    let view = self.list.apply(records);
                    DisplayState::Loaded {
                        is_empty: view.is_empty(),
                        items: view.items,
                        window: view.window,
                    }
                }
            },
        }
    }

    /// Page window of the loaded collection
    pub fn window(&self) -> Option<PageWindow> {
        match self.display() {
            DisplayState::Loaded { window, .. } => Some(window),
            _ => None,
        }
    }

    // =========================================================================
    // Controls
    // =========================================================================

    /// Change the search text and go back to page 1
    pub async fn search(&mut self, text: impl Into<String>) {
        let page = self.list.page();
        self.list.set_search(text);
        if page != self.list.page() {
            self.page_changed().await;
        }
    }

    /// Sort by `key`, flipping the direction if it is already active
    pub fn sort_by(&mut self, key: &str) -> SortSpec {
        self.list.request_sort(key).clone()
    }

    /// Jump to `page` if it exists
    pub async fn go_to_page(&mut self, page: usize) -> bool {
        let allowed = self.window().is_some_and(|w| w.can_go_to(page));
        if allowed && page != self.list.page() && self.list.set_page(page) {
            self.page_changed().await;
        }
        allowed
    }

    pub async fn next_page(&mut self) -> bool {
        let moved = self
            .window()
            .is_some_and(|window| self.list.next_page(&window));
        if moved {
            self.page_changed().await;
        }
        moved
    }

    pub async fn prev_page(&mut self) -> bool {
        let moved = self
            .window()
            .is_some_and(|window| self.list.prev_page(&window));
        if moved {
            self.page_changed().await;
        }
        moved
    }

    /// Change the page size and go back to page 1
    pub async fn set_page_size(&mut self, page_size: usize) {
        self.list.set_page_size(page_size);
        self.page_changed().await;
    }

    async fn page_changed(&mut self) {
        if self.config.pagination == PaginationMode::Server && self.mounted {
            self.refresh().await;
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn create(&mut self, fields: Fields) -> Result<Ack<T>, MutationError> {
        let outcome = self.mutations.create(fields).await?;
        self.reconcile(outcome.reconcile).await;
        Ok(outcome.ack)
    }

    pub async fn update(&mut self, id: &RecordId, fields: Fields) -> Result<Ack<T>, MutationError> {
        let outcome = self.mutations.update(id, fields).await?;
        self.reconcile(outcome.reconcile).await;
        Ok(outcome.ack)
    }

    pub async fn remove(&mut self, id: &RecordId) -> Result<Ack<T>, MutationError> {
        let outcome = self.mutations.remove(id).await?;
        self.reconcile(outcome.reconcile).await;
        Ok(outcome.ack)
    }

    pub async fn toggle_flag(
        &mut self,
        id: &RecordId,
        flag: &str,
        value: bool,
    ) -> Result<Ack<T>, MutationError> {
        let outcome = self.mutations.toggle_flag(id, flag, value).await?;
        self.reconcile(outcome.reconcile).await;
        Ok(outcome.ack)
    }

    /// Delete every record; the caller is expected to have confirmed
    pub async fn clear_all(&mut self) -> Result<Ack<T>, MutationError> {
        let outcome = self.mutations.clear_all().await?;
        self.reconcile(outcome.reconcile).await;
        Ok(outcome.ack)
    }

    /// Bring the store in line with a successful mutation
    pub async fn reconcile(&mut self, reconcile: Reconcile<T>) {
        if !self.mounted {
            return;
        }

        match reconcile {
            Reconcile::Patch(patch) => {
                let target = patch.target().cloned();
                if !self.store.apply(patch) {
                    tracing::debug!(resource = %self.config.resource, "Patch did not apply, reloading");
                    self.refresh().await;
                    return;
                }
                if self.config.pagination == PaginationMode::Server {
                    self.store.repaginate(self.list.page_size());
                }
                if let Some(id) = target {
                    tracing::debug!(resource = %self.config.resource, id = %id, "Record patched");
                    self.bus.publish(ViewEvent::RecordPatched {
                        resource: self.config.resource.clone(),
                        id,
                    });
                }
            }
            Reconcile::Reload => {
                self.refresh().await;
            }
        }
    }
}
