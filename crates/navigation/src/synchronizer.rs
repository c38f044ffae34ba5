use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use catalog::CatalogRegistry;
use routing::{Location, RouteDescriptor, RouteKind, RouteMatcher, Viewport};
use runtime::{CascadeToken, DebounceTicket, Debouncer, Diagnostic, DiagnosticLog, GenerationSource, Timer};
use tracing::{debug, info};

use crate::config::SynchronizerConfig;
use crate::fetch::{Fetch, LocalBoxFuture};
use crate::history::{History, HistoryMode};
use crate::listeners::{ListenerSet, Subscription};
use crate::loader::{CascadeOutcome, CascadingResourceLoader, LoadError, LoadResult};
use crate::selection::SelectionEvent;
use crate::state::{NavigationState, NavigationUpdate};
use crate::store::NavigationStateStore;

/// `ProcessingRoute` while an inbound cascade is in flight. Outbound URL
/// writes are suppressed in that phase, which is what keeps a URL-driven
/// commit from being written straight back to the URL.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ProcessingRoute,
}

/// How an inbound cascade ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeReport {
    /// The path is outside the route grammar; nothing was changed.
    RouteNotMatched { path: String },
    /// The deepest resolvable state was committed. `error` says why the
    /// cascade stopped short of the requested route, if it did.
    Committed {
        state: NavigationState,
        error: Option<LoadError>,
    },
    /// A newer route or a user navigation took over before commit.
    Superseded,
}

struct Inner<F, H, T> {
    matcher: RouteMatcher,
    loader: CascadingResourceLoader<F>,
    store: NavigationStateStore,
    history: H,
    timer: T,
    config: SynchronizerConfig,
    phase: Cell<Phase>,
    generations: GenerationSource,
    pending_mode: Cell<Option<HistoryMode>>,
    viewport: RefCell<Debouncer<Viewport>>,
    selection: Rc<ListenerSet<SelectionEvent>>,
    diagnostics: RefCell<DiagnosticLog>,
}

/// Two-way binding between the URL and the [`NavigationStateStore`].
///
/// Inbound (startup, back/forward): the path is matched, a cascade resolves
/// it, and the deepest valid state is committed. Outbound (UI changes): the
/// committed state is encoded and written with pushState or replaceState.
/// Every inbound cascade carries a [`CascadeToken`]; starting another one,
/// or a user navigation, makes earlier tokens stale so at most one cascade
/// ever commits.
pub struct StateSynchronizer<F, H, T> {
    inner: Rc<Inner<F, H, T>>,
    outbound: Option<Subscription>,
}

impl<F, H, T> StateSynchronizer<F, H, T>
where
    F: Fetch + 'static,
    H: History + 'static,
    T: Timer + 'static,
{
    pub fn new(
        store: NavigationStateStore,
        loader: CascadingResourceLoader<F>,
        history: H,
        timer: T,
        config: SynchronizerConfig,
    ) -> Self {
        let inner = Rc::new(Inner {
            matcher: RouteMatcher::with_base_path(&config.base_path),
            loader,
            store,
            history,
            timer,
            config,
            phase: Cell::new(Phase::Idle),
            generations: GenerationSource::new(),
            pending_mode: Cell::new(None),
            viewport: RefCell::new(Debouncer::new()),
            selection: Rc::default(),
            diagnostics: RefCell::new(DiagnosticLog::new()),
        });

        let weak: Weak<Inner<F, H, T>> = Rc::downgrade(&inner);
        let outbound = inner.store.subscribe(move |state| {
            if let Some(inner) = weak.upgrade() {
                inner.write_outbound(state);
            }
        });

        Self {
            inner,
            outbound: Some(outbound),
        }
    }

    /// Processes the URL the page was opened with. A `mapCenter`/`mapZoom`
    /// pair in the query is announced as a [`SelectionEvent::Location`]
    /// before the cascade starts.
    pub fn start(&self) -> LocalBoxFuture<'static, CascadeReport> {
        let location = self.inner.history.location();
        if let Some(viewport) = Viewport::from_query(&location.query) {
            self.inner.selection.emit(&SelectionEvent::location(viewport));
        }
        Inner::begin_inbound(&self.inner, location)
    }

    /// Call after the browser moved through history (popstate).
    pub fn handle_popstate(&self) -> LocalBoxFuture<'static, CascadeReport> {
        let location = self.inner.history.location();
        Inner::begin_inbound(&self.inner, location)
    }

    /// Applies a UI-driven change and writes it to the URL with `mode`.
    ///
    /// Any in-flight inbound cascade is superseded first, so a slow load of
    /// an older URL cannot overwrite what the user just picked.
    pub fn request_navigation(
        &self,
        update: impl Into<NavigationUpdate>,
        mode: HistoryMode,
    ) -> NavigationState {
        let inner = &self.inner;
        if inner.phase.get() == Phase::ProcessingRoute {
            debug!(
                generation = inner.generations.current_generation(),
                "user navigation supersedes in-flight cascade"
            );
        }
        inner.generations.invalidate();
        inner.phase.set(Phase::Idle);
        inner.pending_mode.set(Some(mode));
        if !inner.store.apply(update) {
            // No notification, but the URL may still be deeper than the
            // state after a partial commit.
            inner.write_outbound(&inner.store.current());
        }
        inner.pending_mode.set(None);
        inner.store.current()
    }

    /// Records a map move. The URL is rewritten (replaceState) once no
    /// further move arrives within the configured quiet period.
    pub fn handle_viewport_change(&self, viewport: Viewport) {
        if !viewport.is_valid() {
            debug!(?viewport, "ignoring invalid viewport");
            return;
        }
        let ticket = self.inner.viewport.borrow_mut().push(viewport);
        let weak = Rc::downgrade(&self.inner);
        self.inner.timer.schedule(
            self.inner.config.viewport_debounce_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.flush_viewport(ticket);
                }
            }),
        );
    }

    pub fn on_selection(&self, listener: impl Fn(&SelectionEvent) + 'static) -> Subscription {
        self.inner.selection.subscribe(listener)
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase.get()
    }

    pub fn store(&self) -> &NavigationStateStore {
        &self.inner.store
    }

    pub fn current_state(&self) -> NavigationState {
        self.inner.store.current()
    }

    pub fn registry(&self) -> &CatalogRegistry {
        self.inner.loader.registry()
    }

    pub fn config(&self) -> &SynchronizerConfig {
        &self.inner.config
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.diagnostics.borrow().entries().cloned().collect()
    }

    /// Encodes `state` as a path under the configured base path.
    pub fn path_for(&self, state: &NavigationState) -> String {
        self.inner.matcher.path_for(&state.to_route())
    }
}

impl<F, H, T> Drop for StateSynchronizer<F, H, T> {
    fn drop(&mut self) {
        if let Some(outbound) = self.outbound.take() {
            outbound.unsubscribe();
        }
    }
}

impl<F, H, T> Inner<F, H, T>
where
    F: Fetch + 'static,
    H: History + 'static,
    T: Timer + 'static,
{
    /// Matches and issues the token synchronously; only the loading is
    /// deferred to the returned future.
    fn begin_inbound(this: &Rc<Self>, location: Location) -> LocalBoxFuture<'static, CascadeReport> {
        let Some(route) = this.route_for(&location) else {
            debug!(path = %location.path, "path does not match any route");
            // The user has left whatever URL an in-flight cascade was loading.
            this.generations.invalidate();
            this.phase.set(Phase::Idle);
            let path = location.path;
            return Box::pin(async move { CascadeReport::RouteNotMatched { path } });
        };

        let token = this.generations.issue();
        this.phase.set(Phase::ProcessingRoute);
        debug!(generation = token.generation(), route = ?route, "inbound cascade started");

        let inner = Rc::clone(this);
        Box::pin(async move { inner.run_cascade(route, token, location).await })
    }

    fn route_for(&self, location: &Location) -> Option<RouteDescriptor> {
        let route = self.matcher.match_path(&location.path)?;
        if route.kind() == RouteKind::Root
            && let Some(legacy) = routing::route_from_legacy_query(&location.query)
        {
            debug!(route = ?legacy, "using legacy query parameters");
            return Some(legacy);
        }
        Some(route)
    }

    async fn run_cascade(
        self: Rc<Self>,
        route: RouteDescriptor,
        token: CascadeToken,
        location: Location,
    ) -> CascadeReport {
        let outcome = self.loader.load(&route, &token).await;
        if token.is_stale() {
            debug!(generation = token.generation(), "discarding superseded cascade");
            return CascadeReport::Superseded;
        }

        match outcome {
            CascadeOutcome::Superseded => CascadeReport::Superseded,
            CascadeOutcome::Resolved(result) => self.commit(result, None, &token, &location),
            CascadeOutcome::Failed(err) => {
                self.diagnostics.borrow_mut().record(
                    token.generation(),
                    err.kind.code(),
                    err.to_string(),
                );
                let partial = err.partial.clone();
                self.commit(partial, Some(err), &token, &location)
            }
        }
    }

    fn commit(
        &self,
        result: LoadResult,
        error: Option<LoadError>,
        token: &CascadeToken,
        location: &Location,
    ) -> CascadeReport {
        let state = result.to_state();
        // Still ProcessingRoute here, so the outbound listener stays quiet.
        self.store.apply(state.clone());
        self.phase.set(Phase::Idle);
        info!(
            generation = token.generation(),
            view_mode = %state.view_mode(),
            partial = error.is_some(),
            "route committed"
        );

        for event in SelectionEvent::from_result(&result) {
            self.selection.emit(&event);
        }

        if error.is_none() && self.config.canonicalize_paths && token.is_current() {
            self.canonicalize(&state, location);
        }
        CascadeReport::Committed { state, error }
    }

    /// Rewrites alias and legacy URLs to the canonical path in place.
    fn canonicalize(&self, state: &NavigationState, location: &Location) {
        let canonical = self.matcher.path_for(&state.to_route());
        let has_legacy = routing::LEGACY_KEYS
            .iter()
            .any(|key| location.query.contains(key));
        if canonical == location.path && !has_legacy {
            return;
        }
        let mut next = self.history.location().with_path(canonical);
        routing::strip_legacy_keys(&mut next.query);
        let url = next.to_url();
        debug!(%url, "canonicalizing url");
        self.write_history(HistoryMode::Replace, &url);
    }

    fn write_outbound(&self, state: &NavigationState) {
        if self.phase.get() == Phase::ProcessingRoute {
            return;
        }
        let mode = self.pending_mode.take().unwrap_or_default();
        let current = self.history.location();
        let path = self.matcher.path_for(&state.to_route());
        if path == current.path {
            return;
        }
        let mut next = current.with_path(path);
        routing::strip_legacy_keys(&mut next.query);
        self.write_history(mode, &next.to_url());
    }

    fn flush_viewport(&self, ticket: DebounceTicket) {
        let Some(viewport) = self.viewport.borrow_mut().fire(ticket) else {
            return;
        };
        let mut location = self.history.location();
        let before = location.to_url();
        viewport.write_query(&mut location.query);
        let after = location.to_url();
        if after != before {
            self.write_history(HistoryMode::Replace, &after);
        }
    }

    fn write_history(&self, mode: HistoryMode, url: &str) {
        let result = match mode {
            HistoryMode::Push => self.history.push_state(url),
            HistoryMode::Replace => self.history.replace_state(url),
        };
        if let Err(err) = result {
            self.diagnostics.borrow_mut().record(
                self.generations.current_generation(),
                "history_failure",
                err.to_string(),
            );
        }
    }
}
