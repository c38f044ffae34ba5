use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use catalog::CatalogRegistry;
use navigation::{
    CascadeReport, CascadingResourceLoader, HistoryMode, NavigationStateStore, NavigationUpdate,
    StateSynchronizer, SynchronizerConfig,
};
use routing::Viewport;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod browser;
mod logging;

pub use browser::{BrowserHistory, GlooFetch, WindowTimer};

// Guard to prevent double-initialization of global state (relevant during hot reload).
static INITIALIZED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();

type Router = StateSynchronizer<GlooFetch, BrowserHistory, WindowTimer>;

thread_local! {
    static ROUTER: RefCell<Option<Rc<Router>>> = const { RefCell::new(None) };
    static POPSTATE: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
}

fn init_panic_hook() {
    PANIC_HOOK_SET.get_or_init(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = info.to_string();
            web_sys::console::error_1(&JsValue::from_str(&msg));
        }));
    });
}

fn to_js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(to_js_err)?;
    js_sys::JSON::parse(&json)
}

fn router() -> Result<Rc<Router>, JsValue> {
    ROUTER
        .try_with(|r| r.borrow().clone())
        .ok()
        .flatten()
        .ok_or_else(|| JsValue::from_str("router not initialised; call init_router first"))
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Avoid double-initialization (can happen during hot-reload edge cases).
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    init_panic_hook();
    if let Err(err) = logging::init_logging(LevelFilter::INFO) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("console logging disabled: {err}")));
    }
    Ok(())
}

/// Changes the console log level (`off`, `error`, `warn`, `info`, `debug`,
/// `trace`). Unknown names mean `info`.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let previous = logging::current_level();
    let level = logging::parse_level(level);
    logging::init_logging(level).map_err(to_js_err)?;
    tracing::info!(%level, ?previous, "log level changed");
    Ok(())
}

/// Builds the router from optional JSON configs, hooks popstate, and starts
/// resolving the current URL. Calling it again replaces the previous router.
#[wasm_bindgen]
pub fn init_router(
    config_json: Option<String>,
    registry_json: Option<String>,
) -> Result<(), JsValue> {
    init_panic_hook();

    let config = match non_blank(config_json) {
        Some(json) => SynchronizerConfig::from_json_str(&json).map_err(to_js_err)?,
        None => SynchronizerConfig::default(),
    };
    let registry = match non_blank(registry_json) {
        Some(json) => CatalogRegistry::from_json_str(&json).map_err(to_js_err)?,
        None => CatalogRegistry::builtin(),
    };

    let loader = CascadingResourceLoader::from_config(Rc::new(registry), GlooFetch, &config);
    let router = Rc::new(StateSynchronizer::new(
        NavigationStateStore::new(),
        loader,
        BrowserHistory::new()?,
        WindowTimer,
        config,
    ));

    install_popstate_listener()?;
    ROUTER.with(|r| *r.borrow_mut() = Some(Rc::clone(&router)));
    tracing::info!(base_path = %router.config().base_path, "router initialised");

    run_inbound(router.start());
    Ok(())
}

fn install_popstate_listener() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    let previous = POPSTATE.with(|p| p.borrow_mut().take());
    if let Some(previous) = previous {
        window.remove_event_listener_with_callback("popstate", previous.as_ref().unchecked_ref())?;
    }

    let listener = Closure::<dyn FnMut(web_sys::Event)>::new(|_event: web_sys::Event| {
        match router() {
            Ok(router) => run_inbound(router.handle_popstate()),
            Err(_) => tracing::debug!("popstate before router initialisation"),
        }
    });
    window.add_event_listener_with_callback("popstate", listener.as_ref().unchecked_ref())?;
    POPSTATE.with(|p| *p.borrow_mut() = Some(listener));
    Ok(())
}

fn run_inbound(cascade: navigation::LocalBoxFuture<'static, CascadeReport>) {
    spawn_local(async move {
        match cascade.await {
            CascadeReport::Committed {
                state,
                error: Some(err),
            } => {
                tracing::warn!(code = err.kind.code(), view_mode = %state.view_mode(), "{err}");
            }
            CascadeReport::Committed { state, error: None } => {
                tracing::debug!(view_mode = %state.view_mode(), "route loaded");
            }
            CascadeReport::RouteNotMatched { path } => {
                tracing::debug!(%path, "path is not a catalog route");
            }
            CascadeReport::Superseded => {}
        }
    });
}

/// Applies a UI selection, e.g. `{"catalogId":"element84","collectionId":"sentinel-2"}`.
/// `push` adds a history entry; otherwise the current one is replaced.
/// Returns the committed state.
#[wasm_bindgen]
pub fn navigate(update_json: &str, push: bool) -> Result<JsValue, JsValue> {
    let update: NavigationUpdate = serde_json::from_str(update_json).map_err(to_js_err)?;
    let mode = if push {
        HistoryMode::Push
    } else {
        HistoryMode::Replace
    };
    let state = router()?.request_navigation(update, mode);
    to_js_value(&state)
}

#[wasm_bindgen]
pub fn map_moved(lat: f64, lng: f64, zoom: f64) -> Result<(), JsValue> {
    router()?.handle_viewport_change(Viewport::new(lat, lng, zoom));
    Ok(())
}

#[wasm_bindgen]
pub fn current_state() -> Result<JsValue, JsValue> {
    to_js_value(&router()?.current_state())
}

/// `callback(state)` after every committed state change.
#[wasm_bindgen]
pub fn on_state_change(callback: js_sys::Function) -> Result<(), JsValue> {
    let router = router()?;
    let _subscription = router.store().subscribe(move |state| {
        let call = to_js_value(state).and_then(|v| callback.call1(&JsValue::NULL, &v));
        if let Err(err) = call {
            web_sys::console::error_2(&JsValue::from_str("on_state_change callback failed"), &err);
        }
    });
    Ok(())
}

/// `callback(event)` for each resolved catalog, collection or item, and for
/// the initial map location.
#[wasm_bindgen]
pub fn on_selection(callback: js_sys::Function) -> Result<(), JsValue> {
    let router = router()?;
    let _subscription = router.on_selection(move |event| {
        let call = to_js_value(event).and_then(|v| callback.call1(&JsValue::NULL, &v));
        if let Err(err) = call {
            web_sys::console::error_2(&JsValue::from_str("on_selection callback failed"), &err);
        }
    });
    Ok(())
}

#[wasm_bindgen]
pub fn get_catalogs() -> Result<JsValue, JsValue> {
    to_js_value(&router()?.registry().config())
}

#[wasm_bindgen]
pub fn get_diagnostics() -> Result<JsValue, JsValue> {
    let out = js_sys::Array::new();
    for d in router()?.diagnostics() {
        let o = js_sys::Object::new();
        js_sys::Reflect::set(
            &o,
            &JsValue::from_str("generation"),
            &JsValue::from_f64(d.generation as f64),
        )?;
        js_sys::Reflect::set(&o, &JsValue::from_str("kind"), &JsValue::from_str(d.kind))?;
        js_sys::Reflect::set(
            &o,
            &JsValue::from_str("message"),
            &JsValue::from_str(&d.message),
        )?;
        out.push(&o);
    }
    Ok(out.into())
}
