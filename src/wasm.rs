//! `wasm-bindgen` exports. Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use log::{error, LevelFilter};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::config::VisualizerConfig;
use crate::error::{require_input, InputSide, VisualizerError};
use crate::levenshtein::{unit_distance, Granularity};
use crate::logging;
use crate::playback::{TickScheduler, TickToken};
use crate::presets::PRESET_PAIRS;
use crate::session::Session;

type OnStep = Rc<RefCell<Option<js_sys::Function>>>;

impl From<VisualizerError> for JsValue {
    fn from(err: VisualizerError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

/// Ticks through `window.setInterval`. The callback reaches the session
/// through a weak reference so a dropped `Visualizer` is not kept alive.
struct IntervalScheduler {
    session: Weak<RefCell<Session<IntervalScheduler>>>,
    on_step: OnStep,
    // a cancelled callback may be the one executing; freed on the next cancel
    retired: Option<Closure<dyn FnMut()>>,
}

/// A live `setInterval`. Dropping it clears the interval, so freeing a
/// running `Visualizer` leaves no timer calling into a dropped closure.
struct IntervalHandle {
    id: i32,
    closure: Option<Closure<dyn FnMut()>>,
}

impl IntervalHandle {
    /// Clears the interval once and hands back its callback.
    fn clear(&mut self) -> Option<Closure<dyn FnMut()>> {
        let closure = self.closure.take()?;
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.id);
        }
        Some(closure)
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.clear();
    }
}

impl TickScheduler for IntervalScheduler {
    type Handle = IntervalHandle;

    fn schedule(&mut self, interval: Duration, token: TickToken) -> crate::error::Result<IntervalHandle> {
        let session = self.session.clone();
        let on_step = self.on_step.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let Some(session) = session.upgrade() else {
                return;
            };
            let cursor = {
                let Ok(mut session) = session.try_borrow_mut() else {
                    return;
                };
                if !session.tick(token) {
                    return;
                }
                session.playback().cursor()
            };
            // session borrow released: the callback may call back in
            let callback = on_step.borrow().clone();
            if let Some(callback) = callback {
                if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from(cursor as u32)) {
                    error!("step callback failed: {:?}", err);
                }
            }
        });

        let window = web_sys::window()
            .ok_or_else(|| VisualizerError::Scheduler("no window to run setInterval on".to_string()))?;
        let millis = i32::try_from(interval.as_millis()).unwrap_or(i32::MAX);
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis,
            )
            .map_err(|err| VisualizerError::Scheduler(format!("setInterval failed: {:?}", err)))?;
        Ok(IntervalHandle {
            id,
            closure: Some(closure),
        })
    }

    fn cancel(&mut self, mut handle: IntervalHandle) {
        self.retired = handle.clear();
    }
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            web_sys::console::error_1(&JsValue::from_str(&format!("panic: {info}")));
        }));
    });
}

#[wasm_bindgen(start)]
pub fn init_runtime() {
    install_panic_hook();
    logging::init(LevelFilter::Info);
}

#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let level: LevelFilter = level
        .parse()
        .map_err(|_| VisualizerError::InvalidConfig(format!("unknown log level `{level}`")))?;
    logging::init(level);
    Ok(())
}

/// Distance only, without a trace or an input limit. Compares per `char`
/// unless `grapheme` is true.
#[wasm_bindgen(js_name = editDistance)]
pub fn edit_distance(a: &str, b: &str, grapheme: Option<bool>) -> usize {
    let granularity = if grapheme.unwrap_or(false) {
        Granularity::Grapheme
    } else {
        Granularity::Char
    };
    unit_distance(a, b, granularity)
}

#[wasm_bindgen(js_name = presetsJson)]
pub fn presets_json() -> Result<String, JsValue> {
    serde_json::to_string(&PRESET_PAIRS)
        .map_err(|e| JsValue::from(VisualizerError::from(e)))
}

#[wasm_bindgen]
pub struct Visualizer {
    session: Rc<RefCell<Session<IntervalScheduler>>>,
    on_step: OnStep,
}

#[wasm_bindgen]
impl Visualizer {
    /// `config_json` may be omitted for defaults. Starts on the first preset.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<Visualizer, JsValue> {
        let config = match config_json {
            Some(json) => VisualizerConfig::from_json(&json)?,
            None => VisualizerConfig::default(),
        };
        let on_step: OnStep = Rc::new(RefCell::new(None));
        let session = Rc::new_cyclic(|weak| {
            RefCell::new(Session::with_validated_config(
                config,
                IntervalScheduler {
                    session: weak.clone(),
                    on_step: on_step.clone(),
                    retired: None,
                },
            ))
        });
        session.borrow_mut().select_preset(0)?;
        Ok(Visualizer { session, on_step })
    }

    /// Called with the new cursor after every animation step.
    #[wasm_bindgen(js_name = onStep)]
    pub fn on_step(&self, callback: Option<js_sys::Function>) {
        *self.on_step.borrow_mut() = callback;
    }

    #[wasm_bindgen(js_name = setInputs)]
    pub fn set_inputs(&self, source: Option<String>, target: Option<String>) -> Result<(), JsValue> {
        let source = require_input(source.as_deref(), InputSide::Source)?;
        let target = require_input(target.as_deref(), InputSide::Target)?;
        self.session.borrow_mut().set_inputs(source, target)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setSource)]
    pub fn set_source(&self, source: Option<String>) -> Result<(), JsValue> {
        let source = require_input(source.as_deref(), InputSide::Source)?;
        self.session.borrow_mut().set_source(source)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setTarget)]
    pub fn set_target(&self, target: Option<String>) -> Result<(), JsValue> {
        let target = require_input(target.as_deref(), InputSide::Target)?;
        self.session.borrow_mut().set_target(target)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = selectPreset)]
    pub fn select_preset(&self, index: usize) -> Result<(), JsValue> {
        self.session.borrow_mut().select_preset(index)?;
        Ok(())
    }

    pub fn source(&self) -> String {
        self.session.borrow().source().to_string()
    }

    pub fn target(&self) -> String {
        self.session.borrow().target().to_string()
    }

    pub fn distance(&self) -> u32 {
        self.session.borrow().distance()
    }

    /// `false` when nothing was started, including when no timer is available.
    pub fn start(&self) -> bool {
        self.session.borrow_mut().start()
    }

    pub fn reset(&self) {
        self.session.borrow_mut().reset()
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.session.borrow().playback().is_running()
    }

    #[wasm_bindgen(js_name = currentStep)]
    pub fn current_step(&self) -> usize {
        self.session.borrow().playback().cursor()
    }

    #[wasm_bindgen(js_name = totalSteps)]
    pub fn total_steps(&self) -> usize {
        self.session.borrow().playback().len()
    }

    /// `current-cell`, `related-cell` or an empty string.
    #[wasm_bindgen(js_name = cellClass)]
    pub fn cell_class(&self, i: usize, j: usize) -> String {
        self.session.borrow().highlight(i, j).css_class().to_string()
    }

    #[wasm_bindgen(js_name = statusJson)]
    pub fn status_json(&self) -> Result<String, JsValue> {
        Ok(self.session.borrow().status_json()?)
    }

    #[wasm_bindgen(js_name = matrixJson)]
    pub fn matrix_json(&self) -> Result<String, JsValue> {
        Ok(self.session.borrow().matrix_json()?)
    }

    #[wasm_bindgen(js_name = computationJson)]
    pub fn computation_json(&self) -> Result<String, JsValue> {
        Ok(self.session.borrow().computation_json()?)
    }

    /// The trace as an Arrow IPC file.
    #[wasm_bindgen(js_name = traceIpc)]
    pub fn trace_ipc(&self) -> Result<Vec<u8>, JsValue> {
        Ok(self.session.borrow().trace_ipc_bytes()?)
    }
}
