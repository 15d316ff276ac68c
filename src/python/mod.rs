//! Python bindings for the game service
//!
//! One in-memory [`GameService`] is cached per interpreter by `init_game`;
//! every function then runs a single action against it.

use crate::battlefield::BattlefieldReport;
use crate::config::GameRules;
use crate::error::WarfareError;
use crate::game::{ActionResponse, GameService};
use crate::store::MemoryGateway;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use pyo3::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

type SharedService = Arc<RwLock<GameService<MemoryGateway>>>;

/// Global cached service
static SERVICE: OnceCell<SharedService> = OnceCell::new();

// ============================================================================
// Helper Functions
// ============================================================================

fn service() -> PyResult<SharedService> {
    SERVICE.get().cloned().ok_or_else(|| {
        PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(
            "Game not initialized. Call init_game() first.",
        )
    })
}

/// Convert any serialisable value into native Python objects
fn to_python<T: Serialize>(py: Python<'_>, value: &T) -> PyResult<Py<PyAny>> {
    let json = serde_json::to_string(value).map_err(WarfareError::from)?;
    Ok(py.import("json")?.call_method1("loads", (json,))?.unbind())
}

// ============================================================================
// Result Wrapper
// ============================================================================

/// Outcome of one action, as handed to Python
#[pyclass(name = "ActionResult")]
pub struct ActionResult {
    #[pyo3(get)]
    success: bool,
    #[pyo3(get)]
    message: String,
    json: String,
}

impl ActionResult {
    fn new(response: ActionResponse) -> PyResult<Self> {
        let json = response.to_json()?;
        Ok(Self {
            success: response.success,
            message: response.message,
            json,
        })
    }
}

#[pymethods]
impl ActionResult {
    /// Full response including action-specific fields
    fn to_dict(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        Ok(py.import("json")?.call_method1("loads", (&self.json,))?.unbind())
    }

    fn to_json(&self) -> String {
        self.json.clone()
    }

    fn __repr__(&self) -> String {
        format!("ActionResult(success={}, message={:?})", self.success, self.message)
    }
}

fn run(f: impl FnOnce(&GameService<MemoryGateway>) -> ActionResponse) -> PyResult<ActionResult> {
    let shared = service()?;
    let guard = shared.read();
    ActionResult::new(f(&guard))
}

// ============================================================================
// Python Functions
// ============================================================================

/// Initialize the game service (call once at startup)
///
/// # Arguments
/// * `rules_json` - Optional JSON overriding any subset of the game rules
/// * `seed` - Optional seed for reproducible battles and layouts
#[pyfunction]
#[pyo3(signature = (rules_json=None, seed=None))]
fn init_game(rules_json: Option<&str>, seed: Option<u64>) -> PyResult<()> {
    let rules = match rules_json {
        Some(json) => GameRules::from_json(json)?,
        None => GameRules::default(),
    };

    let service = match seed {
        Some(seed) => GameService::with_seed(MemoryGateway::new(), rules, seed)?,
        None => GameService::new(MemoryGateway::new(), rules)?,
    };

    // If already initialized, replace the service
    if let Some(existing) = SERVICE.get() {
        *existing.write() = service;
    } else {
        let _ = SERVICE.set(Arc::new(RwLock::new(service)));
    }

    Ok(())
}

#[pyfunction]
fn is_initialized() -> bool {
    SERVICE.get().is_some()
}

/// Record, age tier and soldier profile of a player as a dict
#[pyfunction]
fn player_view(py: Python<'_>, player_id: &str) -> PyResult<Py<PyAny>> {
    let shared = service()?;
    let view = shared.read().player_view(player_id)?;
    to_python(py, &view)
}

#[pyfunction]
fn create_player(player_id: &str, name: &str) -> PyResult<ActionResult> {
    run(|game| game.create_player(player_id, name))
}

#[pyfunction]
fn buy_scroll(player_id: &str) -> PyResult<ActionResult> {
    run(|game| game.buy_scroll(player_id))
}

#[pyfunction]
fn recruit_soldier(player_id: &str) -> PyResult<ActionResult> {
    run(|game| game.recruit_soldier(player_id))
}

#[pyfunction]
fn collect_income(player_id: &str) -> PyResult<ActionResult> {
    run(|game| game.collect_income(player_id))
}

#[pyfunction]
fn donate(player_id: &str, amount: u64) -> PyResult<ActionResult> {
    run(|game| game.donate(player_id, amount))
}

#[pyfunction]
fn choose_country(player_id: &str, country: &str) -> PyResult<ActionResult> {
    run(|game| game.choose_country(player_id, country))
}

#[pyfunction]
fn choose_armor(player_id: &str, armor: &str) -> PyResult<ActionResult> {
    run(|game| game.choose_armor(player_id, armor))
}

#[pyfunction]
fn start_battlefield(player_id: &str) -> PyResult<ActionResult> {
    run(|game| game.start_battlefield(player_id))
}

#[pyfunction]
fn move_player(player_id: &str, x: f64, y: f64) -> PyResult<ActionResult> {
    run(|game| game.move_player(player_id, x, y))
}

#[pyfunction]
#[pyo3(signature = (player_id, enemies_killed, time_survived, gold_earned, retreated=false))]
fn end_battlefield(
    player_id: &str,
    enemies_killed: u64,
    time_survived: u64,
    gold_earned: u64,
    retreated: bool,
) -> PyResult<ActionResult> {
    let report = BattlefieldReport {
        enemies_killed,
        time_survived,
        gold_earned,
        retreated,
    };
    run(|game| game.end_battlefield(player_id, report))
}

#[pyfunction]
fn resolve_battle(player_id: &str) -> PyResult<ActionResult> {
    run(|game| game.resolve_battle(player_id))
}

#[pyfunction]
fn reset(player_id: &str) -> PyResult<ActionResult> {
    run(|game| game.reset(player_id))
}

/// Run an action from raw form fields (`route` is the action name)
#[pyfunction]
fn handle_form(
    player_id: &str,
    route: &str,
    form: HashMap<String, String>,
) -> PyResult<ActionResult> {
    run(|game| game.handle_form(player_id, route, &form))
}

/// Fight one battle asynchronously
///
/// The battle runs on Tokio's blocking pool so Python's asyncio event loop
/// stays responsive while the player's lock is held.
///
/// # Example (Python)
/// ```python
/// result = await resolve_battle_async("player-1")
/// print(result.message)
/// ```
#[pyfunction]
fn resolve_battle_async<'py>(py: Python<'py>, player_id: String) -> PyResult<Bound<'py, PyAny>> {
    // Get the service before entering async context
    let shared = service()?;

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let response = tokio::task::spawn_blocking(move || {
            let game = shared.read();
            game.resolve_battle(&player_id)
        })
        .await
        .map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                "Battle task panicked: {}",
                e
            ))
        })?;

        ActionResult::new(response)
    })
}

// ============================================================================
// Python Module Definition
// ============================================================================

#[pymodule]
fn warfare_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(init_game, m)?)?;
    m.add_function(wrap_pyfunction!(is_initialized, m)?)?;
    m.add_function(wrap_pyfunction!(player_view, m)?)?;
    m.add_function(wrap_pyfunction!(create_player, m)?)?;
    m.add_function(wrap_pyfunction!(buy_scroll, m)?)?;
    m.add_function(wrap_pyfunction!(recruit_soldier, m)?)?;
    m.add_function(wrap_pyfunction!(collect_income, m)?)?;
    m.add_function(wrap_pyfunction!(donate, m)?)?;
    m.add_function(wrap_pyfunction!(choose_country, m)?)?;
    m.add_function(wrap_pyfunction!(choose_armor, m)?)?;
    m.add_function(wrap_pyfunction!(start_battlefield, m)?)?;
    m.add_function(wrap_pyfunction!(move_player, m)?)?;
    m.add_function(wrap_pyfunction!(end_battlefield, m)?)?;
    m.add_function(wrap_pyfunction!(resolve_battle, m)?)?;
    m.add_function(wrap_pyfunction!(resolve_battle_async, m)?)?;
    m.add_function(wrap_pyfunction!(reset, m)?)?;
    m.add_function(wrap_pyfunction!(handle_form, m)?)?;
    m.add_class::<ActionResult>()?;
    Ok(())
}
