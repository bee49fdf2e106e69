use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::json_api;

// ──────────────────────────────────────────────────────────────────────────────
// HJELPER: payload som str eller dict/objekt
// ──────────────────────────────────────────────────────────────────────────────

fn payload_to_json(py: Python<'_>, payload: &PyAny) -> PyResult<String> {
    if let Ok(s) = payload.extract::<&str>() {
        return Ok(s.to_owned());
    }
    // Bruk Python sin json.dumps for å serialisere hvilket som helst Python-objekt
    let json_mod = py
        .import("json")
        .map_err(|e| PyValueError::new_err(format!("failed to import json: {e}")))?;
    json_mod
        .call_method1("dumps", (payload,))
        .and_then(|o| o.extract::<String>())
        .map_err(|e| PyValueError::new_err(format!("failed to serialize payload with json.dumps: {e}")))
}

fn run(py: Python<'_>, payload: &PyAny, f: fn(&str) -> Result<String, crate::EngineError>) -> PyResult<String> {
    let json_in = payload_to_json(py, payload)?;
    f(&json_in).map_err(|e| PyValueError::new_err(e.to_string()))
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-FUNKSJONER (returnerer JSON-streng)
// ──────────────────────────────────────────────────────────────────────────────

#[pyfunction]
fn normalize_json(py: Python<'_>, payload: &PyAny) -> PyResult<String> {
    run(py, payload, json_api::normalize_from_json)
}

#[pyfunction]
fn synthesize_json(py: Python<'_>, payload: &PyAny) -> PyResult<String> {
    run(py, payload, json_api::synthesize_from_json)
}

#[pyfunction]
fn project_json(py: Python<'_>, payload: &PyAny) -> PyResult<String> {
    run(py, payload, json_api::project_from_json)
}

#[pyfunction]
fn route_json(py: Python<'_>, payload: &PyAny) -> PyResult<String> {
    run(py, payload, json_api::route_from_json)
}

#[pymodule]
fn trail_compare_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(normalize_json, m)?)?;
    m.add_function(wrap_pyfunction!(synthesize_json, m)?)?;
    m.add_function(wrap_pyfunction!(project_json, m)?)?;
    m.add_function(wrap_pyfunction!(route_json, m)?)?;
    Ok(())
}
