#![cfg(target_arch = "wasm32")]

use netflow_engine::NetworkSimulator;
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn test_js_surface_drives_engine() {
    let mut sim = NetworkSimulator::new(1);
    assert!(!sim.is_running());

    let paused = sim.tick(1000.0);
    assert!(!paused.is_null());
    assert_eq!(sim.current_tick(), 0);

    sim.start();
    assert!(!sim.tick(1000.0).is_null());
    assert_eq!(sim.current_tick(), 1);
    assert!(!sim.snapshot().is_null());
    assert!(!sim.get_stats().is_null());
    assert!(sim.get_packet(u32::MAX).is_null());
}

#[wasm_bindgen_test]
fn test_js_commands_decode() {
    let mut sim = NetworkSimulator::new(0);
    let command = js_object(r#"{"type":"updateTrafficRate","nodeId":"A","rate":0}"#);
    assert_eq!(sim.apply_command_js(command, 0.0), Ok(true));
    assert_eq!(sim.topology().nodes()[0].traffic_rate, 0.0);

    let bogus = js_object(r#"{"type":"explode"}"#);
    assert!(sim.apply_command_js(bogus, 0.0).is_err());
}

/// Plain JS object (not a `Map`) from a JSON literal.
fn js_object(json: &str) -> JsValue {
    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap()
}
