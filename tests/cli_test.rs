//! Smoke test of the headless runner binary

use std::process::Command;

#[test]
fn test_headless_run_prints_json_state() {
    let output = Command::new(env!("CARGO_BIN_EXE_grid_traffic"))
        .args(["--ticks", "15", "--seed", "7", "--report-every", "5", "--json"])
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to run grid_traffic");

    assert!(output.status.success(), "runner exited with {:?}", output.status);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SIMULATION COMPLETE"), "missing summary in:\n{stderr}");

    let state: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(state["tick"], 15);
    assert!(state["total_cars"].as_u64().unwrap_or(0) >= 5);
    assert!(state["intersections"]["main_intersection"]["signals"].is_object());
}

#[test]
fn test_manual_signal_run_completes() {
    let output = Command::new(env!("CARGO_BIN_EXE_grid_traffic"))
        .args(["--ticks", "40", "--seed", "11", "--cycle-duration", "6", "--manual-signals", "--json"])
        .output()
        .expect("failed to run grid_traffic");

    assert!(output.status.success());
    let state: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(state["intersections"]["main_intersection"]["mode"], "manual");
}
