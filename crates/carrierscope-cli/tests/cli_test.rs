//! End-to-end tests for the carrierscope binary

use serde_json::Value;
use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

fn snapshot(yaml: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(file, "{}", yaml).unwrap();
    file
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_carrierscope"))
        .args(args)
        .env_remove("CARRIERSCOPE_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn report(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "carrierscope failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_mnc_detection() {
    let file = snapshot(
        r#"
providers:
  - carrier_name: "Verizon Wireless"
    mobile_country_code: "310"
    mobile_network_code: "004"
"#,
    );

    let json = report(&run(&["--snapshot", file.path().to_str().unwrap(), "--no-whois"]));
    assert_eq!(json["detection"]["carrier"], "verizon");
    assert_eq!(json["detection"]["confidence"], "high");
    assert_eq!(json["detection"]["method"], "mnc-code");
    assert_eq!(json["sim_status"]["slot_count"], 1);
}

#[test]
fn test_wifi_override_yields_interference() {
    let file = snapshot(
        r#"
providers:
  - carrier_name: "--"
    mobile_country_code: "65535"
    mobile_network_code: "65535"
on_wifi: false
"#,
    );
    let path = file.path().to_str().unwrap();

    let json = report(&run(&["--snapshot", path, "--no-whois"]));
    assert_eq!(json["detection"]["method"], "failed");
    assert_eq!(json["detection"]["detected_label"], "Detection Failed");

    let json = report(&run(&["--snapshot", path, "--no-whois", "--wifi", "true"]));
    assert_eq!(json["detection"]["method"], "wifi-calling-interference");
    assert_eq!(json["detection"]["detected_label"], "Wi-Fi Calling Active");
}

#[test]
fn test_static_registry_fallback() {
    let file = snapshot(
        r#"
providers:
  - carrier_name: "Unknown Regional Co"
interfaces:
  - name: pdp_ip0
    address: 12.34.56.78
"#,
    );

    let json = report(&run(&["--snapshot", file.path().to_str().unwrap()]));
    assert_eq!(json["detection"]["carrier"], "att");
    assert_eq!(json["detection"]["method"], "whois-lookup");
    assert_eq!(json["detection"]["whois"]["source_endpoint"], "whois.arin.net");
}

#[test]
fn test_missing_snapshot_fails() {
    let output = run(&["--snapshot", "/nonexistent/device.yaml"]);
    assert!(!output.status.success());
}
