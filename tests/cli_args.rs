use std::process::Command;

fn assert_rejected(output: std::process::Output) {
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Usage") || stderr.contains("error"),
        "expected a usage/error message, got: {stderr}"
    );
}

#[test]
fn sender_rejects_missing_arguments() {
    let output = Command::new(env!("CARGO_BIN_EXE_sender"))
        .arg("9000")
        .output()
        .expect("run sender");
    assert_rejected(output);
}

#[test]
fn sender_rejects_out_of_range_port() {
    let output = Command::new(env!("CARGO_BIN_EXE_sender"))
        .args(["70000", "localhost", "9001", "localhost", "9002"])
        .output()
        .expect("run sender");
    assert_rejected(output);
}

#[test]
fn receiver_rejects_non_numeric_port() {
    let output = Command::new(env!("CARGO_BIN_EXE_receiver"))
        .arg("not-a-port")
        .output()
        .expect("run receiver");
    assert_rejected(output);
}

#[test]
fn receiver_rejects_extra_arguments() {
    let output = Command::new(env!("CARGO_BIN_EXE_receiver"))
        .args(["9000", "9001"])
        .output()
        .expect("run receiver");
    assert_rejected(output);
}

#[test]
fn network_rejects_percent_above_hundred() {
    let output = Command::new(env!("CARGO_BIN_EXE_network"))
        .args(["9000", "101", "0", "0"])
        .output()
        .expect("run network");
    assert_rejected(output);
}

#[test]
fn network_rejects_missing_percentages() {
    let output = Command::new(env!("CARGO_BIN_EXE_network"))
        .args(["9000", "10"])
        .output()
        .expect("run network");
    assert_rejected(output);
}
