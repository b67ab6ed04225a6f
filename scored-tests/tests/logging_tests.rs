//! Transaction log tests
//!
//! Exactly one line per served connection, in the fixed five-column
//! tab-separated layout, regardless of outcome.

use scored_tests::EngineHarness;

#[test]
fn every_outcome_logs_exactly_one_line() {
    let harness = EngineHarness::new("hunter2");
    harness.send(b"hunter2:noop:EOM:");
    harness.send(b"bad:noop:EOM:");
    harness.send(b"garbage");
    assert_eq!(harness.log_lines().len(), 3);
}

#[test]
fn log_labels_match_the_replies() {
    let harness = EngineHarness::new("hunter2");
    harness.send(b"hunter2:noop:EOM:");
    harness.send(b"bad:noop:EOM:");
    harness.send(b"garbage");

    let labels: Vec<String> = harness
        .log_lines()
        .iter()
        .map(|line| line.split('\t').nth(2).unwrap().to_owned())
        .collect();
    assert_eq!(labels, ["SUCCESS", "AUTH_FAIL", "REQ_FAIL"]);
}

#[test]
fn log_line_has_five_columns_with_bracketed_ip() {
    let harness = EngineHarness::new("hunter2");
    harness.send(b"hunter2:noop:EOM:");

    let lines = harness.log_lines();
    let cols: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(cols.len(), 5);
    assert!(cols[0].ends_with(':'), "timestamp column ends with a colon");
    assert_eq!(cols[1], "[127.0.0.1]");
    assert_eq!(cols[2], "SUCCESS");
    assert_eq!(cols[3], "");
    assert_eq!(cols[4], "");
}

#[test]
fn timestamp_column_is_unix_seconds() {
    let harness = EngineHarness::new("hunter2");
    let before = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    harness.send(b"hunter2:noop:EOM:");

    let lines = harness.log_lines();
    let stamp: i64 = lines[0]
        .split('\t')
        .next()
        .unwrap()
        .trim_end_matches(':')
        .parse()
        .unwrap();
    assert!(stamp >= before && stamp <= before + 60);
}

#[test]
fn aborted_connection_is_still_logged() {
    let harness = EngineHarness::new("hunter2");
    harness.connect_and_abort();
    // A further transaction serializes behind the aborted one
    harness.send(b"hunter2:noop:EOM:");

    let lines = harness.log_lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("REQ_FAIL"));
    assert!(lines[1].contains("SUCCESS"));
}
