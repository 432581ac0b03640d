//! Runs the rangescan binary and checks exit codes and output.
use std::io::Read;
use std::net::TcpListener;
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

struct Run {
    code: i32,
    stdout: String,
    stderr: String,
}

fn rangescan(args: &[&str]) -> Run {
    let mut child = Command::new(env!("CARGO_BIN_EXE_rangescan"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let Some(status) = child.wait_timeout(Duration::from_secs(30)).unwrap() else {
        child.kill().unwrap();
        panic!("rangescan {args:?} did not finish");
    };

    let mut stdout = String::new();
    let mut stderr = String::new();
    child.stdout.take().unwrap().read_to_string(&mut stdout).unwrap();
    child.stderr.take().unwrap().read_to_string(&mut stderr).unwrap();

    Run {
        code: status.code().unwrap_or(-1),
        stdout,
        stderr,
    }
}

#[test]
fn help_exits_zero() {
    let run = rangescan(&["scan", "--help"]);
    assert_eq!(run.code, 0);
    assert!(run.stdout.contains("PORTRANGE"));
}

#[test]
fn unknown_flag_exits_one() {
    let run = rangescan(&["scan", "--bogus"]);
    assert_eq!(run.code, 1);
}

#[test]
fn invalid_ipv4_exits_one() {
    let run = rangescan(&["scan", "-n", "256.1.1.1", "1-10"]);
    assert_eq!(run.code, 1);
    assert!(run.stderr.contains("invalid address '256.1.1.1'"));
}

#[test]
fn invalid_port_range_exits_one() {
    for range in ["abc-1", "10-1", "1-99999"] {
        let run = rangescan(&["scan", "-n", "127.0.0.1", range]);
        assert_eq!(run.code, 1, "{range}");
        assert!(run.stderr.contains("invalid port range"), "{}", run.stderr);
    }
}

#[test]
fn unresolvable_host_exits_one() {
    let run = rangescan(&["scan", "-n", "no-such-host.invalid", "1-10"]);
    assert_eq!(run.code, 1);
    assert!(run.stderr.contains("could not resolve host 'no-such-host.invalid'"));
    assert!(!run.stdout.contains("Open ports"));
}

#[test]
fn greppable_lists_open_port() {
    let listener = TcpListener::bind("127.0.0.41:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let range = format!("{}-{}", port.saturating_sub(3), port.saturating_add(3));

    let run = rangescan(&["scan", "-n", "-g", "-t", "500", "127.0.0.41", &range]);

    assert_eq!(run.code, 0, "{}", run.stderr);
    assert_eq!(run.stdout.trim(), format!("127.0.0.41 -> [{port}]"));
}

#[test]
fn json_report() {
    let listener = TcpListener::bind("127.0.0.42:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let range = format!("{port}-{port}");

    let run = rangescan(&["scan", "-n", "--json", "127.0.0.42", &range]);

    assert_eq!(run.code, 0, "{}", run.stderr);
    let json: serde_json::Value = serde_json::from_str(&run.stdout).unwrap();
    assert_eq!(json["ip"], "127.0.0.42");
    assert_eq!(json["open_ports"], serde_json::json!([port]));
    assert_eq!(json["probed"], 1);
    assert_eq!(json["complete"], true);
}

#[test]
fn default_output_names_ports_and_count() {
    let listener = TcpListener::bind("127.0.0.43:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let range = format!("{port}-{port}");

    let run = rangescan(&["scan", "-n", "--accessible", "127.0.0.43", &range]);

    assert_eq!(run.code, 0, "{}", run.stderr);
    assert!(run.stdout.contains("Scanning 127.0.0.43 on ports"));
    assert!(run.stdout.contains(&format!("Open ports: {port} (1)")));
}

#[test]
fn broken_config_file_exits_one() {
    let dir = std::env::temp_dir().join(format!("rangescan-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("broken.toml");
    std::fs::write(&path, "batch_size = \"lots\"\n").unwrap();

    let run = rangescan(&["scan", "-c", path.to_str().unwrap(), "127.0.0.1", "1-1"]);

    assert_eq!(run.code, 1);
    assert!(run.stderr.contains("configuration file"));
    std::fs::remove_dir_all(dir).unwrap();
}
