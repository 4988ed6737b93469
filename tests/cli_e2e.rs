use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn xmlc14n_bin() -> &'static str {
    env!("CARGO_BIN_EXE_xmlc14n")
}

fn test_temp_dir(tag: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("xmlc14n-cli-e2e-{tag}-{}-{ts}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn run_xmlc14n(args: &[&str]) -> Output {
    Command::new(xmlc14n_bin())
        .args(args)
        .output()
        .expect("run xmlc14n")
}

fn run_with_stdin(args: &[&str], input: &[u8]) -> Output {
    let mut child = Command::new(xmlc14n_bin())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn xmlc14n");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input)
        .expect("write stdin");
    child.wait_with_output().expect("wait xmlc14n")
}

#[test]
fn cli_file_to_file() {
    let dir = test_temp_dir("file");
    let input = dir.join("in.xml");
    let output = dir.join("out.xml");
    fs::write(&input, "<?xml version=\"1.0\"?>\n<r b=\"1\" a=\"2\"><!--x--><c/></r>\n").expect("write xml");

    let out = run_xmlc14n(&["-i", input.to_str().unwrap(), "-o", output.to_str().unwrap()]);
    assert!(out.status.success(), "failed: {}", String::from_utf8_lossy(&out.stderr));

    assert_eq!(fs::read_to_string(&output).expect("read output"), r#"<r a="2" b="1"><c></c></r>"#);
    assert!(!dir.join("out.xml.tmp").exists(), "tmp file left behind");
}

#[test]
fn cli_stdin_to_stdout() {
    let out = run_with_stdin(&[], b"<a:r xmlns:a=\"urn:x\" z=\"1\" a:y=\"2\"/>");
    assert!(out.status.success(), "failed: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(out.stdout, br#"<a:r xmlns:a="urn:x" z="1" a:y="2"></a:r>"#);
}

#[test]
fn cli_filter_pi_is_repeatable() {
    let out = run_with_stdin(
        &["--filter-pi", "one", "--filter-pi", "two"],
        b"<?one?><?two?><?three?><r/>",
    );
    assert!(out.status.success(), "failed: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(out.stdout, b"<?three?>\n<r></r>");
}

#[test]
fn cli_rejects_unsupported_method() {
    let out = run_with_stdin(&["--method", "http://www.w3.org/2001/10/xml-exc-c14n#"], b"<r/>");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unsupported canonicalization kind"), "stderr: {stderr}");
}

#[test]
fn cli_parse_error_leaves_no_output_file() {
    let dir = test_temp_dir("parse-error");
    let input = dir.join("in.xml");
    let output = dir.join("out.xml");
    fs::write(&input, "<root><child>").expect("write xml");

    let out = run_xmlc14n(&["-i", input.to_str().unwrap(), "-o", output.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unclosed element tags"));
    assert!(!output.exists());
    assert!(!dir.join("out.xml.tmp").exists());
}

#[test]
fn cli_missing_input_file() {
    let dir = test_temp_dir("missing");
    let missing = dir.join("nope.xml");
    let out = run_xmlc14n(&["-i", missing.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Lesefehler"));
}

#[test]
fn cli_replaces_existing_output_only_on_success() {
    let dir = test_temp_dir("replace");
    let good = dir.join("good.xml");
    let bad = dir.join("bad.xml");
    let output = dir.join("out.xml");
    fs::write(&good, "<r b='1' a='2'/>").expect("write xml");
    fs::write(&bad, "<r></s>").expect("write xml");
    fs::write(&output, "stale").expect("write stale output");

    let out = run_xmlc14n(&["-i", bad.to_str().unwrap(), "-o", output.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(fs::read_to_string(&output).expect("read output"), "stale");

    let out = run_xmlc14n(&["-i", good.to_str().unwrap(), "-o", output.to_str().unwrap()]);
    assert!(out.status.success(), "failed: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read_to_string(&output).expect("read output"), r#"<r a="2" b="1"></r>"#);
    assert!(!dir.join("out.xml.tmp").exists());
}
