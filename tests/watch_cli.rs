mod common;

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::time::Duration;

use common::MockBackend;
use tokio::time::{sleep, Instant};

#[tokio::test(flavor = "multi_thread")]
async fn watch_switches_symbol_and_exits_with_stdin_open() {
    let backend = MockBackend::start().await;
    backend.hub.announce_analysis();

    let binary = env!("CARGO_BIN_EXE_market-desk");
    let mut child = Command::new(binary)
        .args(["--backend-url", &backend.base_url(), "watch", "AAPL", "--limit", "4"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn market-desk watch");

    // Keep the pipe open for the whole run, like an interactive terminal.
    let mut stdin = child.stdin.take().expect("stdin pipe");
    stdin.write_all(b"msft\n").expect("write symbol");
    stdin.flush().expect("flush stdin");

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = child.try_wait().expect("poll watch") {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("watch --limit 4 did not exit while stdin stayed open");
        }
        sleep(Duration::from_millis(25)).await;
    };
    assert!(status.success(), "watch exited with {status}");

    let mut stdout = String::new();
    child
        .stdout
        .take()
        .expect("stdout pipe")
        .read_to_string(&mut stdout)
        .expect("read stdout");
    drop(stdin);

    assert!(stdout.contains("Watching AAPL"), "stdout was: {stdout}");
    assert!(stdout.contains("Switching to MSFT"), "stdout was: {stdout}");
    assert!(
        stdout.lines().any(|line| line.contains("|     MSFT |")),
        "no MSFT quote in: {stdout}"
    );
    assert!(stdout.contains("AI analysis for MSFT"), "stdout was: {stdout}");

    // Once on switch, once more when the stream announced a new analysis.
    let msft_fetches = backend
        .hub
        .analysis_fetches()
        .iter()
        .filter(|symbol| symbol.as_str() == "MSFT")
        .count();
    assert!(msft_fetches >= 2, "fetches: {:?}", backend.hub.analysis_fetches());
}
