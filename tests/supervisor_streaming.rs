// tests/supervisor_streaming.rs

#![cfg(unix)]

use std::collections::BTreeMap;
use std::error::Error;
use std::time::Duration;

use buildstream_test_utils::builders::sh_tasks;
use buildstream_test_utils::init_tracing;
use buildstream_test_utils::listener::{
    ChannelListener, ListenerEvent, collect_until_finished, data_of,
};
use buildstream_test_utils::with_timeout;

use tokio::sync::mpsc::error::TryRecvError;

use buildstream::errors::BuildStreamError;
use buildstream::exec::{DECODE_ERROR_SENTINEL, Invocation, ProcessSupervisor, SupervisorState};

type TestResult = Result<(), Box<dyn Error>>;

fn sh(script: &str) -> Invocation {
    sh_with_env(script, BTreeMap::new())
}

fn sh_with_env(script: &str, env: BTreeMap<String, String>) -> Invocation {
    let mut command = vec!["sh".to_string()];
    command.extend(sh_tasks(script));
    Invocation::new(command, ".", env).expect("valid invocation")
}

#[tokio::test]
async fn finished_is_reported_once_after_all_stdout_data() -> TestResult {
    init_tracing();

    let (listener, mut rx) = ChannelListener::new();
    let sup = ProcessSupervisor::start(
        sh("printf 'one\\n'; sleep 0.05; printf 'two\\n'; sleep 0.05; printf 'three\\n'"),
        &listener,
    )?;

    let events = with_timeout(collect_until_finished(&mut rx)).await;
    assert_eq!(data_of(&events), "one\ntwo\nthree\n");
    assert_eq!(
        events.last(),
        Some(&ListenerEvent::Finished { run_id: sup.id() })
    );
    assert_eq!(sup.state(), SupervisorState::Finished);

    tokio::time::sleep(Duration::from_millis(100)).await;
    while let Ok(event) = rx.try_recv() {
        assert!(
            !matches!(event, ListenerEvent::Finished { .. }),
            "finished reported twice"
        );
    }

    Ok(())
}

#[tokio::test]
async fn stderr_is_streamed_but_does_not_gate_completion() -> TestResult {
    init_tracing();

    let (listener, mut rx) = ChannelListener::new();
    let _sup = ProcessSupervisor::start(
        sh("printf 'warning: deprecated\\n' >&2; sleep 0.1; printf 'done\\n'"),
        &listener,
    )?;

    let events = with_timeout(collect_until_finished(&mut rx)).await;
    let output = data_of(&events);
    assert!(output.contains("warning: deprecated\n"));
    assert!(output.contains("done\n"));

    Ok(())
}

#[tokio::test]
async fn kill_stops_all_further_delivery() -> TestResult {
    init_tracing();

    let (listener, mut rx) = ChannelListener::new();
    let sup = ProcessSupervisor::start(
        sh("while :; do echo tick; sleep 0.01; done"),
        &listener,
    )?;

    let first = with_timeout(rx.recv()).await;
    assert!(matches!(first, Some(ListenerEvent::Data { .. })));

    sup.kill();
    assert_eq!(sup.state(), SupervisorState::Killed);

    // Anything already queued was sent before kill() returned.
    while rx.try_recv().is_ok() {}

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    // Idempotent.
    sup.kill();
    assert_eq!(sup.state(), SupervisorState::Killed);

    Ok(())
}

#[tokio::test]
async fn kill_after_finish_keeps_finished_state() -> TestResult {
    init_tracing();

    let (listener, mut rx) = ChannelListener::new();
    let sup = ProcessSupervisor::start(sh("echo hi"), &listener)?;

    with_timeout(collect_until_finished(&mut rx)).await;
    sup.kill();
    sup.kill();
    assert_eq!(sup.state(), SupervisorState::Finished);

    Ok(())
}

#[tokio::test]
async fn invalid_utf8_becomes_sentinel_and_stream_continues() -> TestResult {
    init_tracing();

    let (listener, mut rx) = ChannelListener::new();
    let _sup = ProcessSupervisor::start(
        sh("printf '\\377\\376'; sleep 0.1; printf 'after\\n'"),
        &listener,
    )?;

    let events = with_timeout(collect_until_finished(&mut rx)).await;
    let output = data_of(&events);
    assert!(output.contains(DECODE_ERROR_SENTINEL));
    assert!(output.ends_with("after\n"));

    Ok(())
}

#[tokio::test]
async fn environment_overrides_are_layered_on_inherited_env() -> TestResult {
    init_tracing();

    let mut env = BTreeMap::new();
    env.insert("ANDROID_HOME".to_string(), "/opt/android-sdk".to_string());

    let (listener, mut rx) = ChannelListener::new();
    let _sup = ProcessSupervisor::start(
        sh_with_env(
            "printf '%s|%s' \"$ANDROID_HOME\" \"${PATH:+inherited}\"",
            env,
        ),
        &listener,
    )?;

    let events = with_timeout(collect_until_finished(&mut rx)).await;
    assert_eq!(data_of(&events), "/opt/android-sdk|inherited");

    Ok(())
}

#[tokio::test]
async fn runs_in_the_invocation_working_directory() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("marker.txt"), "here")?;

    let (listener, mut rx) = ChannelListener::new();
    let inv = Invocation::new(
        vec!["cat".to_string(), "marker.txt".to_string()],
        dir.path(),
        BTreeMap::new(),
    )?;
    let _sup = ProcessSupervisor::start(inv, &listener)?;

    let events = with_timeout(collect_until_finished(&mut rx)).await;
    assert_eq!(data_of(&events), "here");

    Ok(())
}

#[tokio::test]
async fn missing_executable_is_a_spawn_error() -> TestResult {
    init_tracing();

    let (listener, _rx) = ChannelListener::new();
    let inv = Invocation::new(
        vec!["buildstream-no-such-tool".to_string(), "build".to_string()],
        ".",
        BTreeMap::new(),
    )?;

    match ProcessSupervisor::start(inv, &listener) {
        Err(BuildStreamError::Spawn { program, .. }) => {
            assert_eq!(program, "buildstream-no-such-tool");
        }
        other => panic!("expected spawn error, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn dropped_listener_stops_delivery() -> TestResult {
    init_tracing();

    let (listener, mut rx) = ChannelListener::new();
    let sup = ProcessSupervisor::start(
        sh("while :; do echo tick; sleep 0.01; done"),
        &listener,
    )?;

    with_timeout(rx.recv()).await;
    drop(listener);

    // The channel closes once the readers let go of the last (weak-upgraded)
    // reference to the listener.
    with_timeout(async {
        while rx.recv().await.is_some() {}
    })
    .await;

    sup.kill();
    Ok(())
}
