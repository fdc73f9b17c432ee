/*!
 * SDK Facade Integration Tests
 *
 * These touch the process-wide registry, so they run serially and leave the
 * SDK shut down.
 */

use capture_scope::client::RecordingClient;
use capture_scope::{ClientError, ClientOptions, Event, FlowContext, Level};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn init_recording() -> RecordingClient {
    let client = RecordingClient::new();
    capture_scope::init_with_client(client.clone(), ClientOptions::default());
    client
}

#[test]
#[serial]
fn test_disabled_never_invokes_closures() {
    capture_scope::shutdown();
    let probe = AtomicUsize::new(0);

    capture_scope::configure_scope(|_| {
        probe.fetch_add(1, Ordering::SeqCst);
    });
    let id = capture_scope::capture_event_with(|| {
        probe.fetch_add(1, Ordering::SeqCst);
        Event::from("expensive")
    })
    .unwrap();

    assert_eq!(probe.load(Ordering::SeqCst), 0);
    assert!(id.is_sentinel());
}

#[test]
#[serial]
fn test_disabled_capture_returns_exact_sentinel() {
    capture_scope::shutdown();

    assert!(!capture_scope::is_enabled());
    assert_eq!(
        capture_scope::capture_event(Event::from("e")),
        Ok(capture_scope::EventId::SENTINEL)
    );
    assert_eq!(
        capture_scope::capture_message("m", Level::Error),
        Ok(capture_scope::EventId::SENTINEL)
    );
}

#[test]
#[serial]
fn test_capture_exception_without_client_touches_no_backend() {
    capture_scope::shutdown();
    let bystander = RecordingClient::new();

    let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let id = capture_scope::capture_exception(&err).unwrap();

    assert!(id.is_sentinel());
    assert_eq!(bystander.event_count(), 0);
    assert_eq!(bystander.close_calls(), 0);
}

#[test]
#[serial]
fn test_reinit_routes_only_to_newest_client() {
    let first = init_recording();
    capture_scope::capture_event(Event::from("to first")).unwrap();
    capture_scope::shutdown();

    assert!(first.is_closed());
    assert_eq!(capture_scope::capture_event(Event::from("nowhere")), Ok(capture_scope::EventId::SENTINEL));

    let second = init_recording();
    let id = capture_scope::capture_event(Event::from("to second")).unwrap();

    assert!(!id.is_sentinel());
    assert_eq!(first.event_count(), 1);
    assert_eq!(first.close_calls(), 1);
    assert_eq!(second.events()[0].id, id);

    capture_scope::shutdown();
}

#[test]
#[serial]
fn test_init_replaces_and_closes_previous() {
    let first = init_recording();
    let options = ClientOptions::new().with_shutdown_timeout(Duration::from_millis(100));
    let second = RecordingClient::new();
    let built = second.clone();
    capture_scope::init(options, move |opts| {
        assert_eq!(opts.shutdown_timeout, Duration::from_millis(100));
        Ok(built)
    })
    .unwrap();

    capture_scope::capture_event(Event::from("after swap")).unwrap();

    assert_eq!(first.close_calls(), 1);
    assert_eq!(first.event_count(), 0);
    assert_eq!(second.event_count(), 1);

    capture_scope::shutdown();
    assert_eq!(second.close_calls(), 1);
}

#[test]
#[serial]
fn test_push_tag_capture_pop_capture() {
    FlowContext::root().run(|| {
        let client = init_recording();

        let mut guard = capture_scope::push_scope();
        capture_scope::configure_scope(|scope| scope.add_tag("A"));
        capture_scope::capture_event(Event::from("e1")).unwrap();
        capture_scope::Guard::release(&mut guard).unwrap();
        capture_scope::capture_event(Event::from("e2")).unwrap();

        let events = client.events();
        assert_eq!(events[0].event.summary(), "e1");
        assert_eq!(events[0].scope, "A");
        assert_eq!(events[1].event.summary(), "e2");
        assert_eq!(events[1].scope, "");

        capture_scope::shutdown();
    });
}

#[test]
#[serial]
fn test_forked_child_tags_never_reach_parent_capture() {
    let client = init_recording();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(FlowContext::root().scope(async {
        capture_scope::spawn(async {
            let _guard = capture_scope::push_scope();
            capture_scope::configure_scope(|scope| scope.add_tag("child-only"));
            capture_scope::capture_event(Event::from("child")).unwrap();
        })
        .await
        .unwrap();

        capture_scope::capture_event(Event::from("parent")).unwrap();
    }));

    let events = client.events();
    assert_eq!(events[0].tags, vec!["child-only"]);
    assert!(events[1].tags.is_empty());

    capture_scope::shutdown();
}

#[test]
#[serial]
fn test_client_failure_leaves_registry_and_stack_intact() {
    FlowContext::root().run(|| {
        let client = init_recording();
        client.fail_with(ClientError::Transport("reset by peer".into()));

        let _guard = capture_scope::push_scope();
        let depth = capture_scope::current_stack().depth();

        assert_eq!(
            capture_scope::capture_event(Event::from("lost")),
            Err(ClientError::Transport("reset by peer".into()))
        );
        assert!(capture_scope::is_enabled());
        assert_eq!(capture_scope::current_stack().depth(), depth);

        capture_scope::shutdown();
    });
}

#[test]
#[serial]
fn test_concurrent_captures_during_reinit_never_hit_closed_client() {
    let clients: Vec<RecordingClient> = (0..8).map(|_| RecordingClient::new()).collect();
    capture_scope::init_with_client(clients[0].clone(), ClientOptions::default());

    let captured = Arc::new(AtomicUsize::new(0));
    let mut workers = Vec::new();
    for _ in 0..4 {
        let captured = Arc::clone(&captured);
        workers.push(capture_scope::spawn_thread(move || {
            for _ in 0..500 {
                let id = capture_scope::capture_event(Event::from("load")).unwrap();
                assert!(!id.is_sentinel());
                captured.fetch_add(1, Ordering::SeqCst);
            }
        }));
    }

    for client in &clients[1..] {
        std::thread::sleep(Duration::from_millis(1));
        capture_scope::init_with_client(client.clone(), ClientOptions::default());
    }
    for worker in workers {
        worker.join().unwrap();
    }
    capture_scope::shutdown();

    let recorded: usize = clients.iter().map(|c| c.event_count()).sum();
    assert_eq!(recorded, captured.load(Ordering::SeqCst));
    assert!(clients.iter().all(|c| c.close_calls() == 1));
}
