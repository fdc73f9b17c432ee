/*!
 * Capture Scope - Demo Entry Point
 *
 * Initializes the SDK with the tracing backend and walks through scope
 * push/pop, forked flows and lazy capture.
 */

use anyhow::Result;
use tracing::info;

use capture_scope::client::TracingClient;
use capture_scope::{ClientOptions, Event, Level};

#[tokio::main]
async fn main() -> Result<()> {
    capture_scope::init_tracing();

    let id = capture_scope::capture_message("before init", Level::Info)?;
    info!(sentinel = id.is_sentinel(), "capture while disabled");

    let options = ClientOptions::from_env()?;
    capture_scope::init(options, |opts| Ok(TracingClient::from_options(opts)))?;

    {
        let _guard = capture_scope::push_scope();
        capture_scope::configure_scope(|scope| scope.add_tag("A"));
        capture_scope::capture_event(Event::from("e1"))?;
    }
    capture_scope::capture_event(Event::from("e2"))?;

    let child = capture_scope::spawn(async {
        let _guard = capture_scope::push_scope();
        capture_scope::configure_scope(|scope| scope.add_tag("child-only"));
        capture_scope::capture_event_async(|| async { Event::from("from child") }).await
    });
    child.await??;
    capture_scope::capture_event(Event::from("parent after child"))?;

    let err = std::io::Error::new(std::io::ErrorKind::NotFound, "config file missing");
    capture_scope::capture_exception(&err)?;

    capture_scope::shutdown();
    info!("demo finished");
    Ok(())
}
