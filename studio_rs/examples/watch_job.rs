//! Follow a studio job until it finishes.
//!
//! ```text
//! RUST_LOG=studio_core=debug cargo run -p studio-sdk --example watch_job -- <job-id>
//! ```

use studio::Studio;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), studio::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let job_id = std::env::args()
        .nth(1)
        .ok_or_else(|| studio::Error::Config("usage: watch_job <job-id>".to_string()))?;

    let studio = Studio::from_env()?;
    let tracker = studio.watch_job(&job_id)?;
    let mut updates = tracker.subscribe();
    let mut printed = 0;

    while updates.changed().await.is_ok() {
        let view = tracker.view();
        for event in &view.events[printed.min(view.events.len())..] {
            println!(
                "[{}] {} {}",
                event.event_type,
                event.phase.as_deref().unwrap_or("-"),
                event.message.as_deref().unwrap_or("")
            );
        }
        printed = view.events.len();

        if let Some(error) = &view.error {
            eprintln!("link={} error={}", view.link, error);
        }
        if let Some(snapshot) = &view.snapshot {
            if snapshot.is_terminal() {
                println!("status={}", snapshot.status_str().unwrap_or("unknown"));
                break;
            }
        }
    }

    tracker.disconnect();
    Ok(())
}
