//! Submit a prompt and follow the resulting job.
//!
//! ```text
//! cargo run -p studio-sdk --example submit_job -- "inventory tracker for a bakery"
//! ```

use studio::{GenerationDepth, Studio, StudioJobRequest};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), studio::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let mut request = StudioJobRequest::new(prompt);
    request.generation_depth = Some(GenerationDepth::Prototype);

    let studio = Studio::from_env()?;
    let health = studio.api().health().await;
    if !health.ok {
        eprintln!("studio unreachable: {}", health.data);
    }

    let job_id = studio.submit_job(&request).await?;
    println!("job_id={job_id}");
    println!("preview={}", studio.api().preview_url(&job_id, Some("web")));

    let tracker = studio.watch_job(&job_id)?;
    let mut updates = tracker.subscribe();
    while updates.changed().await.is_ok() {
        let view = tracker.view();
        let status = view
            .snapshot
            .as_ref()
            .and_then(|s| s.status_str())
            .unwrap_or("pending");
        println!("link={} status={} events={}", view.link, status, view.events.len());
        if view.snapshot.as_ref().is_some_and(|s| s.is_terminal()) {
            break;
        }
    }

    println!("bundle={}", studio.api().bundle_url(&job_id));
    Ok(())
}
