use completion_tracker::{
    app::{attach, parse_command, Command},
    bindings::{dispatch, PageEvent},
    lifecycle::HeadlessLifecycle,
    load_page,
    progress::LogProgress,
    HttpTransport, TrackerConfig,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = TrackerConfig::from_env();
    let markup = load_page(&config.page_path).await?;

    let transport = Arc::new(HttpTransport::new(config.base_url.as_str()));
    let Some(session) = attach(
        &markup,
        transport,
        Arc::new(HeadlessLifecycle),
        Arc::new(LogProgress),
    )
    .await
    else {
        info!(page = %config.page_path.display(), "nothing to track");
        return Ok(());
    };
    info!(response_id = session.response_id(), base_url = %config.base_url, "tracking page");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match parse_command(&line) {
            Some(Command::Event(PageEvent::Unload)) => break,
            Some(Command::Event(event)) => {
                let session = session.clone();
                tokio::spawn(async move {
                    dispatch(&session, event).await;
                });
            }
            Some(Command::Complete) => {
                let session = session.clone();
                tokio::spawn(async move { session.complete().await });
            }
            Some(Command::Abandon(reason)) => {
                session.record_abandonment(reason);
            }
            None if line.trim().is_empty() => {}
            None => warn!("unrecognised command: {line}"),
        }
    }

    let outcome = session.handle_unload();
    info!(?outcome, "page unloaded");
    session.destroy();

    tokio::time::sleep(config.shutdown_grace).await;
    Ok(())
}
