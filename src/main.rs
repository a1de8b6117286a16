use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobvisor::http::ApiState;
use jobvisor::{
    config, http, sched, LogWriter, Subscribe, Supervisor, SupervisorConfig,
};

#[derive(Parser, Debug)]
#[command(name = "jobvisor")]
#[command(about = "Single-host supervisor for processes and scheduled tasks", long_about = None)]
struct Args {
    /// Path to the configuration YAML file
    #[arg(short, long, env = "JOBVISOR_CONFIG", default_value = "jobvisor.yaml")]
    config: PathBuf,

    /// Address for the HTTP trigger/kill surface
    #[arg(long, env = "JOBVISOR_LISTEN", default_value = "0.0.0.0:3000")]
    listen: SocketAddr,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!(path = %args.config.display(), "loading configuration");
    let cfg = config::load_and_validate(&args.config)?;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let sup = Supervisor::builder(SupervisorConfig::default())
        .with_subscribers(subs)
        .build();
    let handle = sup.handle();

    // Start all configured processes; commands queue until the loop runs.
    for (name, spec) in cfg.process_specs() {
        tracing::info!(process = %name, "starting process");
        handle.start_process(&name, spec);
    }

    let shutdown = CancellationToken::new();
    sched::spawn_schedules(&cfg, &handle, &shutdown);

    let state = Arc::new(ApiState {
        handle: handle.clone(),
        tasks: cfg.task_specs(),
    });
    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    tracing::info!(addr = %args.listen, "http surface listening");
    let server_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, http::router(state))
            .with_graceful_shutdown(async move { server_token.cancelled().await })
            .await
        {
            tracing::error!(error = %err, "http server error");
        }
    });

    let result = sup.run().await;
    shutdown.cancel();
    result?;
    Ok(())
}
