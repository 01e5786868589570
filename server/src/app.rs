//! Core application

use anyhow::Result;

use crate::api::TelemetryGrpcServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig};
use crate::core::config::AppConfig;
use crate::core::constants::{DEFAULT_LOG_FILTER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::sink::SinkService;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub sink: SinkService,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config)?;
        Self::start_server(app).await
    }

    /// Load configuration and build the sink. No sockets are opened here.
    pub fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let sink = SinkService::init(&config.sink)?;
        let shutdown = ShutdownService::new();

        Ok(Self {
            shutdown,
            config,
            sink,
        })
    }

    fn init_logging() {
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        let grpc_server =
            TelemetryGrpcServer::new(&app.config, app.sink.clone(), app.shutdown.clone())?;
        let addr = grpc_server.addr();
        let shutdown_rx = app.shutdown.subscribe();
        let shutdown = app.shutdown.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = grpc_server.start(shutdown_rx).await {
                tracing::error!(error = %e, "Telemetry gRPC server error");
                // Bring the process down instead of idling without a listener
                shutdown.trigger();
            }
        });
        app.shutdown.register(handle).await;

        banner::print_banner(&app.config, &app.sink.target());
        tracing::info!(%addr, sink = app.sink.name(), "Telebridge started");

        app.shutdown.wait().await;
        app.shutdown.shutdown().await;

        tracing::info!("Telebridge stopped");
        Ok(())
    }
}
