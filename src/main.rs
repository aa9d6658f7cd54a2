//! Lunette - Virtual Glasses Try-On Service
//!
//! Main entry point for the CLI application.

use clap::Parser;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lunette::{
    config::Config,
    output::{viewer::ViewerServer, PoseFrame},
    pose::PoseMapper,
    scene::assets::GlassesCatalog,
    tracking::DetectionReceiver,
    AppState,
};

/// Lunette - Virtual glasses try-on service
#[derive(Parser, Debug)]
#[command(name = "lunette", version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Glasses model to activate at startup (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// List catalog models and exit
    #[arg(long)]
    list_models: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable the HTTP server
    #[arg(long)]
    no_http: bool,

    /// HTTP server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Detection poll interval in milliseconds (overrides config)
    #[arg(long)]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting {} v{}", lunette::NAME, lunette::VERSION);

    // Load configuration
    let mut config = if let Some(ref path) = args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.glasses.default_model = Some(model.clone());
    }
    if args.no_http {
        config.http.enabled = false;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }
    if let Some(interval) = args.interval {
        config.detector.interval_ms = interval;
    }

    config.validate()?;

    let catalog = GlassesCatalog::load(&config.glasses)?;

    // Handle list-models mode
    if args.list_models {
        println!("Available glasses models:\n");
        for name in catalog.names() {
            if name == catalog.default_model() {
                println!("  * {} (default)", name);
            } else {
                println!("    {}", name);
            }
        }
        return Ok(());
    }

    info!("Display surface: {}x{}", config.display.width, config.display.height);
    info!("Detection interval: {} ms", config.detector.interval_ms);
    info!("Active model: {}", catalog.default_model());
    info!("HTTP server: {}", config.http.enabled);

    // Create shared application state
    let state = AppState::new(config.clone(), catalog);

    // Start the detection poll
    let detection_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = run_detection(detection_state).await {
            error!("Detection poll error: {}", e);
        }
    });

    // Start the render loop. Exactly one render task exists for the
    // lifetime of the process; detection only publishes samples to it.
    let render_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = run_render(render_state).await {
            error!("Render loop error: {}", e);
        }
    });

    // Start HTTP server if enabled
    if config.http.enabled {
        let http_state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = run_http_server(http_state).await {
                error!("HTTP server error: {}", e);
            }
        });
    }

    // Wait for Ctrl+C / SIGTERM
    shutdown_signal().await;
    info!("Shutdown signal received");
    state.shutdown();

    // Give tasks a moment to clean up
    tokio::time::sleep(Duration::from_millis(500)).await;
    info!("Lunette stopped");

    Ok(())
}

/// Poll the external detector on a fixed timer and publish the latest
/// pose sample (or face absence) to shared state.
async fn run_detection(state: Arc<AppState>) -> anyhow::Result<()> {
    let config = state.config.read().await;
    let detector_config = config.detector.clone();
    let display = Vec2::new(config.display.width as f32, config.display.height as f32);
    drop(config);

    let mut shutdown_rx = state.subscribe_shutdown();

    let mut receiver = DetectionReceiver::new(&detector_config);
    receiver.start()?;

    info!(
        "Detection poll started (port: {}, every {} ms)",
        detector_config.port, detector_config.interval_ms
    );

    let mut ticker = tokio::time::interval(Duration::from_millis(detector_config.interval_ms));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match receiver.process().await {
                    Ok(Some(data)) if data.has_data => {
                        match data.pose_sample(display) {
                            Ok(sample) => state.set_sample(sample).await,
                            Err(e) => {
                                tracing::warn!("Discarding malformed detection: {}", e);
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("Detection receive error: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Detection poll shutting down");
                break;
            }
        }
    }

    receiver.stop();
    Ok(())
}

/// The single persistent render loop.
///
/// Ticks at the display cadence and re-reads the latest sample, which is
/// stale between detection ticks: landmark freshness is traded for render
/// smoothness. While no face is present the loop idles and the last
/// published frame stays on screen.
async fn run_render(state: Arc<AppState>) -> anyhow::Result<()> {
    let config = state.config.read().await;
    let mapper = PoseMapper::new(config.display.width, config.display.height);
    let frame_interval = Duration::from_millis(config.render.frame_interval_ms);
    drop(config);

    let mut shutdown_rx = state.subscribe_shutdown();
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!("Render loop started ({} ms frames)", frame_interval.as_millis());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(sample) = state.get_sample().await else {
                    continue;
                };

                let params = mapper.map(&sample);
                let variant = {
                    let mut scene = state.scene.write().await;
                    scene.apply(&params)
                };

                let model_name = state.active_model().await;
                let Some(model) = state.catalog.get(&model_name) else {
                    continue;
                };

                let node_position = [params.position.x, params.position.y, params.depth];
                state.publish_frame(PoseFrame {
                    model: model.stem().to_string(),
                    variant,
                    rotation: params.rotation.to_array(),
                    position: node_position,
                });
            }
            _ = shutdown_rx.recv() => {
                info!("Render loop shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn run_http_server(state: Arc<AppState>) -> anyhow::Result<()> {
    let config = state.config.read().await;
    let http_config = config.http.clone();
    drop(config);

    let mut app = ViewerServer::new(Arc::clone(&state)).router();

    if http_config.cors_enabled {
        app = app.layer(tower_http::cors::CorsLayer::permissive());
    }

    let addr = format!("{}:{}", http_config.host, http_config.port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| lunette::error::WebError::Bind(format!("{}: {}", addr, e)))?;

    let mut shutdown_rx = state.subscribe_shutdown();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .map_err(|e| lunette::error::WebError::Startup(e.to_string()))?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
