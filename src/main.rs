//! Boil Alarm - A boil timer daemon with staged alerts
//!
//! This is the main entry point for the boil-alarm application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use boil_alarm::{
    api::create_router,
    config::Config,
    engine::BoilTimer,
    services::{
        check_command_available, AudioOutput, Collaborators, CommandAudio, DesktopNotifier, InhibitorLock,
        NoHaptics, NoWakeLock, NotificationPermission, TerminalBell, TerminalFlash, WakeLock,
    },
    state::{AppState, SettingsStore},
    tasks::{tick_task, TokioRepeater},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("boil_alarm={},tower_http=info", config.log_level()))
        .init();

    info!("Starting boil-alarm server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms", config.host, config.port, config.tick_ms);

    // Settings fall back to defaults if the file is missing or corrupt
    let store = SettingsStore::new(config.settings_path());
    let settings = store.load();
    info!(
        "Loaded settings from {}: {} minutes, {} stages",
        store.path().display(),
        settings.total_minutes,
        settings.stages.len()
    );

    let audio: Arc<dyn AudioOutput> = match &config.sounds_dir {
        Some(dir) => {
            if !check_command_available(&config.player).await {
                tracing::warn!("{} not found, sounds may fail to play", config.player);
            }
            Arc::new(CommandAudio::new(config.player.clone(), dir.clone()))
        }
        None => {
            info!("No sounds directory configured, using the terminal bell");
            Arc::new(TerminalBell)
        }
    };

    let permission = if config.no_notify {
        NotificationPermission::Denied
    } else if check_command_available("notify-send").await {
        NotificationPermission::Granted
    } else {
        NotificationPermission::Default
    };
    info!("Notification permission: {:?}", permission);

    let wake_lock: Arc<dyn WakeLock> = if check_command_available("systemd-inhibit").await {
        Arc::new(InhibitorLock::new())
    } else {
        info!("systemd-inhibit not available, wake lock disabled");
        Arc::new(NoWakeLock)
    };

    let collaborators = Collaborators {
        audio,
        haptics: Arc::new(NoHaptics),
        notifier: Arc::new(DesktopNotifier::default()),
        display: Arc::new(TerminalFlash),
        repeater: Arc::new(TokioRepeater),
    };

    let mut timer = BoilTimer::new(settings, collaborators);
    timer.set_notification_permission(permission);

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        timer,
        store,
        wake_lock,
        config.keep_awake,
    ));

    // Start the tick driver
    let tick_state = Arc::clone(&state);
    let tick_interval = config.tick_interval();
    tokio::spawn(async move {
        tick_task(tick_state, tick_interval).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /start          - Start a fresh boil");
    info!("  POST   /pause          - Pause the boil");
    info!("  POST   /resume         - Resume a paused boil");
    info!("  POST   /reset          - Reset the boil");
    info!("  POST   /acknowledge    - Silence the active alert");
    info!("  GET    /status         - Timer status and active alert");
    info!("  GET    /settings       - Current settings");
    info!("  PUT    /settings       - Replace settings");
    info!("  POST   /stages         - Add a stage");
    info!("  PATCH  /stages/:id     - Edit a stage");
    info!("  DELETE /stages/:id     - Remove a stage");
    info!("  POST   /wake-lock      - Keep the machine awake");
    info!("  DELETE /wake-lock      - Allow sleep again");
    info!("  GET    /events         - Alert event stream (SSE)");
    info!("  GET    /health         - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.shutdown();
    info!("Server shutdown complete");
    Ok(())
}
