use anyhow::Result;
use devorient_config::{AppConfig, StartupConfig};
use devorient_controls::DeviceOrientationControls;
use devorient_scene::Camera;
use devorient_sensor::{EventBus, SensorClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "devorient=info,devorient_sensor=info,devorient_controls=info".into()
            }),
        )
        .init();

    info!("Device orientation tracker starting");

    // Load config. Only a first run writes the file back.
    let (config, persist_path) = match devorient_config::config_path() {
        Ok(path) => {
            let StartupConfig { config, persist } = devorient_config::load_startup_config(&path);
            (config, persist.then_some(path))
        }
        Err(e) => {
            warn!(?e, "Could not locate config directory, using defaults");
            (AppConfig::default(), None)
        }
    };

    info!(addr = %config.sensor.addr, frame_rate_hz = config.frame_rate_hz, "Config loaded");

    let bus = Arc::new(EventBus::new());

    // Connect to the sensor relay (fall back to mock if nothing is listening).
    let sensor = match SensorClient::connect(
        &config.sensor.addr,
        Arc::clone(&bus),
        Duration::from_millis(config.sensor.connect_timeout_ms),
    )
    .await
    {
        Ok(client) => {
            info!("Sensor connected");
            client
        }
        Err(e) => {
            warn!(?e, "Sensor not available, using mock (no orientation tracking)");
            SensorClient::mock()
        }
    };

    let mut controls = DeviceOrientationControls::with_alpha_offset(
        Camera::new(),
        bus.clone(),
        config.controls.alpha_offset_degrees.to_radians(),
    );
    controls.set_enabled(config.controls.enabled);

    let mut frames = tokio::time::interval(config.frame_period());
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut frame_count: u64 = 0;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = frames.tick() => {
                controls.update();

                frame_count += 1;
                if frame_count % 300 == 0 {
                    let forward = controls.object().forward();
                    tracing::debug!(
                        frames = frame_count,
                        samples = sensor.samples_received(),
                        forward_x = forward.x,
                        forward_y = forward.y,
                        forward_z = forward.z,
                        "Frame heartbeat"
                    );
                }
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    error!(?e, "Failed to listen for shutdown signal");
                }
                break;
            }
        }
    }

    info!(frames = frame_count, "Shutting down");
    controls.dispose();
    sensor.shutdown();

    // Persist defaults on first run so the file is there to edit.
    if let Some(path) = persist_path {
        if let Err(e) = devorient_config::save_config_to(&config, &path) {
            error!(?e, "Failed to save config");
        }
    }

    Ok(())
}
