pub mod bus;
pub mod protocol;
pub mod types;

pub use bus::{EventBus, EventSource, Handler, SubscriptionId};
pub use types::{angle_or_zero, EventKind, OrientationEvent, OrientationSample, ScreenOrientation};

use anyhow::{Context, Result};
use protocol::LineParser;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Commands sent to the stream reading task.
enum SensorCommand {
    Shutdown,
}

/// Client for a remote orientation sensor.
///
/// Reads newline-delimited JSON orientation events (typically relayed from
/// a phone's browser over TCP) and dispatches them into an [`EventBus`].
pub struct SensorClient {
    samples: Arc<AtomicU64>,
    command_tx: mpsc::UnboundedSender<SensorCommand>,
    _task: Option<tokio::task::JoinHandle<()>>,
}

impl SensorClient {
    /// Connect to a sensor relay and start dispatching into `bus`.
    pub async fn connect(addr: &str, bus: Arc<EventBus>, timeout: Duration) -> Result<Self> {
        tracing::info!(%addr, "Connecting to orientation sensor");

        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .with_context(|| format!("Timed out connecting to {addr}"))??;
        tracing::info!(%addr, "Connected to orientation sensor");

        Ok(Self::from_reader(stream, bus))
    }

    /// Dispatch events read from any byte stream (socket, stdin, file).
    pub fn from_reader<R>(reader: R, bus: Arc<EventBus>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let samples = Arc::new(AtomicU64::new(0));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(sensor_read_loop(
            reader,
            bus,
            command_rx,
            Arc::clone(&samples),
        ));

        Self {
            samples,
            command_tx,
            _task: Some(task),
        }
    }

    /// Create a client that never delivers anything, for running without a device.
    pub fn mock() -> Self {
        let (command_tx, _) = mpsc::unbounded_channel();
        Self {
            samples: Arc::new(AtomicU64::new(0)),
            command_tx,
            _task: None,
        }
    }

    /// Number of `deviceorientation` samples dispatched so far.
    pub fn samples_received(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    /// Stop reading. Events already dispatched stay latched by their receivers.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(SensorCommand::Shutdown);
    }
}

/// Background task: read the stream, parse lines, dispatch events.
async fn sensor_read_loop<R>(
    mut reader: R,
    bus: Arc<EventBus>,
    mut command_rx: mpsc::UnboundedReceiver<SensorCommand>,
    samples: Arc<AtomicU64>,
) where
    R: AsyncRead + Unpin,
{
    let mut parser = LineParser::new();
    let mut buf = [0u8; 4096];

    loop {
        tokio::select! {
            result = reader.read(&mut buf) => {
                match result {
                    Ok(0) => {
                        tracing::warn!("Orientation stream closed");
                        break;
                    }
                    Ok(n) => {
                        parser.push_data(&buf[..n]);

                        // Drain all complete lines.
                        while let Some(result) = parser.next_event() {
                            match result {
                                Ok(event) => {
                                    if let OrientationEvent::DeviceOrientation(_) = event {
                                        let count = samples.fetch_add(1, Ordering::Relaxed) + 1;
                                        if count % 1000 == 0 {
                                            tracing::debug!(count, "Orientation samples received");
                                        }
                                    } else {
                                        tracing::info!(?event, "Screen orientation changed");
                                    }
                                    bus.dispatch(&event);
                                }
                                Err(e) => {
                                    tracing::warn!(%e, "Skipping malformed orientation line");
                                }
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(?e, "Orientation stream read error");
                        break;
                    }
                }
            }
            cmd = command_rx.recv() => {
                match cmd {
                    Some(SensorCommand::Shutdown) | None => {
                        tracing::info!("Orientation stream reader stopped");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    fn forward_events(bus: &EventBus) -> mpsc::UnboundedReceiver<OrientationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        for kind in [EventKind::DeviceOrientation, EventKind::OrientationChange] {
            let tx = tx.clone();
            bus.subscribe(
                kind,
                Arc::new(move |event: &OrientationEvent| {
                    let _ = tx.send(*event);
                }),
            );
        }
        rx
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<OrientationEvent>) -> OrientationEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event should arrive")
            .expect("channel open")
    }

    #[tokio::test]
    async fn streams_events_from_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let bus = Arc::new(EventBus::new());
        let mut rx = forward_events(&bus);

        let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });
        let client = SensorClient::connect(&addr, Arc::clone(&bus), Duration::from_secs(5))
            .await
            .unwrap();
        let mut peer = accept.await.unwrap();

        peer.write_all(b"{\"type\":\"orientationchange\",\"orientation\":90}\n")
            .await
            .unwrap();
        peer.write_all(b"garbage\n{\"type\":\"deviceorientation\",\"alpha\":5,\"beta\":6,\"gamma\":7}\n")
            .await
            .unwrap();

        assert_eq!(next(&mut rx).await, OrientationEvent::OrientationChange(Some(90.0)));
        assert_eq!(
            next(&mut rx).await,
            OrientationEvent::DeviceOrientation(OrientationSample::degrees(5.0, 6.0, 7.0))
        );
        assert_eq!(client.samples_received(), 1);
        assert_eq!(bus.screen_orientation(), Some(90.0));

        client.shutdown();
    }

    #[tokio::test]
    async fn reads_from_any_stream() {
        let (mut writer, reader) = tokio::io::duplex(256);
        let bus = Arc::new(EventBus::new());
        let mut rx = forward_events(&bus);
        let client = SensorClient::from_reader(reader, Arc::clone(&bus));

        writer
            .write_all(b"{\"type\":\"deviceorientation\",\"gamma\":-12}\n")
            .await
            .unwrap();

        match next(&mut rx).await {
            OrientationEvent::DeviceOrientation(sample) => {
                assert_eq!(sample.gamma, Some(-12.0));
                assert_eq!(sample.alpha, None);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(client.samples_received(), 1);
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let bus = Arc::new(EventBus::new());
        assert!(SensorClient::connect(&addr, bus, Duration::from_secs(5)).await.is_err());
    }

    #[test]
    fn mock_reports_no_samples() {
        let client = SensorClient::mock();
        assert_eq!(client.samples_received(), 0);
        client.shutdown();
    }
}
