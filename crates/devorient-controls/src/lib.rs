pub mod transform;

pub use transform::{object_quaternion, DEVICE_ROTATION_ORDER, DEVICE_TO_CAMERA};

use devorient_scene::RotationSink;
use devorient_sensor::{
    angle_or_zero, EventKind, EventSource, OrientationEvent, OrientationSample,
    ScreenOrientation, SubscriptionId,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// Latest values pushed by the two event producers.
///
/// Each producer owns one channel, so concurrent handlers never write the
/// same field. Readers take a snapshot without blocking the writers.
struct Latch {
    sample: watch::Sender<OrientationSample>,
    screen_orientation: watch::Sender<ScreenOrientation>,
}

impl Latch {
    fn new() -> Self {
        let (sample, _) = watch::channel(OrientationSample::default());
        let (screen_orientation, _) = watch::channel(ScreenOrientation::default());
        Self {
            sample,
            screen_orientation,
        }
    }

    fn latch_sample(&self, sample: OrientationSample) {
        self.sample.send_replace(sample);
    }

    fn latch_screen_orientation(&self, angle: Option<f64>) {
        self.screen_orientation
            .send_replace(ScreenOrientation::from_platform(angle));
    }

    fn reset(&self) {
        self.sample.send_replace(OrientationSample::default());
        self.screen_orientation
            .send_replace(ScreenOrientation::default());
    }

    fn snapshot(&self) -> (OrientationSample, ScreenOrientation) {
        (*self.sample.borrow(), *self.screen_orientation.borrow())
    }
}

struct Subscriptions {
    device_orientation: SubscriptionId,
    orientation_change: SubscriptionId,
}

/// Drives a scene object's rotation from device-orientation events.
///
/// Events only latch state. The transform runs when [`update`] is called,
/// normally once per rendered frame, so repeated calls with no new events
/// produce identical rotations.
///
/// [`update`]: DeviceOrientationControls::update
pub struct DeviceOrientationControls<S> {
    object: S,
    source: Arc<dyn EventSource>,
    enabled: bool,
    /// Heading bias in radians, added to non-zero alpha readings.
    alpha_offset: f32,
    latch: Arc<Latch>,
    subscriptions: Option<Subscriptions>,
}

impl<S: RotationSink> DeviceOrientationControls<S> {
    /// Bind `object` and start listening to `source`.
    pub fn new(object: S, source: Arc<dyn EventSource>) -> Self {
        Self::with_alpha_offset(object, source, 0.0)
    }

    /// Like [`new`](Self::new) with a heading bias in radians.
    pub fn with_alpha_offset(mut object: S, source: Arc<dyn EventSource>, alpha_offset: f32) -> Self {
        fix_rotation_order(&mut object);

        let mut controls = Self {
            object,
            source,
            enabled: true,
            alpha_offset,
            latch: Arc::new(Latch::new()),
            subscriptions: None,
        };
        controls.connect();
        controls
    }

    /// Rebind to a new object, returning the previous one.
    ///
    /// Resets the latched sample and screen angle and re-enables the
    /// controls. Existing subscriptions are kept.
    pub fn configure(&mut self, mut object: S, alpha_offset: f32) -> S {
        fix_rotation_order(&mut object);
        self.latch.reset();
        self.enabled = true;
        self.alpha_offset = alpha_offset;
        debug!(alpha_offset, "Device orientation controls reconfigured");
        std::mem::replace(&mut self.object, object)
    }

    /// Latch a `deviceorientation` reading, replacing the previous one.
    pub fn on_orientation_sample(&self, sample: OrientationSample) {
        self.latch.latch_sample(sample);
    }

    /// Latch the screen angle reported by an `orientationchange` event.
    pub fn on_screen_orientation_change(&self, angle: Option<f64>) {
        self.latch.latch_screen_orientation(angle);
    }

    /// Subscribe to the event source and enable updates.
    ///
    /// The current screen angle is sampled immediately. Connecting while
    /// already connected keeps the existing subscriptions.
    pub fn connect(&mut self) {
        self.on_screen_orientation_change(self.source.screen_orientation());

        if self.subscriptions.is_none() {
            let latch = Arc::clone(&self.latch);
            let orientation_change = self.source.subscribe(
                EventKind::OrientationChange,
                Arc::new(move |event: &OrientationEvent| {
                    if let OrientationEvent::OrientationChange(angle) = event {
                        latch.latch_screen_orientation(*angle);
                    }
                }),
            );

            let latch = Arc::clone(&self.latch);
            let device_orientation = self.source.subscribe(
                EventKind::DeviceOrientation,
                Arc::new(move |event: &OrientationEvent| {
                    if let OrientationEvent::DeviceOrientation(sample) = event {
                        latch.latch_sample(*sample);
                    }
                }),
            );

            self.subscriptions = Some(Subscriptions {
                device_orientation,
                orientation_change,
            });
            info!("Device orientation controls connected");
        } else {
            debug!("Device orientation controls already connected");
        }

        self.enabled = true;
    }

    /// Unsubscribe from the event source and disable updates.
    pub fn disconnect(&mut self) {
        self.release();
        self.enabled = false;
    }

    /// Same as [`disconnect`](Self::disconnect).
    pub fn dispose(&mut self) {
        self.disconnect();
    }

    /// Compute the rotation from the latched state and write it to the object.
    ///
    /// Does nothing while disabled.
    pub fn update(&mut self) {
        if !self.enabled {
            return;
        }

        let (sample, screen) = self.latch.snapshot();

        let alpha = angle_or_zero(sample.alpha);
        let alpha = if alpha != 0.0 {
            alpha.to_radians() as f32 + self.alpha_offset
        } else {
            0.0
        };
        let beta = angle_or_zero(sample.beta).to_radians() as f32;
        let gamma = angle_or_zero(sample.gamma).to_radians() as f32;
        let orient = screen.radians() as f32;

        let quaternion = object_quaternion(alpha, beta, gamma, orient);
        trace!(
            alpha,
            beta,
            gamma,
            screen_degrees = screen.degrees(),
            ?quaternion,
            "Orientation applied"
        );
        self.object.set_quaternion(quaternion);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Gate `update` without touching subscriptions.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_connected(&self) -> bool {
        self.subscriptions.is_some()
    }

    pub fn alpha_offset(&self) -> f32 {
        self.alpha_offset
    }

    pub fn set_alpha_offset(&mut self, alpha_offset: f32) {
        self.alpha_offset = alpha_offset;
    }

    pub fn object(&self) -> &S {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut S {
        &mut self.object
    }
}

impl<S> DeviceOrientationControls<S> {
    fn release(&mut self) {
        if let Some(subscriptions) = self.subscriptions.take() {
            self.source.unsubscribe(subscriptions.orientation_change);
            self.source.unsubscribe(subscriptions.device_orientation);
            info!("Device orientation controls disconnected");
        }
    }
}

impl<S> Drop for DeviceOrientationControls<S> {
    fn drop(&mut self) {
        self.release();
    }
}

fn fix_rotation_order<S: RotationSink>(object: &mut S) {
    let previous = object.rotation_order();
    if previous != DEVICE_ROTATION_ORDER {
        debug!(?previous, "Reordering object rotation to YXZ");
    }
    object.set_rotation_order(DEVICE_ROTATION_ORDER);
}
