//! Surface lifecycle: sizes the canvas to its container, retries while the
//! container has no layout yet, and re-seeds animation state on every resize.

use std::time::Duration;

use centipede_platform::{Canvas, Dimensions, ResizeSource, SubscriptionId};
use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

use crate::config::SurfaceConfig;
use crate::error::{ConfigError, SurfaceError};

/// Receives a full state reset whenever the surface takes a new size.
pub trait Reseed {
    fn reseed(&mut self, size: Dimensions) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Uninitialized,
    /// Container had no size on the last `attempts` tries.
    Pending { attempts: u32 },
    Ready(Dimensions),
    TornDown,
}

/// Outcome of one [`SurfaceLifecycle::initialize`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStatus {
    Ready(Dimensions),
    /// Call again after `retry_after`.
    Pending { attempt: u32, retry_after: Duration },
    TornDown,
}

#[derive(Debug)]
pub struct SurfaceLifecycle {
    state: SurfaceState,
    policy: SurfaceConfig,
    subscription: Option<(SubscriptionId, Receiver<Dimensions>)>,
}

impl SurfaceLifecycle {
    pub fn new(policy: SurfaceConfig) -> Self {
        Self {
            state: SurfaceState::Uninitialized,
            policy,
            subscription: None,
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn size(&self) -> Option<Dimensions> {
        match self.state {
            SurfaceState::Ready(size) => Some(size),
            _ => None,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn initialize<C, R>(
        &mut self,
        container: Dimensions,
        canvas: &mut C,
        target: &mut R,
    ) -> Result<SetupStatus, SurfaceError>
    where
        C: Canvas + ?Sized,
        R: Reseed + ?Sized,
    {
        match self.state {
            SurfaceState::TornDown => return Ok(SetupStatus::TornDown),
            SurfaceState::Ready(size) => return Ok(SetupStatus::Ready(size)),
            SurfaceState::Uninitialized | SurfaceState::Pending { .. } => {}
        }

        if !container.is_positive() {
            let attempt = match self.state {
                SurfaceState::Pending { attempts } => attempts + 1,
                _ => 1,
            };
            if attempt > self.policy.max_attempts {
                warn!(attempt, "container never reported a size");
                return Err(SurfaceError::ContainerNeverSized { attempts: attempt });
            }
            debug!(attempt, %container, "container not laid out yet, retrying");
            self.state = SurfaceState::Pending { attempts: attempt };
            return Ok(SetupStatus::Pending {
                attempt,
                retry_after: self.policy.retry_delay(),
            });
        }

        canvas.create(container).map_err(SurfaceError::Canvas)?;
        target.reseed(container)?;
        self.state = SurfaceState::Ready(container);
        info!(%container, "surface ready");
        Ok(SetupStatus::Ready(container))
    }

    /// Start listening for container dimension changes. No-op when already
    /// subscribed or torn down.
    pub fn observe<S: ResizeSource + ?Sized>(&mut self, source: &mut S) {
        if self.subscription.is_some() || self.state == SurfaceState::TornDown {
            return;
        }
        let (id, receiver) = source.subscribe();
        debug!(?id, "observing container size");
        self.subscription = Some((id, receiver));
    }

    /// Apply every queued dimension change. Returns how many re-seeds ran.
    pub fn pump<C, R>(&mut self, canvas: &mut C, target: &mut R) -> Result<usize, SurfaceError>
    where
        C: Canvas + ?Sized,
        R: Reseed + ?Sized,
    {
        let Some((_, receiver)) = &self.subscription else {
            return Ok(0);
        };
        let pending: Vec<Dimensions> = receiver.try_iter().collect();

        let mut reseeds = 0;
        for size in pending {
            if !size.is_positive() {
                debug!(%size, "ignoring empty container size");
                continue;
            }
            match self.state {
                SurfaceState::Ready(current) => {
                    canvas.resize(size).map_err(SurfaceError::Canvas)?;
                    target.reseed(size)?;
                    self.state = SurfaceState::Ready(size);
                    info!(from = %current, to = %size, "surface resized, state re-seeded");
                    reseeds += 1;
                }
                SurfaceState::Uninitialized | SurfaceState::Pending { .. } => {
                    if let SetupStatus::Ready(_) = self.initialize(size, canvas, target)? {
                        reseeds += 1;
                    }
                }
                SurfaceState::TornDown => break,
            }
        }
        Ok(reseeds)
    }

    /// Release the resize subscription. Safe to call more than once; nothing
    /// is re-seeded afterwards.
    pub fn teardown<S: ResizeSource + ?Sized>(&mut self, source: &mut S) {
        if let Some((id, receiver)) = self.subscription.take() {
            source.unsubscribe(id);
            drop(receiver);
            info!(?id, "resize subscription released");
        }
        self.state = SurfaceState::TornDown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::Sender;
    use glam::Vec2;
    use std::collections::HashMap;

    #[derive(Default)]
    struct NullCanvas {
        created: Vec<Dimensions>,
        resized: Vec<Dimensions>,
    }

    impl Canvas for NullCanvas {
        fn create(&mut self, size: Dimensions) -> centipede_platform::Result<()> {
            self.created.push(size);
            Ok(())
        }
        fn resize(&mut self, size: Dimensions) -> centipede_platform::Result<()> {
            self.resized.push(size);
            Ok(())
        }
        fn background(&mut self, _: centipede_platform::Rgba) {}
        fn stroke(&mut self, _: centipede_platform::Rgba) {}
        fn stroke_weight(&mut self, _: f32) {}
        fn fill(&mut self, _: centipede_platform::Rgba) {}
        fn no_fill(&mut self) {}
        fn line(&mut self, _: Vec2, _: Vec2) {}
        fn circle(&mut self, _: Vec2, _: f32) {}
        fn curve(&mut self, _: &[Vec2]) {}
    }

    #[derive(Default)]
    struct Counter(Vec<Dimensions>);

    impl Reseed for Counter {
        fn reseed(&mut self, size: Dimensions) -> Result<(), ConfigError> {
            self.0.push(size);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Container {
        next: u64,
        subscribers: HashMap<SubscriptionId, Sender<Dimensions>>,
        unsubscribed: Vec<SubscriptionId>,
    }

    impl Container {
        fn resize(&self, size: Dimensions) {
            for sender in self.subscribers.values() {
                let _ = sender.send(size);
            }
        }
    }

    impl ResizeSource for Container {
        fn dimensions(&self) -> Dimensions {
            Dimensions::new(0, 0)
        }
        fn subscribe(&mut self) -> (SubscriptionId, Receiver<Dimensions>) {
            let (tx, rx) = crossbeam_channel::unbounded();
            self.next += 1;
            let id = SubscriptionId(self.next);
            self.subscribers.insert(id, tx);
            (id, rx)
        }
        fn unsubscribe(&mut self, id: SubscriptionId) {
            self.subscribers.remove(&id);
            self.unsubscribed.push(id);
        }
    }

    fn lifecycle() -> SurfaceLifecycle {
        SurfaceLifecycle::new(SurfaceConfig {
            retry_delay_ms: 50,
            max_attempts: 3,
        })
    }

    #[test]
    fn zero_sized_container_retries_then_gives_up() {
        let mut surface = lifecycle();
        let mut canvas = NullCanvas::default();
        let mut seeds = Counter::default();
        for attempt in 1..=3 {
            let status = surface
                .initialize(Dimensions::new(0, 300), &mut canvas, &mut seeds)
                .unwrap();
            assert_eq!(
                status,
                SetupStatus::Pending {
                    attempt,
                    retry_after: Duration::from_millis(50)
                }
            );
        }
        let err = surface
            .initialize(Dimensions::new(400, 0), &mut canvas, &mut seeds)
            .unwrap_err();
        assert!(matches!(err, SurfaceError::ContainerNeverSized { attempts: 4 }));
        assert!(canvas.created.is_empty());
        assert!(seeds.0.is_empty());
    }

    #[test]
    fn pending_then_ready_creates_exact_size() {
        let mut surface = lifecycle();
        let mut canvas = NullCanvas::default();
        let mut seeds = Counter::default();
        surface
            .initialize(Dimensions::new(0, 0), &mut canvas, &mut seeds)
            .unwrap();
        let status = surface
            .initialize(Dimensions::new(400, 300), &mut canvas, &mut seeds)
            .unwrap();
        assert_eq!(status, SetupStatus::Ready(Dimensions::new(400, 300)));
        assert_eq!(canvas.created, vec![Dimensions::new(400, 300)]);
        assert_eq!(seeds.0, vec![Dimensions::new(400, 300)]);

        // A second setup is a no-op.
        surface
            .initialize(Dimensions::new(999, 999), &mut canvas, &mut seeds)
            .unwrap();
        assert_eq!(canvas.created.len(), 1);
        assert_eq!(seeds.0.len(), 1);
    }

    #[test]
    fn each_positive_resize_reseeds_once() {
        let mut surface = lifecycle();
        let mut canvas = NullCanvas::default();
        let mut seeds = Counter::default();
        let mut container = Container::default();
        surface
            .initialize(Dimensions::new(400, 300), &mut canvas, &mut seeds)
            .unwrap();
        surface.observe(&mut container);
        surface.observe(&mut container);
        assert_eq!(container.subscribers.len(), 1);

        container.resize(Dimensions::new(800, 600));
        assert_eq!(surface.pump(&mut canvas, &mut seeds).unwrap(), 1);
        assert_eq!(canvas.resized, vec![Dimensions::new(800, 600)]);
        assert_eq!(seeds.0.len(), 2);
        assert_eq!(surface.size(), Some(Dimensions::new(800, 600)));

        container.resize(Dimensions::new(0, 600));
        assert_eq!(surface.pump(&mut canvas, &mut seeds).unwrap(), 0);
        assert_eq!(surface.pump(&mut canvas, &mut seeds).unwrap(), 0);
        assert_eq!(seeds.0.len(), 2);
    }

    #[test]
    fn resize_while_pending_completes_setup() {
        let mut surface = lifecycle();
        let mut canvas = NullCanvas::default();
        let mut seeds = Counter::default();
        let mut container = Container::default();
        surface
            .initialize(Dimensions::new(0, 0), &mut canvas, &mut seeds)
            .unwrap();
        surface.observe(&mut container);
        container.resize(Dimensions::new(640, 480));
        assert_eq!(surface.pump(&mut canvas, &mut seeds).unwrap(), 1);
        assert_eq!(canvas.created, vec![Dimensions::new(640, 480)]);
        assert_eq!(surface.state(), SurfaceState::Ready(Dimensions::new(640, 480)));
    }

    #[test]
    fn teardown_is_idempotent_and_final() {
        let mut surface = lifecycle();
        let mut canvas = NullCanvas::default();
        let mut seeds = Counter::default();
        let mut container = Container::default();

        surface.teardown(&mut container);
        assert!(container.unsubscribed.is_empty());

        let mut surface = lifecycle();
        surface
            .initialize(Dimensions::new(400, 300), &mut canvas, &mut seeds)
            .unwrap();
        surface.observe(&mut container);
        surface.teardown(&mut container);
        surface.teardown(&mut container);
        assert_eq!(container.unsubscribed.len(), 1);
        assert!(container.subscribers.is_empty());

        container.resize(Dimensions::new(800, 600));
        assert_eq!(surface.pump(&mut canvas, &mut seeds).unwrap(), 0);
        assert_eq!(
            surface
                .initialize(Dimensions::new(800, 600), &mut canvas, &mut seeds)
                .unwrap(),
            SetupStatus::TornDown
        );
        surface.observe(&mut container);
        assert!(!surface.is_subscribed());
        assert_eq!(seeds.0.len(), 1);
    }
}
