//! Viewport dimensions and the debounced resize handler

use std::time::Duration;

use crate::debounce::Debouncer;

/// Logical size of the drawable surface plus the device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Camera aspect ratio; a collapsed surface reports 1.0
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 && self.width > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Device pixel ratio capped at `max`
    pub fn effective_pixel_ratio(&self, max: f32) -> f32 {
        self.device_pixel_ratio.min(max).max(f32::EPSILON)
    }

    /// Surface size in physical pixels after capping the pixel ratio
    pub fn physical_size(&self, max_pixel_ratio: f32) -> (u32, u32) {
        let ratio = self.effective_pixel_ratio(max_pixel_ratio);
        (
            (self.width * ratio).round().max(0.0) as u32,
            (self.height * ratio).round().max(0.0) as u32,
        )
    }
}

/// Resize listener that coalesces bursts and can be detached
#[derive(Debug, Clone)]
pub struct ResizeHandler {
    debouncer: Debouncer<Viewport>,
    attached: bool,
}

impl ResizeHandler {
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            attached: true,
        }
    }

    /// Record a resize event; returns false once the handler is detached
    pub fn on_resize(&mut self, viewport: Viewport, now: Duration) -> bool {
        if !self.attached {
            return false;
        }
        self.debouncer.schedule(viewport, now);
        true
    }

    /// The viewport to apply, if a burst has settled
    pub fn poll(&mut self, now: Duration) -> Option<Viewport> {
        if !self.attached {
            return None;
        }
        self.debouncer.poll(now)
    }

    /// Stop handling events and drop anything pending
    pub fn detach(&mut self) {
        self.attached = false;
        self.debouncer.cancel();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect() {
        assert_eq!(Viewport::new(1600.0, 800.0, 1.0).aspect(), 2.0);
        assert_eq!(Viewport::new(1600.0, 0.0, 1.0).aspect(), 1.0);
    }

    #[test]
    fn test_pixel_ratio_is_capped() {
        let retina = Viewport::new(400.0, 300.0, 3.0);
        assert_eq!(retina.effective_pixel_ratio(2.0), 2.0);
        assert_eq!(retina.physical_size(2.0), (800, 600));

        let plain = Viewport::new(400.0, 300.0, 1.25);
        assert_eq!(plain.effective_pixel_ratio(2.0), 1.25);
        assert_eq!(plain.physical_size(2.0), (500, 375));
    }

    #[test]
    fn test_burst_applies_only_last_viewport() {
        let mut handler = ResizeHandler::new(Duration::ZERO);
        let now = Duration::from_millis(500);
        for width in [640.0, 800.0, 1024.0, 1280.0] {
            assert!(handler.on_resize(Viewport::new(width, 720.0, 1.0), now));
        }
        assert_eq!(handler.poll(now), None);

        let applied = handler.poll(now + Duration::from_millis(16)).unwrap();
        assert_eq!(applied.width, 1280.0);
        assert_eq!(applied.aspect(), 1280.0 / 720.0);
        assert_eq!(handler.poll(now + Duration::from_millis(32)), None);
    }

    #[test]
    fn test_detached_handler_ignores_events() {
        let mut handler = ResizeHandler::new(Duration::ZERO);
        handler.on_resize(Viewport::new(800.0, 600.0, 1.0), Duration::ZERO);
        handler.detach();

        assert!(!handler.on_resize(Viewport::new(1024.0, 768.0, 1.0), Duration::ZERO));
        assert_eq!(handler.poll(Duration::from_secs(1)), None);
        assert!(!handler.is_attached());
    }
}
