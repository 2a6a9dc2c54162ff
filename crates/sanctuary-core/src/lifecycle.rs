//! Mount lifecycle of the scene
//!
//! A scene is activated once and deactivated once. Asynchronous work
//! (asset load continuations, frame callbacks) checks [`Lifecycle::is_active`]
//! before touching anything, and the resources that must be released on
//! teardown are handed out through a single [`Release`] token.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Scene cannot be activated from the {0:?} phase")]
    InvalidActivation(Phase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Mounting,
    Active,
    Deactivated,
}

#[derive(Debug, Clone)]
pub struct Lifecycle {
    phase: Phase,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: Phase::Mounting,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn activate(&mut self) -> Result<(), LifecycleError> {
        match self.phase {
            Phase::Mounting => {
                self.phase = Phase::Active;
                Ok(())
            }
            other => Err(LifecycleError::InvalidActivation(other)),
        }
    }

    /// Flip to inactive. Only the first call returns the release token.
    pub fn deactivate(&mut self) -> Option<Release> {
        if self.phase == Phase::Deactivated {
            return None;
        }
        self.phase = Phase::Deactivated;
        Some(Release::default())
    }
}

/// Teardown obligations that must each be discharged once
#[derive(Debug, Default)]
#[must_use = "a release token must be finished to release the scene's resources"]
pub struct Release {
    report: ReleaseReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    pub resize_handler_removed: bool,
    pub controls_released: bool,
    pub renderer_released: bool,
}

impl Release {
    pub fn remove_resize_handler(&mut self, f: impl FnOnce()) {
        if !self.report.resize_handler_removed {
            f();
            self.report.resize_handler_removed = true;
        }
    }

    pub fn release_controls(&mut self, f: impl FnOnce()) {
        if !self.report.controls_released {
            f();
            self.report.controls_released = true;
        }
    }

    pub fn release_renderer(&mut self, f: impl FnOnce()) {
        if !self.report.renderer_released {
            f();
            self.report.renderer_released = true;
        }
    }

    pub fn finish(self) -> ReleaseReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_phases() {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.phase(), Phase::Mounting);
        assert!(!lifecycle.is_active());

        lifecycle.activate().unwrap();
        assert!(lifecycle.is_active());
        assert_eq!(
            lifecycle.activate(),
            Err(LifecycleError::InvalidActivation(Phase::Active))
        );

        let _ = lifecycle.deactivate();
        assert!(!lifecycle.is_active());
        assert_eq!(
            lifecycle.activate(),
            Err(LifecycleError::InvalidActivation(Phase::Deactivated))
        );
    }

    #[test]
    fn test_release_happens_exactly_once() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.activate().unwrap();

        let listener_removals = Cell::new(0);
        let control_disposals = Cell::new(0);
        let renderer_disposals = Cell::new(0);

        for _ in 0..3 {
            if let Some(mut release) = lifecycle.deactivate() {
                release.remove_resize_handler(|| listener_removals.set(listener_removals.get() + 1));
                release.release_controls(|| control_disposals.set(control_disposals.get() + 1));
                release.release_controls(|| control_disposals.set(control_disposals.get() + 1));
                release.release_renderer(|| renderer_disposals.set(renderer_disposals.get() + 1));
                let report = release.finish();
                assert!(report.resize_handler_removed);
                assert!(report.controls_released);
                assert!(report.renderer_released);
            }
        }

        assert_eq!(listener_removals.get(), 1);
        assert_eq!(control_disposals.get(), 1);
        assert_eq!(renderer_disposals.get(), 1);
    }

    #[test]
    fn test_unmount_before_activation() {
        let mut lifecycle = Lifecycle::new();
        assert!(lifecycle.deactivate().is_some());
        assert!(lifecycle.deactivate().is_none());
        assert!(!lifecycle.is_active());
    }
}
