//! Window theme applied to the host activity

use std::sync::Mutex;

use log::{debug, warn};

use crate::{context::HostActivity, error::Result};

/// Style the host window uses while navigation views are embedded
pub const DEFAULT_THEME: &str = "Theme.AppCompat.NoActionBar";

/// Window-wide theme step, decoupled from per-view construction
///
/// The theme is global to the activity, not to any one view. Applying it is
/// idempotent: once a style has been set successfully, further calls with the
/// same style do not touch the window again.
#[derive(Debug)]
pub struct WindowTheme {
    style: String,
    applied: Mutex<bool>,
}

impl Default for WindowTheme {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

impl WindowTheme {
    /// Theme step for the given style resource
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            applied: Mutex::new(false),
        }
    }

    /// Style resource name
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Whether the style has been applied successfully
    pub fn is_applied(&self) -> bool {
        self.applied.lock().map(|applied| *applied).unwrap_or(false)
    }

    /// Sets the style on `activity` unless it is already applied
    pub fn apply(&self, activity: &dyn HostActivity) -> Result<()> {
        let Ok(mut applied) = self.applied.lock() else {
            return activity.set_theme(&self.style);
        };
        if *applied {
            return Ok(());
        }
        activity.set_theme(&self.style)?;
        *applied = true;
        debug!("Applied window theme {}", self.style);
        Ok(())
    }

    /// Like [`WindowTheme::apply`], but failures are logged and swallowed
    pub fn apply_best_effort(&self, activity: &dyn HostActivity) -> bool {
        match self.apply(activity) {
            Ok(()) => true,
            Err(err) => {
                warn!("Window theme not applied: {}", err);
                false
            }
        }
    }
}
