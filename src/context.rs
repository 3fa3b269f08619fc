//! Host-side collaborators consumed by the view factory

use crate::error::Result;

/// Rendering context supplied by the host with each creation request
///
/// On Android this wraps an `android.content.Context`; elsewhere it is
/// whatever the host uses to look up packaged resources.
pub trait HostContext: Send + Sync {
    /// Package or bundle identifier that owns the resources
    fn package_name(&self) -> &str;

    /// Looks up a string resource by name
    fn string_resource(&self, name: &str) -> Option<String>;
}

/// The activity or window that hosts embedded views
///
/// Shared by every view the factory creates. Views only ever hold a weak
/// reference to it.
pub trait HostActivity: Send + Sync {
    /// Sets the named visual style on the whole window
    fn set_theme(&self, style: &str) -> Result<()>;

    /// Inflates the named layout and returns a binding to it
    fn inflate(&self, layout: &str) -> Result<LayoutBinding>;
}

/// Handle to a layout inflated from the host activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutBinding {
    /// Layout resource name
    pub layout: String,
    /// Host resource identifier of the layout
    pub resource_id: i32,
}

impl LayoutBinding {
    /// Creates a binding for the given layout
    pub fn new(layout: impl Into<String>, resource_id: i32) -> Self {
        Self {
            layout: layout.into(),
            resource_id,
        }
    }
}
