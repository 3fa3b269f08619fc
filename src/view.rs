//! The embedded navigation view and its construction contract

use std::sync::{Arc, Weak};

use bevy::app::App;
use log::debug;

use crate::{
    args::CreationArgs,
    channel::ViewChannel,
    context::{HostActivity, HostContext, LayoutBinding},
    credential::Credential,
    error::Result,
    plugin::NavigationViewPlugin,
};

/// Everything a navigation view is constructed from
///
/// This is the stable hand-off from the factory to the navigation SDK side.
pub struct ViewConstruction {
    /// Rendering context supplied with the request
    pub render_context: Arc<dyn HostContext>,
    /// Host activity; not owned by the view
    pub activity: Weak<dyn HostActivity>,
    /// Inflated navigation layout
    pub binding: LayoutBinding,
    /// Channel bound to this instance
    pub channel: ViewChannel,
    /// Host-assigned instance id
    pub instance_id: i32,
    /// Creation arguments
    pub args: CreationArgs,
    /// Resolved access credential, or the absence marker
    pub credential: Credential,
}

/// A native view owned by the host's view registry
pub trait PlatformView: Send {
    /// Host-assigned instance id the view was created for
    fn instance_id(&self) -> i32;

    /// Channel bound to this view, `None` once disposed
    fn channel(&self) -> Option<&ViewChannel>;

    /// Releases the view's resources; safe to call more than once
    fn dispose(&mut self);
}

/// Constructs navigation views from a [`ViewConstruction`]
pub trait NavigationViewBuilder: Send + Sync {
    /// Concrete view type produced
    type View: PlatformView + 'static;

    /// Builds the view; on error the factory closes the channel
    fn build(&self, parts: ViewConstruction) -> Result<Self::View>;
}

/// Builder producing [`EmbeddedNavigationView`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultViewBuilder;

impl NavigationViewBuilder for DefaultViewBuilder {
    type View = EmbeddedNavigationView;

    fn build(&self, parts: ViewConstruction) -> Result<EmbeddedNavigationView> {
        Ok(EmbeddedNavigationView::new(parts))
    }
}

/// Native navigation map surface embedded in the host view hierarchy
pub struct EmbeddedNavigationView {
    instance_id: i32,
    render_context: Arc<dyn HostContext>,
    activity: Weak<dyn HostActivity>,
    binding: LayoutBinding,
    channel: Option<ViewChannel>,
    args: CreationArgs,
    credential: Credential,
}

impl EmbeddedNavigationView {
    /// Creates the view from its construction parts
    pub fn new(parts: ViewConstruction) -> Self {
        debug!(
            "Navigation view {} bound to {} (credential present: {})",
            parts.instance_id,
            parts.channel.name(),
            parts.credential.is_present()
        );
        Self {
            instance_id: parts.instance_id,
            render_context: parts.render_context,
            activity: parts.activity,
            binding: parts.binding,
            channel: Some(parts.channel),
            args: parts.args,
            credential: parts.credential,
        }
    }

    /// Credential the view was configured with
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Creation arguments
    pub fn args(&self) -> &CreationArgs {
        &self.args
    }

    /// Inflated layout binding
    pub fn binding(&self) -> &LayoutBinding {
        &self.binding
    }

    /// Rendering context supplied with the request
    pub fn render_context(&self) -> &Arc<dyn HostContext> {
        &self.render_context
    }

    /// Host activity, if it is still alive
    pub fn activity(&self) -> Option<Arc<dyn HostActivity>> {
        self.activity.upgrade()
    }

    /// Whether [`PlatformView::dispose`] has run
    pub fn is_disposed(&self) -> bool {
        self.channel.is_none()
    }

    /// Installs this view's channel into a Bevy app
    ///
    /// Returns `false` if the view is already disposed.
    pub fn install(&self, app: &mut App) -> bool {
        let Some(channel) = &self.channel else {
            return false;
        };
        app.add_plugins(NavigationViewPlugin::new(
            self.instance_id,
            channel.clone(),
            self.credential.clone(),
        ));
        true
    }
}

impl PlatformView for EmbeddedNavigationView {
    fn instance_id(&self) -> i32 {
        self.instance_id
    }

    fn channel(&self) -> Option<&ViewChannel> {
        self.channel.as_ref()
    }

    fn dispose(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.close();
            debug!("Navigation view {} disposed", self.instance_id);
        }
    }
}

impl Drop for EmbeddedNavigationView {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for EmbeddedNavigationView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedNavigationView")
            .field("instance_id", &self.instance_id)
            .field("binding", &self.binding)
            .field("channel", &self.channel)
            .field("args", &self.args)
            .field("credential", &self.credential)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        channel::{ChannelFactory, Transport},
        messenger::HostMessenger,
        plugin::NavigationViewInfo,
    };

    struct Host;

    impl HostContext for Host {
        fn package_name(&self) -> &str {
            "com.example.host"
        }

        fn string_resource(&self, _name: &str) -> Option<String> {
            None
        }
    }

    impl HostActivity for Host {
        fn set_theme(&self, _style: &str) -> Result<()> {
            Ok(())
        }

        fn inflate(&self, layout: &str) -> Result<LayoutBinding> {
            Ok(LayoutBinding::new(layout, 1))
        }
    }

    fn view(messenger: &Arc<HostMessenger>, activity: &Arc<dyn HostActivity>) -> EmbeddedNavigationView {
        let transport: Arc<dyn Transport> = messenger.clone();
        EmbeddedNavigationView::new(ViewConstruction {
            render_context: Arc::new(Host),
            activity: Arc::downgrade(activity),
            binding: LayoutBinding::new("navigation_activity", 1),
            channel: ChannelFactory::default()
                .create_channel(&transport, 21)
                .unwrap(),
            instance_id: 21,
            args: CreationArgs::new(),
            credential: Credential::Absent {
                key: "mapbox_access_token".into(),
            },
        })
    }

    #[test]
    fn install_only_while_live() {
        let messenger = Arc::new(HostMessenger::new());
        let activity: Arc<dyn HostActivity> = Arc::new(Host);
        let mut view = view(&messenger, &activity);

        let mut app = App::new();
        assert!(view.install(&mut app));
        let info = app.world().resource::<NavigationViewInfo>();
        assert_eq!(info.instance_id, 21);
        assert!(!info.credential.is_present());
        assert_eq!(
            app.world().resource::<ViewChannel>().name(),
            view.channel().unwrap().name()
        );

        view.dispose();
        assert!(messenger.open_channels().is_empty());
        assert!(app.world().resource::<ViewChannel>().is_closed());

        let mut late = App::new();
        assert!(!view.install(&mut late));
        assert!(late.world().get_resource::<NavigationViewInfo>().is_none());
    }
}
