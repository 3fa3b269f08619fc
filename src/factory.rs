//! Factory creating one embedded navigation view per host request

use std::sync::Arc;

use log::{debug, error};

use crate::{
    args::CreationArgs,
    channel::{ChannelFactory, Transport},
    config::FactoryConfig,
    context::{HostActivity, HostContext},
    credential::{Credential, CredentialResolver, ResourceCredentialResolver},
    error::{EmbedError, Result},
    theme::WindowTheme,
    view::{DefaultViewBuilder, NavigationViewBuilder, PlatformView, ViewConstruction},
};

/// Host-facing surface of a view factory
///
/// Object safe, so the host's view registry can hold factories for several
/// view types behind one trait object.
pub trait PlatformViewFactory: Send + Sync {
    /// Creates a view from raw creation-argument bytes
    fn create_view(
        &self,
        context: Option<Arc<dyn HostContext>>,
        instance_id: i32,
        raw_args: &[u8],
    ) -> Result<Box<dyn PlatformView>>;
}

/// Creates embedded navigation views bound to per-instance channels
///
/// Preconditions owned by the host: `instance_id` is unique among live
/// views, and is only reused after the previous view was disposed. The
/// factory keeps no registry of the views it creates.
pub struct EmbeddedViewFactory<B: NavigationViewBuilder = DefaultViewBuilder> {
    transport: Arc<dyn Transport>,
    activity: Arc<dyn HostActivity>,
    resolver: Box<dyn CredentialResolver>,
    builder: B,
    channels: ChannelFactory,
    theme: Option<WindowTheme>,
    config: FactoryConfig,
}

impl EmbeddedViewFactory<DefaultViewBuilder> {
    /// Factory with the default resolver, builder and config
    pub fn new(transport: Arc<dyn Transport>, activity: Arc<dyn HostActivity>) -> Self {
        Self::with_config(transport, activity, FactoryConfig::default())
    }

    /// Factory with the default resolver and builder
    pub fn with_config(
        transport: Arc<dyn Transport>,
        activity: Arc<dyn HostActivity>,
        config: FactoryConfig,
    ) -> Self {
        EmbeddedViewFactory {
            transport,
            activity,
            resolver: Box::new(ResourceCredentialResolver),
            builder: DefaultViewBuilder,
            channels: ChannelFactory::new(config.channel_namespace.clone()),
            theme: config.theme.as_deref().map(WindowTheme::new),
            config,
        }
    }
}

impl<B: NavigationViewBuilder> EmbeddedViewFactory<B> {
    /// Replaces the credential resolver
    pub fn resolver(mut self, resolver: impl CredentialResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Replaces the view builder
    pub fn builder<C: NavigationViewBuilder>(self, builder: C) -> EmbeddedViewFactory<C> {
        EmbeddedViewFactory {
            transport: self.transport,
            activity: self.activity,
            resolver: self.resolver,
            builder,
            channels: self.channels,
            theme: self.theme,
            config: self.config,
        }
    }

    /// The factory's configuration
    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Applies the configured theme to the host window
    ///
    /// Idempotent and independent of any view. Returns `Ok(())` when no theme
    /// is configured.
    pub fn configure_window(&self) -> Result<()> {
        match &self.theme {
            Some(theme) => theme.apply(self.activity.as_ref()),
            None => Ok(()),
        }
    }

    /// Creates the view for `instance_id`
    ///
    /// A missing credential does not fail creation: the view is built with
    /// [`Credential::Absent`] and the navigation SDK decides what to do with
    /// it. Every other failure is returned before any channel stays open.
    pub fn create(
        &self,
        context: Option<Arc<dyn HostContext>>,
        instance_id: i32,
        args: Option<CreationArgs>,
    ) -> Result<B::View> {
        debug!("Creating navigation view {}", instance_id);

        let render_context = context.ok_or_else(|| {
            error!("Navigation view {} requested without a context", instance_id);
            EmbedError::MissingContext
        })?;

        let key = &self.config.credential_key;
        let credential =
            Credential::from_lookup(key, self.resolver.resolve(render_context.as_ref(), key));

        let channel = self.channels.create_channel(&self.transport, instance_id)?;

        let binding = match self.activity.inflate(&self.config.layout) {
            Ok(binding) => binding,
            Err(err) => {
                channel.close();
                return Err(err);
            }
        };

        let parts = ViewConstruction {
            render_context,
            activity: Arc::downgrade(&self.activity),
            binding,
            channel: channel.clone(),
            instance_id,
            args: args.unwrap_or_default(),
            credential,
        };

        let view = match self.builder.build(parts) {
            Ok(view) => view,
            Err(err) => {
                error!("Navigation view {} construction failed: {}", instance_id, err);
                channel.close();
                return Err(err);
            }
        };

        if let Some(theme) = &self.theme {
            theme.apply_best_effort(self.activity.as_ref());
        }

        Ok(view)
    }
}

impl<B: NavigationViewBuilder> PlatformViewFactory for EmbeddedViewFactory<B> {
    fn create_view(
        &self,
        context: Option<Arc<dyn HostContext>>,
        instance_id: i32,
        raw_args: &[u8],
    ) -> Result<Box<dyn PlatformView>> {
        let args = CreationArgs::from_slice(raw_args)?;
        let view = self.create(context, instance_id, Some(args))?;
        Ok(Box::new(view))
    }
}
