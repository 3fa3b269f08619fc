//! Embedded navigation view support for host applications
//!
//! This crate creates native navigation map views on demand and embeds them
//! in a host application's view hierarchy. Each view gets its own message
//! channel so host-side code can drive and observe it, and is configured with
//! an access token looked up from the host's resources.
//!
//! # Architecture
//!
//! - **EmbeddedViewFactory**: creates one view per host request
//! - **CredentialResolver**: looks up the access token for a host context
//! - **ChannelFactory**: opens a `<namespace>/<instance id>` channel per view
//! - **WindowTheme**: idempotent, window-wide theme step
//! - **NavigationViewPlugin**: bridges a view's channel into a Bevy app

#![warn(missing_docs)]

mod args;
mod channel;
mod config;
mod context;
mod credential;
mod error;
mod factory;
mod init;
mod message;
mod messenger;
mod plugin;
mod theme;
mod view;

#[cfg(target_os = "android")]
pub mod android;

pub use args::*;
pub use channel::*;
pub use config::*;
pub use context::*;
pub use credential::*;
pub use error::*;
pub use factory::*;
pub use message::*;
pub use messenger::*;
pub use plugin::*;
pub use theme::*;
pub use view::*;

#[cfg(target_os = "android")]
pub use android::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        args::CreationArgs,
        channel::{BinaryChannel, ChannelName, Transport, ViewChannel},
        config::FactoryConfig,
        context::{HostActivity, HostContext, LayoutBinding},
        credential::{Credential, CredentialResolver},
        error::EmbedError,
        factory::{EmbeddedViewFactory, PlatformViewFactory},
        message::{EventEnvelope, MethodCall},
        messenger::HostMessenger,
        plugin::{HostMethodCall, NavigationViewInfo, NavigationViewPlugin, ViewEvent},
        view::{EmbeddedNavigationView, PlatformView},
    };

    #[cfg(target_os = "android")]
    pub use crate::android::*;
}
