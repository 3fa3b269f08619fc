//! Bevy plugin that bridges a view channel into the ECS

use bevy::{
    app::{App, Last, Plugin, PreUpdate},
    ecs::{
        message::{Message, MessageReader, MessageWriter},
        resource::Resource,
        system::Res,
    },
};
use log::{error, warn};

use crate::{
    channel::{BinaryChannel, ViewChannel},
    credential::Credential,
    message::{EventEnvelope, MethodCall},
};

/// Identity and configuration of the view driving this app
#[derive(Resource, Debug, Clone)]
pub struct NavigationViewInfo {
    /// Host-assigned instance id
    pub instance_id: i32,
    /// Credential the view was created with
    pub credential: Credential,
}

/// A method call received from the host
#[derive(Message, Debug, Clone, PartialEq)]
pub struct HostMethodCall(pub MethodCall);

/// An event to report to the host
#[derive(Message, Debug, Clone, PartialEq)]
pub struct ViewEvent(pub EventEnvelope);

/// Plugin that connects one embedded navigation view to a Bevy app
///
/// Incoming host bytes are decoded into [`HostMethodCall`] messages during
/// `PreUpdate`; [`ViewEvent`] messages written during the frame are encoded
/// and sent to the host in `Last`. One app drives exactly one view.
///
/// # Example
///
/// ```no_run
/// use bevy::app::App;
/// use navigation_embedded::prelude::*;
///
/// fn attach(view: &EmbeddedNavigationView) -> App {
///     let mut app = App::new();
///     view.install(&mut app);
///     app
/// }
/// ```
pub struct NavigationViewPlugin {
    channel: ViewChannel,
    info: NavigationViewInfo,
}

impl NavigationViewPlugin {
    /// Plugin for the view bound to `channel`
    pub fn new(instance_id: i32, channel: ViewChannel, credential: Credential) -> Self {
        Self {
            channel,
            info: NavigationViewInfo {
                instance_id,
                credential,
            },
        }
    }
}

impl Plugin for NavigationViewPlugin {
    fn name(&self) -> &str {
        "navigation_embedded::NavigationViewPlugin"
    }

    fn build(&self, app: &mut App) {
        app.insert_resource(self.channel.clone())
            .insert_resource(self.info.clone())
            .add_message::<HostMethodCall>()
            .add_message::<ViewEvent>()
            .add_systems(PreUpdate, receive_host_calls)
            .add_systems(Last, send_view_events);
    }
}

/// System that drains the channel and forwards decoded calls
fn receive_host_calls(channel: Res<ViewChannel>, mut calls: MessageWriter<HostMethodCall>) {
    while let Some(bytes) = channel.receive() {
        match MethodCall::decode(&bytes) {
            Ok(call) => {
                calls.write(HostMethodCall(call));
            }
            Err(err) => warn!("Dropping malformed call on {}: {}", channel.name(), err),
        }
    }
}

/// System that sends queued view events to the host
fn send_view_events(channel: Res<ViewChannel>, mut events: MessageReader<ViewEvent>) {
    for ViewEvent(event) in events.read() {
        if let Err(err) = channel.send(event.encode()) {
            error!("Failed to report {} on {}: {}", event.event, channel.name(), err);
        }
    }
}
