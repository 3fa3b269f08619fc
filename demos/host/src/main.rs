//! Desktop host that embeds two navigation views and drives them over
//! their channels

use std::{collections::HashMap, sync::Arc};

use bevy::{
    log::{Level, LogPlugin},
    prelude::*,
};
use navigation_embedded::{
    EnvCredentialResolver, ResolverChain, ResourceCredentialResolver, prelude::*,
};
use serde_json::json;

/// Host resources and window, standing in for an Android activity
struct DemoHost {
    strings: HashMap<&'static str, String>,
}

impl HostContext for DemoHost {
    fn package_name(&self) -> &str {
        "com.example.navigation_host"
    }

    fn string_resource(&self, name: &str) -> Option<String> {
        self.strings.get(name).cloned()
    }
}

impl HostActivity for DemoHost {
    fn set_theme(&self, style: &str) -> navigation_embedded::Result<()> {
        info!("Host window theme set to {}", style);
        Ok(())
    }

    fn inflate(&self, layout: &str) -> navigation_embedded::Result<LayoutBinding> {
        Ok(LayoutBinding::new(layout, 0x7f0b_0001))
    }
}

/// Answers every host call with an event echoing the method name
fn echo_calls(
    info: Res<NavigationViewInfo>,
    mut calls: MessageReader<HostMethodCall>,
    mut events: MessageWriter<ViewEvent>,
) {
    for HostMethodCall(call) in calls.read() {
        info!("View {} received {}", info.instance_id, call.method);
        events.write(ViewEvent(EventEnvelope::new(
            "methodHandled",
            json!({ "method": call.method, "view": info.instance_id }),
        )));
    }
}

fn main() {
    // No packaged token: the resolver chain falls back to MAPBOX_ACCESS_TOKEN.
    let host = Arc::new(DemoHost {
        strings: HashMap::new(),
    });
    let messenger = Arc::new(HostMessenger::new());
    let factory = EmbeddedViewFactory::new(messenger.clone(), host.clone()).resolver(
        ResolverChain::new()
            .with(ResourceCredentialResolver)
            .with(EnvCredentialResolver::default()),
    );

    let mut apps = Vec::new();
    let mut views = Vec::new();
    for instance_id in [1, 2] {
        let view = match factory.create(Some(host.clone()), instance_id, None) {
            Ok(view) => view,
            Err(err) => {
                eprintln!("view {instance_id} not created: {err}");
                return;
            }
        };

        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            LogPlugin {
                level: Level::DEBUG,
                filter: "navigation_embedded=debug".to_string(),
                ..Default::default()
            },
        ));
        view.install(&mut app);
        app.add_systems(Update, echo_calls);
        apps.push(app);
        views.push(view);
    }

    for view in &views {
        let Some(channel) = view.channel() else {
            continue;
        };
        if let Some(host_side) = messenger.host_endpoint(channel.name()) {
            let call = MethodCall::new("startNavigation", json!({ "simulateRoute": true }));
            if let Err(err) = host_side.send(call.encode()) {
                eprintln!("call to view {} not sent: {err}", view.instance_id());
            }
        }
    }

    for app in &mut apps {
        app.update();
    }

    for view in &views {
        let Some(host_side) = view
            .channel()
            .and_then(|channel| messenger.host_endpoint(channel.name()))
        else {
            continue;
        };
        while let Some(bytes) = host_side.receive() {
            match EventEnvelope::decode(&bytes) {
                Ok(event) => println!("view {} -> {} {}", view.instance_id(), event.event, event.data),
                Err(err) => eprintln!("bad event from view {}: {err}", view.instance_id()),
            }
        }
    }

    drop(views);
    println!("open channels after disposal: {:?}", messenger.open_channels());
}
