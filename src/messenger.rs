//! In-process transport that routes host messages by channel name

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use log::{debug, warn};

use crate::{
    channel::{ChannelName, Endpoint, Transport},
    error::{EmbedError, Result},
};

/// Host-side messenger holding one route per open view channel
///
/// The view side of each route is handed to the view through
/// [`Transport::open`]; the host side is looked up by name with
/// [`HostMessenger::host_endpoint`]. Releasing a route drops both queues, so
/// a later reopen under the same name starts empty.
pub struct HostMessenger {
    routes: Mutex<HashMap<ChannelName, Endpoint>>,
    available: AtomicBool,
}

impl Default for HostMessenger {
    fn default() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }
}

impl HostMessenger {
    /// Creates an available messenger with no routes
    pub fn new() -> Self {
        Self::default()
    }

    /// Host-side endpoint of an open channel
    pub fn host_endpoint(&self, name: &ChannelName) -> Option<Endpoint> {
        self.routes.lock().ok()?.get(name).cloned()
    }

    /// Names of every open channel, sorted
    pub fn open_channels(&self) -> Vec<ChannelName> {
        let mut names: Vec<_> = self
            .routes
            .lock()
            .map(|routes| routes.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Detaches the messenger, dropping all routes
    pub fn shutdown(&self) {
        self.available.store(false, Ordering::Release);
        if let Ok(mut routes) = self.routes.lock() {
            routes.clear();
        }
        debug!("Host messenger shut down");
    }
}

impl Transport for HostMessenger {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    fn open(&self, name: &ChannelName) -> Result<Endpoint> {
        if !self.is_available() {
            return Err(EmbedError::TransportUnavailable(
                "host messenger is shut down".into(),
            ));
        }

        let mut routes = self
            .routes
            .lock()
            .map_err(|_| EmbedError::TransportUnavailable("route table poisoned".into()))?;

        let (view_side, host_side) = Endpoint::pair();
        if routes.insert(name.clone(), host_side).is_some() {
            warn!("Channel {} reopened while still live, replacing route", name);
        }
        Ok(view_side)
    }

    fn release(&self, name: &ChannelName) {
        let mut routes = self.routes.lock().unwrap_or_else(|poisoned| {
            warn!("Route table poisoned while releasing {}, recovering", name);
            poisoned.into_inner()
        });
        routes.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{BinaryChannel, CHANNEL_NAMESPACE};
    use std::sync::Arc;

    fn name(id: i32) -> ChannelName {
        ChannelName::for_instance(CHANNEL_NAMESPACE, id)
    }

    #[test]
    fn routes_both_directions() {
        let messenger = HostMessenger::new();
        let view = messenger.open(&name(1)).unwrap();
        let host = messenger.host_endpoint(&name(1)).unwrap();

        host.send(b"to view".to_vec()).unwrap();
        view.send(b"to host".to_vec()).unwrap();

        assert_eq!(view.receive(), Some(b"to view".to_vec()));
        assert_eq!(host.receive(), Some(b"to host".to_vec()));
    }

    #[test]
    fn release_removes_route() {
        let messenger = HostMessenger::new();
        messenger.open(&name(1)).unwrap();
        messenger.open(&name(2)).unwrap();
        assert_eq!(messenger.open_channels(), vec![name(1), name(2)]);

        messenger.release(&name(1));
        assert_eq!(messenger.open_channels(), vec![name(2)]);
        assert!(messenger.host_endpoint(&name(1)).is_none());
    }

    #[test]
    fn release_recovers_poisoned_routes() {
        let messenger = Arc::new(HostMessenger::new());
        messenger.open(&name(1)).unwrap();

        let poisoner = Arc::clone(&messenger);
        let _ = std::thread::spawn(move || {
            let _routes = poisoner.routes.lock().unwrap();
            panic!("poison the route table");
        })
        .join();
        assert!(messenger.routes.is_poisoned());

        messenger.release(&name(1));
        let routes = messenger
            .routes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        assert!(routes.is_empty());
    }

    #[test]
    fn shutdown_rejects_open() {
        let messenger = HostMessenger::new();
        messenger.open(&name(1)).unwrap();
        messenger.shutdown();

        assert!(!messenger.is_available());
        assert!(messenger.open_channels().is_empty());
        assert!(matches!(
            messenger.open(&name(2)),
            Err(EmbedError::TransportUnavailable(_))
        ));
    }
}
