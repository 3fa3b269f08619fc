//! Per-view binary channels between the embedded view and the host

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use bevy::ecs::resource::Resource;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::debug;

use crate::error::{EmbedError, Result};

/// Namespace every view channel name is derived from
pub const CHANNEL_NAMESPACE: &str = "flutter_mapbox_navigation";

/// Trait for bidirectional binary message passing
pub trait BinaryChannel: Send + Sync {
    /// Send a binary message to the other end
    fn send(&self, data: Vec<u8>) -> Result<()>;

    /// Receive a binary message from the other end (non-blocking)
    fn receive(&self) -> Option<Vec<u8>>;
}

/// Route name of a view channel, `<namespace>/<instance id>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelName(String);

impl ChannelName {
    /// Derives the channel name for a view instance
    pub fn for_instance(namespace: &str, instance_id: i32) -> Self {
        Self(format!("{namespace}/{instance_id}"))
    }

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One end of a bidirectional channel
#[derive(Clone)]
pub struct Endpoint {
    sender: Sender<Vec<u8>>,
    receiver: Receiver<Vec<u8>>,
}

impl Endpoint {
    /// Creates an endpoint from the given sender and receiver
    pub fn new(sender: Sender<Vec<u8>>, receiver: Receiver<Vec<u8>>) -> Self {
        Self { sender, receiver }
    }

    /// Creates two endpoints wired to each other
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = unbounded();
        let (b_tx, a_rx) = unbounded();
        (Self::new(a_tx, a_rx), Self::new(b_tx, b_rx))
    }

    /// Number of messages waiting to be received
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl BinaryChannel for Endpoint {
    fn send(&self, data: Vec<u8>) -> Result<()> {
        self.sender
            .send(data)
            .map_err(|_| EmbedError::ChannelClosed("peer disconnected".into()))
    }

    fn receive(&self) -> Option<Vec<u8>> {
        self.receiver.try_recv().ok()
    }
}

/// Host transport capable of opening named channels
///
/// Implemented by the host framework's messenger. Channel names are unique
/// per live view; reopening a released name must yield fresh state.
pub trait Transport: Send + Sync {
    /// Whether the transport can currently open channels
    fn is_available(&self) -> bool;

    /// Opens the named channel and returns the view-side endpoint
    fn open(&self, name: &ChannelName) -> Result<Endpoint>;

    /// Releases the named channel
    fn release(&self, name: &ChannelName);
}

struct ChannelState {
    name: ChannelName,
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
    closed: AtomicBool,
}

impl ChannelState {
    fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.transport.release(&self.name);
        debug!("Closed channel {}", self.name);
        true
    }
}

impl Drop for ChannelState {
    fn drop(&mut self) {
        self.close();
    }
}

/// Channel bound to a single embedded view instance
///
/// Clones share state. The channel is released from its transport exactly
/// once: on the first [`ViewChannel::close`] or when the last clone drops.
#[derive(Clone, Resource)]
pub struct ViewChannel {
    state: Arc<ChannelState>,
}

impl ViewChannel {
    /// The channel's route name
    pub fn name(&self) -> &ChannelName {
        &self.state.name
    }

    /// Whether the channel has been closed
    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::Acquire)
    }

    /// Closes the channel, returning `true` only for the call that closed it
    pub fn close(&self) -> bool {
        self.state.close()
    }
}

impl BinaryChannel for ViewChannel {
    fn send(&self, data: Vec<u8>) -> Result<()> {
        if self.is_closed() {
            return Err(EmbedError::ChannelClosed(self.name().to_string()));
        }
        self.state.endpoint.send(data)
    }

    fn receive(&self) -> Option<Vec<u8>> {
        if self.is_closed() {
            return None;
        }
        self.state.endpoint.receive()
    }
}

impl fmt::Debug for ViewChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewChannel")
            .field("name", self.name())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Builds per-instance channels under a fixed namespace
#[derive(Debug, Clone)]
pub struct ChannelFactory {
    namespace: String,
}

impl Default for ChannelFactory {
    fn default() -> Self {
        Self::new(CHANNEL_NAMESPACE)
    }
}

impl ChannelFactory {
    /// Creates a factory for the given namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Channel name for an instance id
    pub fn channel_name(&self, instance_id: i32) -> ChannelName {
        ChannelName::for_instance(&self.namespace, instance_id)
    }

    /// Opens the channel for `instance_id` on `transport`
    pub fn create_channel(
        &self,
        transport: &Arc<dyn Transport>,
        instance_id: i32,
    ) -> Result<ViewChannel> {
        let name = self.channel_name(instance_id);
        if !transport.is_available() {
            return Err(EmbedError::TransportUnavailable(format!(
                "cannot open {name}"
            )));
        }

        let endpoint = transport.open(&name)?;
        debug!("Opened channel {}", name);

        Ok(ViewChannel {
            state: Arc::new(ChannelState {
                name,
                endpoint,
                transport: Arc::clone(transport),
                closed: AtomicBool::new(false),
            }),
        })
    }
}
