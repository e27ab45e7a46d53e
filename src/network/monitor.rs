//! Turns platform connectivity callbacks into network events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::Result;
use crate::network::events::{
    NetCapabilities, NetState, NetworkEvent, PlatformCapabilities, TransportType,
    DEFAULT_TRANSPORT_TYPES,
};
use crate::network::gate::NetworkStateProvider;
use crate::network::registry::{CallbackId, CallbackRegistry, NetworkCallback};

/// Capacity of the event channel created by [`NetworkMonitor::new`].
pub const DEFAULT_EVENT_CAPACITY: usize = 16;

/// The platform side of network monitoring.
///
/// Implementations register the monitor with the platform's connectivity
/// service and answer point-in-time queries. The platform then drives the
/// monitor through [`NetworkMonitor::on_available`],
/// [`NetworkMonitor::on_lost`] and
/// [`NetworkMonitor::on_capabilities_changed`].
///
/// No monitor lock is held while registering or unregistering, so the
/// platform may report state synchronously from inside either call.
pub trait ConnectivityManager: Send + Sync {
    /// Start delivering notifications for the given transports.
    fn register_network_callback(&self, transports: &[TransportType]) -> Result<()>;

    /// Stop delivering notifications.
    fn unregister_network_callback(&self) -> Result<()>;

    /// Whether the active network is connected.
    fn is_network_connected(&self) -> bool;

    /// Whether the active network is metered.
    fn is_active_network_metered(&self) -> bool;
}

impl<C: ConnectivityManager + ?Sized> ConnectivityManager for Arc<C> {
    fn register_network_callback(&self, transports: &[TransportType]) -> Result<()> {
        (**self).register_network_callback(transports)
    }

    fn unregister_network_callback(&self) -> Result<()> {
        (**self).unregister_network_callback()
    }

    fn is_network_connected(&self) -> bool {
        (**self).is_network_connected()
    }

    fn is_active_network_metered(&self) -> bool {
        (**self).is_active_network_metered()
    }
}

/// Watches connectivity and fans changes out to callbacks and subscribers.
///
/// Events reach two audiences: callbacks registered with
/// [`NetworkMonitor::add_callback`] are invoked synchronously on the
/// notifying thread, and every [`NetworkMonitor::subscribe`] receiver gets a
/// copy through a broadcast channel. The monitor also answers
/// [`NetworkStateProvider::is_network_available`] from the last reported
/// state, so it can guard pipelines directly.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tideline::testing::RecordingConnectivity;
/// use tideline::{NetworkEvent, NetworkMonitor, NetworkStateProvider};
///
/// # tokio_test::block_on(async {
/// let platform = Arc::new(RecordingConnectivity::new(true, false));
/// let monitor = NetworkMonitor::new(platform.clone());
/// let mut events = monitor.subscribe();
///
/// monitor.enable().unwrap();
/// monitor.on_lost();
///
/// assert!(!monitor.is_network_available());
/// match events.recv().await.unwrap() {
///     NetworkEvent::StateChanged(state) => assert!(!state.is_network_available),
///     other => panic!("unexpected event: {:?}", other),
/// }
/// # });
/// ```
pub struct NetworkMonitor<C> {
    manager: C,
    transports: Vec<TransportType>,
    enabled: AtomicBool,
    available: AtomicBool,
    callbacks: CallbackRegistry,
    events: broadcast::Sender<NetworkEvent>,
}

impl<C> std::fmt::Debug for NetworkMonitor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkMonitor")
            .field("transports", &self.transports)
            .field("enabled", &self.is_enabled())
            .field("available", &self.available.load(Ordering::Acquire))
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

impl<C: ConnectivityManager> NetworkMonitor<C> {
    /// Create a disabled monitor watching [`DEFAULT_TRANSPORT_TYPES`].
    pub fn new(manager: C) -> Self {
        Self::with_transport_types(manager, DEFAULT_TRANSPORT_TYPES)
    }

    /// Create a disabled monitor watching the given transports.
    pub fn with_transport_types(manager: C, transports: &[TransportType]) -> Self {
        let (events, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        let available = manager.is_network_connected();

        Self {
            manager,
            transports: transports.to_vec(),
            enabled: AtomicBool::new(false),
            available: AtomicBool::new(available),
            callbacks: CallbackRegistry::new(),
            events,
        }
    }

    /// Register with the platform. Calling it while enabled is a no-op.
    ///
    /// The monitor reports itself enabled while the platform registers it. A
    /// failed registration leaves it disabled.
    pub fn enable(&self) -> Result<()> {
        if self
            .enabled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        if let Err(error) = self.manager.register_network_callback(&self.transports) {
            self.enabled.store(false, Ordering::Release);
            return Err(error);
        }

        #[cfg(feature = "tracing")]
        tracing::info!(transports = ?self.transports, "network monitor enabled");
        Ok(())
    }

    /// Unregister from the platform. Calling it while disabled is a no-op.
    ///
    /// A failed unregistration leaves the monitor enabled.
    pub fn disable(&self) -> Result<()> {
        if self
            .enabled
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        if let Err(error) = self.manager.unregister_network_callback() {
            self.enabled.store(true, Ordering::Release);
            return Err(error);
        }

        #[cfg(feature = "tracing")]
        tracing::info!("network monitor disabled");
        Ok(())
    }

    /// The platform reported a new available network.
    pub fn on_available(&self) {
        self.report_state_change(NetState {
            is_network_available: true,
            is_network_metered: self.manager.is_active_network_metered(),
        });
    }

    /// The platform reported a lost network.
    pub fn on_lost(&self) {
        self.report_state_change(NetState {
            is_network_available: false,
            is_network_metered: self.manager.is_active_network_metered(),
        });
    }

    /// The platform reported new capabilities for a network.
    ///
    /// Networks without internet capability are ignored.
    pub fn on_capabilities_changed(&self, capabilities: &PlatformCapabilities) {
        if !capabilities.has_internet {
            return;
        }

        self.report_capabilities_change(capabilities.to_net_capabilities(
            self.manager.is_network_connected(),
            self.manager.is_active_network_metered(),
        ));
    }
}

impl<C> NetworkMonitor<C> {
    /// Returns true if the monitor is registered with the platform.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// The transports this monitor watches.
    pub fn transport_types(&self) -> &[TransportType] {
        &self.transports
    }

    /// Register a callback for change notifications.
    pub fn add_callback(&self, callback: Arc<dyn NetworkCallback>) -> CallbackId {
        self.callbacks.add(callback)
    }

    /// Remove a previously registered callback.
    pub fn remove_callback(&self, id: CallbackId) -> bool {
        self.callbacks.remove(id)
    }

    /// Remove every registered callback.
    pub fn clear_callbacks(&self) {
        self.callbacks.clear();
    }

    /// Receive every event reported after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<NetworkEvent> {
        self.events.subscribe()
    }

    fn report_state_change(&self, state: NetState) {
        self.available
            .store(state.is_network_available, Ordering::Release);

        #[cfg(feature = "tracing")]
        tracing::trace!(?state, "network state changed");

        self.post_event(NetworkEvent::StateChanged(state));
        self.callbacks.on_network_state_changed(&state);
    }

    fn report_capabilities_change(&self, capabilities: NetCapabilities) {
        self.available
            .store(capabilities.is_network_available, Ordering::Release);

        #[cfg(feature = "tracing")]
        tracing::trace!(?capabilities, "network capabilities changed");

        self.post_event(NetworkEvent::CapabilitiesChanged(capabilities));
        self.callbacks.on_network_capabilities_changed(&capabilities);
    }

    fn post_event(&self, event: NetworkEvent) {
        // No receivers is not an error; events are fire-and-forget.
        let _ = self.events.send(event);
    }
}

impl<C: Send + Sync> NetworkStateProvider for NetworkMonitor<C> {
    fn is_network_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }
}
