//! Network availability: gating, monitoring and callbacks.
//!
//! - [`NetworkStateProvider`] answers "is the network up?" and
//!   [`NetworkGateExt`] uses it to short-circuit operations with
//!   [`Error::NetworkUnavailable`](crate::Error::NetworkUnavailable).
//! - [`NetworkMonitor`] receives platform notifications through a
//!   [`ConnectivityManager`] and republishes them to [`NetworkCallback`]s and
//!   broadcast subscribers. It is itself a [`NetworkStateProvider`].

mod events;
mod gate;
mod monitor;
mod registry;

pub use events::{
    NetCapabilities, NetState, NetworkEvent, PlatformCapabilities, TransportType,
    DEFAULT_TRANSPORT_TYPES,
};
pub use gate::{NetworkGateExt, NetworkStateProvider};
pub use monitor::{ConnectivityManager, NetworkMonitor, DEFAULT_EVENT_CAPACITY};
pub use registry::{CallbackId, CallbackRegistry, NetworkCallback};
