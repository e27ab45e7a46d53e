//! Network state values reported by [`NetworkMonitor`](crate::NetworkMonitor).

/// Connectivity after a network became available or was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetState {
    /// Whether a network is available.
    pub is_network_available: bool,
    /// Whether the active network is metered.
    pub is_network_metered: bool,
}

/// Capabilities of a network that can reach the internet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetCapabilities {
    /// Downstream bandwidth estimate in Kbps.
    pub link_downstream_bandwidth_kbps: u32,
    /// Upstream bandwidth estimate in Kbps.
    pub link_upstream_bandwidth_kbps: u32,
    /// Whether a network is available.
    pub is_network_available: bool,
    /// Whether the active network is metered.
    pub is_network_metered: bool,
    /// Whether the network is restricted to privileged applications.
    pub is_restricted: bool,
    /// Whether the network is trusted by the user.
    pub is_trusted: bool,
    /// Whether the network is a VPN.
    pub is_vpn: bool,
    /// Whether connectivity on the network has been validated.
    pub is_validated: bool,
}

/// An event broadcast to monitor subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NetworkEvent {
    /// A network became available or was lost.
    StateChanged(NetState),
    /// The capabilities of the current network changed.
    CapabilitiesChanged(NetCapabilities),
}

/// Raw capability bits delivered by the platform with a
/// capabilities-changed notification.
///
/// The platform reports negative capabilities (`not_restricted`, `not_vpn`);
/// [`PlatformCapabilities::to_net_capabilities`] flips them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlatformCapabilities {
    /// The network can reach the internet.
    pub has_internet: bool,
    /// The network is not restricted.
    pub not_restricted: bool,
    /// The network is trusted.
    pub trusted: bool,
    /// The network is not a VPN.
    pub not_vpn: bool,
    /// Connectivity has been validated.
    pub validated: bool,
    /// Downstream bandwidth estimate in Kbps.
    pub link_downstream_bandwidth_kbps: u32,
    /// Upstream bandwidth estimate in Kbps.
    pub link_upstream_bandwidth_kbps: u32,
}

impl PlatformCapabilities {
    /// Build the reported capabilities, combining these bits with the
    /// connectivity flags queried from the platform.
    pub fn to_net_capabilities(&self, available: bool, metered: bool) -> NetCapabilities {
        NetCapabilities {
            link_downstream_bandwidth_kbps: self.link_downstream_bandwidth_kbps,
            link_upstream_bandwidth_kbps: self.link_upstream_bandwidth_kbps,
            is_network_available: available,
            is_network_metered: metered,
            is_restricted: !self.not_restricted,
            is_trusted: self.trusted,
            is_vpn: !self.not_vpn,
            is_validated: self.validated,
        }
    }
}

/// Transport types a monitor asks the platform to watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportType {
    /// Wi-Fi.
    Wifi,
    /// Cellular data.
    Cellular,
    /// Wired ethernet.
    Ethernet,
    /// Bluetooth tethering.
    Bluetooth,
    /// VPN.
    Vpn,
}

/// Transports watched unless the caller picks others.
pub const DEFAULT_TRANSPORT_TYPES: &[TransportType] = &[TransportType::Wifi, TransportType::Cellular];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_capabilities_are_flipped() {
        let raw = PlatformCapabilities {
            has_internet: true,
            not_restricted: true,
            trusted: true,
            not_vpn: false,
            validated: true,
            link_downstream_bandwidth_kbps: 10_000,
            link_upstream_bandwidth_kbps: 2_000,
        };

        let caps = raw.to_net_capabilities(true, false);

        assert!(!caps.is_restricted);
        assert!(caps.is_vpn);
        assert!(caps.is_trusted);
        assert!(caps.is_validated);
        assert!(caps.is_network_available);
        assert!(!caps.is_network_metered);
        assert_eq!(caps.link_downstream_bandwidth_kbps, 10_000);
        assert_eq!(caps.link_upstream_bandwidth_kbps, 2_000);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_event_serde() {
        let event = NetworkEvent::StateChanged(NetState {
            is_network_available: true,
            is_network_metered: true,
        });

        let json = serde_json::to_string(&event).unwrap();
        let back: NetworkEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
