use std::fmt;

/// How a UPB address is interpreted by receivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// A single device, optionally one channel of a multi-channel device.
    Device { channel: u8, multi_channel: bool },
    /// A link: every device that is a member responds.
    Link,
}

/// Destination of an outbound UPB command.
///
/// Supplied by the device model; the codec only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    network_id: u8,
    upb_id: u8,
    kind: AddressKind,
}

impl Address {
    /// A single-channel device.
    pub fn device(network_id: u8, upb_id: u8) -> Self {
        Self::device_channel(network_id, upb_id, 0, false)
    }

    /// One channel of a device. `channel` is 0-based.
    pub fn device_channel(network_id: u8, upb_id: u8, channel: u8, multi_channel: bool) -> Self {
        Self {
            network_id,
            upb_id,
            kind: AddressKind::Device {
                channel,
                multi_channel,
            },
        }
    }

    /// A link.
    pub fn link(network_id: u8, link_id: u8) -> Self {
        Self {
            network_id,
            upb_id: link_id,
            kind: AddressKind::Link,
        }
    }

    pub fn network_id(&self) -> u8 {
        self.network_id
    }

    /// Device or link id placed in the destination byte.
    pub fn upb_id(&self) -> u8 {
        self.upb_id
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// 0-based channel index; `None` for links.
    pub fn channel(&self) -> Option<u8> {
        match self.kind {
            AddressKind::Device { channel, .. } => Some(channel),
            AddressKind::Link => None,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, AddressKind::Link)
    }

    pub fn is_device(&self) -> bool {
        matches!(self.kind, AddressKind::Device { .. })
    }

    /// True when the target device needs the channel spelled out in the payload.
    pub fn multi_channel(&self) -> bool {
        matches!(
            self.kind,
            AddressKind::Device {
                multi_channel: true,
                ..
            }
        )
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AddressKind::Link => write!(f, "{}_L{}", self.network_id, self.upb_id),
            AddressKind::Device { channel, .. } => {
                write!(f, "{}_{}_{}", self.network_id, self.upb_id, channel)
            }
        }
    }
}
