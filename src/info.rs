// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device metadata.
//!
//! Simple key/value descriptive properties - names, manufacturer, transport.
//! These never participate in power or timer ordering; they are read-mostly
//! and live outside the serialized section.

use std::fmt;

/// How the device is attached to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportType {
    /// Soldered onto the board.
    BuiltIn,
    /// PCI or PCI Express.
    Pci,
    /// USB.
    Usb,
    /// FireWire / IEEE 1394.
    FireWire,
    /// Bluetooth.
    Bluetooth,
    /// Network audio (AVB, AES67, ...).
    Network,
    /// No physical transport; a software device.
    Virtual,
    /// A transport this library has no name for.
    Other(u32),
}

impl TransportType {
    /// Returns a lowercase name for the transport.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BuiltIn => "built-in",
            Self::Pci => "pci",
            Self::Usb => "usb",
            Self::FireWire => "firewire",
            Self::Bluetooth => "bluetooth",
            Self::Network => "network",
            Self::Virtual => "virtual",
            Self::Other(_) => "other",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(raw) => write!(f, "other({raw})"),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

/// Which system default roles the device may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefaultsFlags {
    /// May become the default input device.
    pub input: bool,
    /// May become the default output device.
    pub output: bool,
    /// May become the system (alert) output device.
    pub system_output: bool,
}

impl DefaultsFlags {
    /// Every role allowed.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            input: true,
            output: true,
            system_output: true,
        }
    }

    /// No role allowed.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            input: false,
            output: false,
            system_output: false,
        }
    }
}

impl Default for DefaultsFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Descriptive properties of a device.
///
/// # Examples
///
/// ```
/// use audiodev::{DeviceInfo, TransportType};
///
/// let mut info = DeviceInfo::new();
/// info.set_name("USB Audio Interface");
/// info.set_transport(TransportType::Usb);
/// assert_eq!(info.name(), Some("USB Audio Interface"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceInfo {
    name: Option<String>,
    short_name: Option<String>,
    manufacturer: Option<String>,
    model_name: Option<String>,
    configuration_application: Option<String>,
    transport: Option<TransportType>,
    defaults: DefaultsFlags,
}

impl DeviceInfo {
    /// Creates an empty property set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Full localizable device name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets the device name.
    ///
    /// If no model name has been set yet, one is derived as
    /// `"<manufacturer>:<name>"` (or just the name without a manufacturer).
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.model_name.is_none() {
            self.model_name = Some(match &self.manufacturer {
                Some(manufacturer) => format!("{manufacturer}:{name}"),
                None => name.clone(),
            });
        }
        self.name = Some(name);
    }

    /// Abbreviated device name.
    #[must_use]
    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    /// Sets the abbreviated device name.
    pub fn set_short_name(&mut self, short_name: impl Into<String>) {
        self.short_name = Some(short_name.into());
    }

    /// Manufacturer name.
    #[must_use]
    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    /// Sets the manufacturer name.
    pub fn set_manufacturer(&mut self, manufacturer: impl Into<String>) {
        self.manufacturer = Some(manufacturer.into());
    }

    /// Model identifier.
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    /// Sets the model identifier.
    pub fn set_model_name(&mut self, model_name: impl Into<String>) {
        self.model_name = Some(model_name.into());
    }

    /// Bundle identifier of the device's configuration application.
    #[must_use]
    pub fn configuration_application(&self) -> Option<&str> {
        self.configuration_application.as_deref()
    }

    /// Sets the configuration application bundle identifier.
    pub fn set_configuration_application(&mut self, bundle_id: impl Into<String>) {
        self.configuration_application = Some(bundle_id.into());
    }

    /// Transport type.
    #[must_use]
    pub fn transport(&self) -> Option<TransportType> {
        self.transport
    }

    /// Sets the transport type.
    pub fn set_transport(&mut self, transport: TransportType) {
        self.transport = Some(transport);
    }

    /// Default-role eligibility flags.
    #[must_use]
    pub fn defaults(&self) -> DefaultsFlags {
        self.defaults
    }

    /// Sets the default-role eligibility flags.
    pub fn set_defaults(&mut self, defaults: DefaultsFlags) {
        self.defaults = defaults;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_everything() {
        let flags = DefaultsFlags::default();
        assert!(flags.input && flags.output && flags.system_output);
    }

    #[test]
    fn set_name_backfills_model_name() {
        let mut info = DeviceInfo::new();
        info.set_manufacturer("Example Corp");
        info.set_name("Duet");
        assert_eq!(info.model_name(), Some("Example Corp:Duet"));
    }

    #[test]
    fn set_name_without_manufacturer_uses_name_as_model() {
        let mut info = DeviceInfo::new();
        info.set_name("Duet");
        assert_eq!(info.model_name(), Some("Duet"));
    }

    #[test]
    fn explicit_model_name_is_not_overwritten() {
        let mut info = DeviceInfo::new();
        info.set_model_name("XY-100");
        info.set_name("Duet");
        assert_eq!(info.model_name(), Some("XY-100"));
    }

    #[test]
    fn transport_display() {
        assert_eq!(TransportType::Usb.to_string(), "usb");
        assert_eq!(TransportType::Other(7).to_string(), "other(7)");
    }
}
