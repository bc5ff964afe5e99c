//! USB device status as shown on the status LED

/// Blink half-period while the host has not configured the device
pub const BLINK_NOT_MOUNTED_MS: u64 = 250;
/// Blink half-period once configured
pub const BLINK_MOUNTED_MS: u64 = 1000;
/// Blink half-period while the bus is suspended
pub const BLINK_SUSPENDED_MS: u64 = 2500;

/// Device state tracked from USB bus events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsbStatus {
    #[default]
    NotMounted,
    Mounted,
    Suspended,
}

impl UsbStatus {
    pub fn blink_interval_ms(self) -> u64 {
        match self {
            UsbStatus::NotMounted => BLINK_NOT_MOUNTED_MS,
            UsbStatus::Mounted => BLINK_MOUNTED_MS,
            UsbStatus::Suspended => BLINK_SUSPENDED_MS,
        }
    }

    /// Configuration set or cleared by the host
    pub fn on_configured(self, configured: bool) -> Self {
        if configured {
            UsbStatus::Mounted
        } else {
            UsbStatus::NotMounted
        }
    }

    /// Bus suspend or resume
    ///
    /// Resume always reports mounted, even if the host never configured
    /// the device; the next configuration event corrects it.
    pub fn on_suspended(self, suspended: bool) -> Self {
        if suspended {
            UsbStatus::Suspended
        } else {
            UsbStatus::Mounted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blink_intervals() {
        assert_eq!(UsbStatus::default().blink_interval_ms(), 250);
        assert_eq!(UsbStatus::Mounted.blink_interval_ms(), 1000);
        assert_eq!(UsbStatus::Suspended.blink_interval_ms(), 2500);
    }

    #[test]
    fn test_mount_suspend_resume() {
        let status = UsbStatus::default().on_configured(true);
        assert_eq!(status, UsbStatus::Mounted);

        let status = status.on_suspended(true);
        assert_eq!(status, UsbStatus::Suspended);

        let status = status.on_suspended(false);
        assert_eq!(status, UsbStatus::Mounted);

        assert_eq!(status.on_configured(false), UsbStatus::NotMounted);
    }

    #[test]
    fn test_suspend_before_mount() {
        let status = UsbStatus::NotMounted.on_suspended(true);
        assert_eq!(status, UsbStatus::Suspended);
        assert_eq!(status.blink_interval_ms(), BLINK_SUSPENDED_MS);

        let status = status.on_suspended(false);
        assert_eq!(status, UsbStatus::Mounted);
        assert_eq!(status.on_configured(false), UsbStatus::NotMounted);
    }
}
