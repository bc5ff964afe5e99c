//! HID report descriptor
//!
//! Vendor usage page (0xFF00) with one 64-byte input report and one
//! 64-byte output report, no report IDs.

use crate::report::REPORT_LEN;

/// Generic in/out report descriptor
#[rustfmt::skip]
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x06, 0x00, 0xFF,           // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01,                 // Usage (0x01)
    0xA1, 0x01,                 // Collection (Application)
    // Input: device to host
    0x09, 0x02,                 //   Usage (0x02)
    0x15, 0x00,                 //   Logical Minimum (0)
    0x26, 0xFF, 0x00,           //   Logical Maximum (255)
    0x75, 0x08,                 //   Report Size (8)
    0x95, REPORT_LEN as u8,     //   Report Count (64)
    0x81, 0x02,                 //   Input (Data, Var, Abs)
    // Output: host to device
    0x09, 0x03,                 //   Usage (0x03)
    0x15, 0x00,                 //   Logical Minimum (0)
    0x26, 0xFF, 0x00,           //   Logical Maximum (255)
    0x75, 0x08,                 //   Report Size (8)
    0x95, REPORT_LEN as u8,     //   Report Count (64)
    0x91, 0x02,                 //   Output (Data, Var, Abs)
    0xC0,                       // End Collection
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_shape() {
        assert_eq!(REPORT_DESCRIPTOR.len(), 34);
        // Vendor usage page
        assert_eq!(&REPORT_DESCRIPTOR[..3], &[0x06, 0x00, 0xFF]);
        // Collection is closed
        assert_eq!(REPORT_DESCRIPTOR[REPORT_DESCRIPTOR.len() - 1], 0xC0);
    }

    #[test]
    fn test_report_counts_match_report_len() {
        let counts: heapless::Vec<u8, 4> = REPORT_DESCRIPTOR
            .windows(2)
            .filter(|w| w[0] == 0x95)
            .map(|w| w[1])
            .collect();
        assert_eq!(counts.as_slice(), &[64, 64]);
    }
}
