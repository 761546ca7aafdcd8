//! Wire formats: the HIDP keyboard report and the SDP service record.

pub mod report;
pub mod sdp;

pub use report::{
    hex_dump, InputReport, ModifierFlags, ReportError, HANDSHAKE_MESSAGES, PSM_HID_CONTROL,
    PSM_HID_INTERRUPT, REPORT_LEN,
};
pub use sdp::{hid_keyboard_record, DataElement, SdpError, ServiceInfo, ServiceRecord};
