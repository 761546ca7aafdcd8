//! SDP data-element codec, the HID keyboard service record, and the PDUs
//! used to register it with the local SDP server.
//!
//! # SDP in one paragraph (for beginners)
//!
//! A Bluetooth host discovers what a device can do by querying its Service
//! Discovery Protocol server.  Each service is a *record*: a list of
//! `(attribute id, value)` pairs, where every value is a self-describing
//! *data element*.  A data element starts with one header byte
//! (`type << 3 | size index`), optionally followed by an explicit length,
//! then the payload.  All multi-byte integers are big-endian.
//!
//! ```text
//! uint16 0x1124        → 09 11 24
//! uuid16 0x0100        → 19 01 00
//! text   "Keyboard"    → 25 08 4B 65 79 62 6F 61 72 64
//! seq { uint8 0x22 }   → 35 02 08 22
//! ```
//!
//! The local BlueZ SDP daemon accepts records over a Unix socket using two
//! private PDUs: `SVC_REGISTER_REQ` (0x75) carrying a whole record and
//! answered with a 32-bit record handle, and `SVC_REMOVE_REQ` (0x79) carrying
//! that handle.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::address::BdAddr;
use crate::protocol::report::{KEYBOARD_REPORT_ID, PSM_HID_CONTROL, PSM_HID_INTERRUPT};

// ── PDU identifiers ───────────────────────────────────────────────────────────

pub const SDP_ERROR_RSP: u8 = 0x01;
pub const SDP_SVC_REGISTER_REQ: u8 = 0x75;
pub const SDP_SVC_REGISTER_RSP: u8 = 0x76;
pub const SDP_SVC_REMOVE_REQ: u8 = 0x79;
pub const SDP_SVC_REMOVE_RSP: u8 = 0x80;

/// Size of the PDU header: id (1) + transaction id (2) + parameter length (2).
pub const PDU_HEADER_SIZE: usize = 5;

// ── Well-known UUIDs and attribute ids ────────────────────────────────────────

const UUID_L2CAP: u16 = 0x0100;
const UUID_HIDP: u16 = 0x0011;
const UUID_PUBLIC_BROWSE_GROUP: u16 = 0x1002;
const UUID_HID_SERVICE_CLASS: u16 = 0x1124;

pub const ATTR_SERVICE_CLASS_ID_LIST: u16 = 0x0001;
pub const ATTR_PROTOCOL_DESCRIPTOR_LIST: u16 = 0x0004;
pub const ATTR_BROWSE_GROUP_LIST: u16 = 0x0005;
pub const ATTR_LANGUAGE_BASE_LIST: u16 = 0x0006;
pub const ATTR_PROFILE_DESCRIPTOR_LIST: u16 = 0x0009;
pub const ATTR_ADDITIONAL_PROTOCOL_LISTS: u16 = 0x000D;
pub const ATTR_SERVICE_NAME: u16 = 0x0100;
pub const ATTR_SERVICE_DESCRIPTION: u16 = 0x0101;
pub const ATTR_PROVIDER_NAME: u16 = 0x0102;
pub const ATTR_HID_RELEASE_NUMBER: u16 = 0x0200;
pub const ATTR_HID_PARSER_VERSION: u16 = 0x0201;
pub const ATTR_HID_DEVICE_SUBCLASS: u16 = 0x0202;
pub const ATTR_HID_COUNTRY_CODE: u16 = 0x0203;
pub const ATTR_HID_VIRTUAL_CABLE: u16 = 0x0204;
pub const ATTR_HID_RECONNECT_INITIATE: u16 = 0x0205;
pub const ATTR_HID_DESCRIPTOR_LIST: u16 = 0x0206;
pub const ATTR_HID_LANGID_BASE_LIST: u16 = 0x0207;
pub const ATTR_HID_PROFILE_VERSION: u16 = 0x020B;
pub const ATTR_HID_SUPERVISION_TIMEOUT: u16 = 0x020C;
pub const ATTR_HID_NORMALLY_CONNECTABLE: u16 = 0x020D;
pub const ATTR_HID_BOOT_DEVICE: u16 = 0x020E;

/// Boot keyboard report descriptor with report ID 1.
///
/// Input: modifier byte, reserved byte, six key slots.  Output: five LED
/// bits plus padding.
#[rustfmt::skip]
pub const KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01,       // Usage Page (Generic Desktop)
    0x09, 0x06,       // Usage (Keyboard)
    0xA1, 0x01,       // Collection (Application)
    0x85, KEYBOARD_REPORT_ID, //   Report ID (1)
    0x75, 0x01,       //   Report Size (1)
    0x95, 0x08,       //   Report Count (8)
    0x05, 0x07,       //   Usage Page (Key Codes)
    0x19, 0xE0,       //   Usage Minimum (224)
    0x29, 0xE7,       //   Usage Maximum (231)
    0x15, 0x00,       //   Logical Minimum (0)
    0x25, 0x01,       //   Logical Maximum (1)
    0x81, 0x02,       //   Input (Data, Variable, Absolute) ; modifiers
    0x95, 0x01,       //   Report Count (1)
    0x75, 0x08,       //   Report Size (8)
    0x81, 0x01,       //   Input (Constant) ; reserved
    0x95, 0x05,       //   Report Count (5)
    0x75, 0x01,       //   Report Size (1)
    0x05, 0x08,       //   Usage Page (LEDs)
    0x19, 0x01,       //   Usage Minimum (1)
    0x29, 0x05,       //   Usage Maximum (5)
    0x91, 0x02,       //   Output (Data, Variable, Absolute) ; LEDs
    0x95, 0x01,       //   Report Count (1)
    0x75, 0x03,       //   Report Size (3)
    0x91, 0x01,       //   Output (Constant) ; LED padding
    0x95, 0x06,       //   Report Count (6)
    0x75, 0x08,       //   Report Size (8)
    0x15, 0x00,       //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x05, 0x07,       //   Usage Page (Key Codes)
    0x19, 0x00,       //   Usage Minimum (0)
    0x2A, 0xFF, 0x00, //   Usage Maximum (255)
    0x81, 0x00,       //   Input (Data, Array) ; key slots
    0xC0,             // End Collection
];

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors produced while encoding records or decoding server responses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SdpError {
    /// A text or sequence element exceeds the 16-bit length form.
    #[error("data element too long: {0} bytes")]
    ElementTooLong(usize),

    /// The response is shorter than its header or declared length.
    #[error("truncated SDP response: need {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    /// The response answers a different request.
    #[error("transaction id mismatch: sent {sent}, received {received}")]
    TransactionMismatch { sent: u16, received: u16 },

    /// The response PDU id does not match the request.
    #[error("unexpected SDP response PDU 0x{0:02X}")]
    UnexpectedPdu(u8),

    /// The server answered with `SDP_ERROR_RSP`.
    #[error("SDP server returned error code 0x{0:04X}")]
    ServerError(u16),
}

// ── Data elements ─────────────────────────────────────────────────────────────

/// One SDP data element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataElement {
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uuid16(u16),
    /// Text string; SDP text is a byte string and may carry binary data
    /// such as the HID report descriptor.
    Text(Vec<u8>),
    Bool(bool),
    Sequence(Vec<DataElement>),
}

const TYPE_UINT: u8 = 1;
const TYPE_UUID: u8 = 3;
const TYPE_TEXT: u8 = 4;
const TYPE_BOOL: u8 = 5;
const TYPE_SEQUENCE: u8 = 6;

const SIZE_1: u8 = 0;
const SIZE_2: u8 = 1;
const SIZE_4: u8 = 2;
const SIZE_VAR8: u8 = 5;
const SIZE_VAR16: u8 = 6;

fn header(type_id: u8, size_index: u8) -> u8 {
    (type_id << 3) | size_index
}

impl DataElement {
    pub fn text(s: &str) -> Self {
        DataElement::Text(s.as_bytes().to_vec())
    }

    /// Appends the encoded element to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`SdpError::ElementTooLong`] if a text or sequence payload is
    /// longer than 65535 bytes.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), SdpError> {
        match self {
            DataElement::Uint8(v) => {
                out.push(header(TYPE_UINT, SIZE_1));
                out.push(*v);
            }
            DataElement::Uint16(v) => {
                out.push(header(TYPE_UINT, SIZE_2));
                out.extend_from_slice(&v.to_be_bytes());
            }
            DataElement::Uint32(v) => {
                out.push(header(TYPE_UINT, SIZE_4));
                out.extend_from_slice(&v.to_be_bytes());
            }
            DataElement::Uuid16(v) => {
                out.push(header(TYPE_UUID, SIZE_2));
                out.extend_from_slice(&v.to_be_bytes());
            }
            DataElement::Bool(v) => {
                out.push(header(TYPE_BOOL, SIZE_1));
                out.push(u8::from(*v));
            }
            DataElement::Text(bytes) => {
                write_variable(out, TYPE_TEXT, bytes)?;
            }
            DataElement::Sequence(items) => {
                let mut body = Vec::new();
                for item in items {
                    item.encode(&mut body)?;
                }
                write_variable(out, TYPE_SEQUENCE, &body)?;
            }
        }
        Ok(())
    }
}

fn write_variable(out: &mut Vec<u8>, type_id: u8, body: &[u8]) -> Result<(), SdpError> {
    if let Ok(len) = u8::try_from(body.len()) {
        out.push(header(type_id, SIZE_VAR8));
        out.push(len);
    } else if let Ok(len) = u16::try_from(body.len()) {
        out.push(header(type_id, SIZE_VAR16));
        out.extend_from_slice(&len.to_be_bytes());
    } else {
        return Err(SdpError::ElementTooLong(body.len()));
    }
    out.extend_from_slice(body);
    Ok(())
}

// ── Service record ────────────────────────────────────────────────────────────

/// A service record: attributes kept sorted by id, as SDP requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRecord {
    attributes: BTreeMap<u16, DataElement>,
}

impl ServiceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set(&mut self, id: u16, value: DataElement) -> &mut Self {
        self.attributes.insert(id, value);
        self
    }

    pub fn get(&self, id: u16) -> Option<&DataElement> {
        self.attributes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Encodes the record as one sequence of alternating id/value elements.
    ///
    /// # Errors
    ///
    /// Returns [`SdpError::ElementTooLong`] if the record does not fit the
    /// 16-bit sequence length form.
    pub fn encode(&self) -> Result<Vec<u8>, SdpError> {
        let items = self
            .attributes
            .iter()
            .flat_map(|(&id, value)| [DataElement::Uint16(id), value.clone()])
            .collect();
        let mut out = Vec::new();
        DataElement::Sequence(items).encode(&mut out)?;
        Ok(out)
    }
}

/// Human-readable strings advertised in the keyboard record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub name: String,
    pub description: String,
    pub provider: String,
}

/// Builds the HID keyboard service record advertised to hosts.
pub fn hid_keyboard_record(info: &ServiceInfo) -> ServiceRecord {
    use DataElement::{Bool, Sequence, Uint16, Uint8, Uuid16};

    let l2cap_hidp = |psm: u16| {
        Sequence(vec![
            Sequence(vec![Uuid16(UUID_L2CAP), Uint16(psm)]),
            Sequence(vec![Uuid16(UUID_HIDP)]),
        ])
    };

    let mut record = ServiceRecord::new();
    record
        .set(ATTR_SERVICE_CLASS_ID_LIST, Sequence(vec![Uuid16(UUID_HID_SERVICE_CLASS)]))
        .set(ATTR_PROTOCOL_DESCRIPTOR_LIST, l2cap_hidp(PSM_HID_CONTROL))
        .set(ATTR_BROWSE_GROUP_LIST, Sequence(vec![Uuid16(UUID_PUBLIC_BROWSE_GROUP)]))
        .set(
            ATTR_LANGUAGE_BASE_LIST,
            // "en", UTF-8 (MIBenum 106), base attribute 0x0100
            Sequence(vec![Uint16(0x656E), Uint16(0x006A), Uint16(0x0100)]),
        )
        .set(
            ATTR_PROFILE_DESCRIPTOR_LIST,
            Sequence(vec![Sequence(vec![Uuid16(UUID_HID_SERVICE_CLASS), Uint16(0x0100)])]),
        )
        .set(ATTR_ADDITIONAL_PROTOCOL_LISTS, Sequence(vec![l2cap_hidp(PSM_HID_INTERRUPT)]))
        .set(ATTR_SERVICE_NAME, DataElement::text(&info.name))
        .set(ATTR_SERVICE_DESCRIPTION, DataElement::text(&info.description))
        .set(ATTR_PROVIDER_NAME, DataElement::text(&info.provider))
        .set(ATTR_HID_RELEASE_NUMBER, Uint16(0x0100))
        .set(ATTR_HID_PARSER_VERSION, Uint16(0x0111))
        .set(ATTR_HID_DEVICE_SUBCLASS, Uint8(0x40))
        .set(ATTR_HID_COUNTRY_CODE, Uint8(0x00))
        .set(ATTR_HID_VIRTUAL_CABLE, Bool(true))
        .set(ATTR_HID_RECONNECT_INITIATE, Bool(true))
        .set(
            ATTR_HID_DESCRIPTOR_LIST,
            Sequence(vec![Sequence(vec![
                Uint8(0x22), // report descriptor
                DataElement::Text(KEYBOARD_REPORT_DESCRIPTOR.to_vec()),
            ])]),
        )
        .set(
            ATTR_HID_LANGID_BASE_LIST,
            Sequence(vec![Sequence(vec![Uint16(0x0409), Uint16(0x0100)])]),
        )
        .set(ATTR_HID_PROFILE_VERSION, Uint16(0x0100))
        .set(ATTR_HID_SUPERVISION_TIMEOUT, Uint16(0x0C80))
        .set(ATTR_HID_NORMALLY_CONNECTABLE, Bool(true))
        .set(ATTR_HID_BOOT_DEVICE, Bool(true));
    record
}

// ── PDUs ──────────────────────────────────────────────────────────────────────

fn pdu(id: u8, transaction_id: u16, params: &[u8]) -> Result<Vec<u8>, SdpError> {
    let plen = u16::try_from(params.len()).map_err(|_| SdpError::ElementTooLong(params.len()))?;
    let mut buf = Vec::with_capacity(PDU_HEADER_SIZE + params.len());
    buf.push(id);
    buf.extend_from_slice(&transaction_id.to_be_bytes());
    buf.extend_from_slice(&plen.to_be_bytes());
    buf.extend_from_slice(params);
    Ok(buf)
}

/// Builds an `SVC_REGISTER_REQ` asking the server to publish `record` on
/// `device` (ANY for all adapters).
///
/// # Errors
///
/// Returns [`SdpError::ElementTooLong`] if the record does not fit one PDU.
pub fn register_request(
    transaction_id: u16,
    device: BdAddr,
    record: &ServiceRecord,
) -> Result<Vec<u8>, SdpError> {
    let encoded = record.encode()?;
    let mut params = Vec::with_capacity(7 + encoded.len());
    params.extend_from_slice(&device.to_le_bytes());
    params.push(0); // flags: not persistent
    params.extend_from_slice(&encoded);
    pdu(SDP_SVC_REGISTER_REQ, transaction_id, &params)
}

/// Builds an `SVC_REMOVE_REQ` for a previously registered record handle.
pub fn remove_request(transaction_id: u16, handle: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(PDU_HEADER_SIZE + 4);
    buf.push(SDP_SVC_REMOVE_REQ);
    buf.extend_from_slice(&transaction_id.to_be_bytes());
    buf.extend_from_slice(&4u16.to_be_bytes());
    buf.extend_from_slice(&handle.to_be_bytes());
    buf
}

/// Splits a response into `(pdu id, parameters)` after checking its header.
fn parse_response(bytes: &[u8], transaction_id: u16) -> Result<(u8, &[u8]), SdpError> {
    if bytes.len() < PDU_HEADER_SIZE {
        return Err(SdpError::Truncated {
            needed: PDU_HEADER_SIZE,
            available: bytes.len(),
        });
    }
    let id = bytes[0];
    let received = u16::from_be_bytes([bytes[1], bytes[2]]);
    let plen = u16::from_be_bytes([bytes[3], bytes[4]]) as usize;

    if received != transaction_id {
        return Err(SdpError::TransactionMismatch {
            sent: transaction_id,
            received,
        });
    }
    let needed = PDU_HEADER_SIZE + plen;
    if bytes.len() < needed {
        return Err(SdpError::Truncated {
            needed,
            available: bytes.len(),
        });
    }
    let params = &bytes[PDU_HEADER_SIZE..needed];

    if id == SDP_ERROR_RSP {
        let code = read_u16(params)?;
        return Err(SdpError::ServerError(code));
    }
    Ok((id, params))
}

fn read_u16(params: &[u8]) -> Result<u16, SdpError> {
    match params {
        [a, b, ..] => Ok(u16::from_be_bytes([*a, *b])),
        _ => Err(SdpError::Truncated {
            needed: PDU_HEADER_SIZE + 2,
            available: PDU_HEADER_SIZE + params.len(),
        }),
    }
}

/// Decodes an `SVC_REGISTER_RSP` and returns the assigned record handle.
///
/// # Errors
///
/// Returns an [`SdpError`] for malformed, mismatched or error responses.
pub fn parse_register_response(bytes: &[u8], transaction_id: u16) -> Result<u32, SdpError> {
    let (id, params) = parse_response(bytes, transaction_id)?;
    if id != SDP_SVC_REGISTER_RSP {
        return Err(SdpError::UnexpectedPdu(id));
    }
    match params {
        [a, b, c, d, ..] => Ok(u32::from_be_bytes([*a, *b, *c, *d])),
        _ => Err(SdpError::Truncated {
            needed: PDU_HEADER_SIZE + 4,
            available: PDU_HEADER_SIZE + params.len(),
        }),
    }
}

/// Decodes an `SVC_REMOVE_RSP`.
///
/// # Errors
///
/// Returns [`SdpError::ServerError`] if the server reports a non-zero status.
pub fn parse_remove_response(bytes: &[u8], transaction_id: u16) -> Result<(), SdpError> {
    let (id, params) = parse_response(bytes, transaction_id)?;
    if id != SDP_SVC_REMOVE_RSP {
        return Err(SdpError::UnexpectedPdu(id));
    }
    match read_u16(params)? {
        0 => Ok(()),
        status => Err(SdpError::ServerError(status)),
    }
}
