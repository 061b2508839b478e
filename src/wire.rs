//! Schema-id framed wire format
//!
//! ```text
//! byte 0      magic byte, 0x00
//! bytes 1-4   schema id, i32 big-endian
//! bytes 5..   Avro binary encoding of the record
//! ```

use crate::error::{Result, SerdeError};

/// Leading byte of every framed message
pub const MAGIC_BYTE: u8 = 0x00;

/// Magic byte plus schema id
pub const HEADER_LEN: usize = 5;

/// Prefix an Avro payload with the magic byte and schema id
pub fn frame(schema_id: i32, payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(HEADER_LEN + payload.len());
    message.push(MAGIC_BYTE);
    message.extend_from_slice(&schema_id.to_be_bytes());
    message.extend_from_slice(payload);
    message
}

/// Split a framed message into its schema id and Avro payload
pub fn unframe(message: &[u8]) -> Result<(i32, &[u8])> {
    if message.len() < HEADER_LEN {
        return Err(SerdeError::MalformedWireFormat(format!(
            "expected at least {} bytes, got {}",
            HEADER_LEN,
            message.len()
        )));
    }
    if message[0] != MAGIC_BYTE {
        return Err(SerdeError::MalformedWireFormat(format!(
            "unknown magic byte {:#04x}",
            message[0]
        )));
    }

    let schema_id = i32::from_be_bytes([message[1], message[2], message[3], message[4]]);
    Ok((schema_id, &message[HEADER_LEN..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_layout() {
        let message = frame(7, &[6]);
        assert_eq!(message, vec![0, 0, 0, 0, 7, 6]);
    }

    #[test]
    fn test_unframe() {
        let (id, payload) = unframe(&[0, 0, 0, 1, 0, 2, 4]).unwrap();
        assert_eq!(id, 256);
        assert_eq!(payload, &[2, 4]);

        let (id, payload) = unframe(&[0, 0, 0, 0, 3]).unwrap();
        assert_eq!(id, 3);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_negative_ids_are_signed() {
        let message = frame(-1, &[]);
        assert_eq!(message, vec![0, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(unframe(&message).unwrap().0, -1);
    }

    #[test]
    fn test_rejects_malformed_input() {
        for message in [&[][..], &[0, 0, 0, 1][..], &[1, 0, 0, 0, 1][..]] {
            assert!(matches!(
                unframe(message),
                Err(SerdeError::MalformedWireFormat(_))
            ));
        }
    }
}
