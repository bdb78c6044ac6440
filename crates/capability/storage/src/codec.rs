//! 记录编解码
//!
//! - 缓存 key：原始主键字节经标准 base64 编码，保证字符集安全
//! - 记录体：JSON `{"l": <last_seen>}`，字段名尽量短以节省缓存空间

use crate::error::StorageError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use domain::{PresenceRecord, PrimaryKey};

#[derive(serde::Serialize, serde::Deserialize)]
struct RecordPayload {
    #[serde(rename = "l")]
    last_seen: i64,
}

/// 主键编码为缓存 key。
pub fn encode_key(key: &[u8]) -> String {
    STANDARD.encode(key)
}

/// 缓存 key 还原为主键字节（仅用于诊断输出）。
pub fn decode_key(key: &str) -> Result<PrimaryKey, StorageError> {
    STANDARD
        .decode(key)
        .map(PrimaryKey::from)
        .map_err(|err| StorageError::Codec(err.to_string()))
}

pub fn encode_record(record: &PresenceRecord) -> Result<Vec<u8>, StorageError> {
    let payload = RecordPayload {
        last_seen: record.last_seen,
    };
    serde_json::to_vec(&payload).map_err(|err| StorageError::Codec(err.to_string()))
}

pub fn decode_record(data: &[u8]) -> Result<PresenceRecord, StorageError> {
    let payload: RecordPayload =
        serde_json::from_slice(data).map_err(|err| StorageError::Codec(err.to_string()))?;
    Ok(PresenceRecord::new(payload.last_seen))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_round_trip_for_16_byte_keys() {
        let keys: [[u8; 16]; 4] = [
            [0; 16],
            [0xff; 16],
            *b"0123456789abcdef",
            [
                0x00, 0x80, 0xfe, 0x2b, 0x2f, 0x3d, 0x0a, 0x0d, 0x20, 0x7f, 0x01, 0xc3, 0xa9,
                0x10, 0x99, 0x42,
            ],
        ];
        for key in keys {
            let encoded = encode_key(&key);
            assert!(encoded.is_ascii());
            assert!(!encoded.contains(char::is_whitespace));
            assert_eq!(decode_key(&encoded).unwrap().as_bytes(), key.as_slice());
        }
    }

    #[test]
    fn key_round_trip_for_random_16_byte_keys() {
        use rand_core::{OsRng, RngCore};

        let mut key = [0u8; 16];
        for _ in 0..10_000 {
            OsRng.fill_bytes(&mut key);
            let encoded = encode_key(&key);
            assert_eq!(encoded.len(), 24);
            assert_eq!(decode_key(&encoded).unwrap().as_bytes(), key.as_slice());
        }
    }

    #[test]
    fn decode_key_rejects_non_base64() {
        assert!(matches!(decode_key("not base64!"), Err(StorageError::Codec(_))));
    }

    #[test]
    fn record_uses_short_field() {
        let data = encode_record(&PresenceRecord::new(1_700_000_000)).unwrap();
        assert_eq!(data, br#"{"l":1700000000}"#.to_vec());
        assert_eq!(decode_record(&data).unwrap().last_seen, 1_700_000_000);
    }

    #[test]
    fn decode_record_rejects_garbage() {
        assert!(matches!(decode_record(b"test"), Err(StorageError::Codec(_))));
    }
}
