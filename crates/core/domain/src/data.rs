/// 设备/令牌主键（不透明字节序列）。
///
/// 由调用方提供，或由 HTTP 层随机生成（16 字节，base64 文本）。
/// 相同主键的记录会被后一次写入覆盖。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimaryKey(Vec<u8>);

impl PrimaryKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

}

impl From<&str> for PrimaryKey {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<&[u8]> for PrimaryKey {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl From<Vec<u8>> for PrimaryKey {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl AsRef<[u8]> for PrimaryKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// 在线记录：最近一次心跳时间（Unix 秒，UTC）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceRecord {
    pub last_seen: i64,
}

impl PresenceRecord {
    pub fn new(last_seen: i64) -> Self {
        Self { last_seen }
    }

    /// 距离最近一次心跳的秒数，时钟回拨时不返回负数。
    pub fn seconds_since(&self, now: i64) -> i64 {
        now.saturating_sub(self.last_seen).max(0)
    }
}
