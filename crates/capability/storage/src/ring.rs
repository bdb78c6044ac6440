//! 一致性哈希环（ketama 风格）
//!
//! 每个节点按 `节点地址-副本序号` 散列出 160 个虚拟点，
//! key 落在顺时针方向的第一个虚拟点所属节点上。
//! 节点增减时只有相邻区间的 key 会迁移。

use sha2::{Digest, Sha256};

const REPLICAS_PER_NODE: usize = 40;
const POINTS_PER_DIGEST: usize = 4;

#[derive(Debug, Clone)]
pub struct HashRing {
    points: Vec<(u32, usize)>,
    nodes: usize,
}

impl HashRing {
    pub fn new(nodes: &[String]) -> Self {
        let mut points = Vec::with_capacity(nodes.len() * REPLICAS_PER_NODE * POINTS_PER_DIGEST);
        for (index, node) in nodes.iter().enumerate() {
            for replica in 0..REPLICAS_PER_NODE {
                let digest = Sha256::digest(format!("{node}-{replica}").as_bytes());
                for chunk in digest.chunks_exact(4).take(POINTS_PER_DIGEST) {
                    let point = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                    points.push((point, index));
                }
            }
        }
        points.sort_unstable();
        Self {
            points,
            nodes: nodes.len(),
        }
    }

    /// key 所属节点的下标，空环返回 `None`。
    pub fn node_for(&self, key: &str) -> Option<usize> {
        if self.nodes == 1 {
            return Some(0);
        }
        if self.points.is_empty() {
            return None;
        }
        let hash = Self::hash_key(key);
        let position = self.points.partition_point(|(point, _)| *point < hash);
        let (_, node) = self.points[position % self.points.len()];
        Some(node)
    }

    fn hash_key(key: &str) -> u32 {
        let digest = Sha256::digest(key.as_bytes());
        u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
    }
}
