// ==========================================
// 扁平化 BOM 生成器 - 遍历血缘路径
// ==========================================
// 红线: 每个递归帧独占自己的路径副本,兄弟分支之间绝不共享
// 红线: 路径中不允许出现重复零件 ID
// ==========================================

use crate::domain::part::PartId;

/// 从根到当前节点父级的有序祖先零件 ID
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalPath {
    ancestors: Vec<PartId>,
}

impl TraversalPath {
    /// 根节点的空路径
    pub fn new() -> Self {
        Self::default()
    }

    /// 该零件是否已在本血缘链上
    pub fn contains(&self, part_id: PartId) -> bool {
        self.ancestors.contains(&part_id)
    }

    /// 生成下探一层的路径副本(追加当前零件)
    ///
    /// 原路径保持不变,供兄弟分支继续使用
    pub fn descend(&self, part_id: PartId) -> Self {
        debug_assert!(!self.contains(part_id), "血缘路径中出现重复零件");
        let mut ancestors = Vec::with_capacity(self.ancestors.len() + 1);
        ancestors.extend_from_slice(&self.ancestors);
        ancestors.push(part_id);
        Self { ancestors }
    }

    pub fn as_slice(&self) -> &[PartId] {
        &self.ancestors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descend_leaves_parent_path_untouched() {
        let root = TraversalPath::new().descend(1);
        let left = root.descend(2);
        let right = root.descend(3);

        assert_eq!(root.as_slice(), &[1]);
        assert_eq!(left.as_slice(), &[1, 2]);
        assert_eq!(right.as_slice(), &[1, 3]);
        assert!(!right.contains(2));
        assert!(left.contains(1));
    }

    #[test]
    fn test_empty_path() {
        let path = TraversalPath::new();
        assert!(path.as_slice().is_empty());
        assert!(!path.contains(1));
    }
}
