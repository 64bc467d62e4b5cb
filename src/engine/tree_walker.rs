// ==========================================
// 扁平化 BOM 生成器 - 树遍历引擎
// ==========================================
// 职责: 从根零件递归构建带注解的 BOM 树
// 输入: 零件目录 + 分类器 + 最大深度
// 输出: 树 + depth_reached + 内部制造件计数 + 告警
// ==========================================
// 红线: 血缘路径按值复制下传,兄弟分支之间不共享
// 红线: 无全局缓存,两次调用之间不保留任何状态
// ==========================================

mod core;
mod path;


pub use core::{TreeWalker, WalkOutcome};
pub use path::TraversalPath;
