use std::fmt;

use super::node::TreeNode;

const INDENT: &str = "    ";

impl TreeNode {
    /// The listing line for this node alone
    pub fn print(&self) -> String {
        if self.path() == "/" {
            return "/".to_string();
        }
        let depth = self.path().matches('/').count().saturating_sub(1);
        format!(
            "{}|---{} (Hash:{} Size:{})",
            INDENT.repeat(depth),
            self.name(),
            self.hash(),
            self.size()
        )
    }

    /// An indented, pre-order listing of the whole subtree.
    /// Meant for eyeballing, not parsing.
    pub fn print_all(&self) -> String {
        self.walk()
            .map(TreeNode::print)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print_all())
    }
}
