use crate::linked_data::DataCid;

/**
 * Tree Nodes
 * ==========
 * A tree node is one entry of a directory hierarchy that was
 *  reconstructed from the store. Unlike the store's DAG, the
 *  tree owns its children outright: two entries with identical
 *  content are two separate nodes that happen to share a hash.
 * Nodes are only ever created by the resolver or by callers
 *  handing a finished subtree to `insert`, and never move
 *  between parents once attached.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    hash: DataCid,
    // assigned once when the node is discovered
    path: String,
    // the link name our parent used for us, empty for a root
    name: String,
    size: u64,
    dir: bool,
    // informational only
    deep: usize,
    children: Vec<TreeNode>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("no node with hash {0}")]
    NotFound(DataCid),
    #[error("node {0} is not a directory")]
    NotADirectory(DataCid),
    #[error("cannot remove the root node {0}")]
    CannotRemoveRoot(DataCid),
}

impl TreeNode {
    pub fn new(
        hash: DataCid,
        path: impl Into<String>,
        name: impl Into<String>,
        size: u64,
        dir: bool,
    ) -> Self {
        Self {
            hash,
            path: path.into(),
            name: name.into(),
            size,
            dir,
            deep: 0,
            children: Vec::new(),
        }
    }

    pub fn hash(&self) -> &DataCid {
        &self.hash
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_dir(&self) -> bool {
        self.dir
    }

    pub fn deep(&self) -> usize {
        self.deep
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<TreeNode> {
        &mut self.children
    }

    /// Number of nodes in this subtree, including this one
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    /// A tree always contains at least its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Append a child in discovery order.
    ///
    /// Leaves never gain children, so appending to one is an error
    ///  rather than a silent drop.
    pub fn add_child(&mut self, mut child: TreeNode) -> Result<(), TreeError> {
        if !self.dir {
            return Err(TreeError::NotADirectory(self.hash.clone()));
        }
        child.set_deep(self.deep + 1);
        self.children.push(child);
        Ok(())
    }

    fn set_deep(&mut self, deep: usize) {
        self.deep = deep;
        for child in self.children.iter_mut() {
            child.set_deep(deep + 1);
        }
    }

    /// Pre-order search for the first node carrying `hash`.
    ///
    /// The same content can sit at several paths; this returns
    ///  whichever one the walk reaches first.
    pub fn find(&self, hash: &DataCid) -> Option<&TreeNode> {
        self.walk().find(|node| node.hash == *hash)
    }

    pub fn find_mut(&mut self, hash: &DataCid) -> Option<&mut TreeNode> {
        if self.hash == *hash {
            return Some(self);
        }
        for child in self.children.iter_mut() {
            if let Some(found) = child.find_mut(hash) {
                return Some(found);
            }
        }
        None
    }

    /// Attach `node` beneath the first node carrying `hash`
    pub fn insert(&mut self, hash: &DataCid, node: TreeNode) -> Result<(), TreeError> {
        let parent = self
            .find_mut(hash)
            .ok_or_else(|| TreeError::NotFound(hash.clone()))?;
        parent.add_child(node)
    }

    /// Detach the first node carrying `hash`, along with its subtree,
    ///  and hand it back.
    ///
    /// Other nodes with the same content stay where they are.
    pub fn del(&mut self, hash: &DataCid) -> Result<TreeNode, TreeError> {
        if self.hash == *hash {
            return Err(TreeError::CannotRemoveRoot(hash.clone()));
        }
        self.detach(hash)
            .ok_or_else(|| TreeError::NotFound(hash.clone()))
    }

    fn detach(&mut self, hash: &DataCid) -> Option<TreeNode> {
        for index in 0..self.children.len() {
            if self.children[index].hash == *hash {
                return Some(self.children.remove(index));
            }
            if let Some(found) = self.children[index].detach(hash) {
                return Some(found);
            }
        }
        None
    }

    /// Pre-order iterator over this subtree
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

pub struct Walk<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cid(s: &str) -> DataCid {
        DataCid::parse(s).unwrap()
    }

    // root -> [a(10), b -> [c(20)]]
    fn sample() -> TreeNode {
        let mut root = TreeNode::new(cid("Qroot"), "/", "", 30, true);
        root.add_child(TreeNode::new(cid("Qa"), "/Qa", "a", 10, false))
            .unwrap();
        let mut b = TreeNode::new(cid("Qb"), "/Qb", "b", 20, true);
        b.add_child(TreeNode::new(cid("Qc"), "/Qb/Qc", "c", 20, false))
            .unwrap();
        root.add_child(b).unwrap();
        root
    }

    #[test]
    fn test_new_node_is_childless() {
        let node = TreeNode::new(cid("Qa"), "/Qa", "a", 10, true);
        assert!(node.children().is_empty());
        assert_eq!(node.deep(), 0);
        assert_eq!(node.len(), 1);
    }

    #[test]
    fn test_add_child_to_leaf_fails() {
        let mut leaf = TreeNode::new(cid("Qa"), "/Qa", "a", 10, false);
        let err = leaf
            .add_child(TreeNode::new(cid("Qb"), "/Qa/Qb", "b", 1, false))
            .unwrap_err();
        assert_eq!(err, TreeError::NotADirectory(cid("Qa")));
        assert!(leaf.children().is_empty());
    }

    #[test]
    fn test_add_child_sets_depth() {
        let root = sample();
        let c = root.find(&cid("Qc")).unwrap();
        assert_eq!(c.deep(), 2);
    }

    #[test]
    fn test_find() {
        let root = sample();
        assert_eq!(root.find(&cid("Qc")).unwrap().name(), "c");
        assert_eq!(root.find(&cid("Qroot")).unwrap().path(), "/");
        assert!(root.find(&cid("Qz")).is_none());
    }

    #[test]
    fn test_find_returns_first_preorder_match() {
        let mut root = sample();
        // same content as c, reachable under a second name
        root.insert(&cid("Qroot"), TreeNode::new(cid("Qc"), "/Qc", "c-copy", 20, false))
            .unwrap();
        assert_eq!(root.find(&cid("Qc")).unwrap().name(), "c");
    }

    #[test]
    fn test_walk_is_preorder() {
        let root = sample();
        let order: Vec<&str> = root.walk().map(|n| n.hash().as_str()).collect();
        assert_eq!(order, vec!["Qroot", "Qa", "Qb", "Qc"]);
    }

    #[test]
    fn test_insert() {
        let mut root = sample();
        root.insert(&cid("Qb"), TreeNode::new(cid("Qd"), "/Qb/Qd", "d", 5, false))
            .unwrap();
        let b = root.find(&cid("Qb")).unwrap();
        assert_eq!(b.children().len(), 2);
        assert_eq!(b.children()[1].name(), "d");
        assert_eq!(b.children()[1].deep(), 2);
    }

    #[test]
    fn test_insert_reports_miss_and_leaf() {
        let mut root = sample();
        let node = TreeNode::new(cid("Qd"), "/Qd", "d", 5, false);
        assert_eq!(
            root.insert(&cid("Qz"), node.clone()),
            Err(TreeError::NotFound(cid("Qz")))
        );
        assert_eq!(
            root.insert(&cid("Qa"), node),
            Err(TreeError::NotADirectory(cid("Qa")))
        );
        assert_eq!(root.len(), 4);
    }

    #[test]
    fn test_del_detaches_subtree() {
        let mut root = sample();
        let removed = root.del(&cid("Qb")).unwrap();
        assert_eq!(removed.name(), "b");
        assert_eq!(removed.children().len(), 1);
        assert!(root.find(&cid("Qb")).is_none());
        assert!(root.find(&cid("Qc")).is_none());
        assert_eq!(root.len(), 2);
    }

    #[test]
    fn test_del_leaves_other_copies_findable() {
        let mut root = sample();
        root.insert(&cid("Qroot"), TreeNode::new(cid("Qc"), "/Qc", "c-copy", 20, false))
            .unwrap();
        root.del(&cid("Qc")).unwrap();
        assert_eq!(root.find(&cid("Qc")).unwrap().name(), "c-copy");
    }

    #[test]
    fn test_del_errors() {
        let mut root = sample();
        assert_eq!(
            root.del(&cid("Qroot")),
            Err(TreeError::CannotRemoveRoot(cid("Qroot")))
        );
        assert_eq!(root.del(&cid("Qz")), Err(TreeError::NotFound(cid("Qz"))));
    }
}
