//! Tree reconstruction for structured container contents
//!
//! Parsers emit a flat item list with slash-delimited paths; consumers
//! want a hierarchy. Each path is split on `/`, intermediate directory
//! nodes are created on demand, and a node counts as a directory when it
//! is explicitly typed as one or has descendants.

use crate::types::{ItemKind, StructuredItem};
use serde::{Deserialize, Serialize};

/// One node in the reconstructed content hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Final path segment
    pub name: String,
    /// Full slash-delimited path from the container root
    pub path: String,
    pub kind: ItemKind,
    pub size: u64,
    pub encrypted: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn directory(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            kind: ItemKind::Directory,
            size: 0,
            encrypted: false,
            children: Vec::new(),
        }
    }
}

/// Reconstruct the hierarchy implied by the items' paths.
#[must_use]
pub fn build_tree(items: &[StructuredItem]) -> Vec<TreeNode> {
    let mut roots = Vec::new();
    for item in items {
        let segments: Vec<&str> = item.path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            continue;
        }
        insert(&mut roots, &segments, "", item);
    }
    roots
}

fn insert(nodes: &mut Vec<TreeNode>, segments: &[&str], prefix: &str, item: &StructuredItem) {
    let name = segments[0];
    let path = if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    };

    let idx = match nodes.iter().position(|n| n.name == name) {
        Some(i) => i,
        None => {
            nodes.push(TreeNode::directory(name, &path));
            nodes.len() - 1
        }
    };

    if segments.len() == 1 {
        let node = &mut nodes[idx];
        node.size = item.size;
        node.encrypted = item.encrypted;
        // Descendants win over the item's declared kind.
        node.kind = if node.children.is_empty() {
            item.kind
        } else {
            ItemKind::Directory
        };
    } else {
        nodes[idx].kind = ItemKind::Directory;
        insert(&mut nodes[idx].children, &segments[1..], &path, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, size: u64) -> StructuredItem {
        StructuredItem {
            path: path.to_string(),
            kind: ItemKind::File,
            size,
            bytes: None,
            encrypted: false,
        }
    }

    #[test]
    fn flat_files_become_roots() {
        let tree = build_tree(&[file("a.txt", 1), file("b.txt", 2)]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].name, "a.txt");
        assert_eq!(tree[0].kind, ItemKind::File);
    }

    #[test]
    fn nested_paths_create_intermediate_directories() {
        let tree = build_tree(&[file("docs/inner/payload.bin", 7)]);
        assert_eq!(tree.len(), 1);
        let docs = &tree[0];
        assert_eq!(docs.name, "docs");
        assert_eq!(docs.kind, ItemKind::Directory);
        let inner = &docs.children[0];
        assert_eq!(inner.kind, ItemKind::Directory);
        let leaf = &inner.children[0];
        assert_eq!(leaf.name, "payload.bin");
        assert_eq!(leaf.path, "docs/inner/payload.bin");
        assert_eq!(leaf.kind, ItemKind::File);
        assert_eq!(leaf.size, 7);
    }

    #[test]
    fn sibling_paths_share_parents() {
        let tree = build_tree(&[file("d/a.txt", 1), file("d/b.txt", 2)]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 2);
    }

    #[test]
    fn item_with_descendants_is_a_directory() {
        // "d" arrives typed as a file, then gains a child.
        let tree = build_tree(&[file("d", 0), file("d/a.txt", 1)]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].kind, ItemKind::Directory);

        // Same in reverse arrival order.
        let tree = build_tree(&[file("d/a.txt", 1), file("d", 0)]);
        assert_eq!(tree[0].kind, ItemKind::Directory);
    }

    #[test]
    fn trailing_separator_directories() {
        let dir = StructuredItem {
            path: "folder/".to_string(),
            kind: ItemKind::Directory,
            size: 0,
            bytes: None,
            encrypted: false,
        };
        let tree = build_tree(&[dir]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name, "folder");
        assert_eq!(tree[0].kind, ItemKind::Directory);
    }
}
