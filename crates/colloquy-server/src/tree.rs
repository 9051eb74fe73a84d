//! Thread assembly.
//!
//! Rebuilds the nested view of a post's comments from the flat records in
//! one O(n) pass, to unlimited depth.  A node whose parent is absent from
//! the visible set -- filtered out by moderation status, or deleted --
//! surfaces as a root: hiding an approved comment because an ancestor is
//! invisible would hide legitimately approved content.

use std::collections::{HashMap, HashSet};

use colloquy_core::Comment;
use uuid::Uuid;

/// A comment with its nested replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub comment: Comment,
    pub children: Vec<CommentNode>,
}

/// Build the forest of root nodes from a flat slice of visible comments.
///
/// Siblings are ordered by `created_at` ascending (id as a deterministic
/// tiebreak).  Every input comment appears exactly once in the output.
pub fn assemble(mut comments: Vec<Comment>) -> Vec<CommentNode> {
    comments.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let visible: HashSet<Uuid> = comments.iter().map(|c| c.id).collect();

    let mut by_parent: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    let mut roots = Vec::new();
    for comment in comments {
        match comment.parent_id.filter(|p| visible.contains(p)) {
            Some(parent) => by_parent.entry(parent).or_default().push(comment),
            None => roots.push(comment),
        }
    }

    roots
        .into_iter()
        .map(|c| build_node(c, &mut by_parent))
        .collect()
}

fn build_node(comment: Comment, by_parent: &mut HashMap<Uuid, Vec<Comment>>) -> CommentNode {
    let children = by_parent
        .remove(&comment.id)
        .unwrap_or_default()
        .into_iter()
        .map(|c| build_node(c, by_parent))
        .collect();

    CommentNode { comment, children }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use colloquy_core::{Authorship, CommentStatus};

    fn comment(post_id: Uuid, parent_id: Option<Uuid>, offset_secs: i64) -> Comment {
        let at = Utc::now() + Duration::seconds(offset_secs);
        Comment {
            id: Uuid::new_v4(),
            post_id,
            parent_id,
            content: "node".into(),
            authorship: Authorship::Identified {
                user_id: Uuid::new_v4(),
            },
            status: CommentStatus::Approved,
            reply_count: 0,
            like_count: 0,
            ip_address: "127.0.0.1".into(),
            user_agent: "test".into(),
            created_at: at,
            updated_at: at,
        }
    }

    fn count_nodes(nodes: &[CommentNode]) -> usize {
        nodes
            .iter()
            .map(|n| 1 + count_nodes(&n.children))
            .sum()
    }

    #[test]
    fn empty_input_gives_empty_forest() {
        assert!(assemble(Vec::new()).is_empty());
    }

    #[test]
    fn deep_chain_is_fully_nested() {
        let post_id = Uuid::new_v4();
        let mut comments = Vec::new();
        let mut parent = None;
        for depth in 0..8 {
            let c = comment(post_id, parent, depth);
            parent = Some(c.id);
            comments.push(c);
        }
        let expected_leaf = comments.last().unwrap().id;

        let forest = assemble(comments);
        assert_eq!(forest.len(), 1);
        assert_eq!(count_nodes(&forest), 8);

        let mut node = &forest[0];
        while !node.children.is_empty() {
            assert_eq!(node.children.len(), 1);
            node = &node.children[0];
        }
        assert_eq!(node.comment.id, expected_leaf);
    }

    #[test]
    fn siblings_ordered_by_creation_time() {
        let post_id = Uuid::new_v4();
        let root = comment(post_id, None, 0);
        let late = comment(post_id, Some(root.id), 20);
        let early = comment(post_id, Some(root.id), 10);

        let forest = assemble(vec![late.clone(), root.clone(), early.clone()]);
        assert_eq!(forest.len(), 1);
        let children: Vec<Uuid> = forest[0].children.iter().map(|n| n.comment.id).collect();
        assert_eq!(children, vec![early.id, late.id]);
    }

    #[test]
    fn child_of_invisible_parent_becomes_root() {
        let post_id = Uuid::new_v4();
        let hidden_parent_id = Uuid::new_v4();
        let orphan = comment(post_id, Some(hidden_parent_id), 0);
        let grandchild = comment(post_id, Some(orphan.id), 1);

        let forest = assemble(vec![orphan.clone(), grandchild.clone()]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].comment.id, orphan.id);
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].comment.id, grandchild.id);
    }

    #[test]
    fn no_node_appears_twice() {
        let post_id = Uuid::new_v4();
        let a = comment(post_id, None, 0);
        let b = comment(post_id, Some(a.id), 1);
        let c = comment(post_id, Some(a.id), 2);
        let d = comment(post_id, Some(b.id), 3);

        let forest = assemble(vec![a, b, c, d]);
        assert_eq!(count_nodes(&forest), 4);

        fn collect_ids(nodes: &[CommentNode], out: &mut Vec<Uuid>) {
            for n in nodes {
                out.push(n.comment.id);
                collect_ids(&n.children, out);
            }
        }
        let mut ids = Vec::new();
        collect_ids(&forest, &mut ids);
        let unique: HashSet<Uuid> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }
}
