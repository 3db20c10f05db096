use std::collections::{HashMap, HashSet};

/// A flat menu entry as delivered by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: u64,
    /// Zero for top-level entries.
    pub parent: u64,
    pub order: i64,
    pub label: String,
    pub url: String,
}

/// Node of the navigation tree. Children keep backend menu order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationItem {
    pub id: u64,
    pub label: String,
    pub url: String,
    pub children: Vec<NavigationItem>,
}

/// Assemble the ordered navigation tree from flat menu entries.
///
/// Entries whose parent is absent from the list are promoted to the root.
/// Entries that can only be reached through a cycle are dropped.
pub fn build_tree(entries: Vec<MenuEntry>) -> Vec<NavigationItem> {
    let known: HashSet<u64> = entries.iter().map(|entry| entry.id).collect();

    let mut by_parent: HashMap<u64, Vec<MenuEntry>> = HashMap::new();
    for entry in entries {
        let parent = if entry.parent != entry.id && known.contains(&entry.parent) {
            entry.parent
        } else {
            0
        };
        by_parent.entry(parent).or_default().push(entry);
    }

    for siblings in by_parent.values_mut() {
        siblings.sort_by(|lhs, rhs| lhs.order.cmp(&rhs.order).then(lhs.id.cmp(&rhs.id)));
    }

    let mut visited = HashSet::new();
    attach_children(0, &mut by_parent, &mut visited)
}

fn attach_children(
    parent: u64,
    by_parent: &mut HashMap<u64, Vec<MenuEntry>>,
    visited: &mut HashSet<u64>,
) -> Vec<NavigationItem> {
    let Some(siblings) = by_parent.remove(&parent) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(siblings.len());
    for entry in siblings {
        if !visited.insert(entry.id) {
            continue;
        }
        let children = attach_children(entry.id, by_parent, visited);
        nodes.push(NavigationItem {
            id: entry.id,
            label: entry.label,
            url: entry.url,
            children,
        });
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, parent: u64, order: i64, label: &str) -> MenuEntry {
        MenuEntry {
            id,
            parent,
            order,
            label: label.to_string(),
            url: format!("/{}", label.to_lowercase()),
        }
    }

    #[test]
    fn builds_ordered_tree() {
        let tree = build_tree(vec![
            entry(3, 1, 2, "Pricing"),
            entry(1, 0, 2, "Tools"),
            entry(2, 1, 1, "Audit"),
            entry(4, 0, 1, "Home"),
        ]);

        let labels: Vec<&str> = tree.iter().map(|item| item.label.as_str()).collect();
        assert_eq!(labels, vec!["Home", "Tools"]);

        let tools = &tree[1];
        let children: Vec<&str> = tools.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(children, vec!["Audit", "Pricing"]);
    }

    #[test]
    fn orphans_are_promoted_to_root() {
        let tree = build_tree(vec![entry(5, 99, 1, "Orphan"), entry(1, 0, 0, "Home")]);
        let labels: Vec<&str> = tree.iter().map(|item| item.label.as_str()).collect();
        assert_eq!(labels, vec!["Home", "Orphan"]);
    }

    #[test]
    fn cycles_are_dropped() {
        let tree = build_tree(vec![
            entry(1, 0, 0, "Home"),
            entry(2, 3, 0, "Loop A"),
            entry(3, 2, 0, "Loop B"),
        ]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].label, "Home");
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn self_parent_is_treated_as_root() {
        let tree = build_tree(vec![entry(7, 7, 0, "Self")]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 7);
    }
}
