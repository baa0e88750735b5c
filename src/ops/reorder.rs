use crate::model::tree::Tree;
use crate::ops::tree_ops::{self, ReorderScope};

/// A committed drag: `active_id` was released over `over_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    pub scope: ReorderScope,
    pub active_id: String,
    /// `None` when released outside any sibling
    pub over_id: Option<String>,
}

/// A `(moved, target)` pair emitted by a gesture backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEvent {
    pub moved_id: String,
    pub target_id: Option<String>,
}

/// Capability a drag-and-drop backend provides: shown the current sibling
/// ids, it yields at most one move event when the user commits a reorder.
pub trait ReorderGesture {
    fn commit(&mut self, sibling_ids: &[String]) -> Option<MoveEvent>;
}

/// Gesture backend driven by explicit ids, as given on the command line.
/// A target that is not among the siblings is reported as "no drop target".
#[derive(Debug, Clone)]
pub struct ExplicitGesture {
    moved_id: String,
    target_id: String,
}

impl ExplicitGesture {
    pub fn new(moved_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        ExplicitGesture {
            moved_id: moved_id.into(),
            target_id: target_id.into(),
        }
    }
}

impl ReorderGesture for ExplicitGesture {
    fn commit(&mut self, sibling_ids: &[String]) -> Option<MoveEvent> {
        if !sibling_ids.contains(&self.moved_id) {
            return None;
        }
        let target_id = sibling_ids
            .contains(&self.target_id)
            .then(|| self.target_id.clone());
        Some(MoveEvent {
            moved_id: self.moved_id.clone(),
            target_id,
        })
    }
}

/// Apply a drag-end to the tree. No target, or a drop onto itself, leaves
/// the tree unchanged.
pub fn handle_drag_end(tree: &Tree, event: &DragEnd) -> Tree {
    match event.over_id.as_deref() {
        Some(over) if over != event.active_id => {
            tree_ops::reorder(tree, &event.scope, &event.active_id, over)
        }
        _ => tree.clone(),
    }
}

/// Ask `gesture` for a move within `scope` and apply it.
/// Returns the unchanged tree when the scope does not resolve or the gesture
/// yields nothing.
pub fn run_gesture(tree: &Tree, scope: ReorderScope, gesture: &mut dyn ReorderGesture) -> Tree {
    let Some(ids) = tree_ops::sibling_ids(tree, &scope) else {
        return tree.clone();
    };
    match gesture.commit(&ids) {
        Some(event) => handle_drag_end(
            tree,
            &DragEnd {
                scope,
                active_id: event.moved_id,
                over_id: event.target_id,
            },
        ),
        None => tree.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tree::Topic;

    fn topics(ids: &[&str]) -> Tree {
        Tree::new(
            ids.iter()
                .map(|id| Topic {
                    id: id.to_string(),
                    title: id.to_uppercase(),
                    subtopics: vec![],
                })
                .collect(),
        )
    }

    fn order(tree: &Tree) -> Vec<&str> {
        tree.topics.iter().map(|t| t.id.as_str()).collect()
    }

    fn drag(active: &str, over: Option<&str>) -> DragEnd {
        DragEnd {
            scope: ReorderScope::Topics,
            active_id: active.into(),
            over_id: over.map(String::from),
        }
    }

    #[test]
    fn drag_forward_and_backward() {
        let tree = topics(&["a", "b", "c", "d"]);
        assert_eq!(order(&handle_drag_end(&tree, &drag("a", Some("c")))), vec!["b", "c", "a", "d"]);
        assert_eq!(order(&handle_drag_end(&tree, &drag("d", Some("a")))), vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn drag_without_target_or_onto_self_is_noop() {
        let tree = topics(&["a", "b", "c"]);
        assert_eq!(handle_drag_end(&tree, &drag("a", None)), tree);
        assert_eq!(handle_drag_end(&tree, &drag("b", Some("b"))), tree);
        assert_eq!(handle_drag_end(&tree, &drag("zz", Some("a"))), tree);
    }

    #[test]
    fn explicit_gesture_reports_missing_target_as_none() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let mut gesture = ExplicitGesture::new("a", "zz");
        assert_eq!(
            gesture.commit(&ids),
            Some(MoveEvent {
                moved_id: "a".into(),
                target_id: None
            })
        );
        assert_eq!(ExplicitGesture::new("zz", "a").commit(&ids), None);
    }

    #[test]
    fn run_gesture_applies_move() {
        let tree = topics(&["a", "b", "c", "d"]);
        let next = run_gesture(&tree, ReorderScope::Topics, &mut ExplicitGesture::new("b", "d"));
        assert_eq!(order(&next), vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn run_gesture_with_unknown_scope_is_noop() {
        let tree = topics(&["a", "b"]);
        let scope = ReorderScope::SubTopics {
            topic_id: "missing".into(),
        };
        assert_eq!(run_gesture(&tree, scope, &mut ExplicitGesture::new("x", "y")), tree);
    }
}
