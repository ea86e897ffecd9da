//! Groups of objects that move as one.

use super::Object;
use serde::{Deserialize, Serialize};

/// A group of objects.
///
/// Children keep absolute canvas coordinates. The group's own rotation is
/// applied on top, about the center of the children's combined bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub children: Vec<Object>,
}

impl Group {
    pub fn new(children: Vec<Object>) -> Self {
        Self { children }
    }

    /// Dissolve this group and return its children.
    pub fn ungroup(self) -> Vec<Object> {
        self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ObjectId, ObjectKind, Stroke, StrokeTool};
    use kurbo::Point;

    #[test]
    fn test_ungroup_keeps_child_order() {
        let leaf = |id| {
            Object::new(
                ObjectId(id),
                ObjectKind::Stroke(Stroke::new(vec![Point::ZERO], StrokeTool::Pencil)),
            )
        };
        let group = Group::new(vec![leaf(2), leaf(1)]);
        let ids: Vec<ObjectId> = group.ungroup().iter().map(Object::id).collect();
        assert_eq!(ids, vec![ObjectId(2), ObjectId(1)]);
    }
}
