//! Editor tools and the actions they produce

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Aabb;
use crate::validation::RejectReason;

/// Editor tool mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorTool {
    #[default]
    Place,
    Move,
    Wall,
    Floor,
    Bulldoze,
    Eyedropper,
}

impl EditorTool {
    pub const ALL: [EditorTool; 6] = [
        EditorTool::Place,
        EditorTool::Move,
        EditorTool::Wall,
        EditorTool::Floor,
        EditorTool::Bulldoze,
        EditorTool::Eyedropper,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EditorTool::Place => "Place",
            EditorTool::Move => "Move",
            EditorTool::Wall => "Wall",
            EditorTool::Floor => "Floor",
            EditorTool::Bulldoze => "Bulldoze",
            EditorTool::Eyedropper => "Eyedropper",
        }
    }

    /// Whether the tool edits the lot. The eyedropper only reads it.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, EditorTool::Eyedropper)
    }
}

/// A concrete edit requested through a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ToolAction {
    Place {
        catalog_id: String,
        position: Vec3,
        rotation: f32,
    },
    /// Also used for rotating in place
    Move {
        id: Uuid,
        position: Vec3,
        rotation: f32,
    },
    RemoveObject {
        id: Uuid,
    },
    Wall {
        a: Vec3,
        b: Vec3,
    },
    RemoveWall {
        id: Uuid,
    },
    Floor {
        x: i32,
        z: i32,
        material: String,
    },
    Bulldoze {
        area: Aabb,
    },
}

impl ToolAction {
    /// Tool that produces this action
    pub fn tool(&self) -> EditorTool {
        match self {
            ToolAction::Place { .. } => EditorTool::Place,
            ToolAction::Move { .. } => EditorTool::Move,
            ToolAction::Wall { .. } | ToolAction::RemoveWall { .. } => EditorTool::Wall,
            ToolAction::Floor { .. } => EditorTool::Floor,
            ToolAction::RemoveObject { .. } | ToolAction::Bulldoze { .. } => EditorTool::Bulldoze,
        }
    }
}

/// Result of applying a [`ToolAction`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolOutcome {
    /// The edit ran and was pushed onto the history
    Applied,
    /// A placement rule refused the edit
    Rejected(RejectReason),
    InsufficientFunds { cost: f64, funds: f64 },
    /// Nothing to do; the lot already looks like that
    Unchanged,
}

impl ToolOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ToolOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names() {
        let names: Vec<_> = EditorTool::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            ["Place", "Move", "Wall", "Floor", "Bulldoze", "Eyedropper"]
        );
        assert_eq!(EditorTool::default(), EditorTool::Place);
        assert!(!EditorTool::Eyedropper.is_mutating());
        assert!(EditorTool::Bulldoze.is_mutating());
    }

    #[test]
    fn test_action_tool() {
        let action = ToolAction::Floor {
            x: 0,
            z: 0,
            material: "oak".into(),
        };
        assert_eq!(action.tool(), EditorTool::Floor);
        assert_eq!(
            ToolAction::RemoveWall { id: Uuid::nil() }.tool(),
            EditorTool::Wall
        );
    }

    #[test]
    fn test_action_serializes_tagged() {
        let action = ToolAction::RemoveObject { id: Uuid::nil() };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["action"], "remove_object");
    }
}
