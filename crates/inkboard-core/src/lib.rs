//! Inkboard Core Library
//!
//! Platform-agnostic document model and editing logic for the Inkboard
//! whiteboard: shapes, scenes, history, pointer gestures and pages.

pub mod canvas;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod history;
pub mod hit;
pub mod input;
pub mod interaction;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod tools;

pub use canvas::{Canvas, LayerInfo, SelectionProperties};
pub use config::EditorConfig;
pub use document::{Background, Document, DocumentState, PageState};
pub use error::{DocumentError, DocumentResult, EditError};
pub use history::History;
pub use input::{Modifiers, PointerEvent};
pub use interaction::{Gesture, GestureOutcome, Interaction};
pub use scene::Scene;
pub use selection::{Handle, HandleKind, SelectionFrame};
pub use shapes::{Object, ObjectId, ObjectKind, SerializableColor};
pub use snap::{Guide, GuideAxis};
pub use tools::{ToolKind, ToolSettings};
