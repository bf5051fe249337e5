pub mod editor;
pub mod gesture;
pub mod input;
pub mod selection;
pub mod shortcuts;

pub use editor::Editor;
pub use gesture::{Gesture, GestureOutcome, GestureState, Grip, InteractionEngine};
pub use input::{InputEvent, Modifiers};
pub use selection::{FontStyle, Propagation, Selection};
pub use shortcuts::{ShortcutAction, ShortcutMap};
