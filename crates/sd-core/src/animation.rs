use serde::{Deserialize, Serialize};

/// A frame-swap door definition.
///
/// A line whose front middle texture equals `base` can be opened as an
/// animated door; opening steps through `frames` in order, closing steps back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorAnimation {
    /// Middle texture identifying the door.
    pub base: String,
    /// Texture frames from closed to fully open.
    pub frames: Vec<String>,
    /// Sound cue played on opening.
    #[serde(default)]
    pub open_sound: Option<String>,
    /// Sound cue played on closing.
    #[serde(default)]
    pub close_sound: Option<String>,
}

impl DoorAnimation {
    /// Create an animation with no sound cues.
    pub fn new(base: impl Into<String>, frames: Vec<String>) -> Self {
        Self {
            base: base.into(),
            frames,
            open_sound: None,
            close_sound: None,
        }
    }

    /// Number of texture frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}
