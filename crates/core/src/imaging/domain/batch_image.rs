use crate::shared::frame::Frame;

/// A decoded image of an account batch together with the reference it was
/// loaded from (usually the file name).
#[derive(Clone, Debug)]
pub struct BatchImage {
    pub image_ref: String,
    pub frame: Frame,
}

impl BatchImage {
    pub fn new(image_ref: impl Into<String>, frame: Frame) -> Self {
        Self {
            image_ref: image_ref.into(),
            frame,
        }
    }
}
