use geometry::{Extent, Point, Rect};

use crate::{approximate_text_extent, Canvas, Color, Font, TextAlign};

/// One recorded call on a [`RecordingCanvas`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: u32,
    },
    Text {
        at: Point,
        text: String,
        color: Color,
        font: Font,
    },
    TextInRect {
        rect: Rect,
        text: String,
        color: Color,
        font: Font,
        align: TextAlign,
    },
}

/// The finished contents of a [`RecordingCanvas`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub extent: Extent,
    pub commands: Vec<DrawCommand>,
}

/// A canvas that records draw calls in order instead of rasterizing them.
///
/// Text measurement uses [`approximate_text_extent`].
#[derive(Debug)]
pub struct RecordingCanvas {
    frame: Frame,
}

impl RecordingCanvas {
    #[must_use]
    pub fn new(extent: Extent) -> Self {
        Self {
            frame: Frame {
                extent,
                commands: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.frame.commands
    }

    #[must_use]
    pub fn into_frame(self) -> Frame {
        self.frame
    }
}

impl Canvas for RecordingCanvas {
    fn extent(&self) -> Extent {
        self.frame.extent
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.frame.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        self.frame
            .commands
            .push(DrawCommand::StrokeRect { rect, color });
    }

    fn line(&mut self, from: Point, to: Point, color: Color, width: u32) {
        self.frame.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn text(&mut self, at: Point, text: &str, color: Color, font: &Font) {
        self.frame.commands.push(DrawCommand::Text {
            at,
            text: text.to_owned(),
            color,
            font: font.clone(),
        });
    }

    fn text_in_rect(&mut self, rect: Rect, text: &str, color: Color, font: &Font, align: TextAlign) {
        self.frame.commands.push(DrawCommand::TextInRect {
            rect,
            text: text.to_owned(),
            color,
            font: font.clone(),
            align,
        });
    }

    fn measure_text(&mut self, text: &str, font: &Font) -> Extent {
        approximate_text_extent(text, font)
    }
}
