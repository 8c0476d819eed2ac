use foundation::bounds::Aabb2;
use foundation::math::Vec2;

/// Stroke applied around a filled shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

/// The shared 2D drawing surface. Owned by the render pass for the duration
/// of a frame; markers never hold one.
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn clear(&mut self, region: Aabb2);
    /// Draws the `src` rectangle of the image at `url` into `dst`.
    fn draw_image(&mut self, url: &str, src: Aabb2, dst: Aabb2);
    fn fill_circle(&mut self, center: Vec2, radius: f64, fill: &str, stroke: Option<&Stroke>);
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Save,
    Restore,
    Clear {
        region: Aabb2,
    },
    DrawImage {
        url: String,
        src: Aabb2,
        dst: Aabb2,
    },
    FillCircle {
        center: Vec2,
        radius: f64,
        fill: String,
        stroke: Option<Stroke>,
    },
}

/// Canvas that records calls instead of rasterizing them.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<RenderCommand>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Image draws only, in call order.
    pub fn images(&self) -> impl Iterator<Item = (&str, Aabb2)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            RenderCommand::DrawImage { url, dst, .. } => Some((url.as_str(), *dst)),
            _ => None,
        })
    }

    pub fn take(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.commands.push(RenderCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(RenderCommand::Restore);
    }

    fn clear(&mut self, region: Aabb2) {
        self.commands.push(RenderCommand::Clear { region });
    }

    fn draw_image(&mut self, url: &str, src: Aabb2, dst: Aabb2) {
        self.commands.push(RenderCommand::DrawImage {
            url: url.to_string(),
            src,
            dst,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, fill: &str, stroke: Option<&Stroke>) {
        self.commands.push(RenderCommand::FillCircle {
            center,
            radius,
            fill: fill.to_string(),
            stroke: stroke.cloned(),
        });
    }
}
