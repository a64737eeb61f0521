//! A polyline graph over a buffer of sample values.

use crate::colour::ColourSet;
use crate::geometry::{Point, Size};
use crate::render::{DrawMode, RenderBackend, Vertex};
use crate::widget::base::{FrameContext, FrameEvents, WidgetCore};

/// Plots its samples left to right across the widget, scaled so that
/// `min..max` spans the widget height. Values outside the range are clamped
/// to the box.
pub struct GraphLine {
    pub core: WidgetCore,
    data: Vec<f32>,
    min: f32,
    max: f32,
}

impl GraphLine {
    pub fn new(colours: ColourSet, min: f32, max: f32, size: Size, position: Point) -> Self {
        let mut core = WidgetCore::new(colours, "", None, size, position);
        core.focusable = false;
        Self {
            core,
            data: Vec::new(),
            min,
            max,
        }
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Replace the plotted samples.
    pub fn set_data(&mut self, data: Vec<f32>) {
        self.data = data;
        self.core.refresh_position_only();
    }

    /// Append one sample.
    pub fn push(&mut self, value: f32) {
        self.data.push(value);
        self.core.refresh_position_only();
    }

    pub fn set_min(&mut self, min: f32) {
        if self.min != min {
            self.min = min;
            self.core.refresh_position_only();
        }
    }

    pub fn set_max(&mut self, max: f32) {
        if self.max != max {
            self.max = max;
            self.core.refresh_position_only();
        }
    }

    fn setup_polyline(&mut self, backend: &mut dyn RenderBackend, origin: Point) {
        let absolute = self.core.absolute_position(origin);
        let size = self.core.get_size_nodpiscale();

        let mut vertices = Vec::with_capacity(self.data.len());
        let mut indices = Vec::with_capacity(self.data.len());
        let x_step = if self.data.is_empty() {
            0.0
        } else {
            size.width / self.data.len() as f32
        };
        let vertical_scale = if self.max == self.min {
            0.0
        } else {
            size.height / (self.max - self.min)
        };

        let mut x = absolute.x;
        for &value in &self.data {
            indices.push(vertices.len() as u32);
            let y = absolute.y + ((value - self.min) * vertical_scale).clamp(0.0, size.height);
            vertices.push(Vertex::new([x, y], [1.0, 1.0]));
            x += x_step;
        }
        self.core.upload_shape(backend, &vertices, &indices);
    }

    pub(crate) fn render(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext,
        origin: Point,
        events: &mut FrameEvents,
    ) {
        if !self.core.visible {
            return;
        }
        if !self.core.is_ready() && backend.is_active() {
            self.setup_polyline(backend, origin);
            self.core.mark_ready();
        }
        self.core.draw_shape(
            backend,
            DrawMode::LineStrip,
            self.core.colours.current.content,
        );
        self.core.update(ctx, events);
    }

    pub(crate) fn destroy_buffers(&mut self, backend: &mut dyn RenderBackend) {
        self.core.destroy_buffers(backend);
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_mutations_invalidate_buffers() {
        let mut graph = GraphLine::new(
            ColourSet::default(),
            0.0,
            1.0,
            Size::new(100.0, 40.0),
            Point::zero(),
        );
        graph.core.mark_ready();
        graph.push(0.5);
        assert!(!graph.core.is_ready());

        graph.core.mark_ready();
        graph.set_min(0.0); // unchanged
        assert!(graph.core.is_ready());
        graph.set_max(2.0);
        assert!(!graph.core.is_ready());
    }

    #[test]
    fn values_clamp_to_the_box() {
        // clamping maths only; rendering is exercised via the null backend
        let min = 0.0_f32;
        let max = 1.0_f32;
        let height = 40.0_f32;
        let scale = height / (max - min);
        assert_eq!(((2.0 - min) * scale).clamp(0.0, height), height);
        assert_eq!(((-1.0 - min) * scale).clamp(0.0, height), 0.0);
    }
}
