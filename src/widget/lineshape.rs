//! A shape assembled from straight line segments.
//!
//! Segments are given as endpoint pairs relative to the widget position;
//! shared endpoints are merged into one vertex so connected outlines upload
//! as a compact indexed array.

use crate::colour::ColourSet;
use crate::geometry::Point;
use crate::render::{DrawMode, RenderBackend, Vertex};
use crate::widget::base::{FrameContext, FrameEvents, WidgetCore};

pub struct LineShape {
    pub core: WidgetCore,
    /// Deduplicated endpoints, relative to the widget position.
    vertices: Vec<Point>,
    indices: Vec<u32>,
}

impl LineShape {
    pub fn new(colours: ColourSet, segments: &[(Point, Point)], position: Point) -> Self {
        let mut core = WidgetCore::new(
            colours,
            "",
            None,
            crate::geometry::Size::zero(),
            position,
        );
        core.focusable = false;
        core.set_shape(false);
        let mut shape = Self {
            core,
            vertices: Vec::new(),
            indices: Vec::new(),
        };
        shape.set_segments(segments);
        shape
    }

    /// Endpoints shared between segments, after merging.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Replace the segment list, merging shared endpoints into an indexed
    /// vertex array.
    pub fn set_segments(&mut self, segments: &[(Point, Point)]) {
        self.vertices.clear();
        self.indices.clear();
        self.vertices.reserve(segments.len() * 2); // worst case, nothing shared
        self.indices.reserve(segments.len() * 2);

        for &(a, b) in segments {
            for point in [a, b] {
                let index = match self.vertices.iter().position(|&v| v == point) {
                    Some(found) => found,
                    None => {
                        self.vertices.push(point);
                        self.vertices.len() - 1
                    }
                };
                self.indices.push(index as u32);
            }
        }
        self.core.refresh_position_only();
    }

    fn setup_shape(&mut self, backend: &mut dyn RenderBackend, origin: Point) {
        let absolute = self.core.absolute_position(origin);
        let vertices: Vec<Vertex> = self
            .vertices
            .iter()
            .map(|v| Vertex::new([absolute.x + v.x, absolute.y + v.y], [1.0, 1.0]))
            .collect();
        self.core.upload_shape(backend, &vertices, &self.indices);
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
            self.setup_shape(backend, origin);
            self.core.mark_ready();
        }
        self.core
            .draw_shape(backend, DrawMode::Lines, self.core.colours.current.outline);
        self.core.update(ctx, events);
    }

    pub(crate) fn destroy_buffers(&mut self, backend: &mut dyn RenderBackend) {
        self.core.destroy_buffers(backend);
    }
}
