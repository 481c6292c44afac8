//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::scene::{DrawCommand, Shape};
use super::vertex::Vertex;

/// Circle segment count scales with radius, within these bounds
const MIN_SEGMENTS: u32 = 6;
const MAX_SEGMENTS: u32 = 48;

/// Generate vertices for a filled axis-aligned rectangle
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let max = min + size;
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let (inner1, outer1) = (
            center + Vec2::from_angle(theta1) * inner_radius,
            center + Vec2::from_angle(theta1) * outer_radius,
        );
        let (inner2, outer2) = (
            center + Vec2::from_angle(theta2) * inner_radius,
            center + Vec2::from_angle(theta2) * outer_radius,
        );

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

/// Generate vertices for a thick line segment
pub fn segment(from: Vec2, to: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    // Perpendicular for width
    let perp = dir.perp() * (width / 2.0);

    let (a1, b1) = (from + perp, from - perp);
    let (a2, b2) = (to + perp, to - perp);

    vec![
        Vertex::new(a1.x, a1.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(b2.x, b2.y, color),
    ]
}

fn segments_for(radius: f32) -> u32 {
    (radius.max(0.0) as u32).clamp(MIN_SEGMENTS, MAX_SEGMENTS)
}

/// Triangulate a draw list in order
pub fn tessellate(commands: &[DrawCommand]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(commands.len() * 6);
    for cmd in commands {
        match cmd.shape {
            Shape::Rect { min, size } => vertices.extend(rect(min, size, cmd.color)),
            Shape::Circle { center, radius } => {
                vertices.extend(circle(center, radius, cmd.color, segments_for(radius)))
            }
            Shape::Ring {
                center,
                inner,
                outer,
            } => vertices.extend(ring(center, inner, outer, cmd.color, segments_for(outer))),
            Shape::Segment { from, to, width } => vertices.extend(segment(from, to, width, cmd.color)),
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::RenderLayer;

    #[test]
    fn test_rect_covers_corners() {
        let v = rect(Vec2::new(10.0, 20.0), Vec2::new(30.0, 40.0), [1.0; 4]);
        assert_eq!(v.len(), 6);
        assert!(v.iter().any(|v| v.position == [40.0, 60.0]));
        assert!(v.iter().any(|v| v.position == [10.0, 20.0]));
    }

    #[test]
    fn test_degenerate_segment_is_empty() {
        assert!(segment(Vec2::ONE, Vec2::ONE, 4.0, [1.0; 4]).is_empty());
        assert_eq!(segment(Vec2::ZERO, Vec2::X, 4.0, [1.0; 4]).len(), 6);
    }

    #[test]
    fn test_tessellate_counts() {
        let commands = [
            DrawCommand {
                layer: RenderLayer::Background,
                shape: Shape::Rect {
                    min: Vec2::ZERO,
                    size: Vec2::ONE,
                },
                color: [1.0; 4],
            },
            DrawCommand {
                layer: RenderLayer::Particle,
                shape: Shape::Circle {
                    center: Vec2::ZERO,
                    radius: 2.0,
                },
                color: [1.0; 4],
            },
        ];
        // Rect + minimum-segment circle
        assert_eq!(tessellate(&commands).len(), 6 + 3 * MIN_SEGMENTS as usize);
    }
}
