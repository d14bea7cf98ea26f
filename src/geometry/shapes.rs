use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use super::{Geometry, GeometryKind, Vertex};
use crate::error::{Result, SceneError};

/// Beyond this an icosahedron has more than a million triangles
pub const MAX_ICOSAHEDRON_DETAIL: u32 = 64;

fn positive(name: &str, value: f32) -> Result<f32> {
    if !value.is_finite() {
        return Err(SceneError::invalid(name, format!("{value} is not finite")));
    }
    if value <= 0.0 {
        return Err(SceneError::invalid(name, format!("{value} must be positive")));
    }
    Ok(value)
}

fn at_least(name: &str, value: u32, min: u32) -> Result<u32> {
    if value < min {
        return Err(SceneError::invalid(name, format!("{value} is below {min}")));
    }
    Ok(value)
}

#[rustfmt::skip]
const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

fn icosahedron_corners() -> [Vec3; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
}

/// Faceted sphere: each of the 20 faces is split into `(detail + 1)²`
/// triangles and every vertex is pushed out to `radius`.
///
/// The result is non-indexed in spirit (three vertices per triangle, flat
/// normals) so each facet shades as a single plane.
pub fn icosahedron(radius: f32, detail: u32) -> Result<Geometry> {
    let radius = positive("radius", radius)?;
    if detail > MAX_ICOSAHEDRON_DETAIL {
        return Err(SceneError::invalid(
            "detail",
            format!("{detail} exceeds {MAX_ICOSAHEDRON_DETAIL}"),
        ));
    }

    let corners = icosahedron_corners();
    let cols = detail as usize + 1;
    let mut triangles: Vec<[Vec3; 3]> = Vec::with_capacity(20 * cols * cols);

    for face in ICOSAHEDRON_FACES {
        let [a, b, c] = face.map(|i| corners[i]);

        // grid[i][j]: row i walks from edge ab towards c
        let grid: Vec<Vec<Vec3>> = (0..=cols)
            .map(|i| {
                let t = i as f32 / cols as f32;
                let aj = a.lerp(c, t);
                let bj = b.lerp(c, t);
                let rows = cols - i;
                (0..=rows)
                    .map(|j| {
                        if j == 0 && i == cols {
                            aj
                        } else {
                            aj.lerp(bj, j as f32 / rows as f32)
                        }
                    })
                    .collect()
            })
            .collect();

        for i in 0..cols {
            for j in 0..2 * (cols - i) - 1 {
                let k = j / 2;
                if j % 2 == 0 {
                    triangles.push([grid[i][k + 1], grid[i + 1][k], grid[i][k]]);
                } else {
                    triangles.push([grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]);
                }
            }
        }
    }

    let mut vertices = Vec::with_capacity(triangles.len() * 3);
    for tri in &triangles {
        let [p0, p1, p2] = tri.map(|p| p.normalize() * radius);
        let mut normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
        if normal.dot(p0 + p1 + p2) < 0.0 {
            normal = -normal;
        }
        vertices.extend([p0, p1, p2].map(|p| Vertex::new(p, normal)));
    }
    let indices = (0..vertices.len() as u32).collect();

    Ok(Geometry::new(GeometryKind::Icosahedron { detail }, vertices, indices))
}

/// Latitude/longitude sphere. Pole rows skip their degenerate triangle, so a
/// sphere has `2·w·h − 2·w` triangles over `(w + 1)·(h + 1)` vertices.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Result<Geometry> {
    let radius = positive("radius", radius)?;
    let w = at_least("width_segments", width_segments, 3)?;
    let h = at_least("height_segments", height_segments, 2)?;

    let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let dir = Vec3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            );
            vertices.push(Vertex::new(dir * radius, dir.normalize_or_zero()));
        }
    }

    let row = w + 1;
    let mut indices = Vec::new();
    for iy in 0..h {
        for ix in 0..w {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                indices.extend([a, b, d]);
            }
            if iy != h - 1 {
                indices.extend([b, c, d]);
            }
        }
    }

    Ok(Geometry::new(
        GeometryKind::Sphere {
            width_segments: w,
            height_segments: h,
        },
        vertices,
        indices,
    ))
}

/// Upright cone centred on the origin with its apex at `+height/2` and a
/// closed base at `-height/2`.
pub fn cone(
    radius: f32,
    height: f32,
    radial_segments: u32,
    height_segments: u32,
) -> Result<Geometry> {
    let radius = positive("radius", radius)?;
    let height = positive("height", height)?;
    let radial = at_least("radial_segments", radial_segments, 3)?;
    let rows = at_least("height_segments", height_segments, 1)?;

    let half = height / 2.0;
    let slope = radius / height;
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for y in 0..=rows {
        let v = y as f32 / rows as f32;
        let ring_radius = v * radius;
        for x in 0..=radial {
            let theta = x as f32 / radial as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            vertices.push(Vertex::new(
                Vec3::new(ring_radius * sin, half - v * height, ring_radius * cos),
                Vec3::new(sin, slope, cos).normalize(),
            ));
        }
    }
    let row = radial + 1;
    for x in 0..radial {
        for y in 0..rows {
            let a = y * row + x;
            let b = (y + 1) * row + x;
            let c = (y + 1) * row + x + 1;
            let d = y * row + x + 1;
            indices.extend([a, b, d, b, c, d]);
        }
    }

    // Base cap: one centre vertex per segment, then the rim
    let centre_start = vertices.len() as u32;
    for _ in 0..radial {
        vertices.push(Vertex::new(Vec3::new(0.0, -half, 0.0), Vec3::NEG_Y));
    }
    let rim_start = vertices.len() as u32;
    for x in 0..=radial {
        let theta = x as f32 / radial as f32 * TAU;
        vertices.push(Vertex::new(
            Vec3::new(radius * theta.sin(), -half, radius * theta.cos()),
            Vec3::NEG_Y,
        ));
    }
    for x in 0..radial {
        indices.extend([rim_start + x + 1, rim_start + x, centre_start + x]);
    }

    Ok(Geometry::new(
        GeometryKind::Cone {
            radial_segments: radial,
            height_segments: rows,
        },
        vertices,
        indices,
    ))
}

/// Half disc of `radius` (arc from 0 to π sampled at `divisions + 1` points)
/// extruded along +Z by `depth`.
///
/// With `n = divisions + 1` outline points the solid has `6·n` vertices and
/// `4·n − 4` triangles.
pub fn extruded_fan(radius: f32, depth: f32, divisions: u32) -> Result<Geometry> {
    let radius = positive("radius", radius)?;
    let depth = positive("depth", depth)?;
    let divisions = at_least("divisions", divisions, 2)?;

    let outline: Vec<Vec2> = (0..=divisions)
        .map(|k| {
            let angle = PI * k as f32 / divisions as f32;
            Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect();
    let n = outline.len() as u32;

    let mut vertices = Vec::with_capacity(6 * n as usize);
    let mut indices = Vec::new();

    // Caps, fanned from the first outline point (the outline is convex)
    for (z, normal) in [(0.0, Vec3::NEG_Z), (depth, Vec3::Z)] {
        let base = vertices.len() as u32;
        vertices.extend(outline.iter().map(|p| Vertex::new(p.extend(z), normal)));
        for k in 1..n - 1 {
            if z == 0.0 {
                indices.extend([base, base + k + 1, base + k]);
            } else {
                indices.extend([base, base + k, base + k + 1]);
            }
        }
    }

    // Walls, including the straight closing edge
    for k in 0..n as usize {
        let p = outline[k];
        let q = outline[(k + 1) % n as usize];
        let edge = q - p;
        let normal = Vec3::new(edge.y, -edge.x, 0.0).normalize_or_zero();
        let base = vertices.len() as u32;
        vertices.extend([
            Vertex::new(p.extend(0.0), normal),
            Vertex::new(q.extend(0.0), normal),
            Vertex::new(q.extend(depth), normal),
            Vertex::new(p.extend(depth), normal),
        ]);
        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Ok(Geometry::new(GeometryKind::ExtrudedFan { divisions }, vertices, indices))
}
