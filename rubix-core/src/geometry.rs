/// Geometry primitives for drawing cubies
use nalgebra::{Point3, Vector3};

use crate::cube::Face;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle on one face of a cubie
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
    /// The cubie face (in the cubie's home frame) this triangle belongs to
    pub face: Face,
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex, face: Face) -> Self {
        Self {
            vertices: [v0, v1, v2],
            face,
        }
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Axis-aligned cube centred on the origin, two counter-clockwise
    /// triangles per face, each tagged with its face.
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(12);

        for face in Face::ALL {
            let normal = face.normal();
            let center = normal * half;
            // In-plane axes ordered so that u × v points outwards
            let [a, b] = face.axis().perpendiculars();
            let (u, v) = if face.sign() > 0 { (a, b) } else { (b, a) };
            let u = u.unit_vector() * half;
            let v = v.unit_vector() * half;

            let corner =
                |su: f32, sv: f32| Vertex::new(Point3::from(center + u * su + v * sv), normal);
            let c0 = corner(-1.0, -1.0);
            let c1 = corner(1.0, -1.0);
            let c2 = corner(1.0, 1.0);
            let c3 = corner(-1.0, 1.0);

            mesh.add_triangle(Triangle::new(c0, c1, c2, face));
            mesh.add_triangle(Triangle::new(c0, c2, c3, face));
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_winding_faces_outwards() {
        let mesh = Mesh::cube(2.0);
        assert_eq!(mesh.triangles.len(), 12);
        for triangle in &mesh.triangles {
            let normal = triangle.calculate_normal();
            assert!((normal - triangle.face.normal()).norm() < 1e-6);
            for vertex in &triangle.vertices {
                let coord = vertex.position[triangle.face.axis().index()];
                assert!((coord - triangle.face.sign() as f32).abs() < 1e-6);
            }
        }
    }
}
