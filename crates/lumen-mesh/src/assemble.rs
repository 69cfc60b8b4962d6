use glam::Vec3;
use lumen_host::{AnimatedComponent, SubMesh, Vertex, VertexTransform};

use crate::buffer::MeshBuffer;
use crate::error::MeshError;

/// How vertices of a sub-mesh are posed when appended.
#[derive(Clone, Copy)]
pub enum Deformation<'a> {
    /// Render-scene modes: the animated pose when available, the bind pose
    /// otherwise. A wrinkle factor is recorded per vertex.
    Posed(Option<&'a dyn AnimatedComponent>),
    /// Baking modes: always the bind pose, no wrinkle factors.
    BindPose,
}

/// Appends `sub_mesh` to `buffer`, tagging every triangle with `shader`.
///
/// Triangle indices are offset by the buffer's vertex count at insertion
/// and keep their source order.
pub fn append_sub_mesh(
    buffer: &mut MeshBuffer,
    sub_mesh: &SubMesh,
    shader: u32,
    deformation: Deformation<'_>,
) -> Result<(), MeshError> {
    if shader as usize >= buffer.shaders().len() {
        return Err(MeshError::ShaderIndexOutOfRange {
            index: shader,
            count: buffer.shaders().len(),
        });
    }
    let vertex_count = sub_mesh.vertices.len();
    if let Some(&index) = sub_mesh
        .triangles
        .iter()
        .find(|&&i| i as usize >= vertex_count)
    {
        return Err(MeshError::VertexIndexOutOfRange {
            index,
            count: vertex_count,
        });
    }

    let offset = buffer.vertex_offset();
    for (i, v) in sub_mesh.vertices.iter().enumerate() {
        match deformation {
            Deformation::Posed(animated) => {
                let transform = animated.and_then(|a| a.vertex_transform(sub_mesh, i));
                match transform {
                    Some(t) => {
                        let (position, normal, tangent) = apply_transform(v, &t);
                        buffer.add_vertex(position, normal, tangent, v.uv);
                        buffer.add_wrinkle_factor(t.wrinkle);
                    }
                    None => {
                        buffer.add_vertex(v.position, v.normal, v.tangent, v.uv);
                        buffer.add_wrinkle_factor(0.0);
                    }
                }
            }
            Deformation::BindPose => buffer.add_vertex(v.position, v.normal, v.tangent, v.uv),
        }

        if buffer.has_alphas() {
            buffer.add_alpha(sub_mesh.alphas.get(i).map_or(0.0, |a| a.x));
        }
    }

    for tri in sub_mesh.triangles.chunks_exact(3) {
        buffer.add_triangle([tri[0] + offset, tri[1] + offset, tri[2] + offset], shader)?;
    }
    Ok(())
}

fn apply_transform(v: &Vertex, t: &VertexTransform) -> (Vec3, Vec3, Vec3) {
    let p = t.matrix * v.position.extend(1.0);
    let position = p.truncate() / p.w;
    let normal = (t.matrix * v.normal.extend(0.0)).truncate() + t.normal_offset;
    let tangent = (t.matrix * v.tangent.extend(0.0)).truncate() + t.normal_offset;
    (position, normal.normalize_or_zero(), tangent.normalize_or_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MeshFlags;
    use crate::buffer::tests::shader;
    use glam::{Mat4, Vec2};

    fn quad() -> SubMesh {
        let v = |x: f32, y: f32| Vertex::new(Vec3::new(x, y, 0.0), Vec3::Z, Vec3::X, Vec2::new(x, y));
        SubMesh {
            vertices: vec![v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)],
            triangles: vec![0, 1, 2, 0, 2, 3],
            ..SubMesh::default()
        }
    }

    fn empty_buffer(flags: MeshFlags) -> (MeshBuffer, u32) {
        let mut buffer = MeshBuffer::new("ent_1", 8, 4, flags);
        let idx = buffer.add_shader(shader("ent_1"));
        (buffer, idx)
    }

    struct Lift;

    impl AnimatedComponent for Lift {
        fn active_animation(&self) -> Option<u32> {
            Some(0)
        }

        fn vertex_transform(&self, _: &SubMesh, vertex_index: usize) -> Option<VertexTransform> {
            // Only even vertices are skinned.
            (vertex_index % 2 == 0).then(|| VertexTransform {
                matrix: Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)),
                normal_offset: Vec3::ZERO,
                wrinkle: 0.5,
            })
        }
    }

    #[test]
    fn test_bind_pose_is_exact() {
        let (mut buffer, idx) = empty_buffer(MeshFlags::default());
        let sub_mesh = quad();
        append_sub_mesh(&mut buffer, &sub_mesh, idx, Deformation::BindPose).unwrap();

        let positions: Vec<Vec3> = sub_mesh.vertices.iter().map(|v| v.position).collect();
        assert_eq!(buffer.positions(), positions.as_slice());
        assert_eq!(buffer.normals(), &[Vec3::Z; 4]);
        assert_eq!(buffer.uvs()[2], Vec2::new(1.0, 1.0));
        assert_eq!(buffer.triangle_count(), 2);
    }

    #[test]
    fn test_triangle_indices_are_offset() {
        let (mut buffer, idx) = empty_buffer(MeshFlags::default());
        append_sub_mesh(&mut buffer, &quad(), idx, Deformation::BindPose).unwrap();
        let second = buffer.add_shader(shader("ent_1"));
        append_sub_mesh(&mut buffer, &quad(), second, Deformation::BindPose).unwrap();

        let tris = buffer.triangles();
        assert_eq!(tris.len(), 4);
        assert_eq!(tris[0].indices, [0, 1, 2]);
        assert_eq!(tris[2].indices, [4, 5, 6]);
        assert_eq!(tris[3].indices, [4, 6, 7]);
        assert_eq!(tris[2].shader, second);
    }

    #[test]
    fn test_posed_vertices_use_transform() {
        let flags = MeshFlags {
            has_wrinkles: true,
            ..MeshFlags::default()
        };
        let (mut buffer, idx) = empty_buffer(flags);
        append_sub_mesh(&mut buffer, &quad(), idx, Deformation::Posed(Some(&Lift))).unwrap();

        assert_eq!(buffer.positions()[0], Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(buffer.positions()[1], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(buffer.normals()[0], Vec3::Z);
        assert_eq!(buffer.wrinkles(), &[0.5, 0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_bake_ignores_animation_and_wrinkles() {
        let flags = MeshFlags {
            has_wrinkles: true,
            ..MeshFlags::default()
        };
        let (mut buffer, idx) = empty_buffer(flags);
        append_sub_mesh(&mut buffer, &quad(), idx, Deformation::BindPose).unwrap();
        assert_eq!(buffer.positions()[0], Vec3::ZERO);
        assert!(buffer.wrinkles().is_empty());
    }

    #[test]
    fn test_missing_alphas_default_to_zero() {
        let flags = MeshFlags {
            has_alphas: true,
            ..MeshFlags::default()
        };
        let (mut buffer, idx) = empty_buffer(flags);
        let mut sub_mesh = quad();
        sub_mesh.alphas = vec![Vec2::new(0.75, 0.0), Vec2::new(0.25, 0.0)];
        append_sub_mesh(&mut buffer, &sub_mesh, idx, Deformation::BindPose).unwrap();
        assert_eq!(buffer.alphas(), &[0.75, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn test_rejects_bad_indices() {
        let (mut buffer, idx) = empty_buffer(MeshFlags::default());
        let mut sub_mesh = quad();
        sub_mesh.triangles.push(9);
        sub_mesh.triangles.extend([0, 1]);
        assert!(matches!(
            append_sub_mesh(&mut buffer, &sub_mesh, idx, Deformation::BindPose),
            Err(MeshError::VertexIndexOutOfRange { index: 9, count: 4 })
        ));
        assert!(matches!(
            append_sub_mesh(&mut buffer, &quad(), 3, Deformation::BindPose),
            Err(MeshError::ShaderIndexOutOfRange { index: 3, .. })
        ));
        assert_eq!(buffer.vertex_count(), 0);
    }
}
