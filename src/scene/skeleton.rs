use glam::{Affine3A, Mat4, Vec3};
use uuid::Uuid;

use crate::resources::BoundingBox;
use crate::scene::transform::Transform;

/// Joint chain of one page.
///
/// Joint 0 sits on the spine; every following joint is a child of the one
/// before it, offset by one segment along x. Rotating a joint therefore
/// carries the rest of the page with it, which is what makes the page curl.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: Uuid,
    pub name: String,

    // === Core Data ===
    /// Local transforms, parent -> child order. `joints[i]` is joint `i` in the skin indices.
    pub joints: Vec<Transform>,

    /// Mesh space -> joint local space at bind time
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,

    // === Runtime Data ===
    /// Final matrices uploaded per frame
    pub(crate) joint_matrices: Vec<Mat4>,
}

impl Skeleton {
    /// Builds a straight chain of `joint_count` joints spaced `segment_width` apart.
    #[must_use]
    pub fn new(name: &str, joint_count: usize, segment_width: f32) -> Self {
        let mut joints = Vec::with_capacity(joint_count);
        let mut inverse_bind_matrices = Vec::with_capacity(joint_count);

        for i in 0..joint_count {
            let offset = if i == 0 { 0.0 } else { segment_width };
            joints.push(Transform::from_position(Vec3::new(offset, 0.0, 0.0)));
            // Bind pose is the flat page: joint i rests at x = i * segment_width
            inverse_bind_matrices.push(Affine3A::from_translation(Vec3::new(
                -(i as f32) * segment_width,
                0.0,
                0.0,
            )));
        }

        let mut skeleton = Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            joints,
            inverse_bind_matrices,
            joint_matrices: vec![Mat4::IDENTITY; joint_count],
        };
        skeleton.compute_joint_matrices();
        skeleton
    }

    #[inline]
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Sets the fold (x) and bend (y) rotation of joint `i`.
    pub fn set_joint_rotation(&mut self, i: usize, fold: f32, bend: f32) {
        if let Some(joint) = self.joints.get_mut(i) {
            joint.set_rotation_euler(fold, bend, 0.0);
        }
    }

    /// Propagates local transforms down the chain and refreshes the joint matrices.
    ///
    /// The result is in page space: the page's own transform is applied by
    /// the renderer on top.
    pub fn compute_joint_matrices(&mut self) {
        let mut parent_world = Affine3A::IDENTITY;
        for (i, joint) in self.joints.iter_mut().enumerate() {
            joint.update_local_matrix();
            let world = parent_world * joint.local_matrix;
            joint.set_world_matrix(world);

            // First IBM (mesh -> joint local), then the posed joint
            self.joint_matrices[i] = (world * self.inverse_bind_matrices[i]).into();
            parent_world = world;
        }
    }

    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// Page-space position of joint `i` in the current pose.
    #[must_use]
    pub fn joint_position(&self, i: usize) -> Option<Vec3> {
        self.joints.get(i).map(|j| j.world_matrix().translation.into())
    }

    /// Applies linear blend skinning to one vertex.
    #[must_use]
    pub fn skin_position(&self, position: Vec3, indices: [u16; 4], weights: [f32; 4]) -> Vec3 {
        indices
            .iter()
            .zip(weights)
            .filter(|(_, w)| *w > 0.0)
            .filter_map(|(&j, w)| {
                self.joint_matrices
                    .get(j as usize)
                    .map(|m| m.transform_point3(position) * w)
            })
            .sum()
    }

    /// Tight page-space bounds of the current joint positions.
    #[must_use]
    pub fn compute_tight_bounds(&self) -> Option<BoundingBox> {
        let mut positions = self.joints.iter().map(|j| Vec3::from(j.world_matrix().translation));
        let first = positions.next()?;
        let (min, max) = positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(BoundingBox { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_pose_is_identity() {
        let s = Skeleton::new("page", 5, 0.25);
        for m in s.joint_matrices() {
            assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-6));
        }
        let tip = s.joint_position(4).unwrap();
        assert!((tip.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rotating_root_swings_whole_chain() {
        let mut s = Skeleton::new("page", 3, 0.5);
        s.set_joint_rotation(0, 0.0, -std::f32::consts::FRAC_PI_2);
        s.compute_joint_matrices();
        let tip = s.joint_position(2).unwrap();
        assert!(tip.x.abs() < 1e-5);
        assert!((tip.z - 1.0).abs() < 1e-5);
    }
}
