//! Soft box: a centre body held inside a ring of four corners by springs
//!
//! The centre is the web's anchor, so locomotion pushes it around and the
//! corners follow through their links. Ground distance is taken from the
//! lowest corner, so the box lands on its corners.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Pose2, Vec2};
use super::{ConstructError, JointParams, Material, ShapeDesc, Web, WebJoint};

/// Corner placements relative to the centre, in units of the half extents
///
/// Bottom left first, then around the ring.
pub const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (1.0, -1.0)];

/// Soft box description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftBox {
    /// Offset from the centre to each corner body
    pub half_extents: Vec2,
    /// Shape of the centre and of every corner
    pub node: ShapeDesc,
    /// Spring of every link
    pub params: JointParams,
}

impl Default for SoftBox {
    fn default() -> Self {
        Self {
            half_extents: Vec2::new(5.0, 5.0),
            node: ShapeDesc::cuboid(0.5, 0.5).with_material(Material::default().with_density(5.0)),
            params: JointParams::from_frequency(4.0, 0.5),
        }
    }
}

impl SoftBox {
    /// Soft box with corners `half_width` and `half_height` away from the centre
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_extents: Vec2::new(half_width, half_height),
            ..Self::default()
        }
    }

    /// Set the shape used for every body
    pub fn with_node(mut self, node: ShapeDesc) -> Self {
        self.node = node;
        self
    }

    /// Set the spring of every link
    pub fn with_params(mut self, params: JointParams) -> Self {
        self.params = params;
        self
    }

    /// Lay out the bodies and links as a web
    ///
    /// Shape 0 is the centre, shapes 1 to 4 follow [`CORNERS`]. Links 0 to 3
    /// are the spokes from the centre, links 4 to 7 the ring.
    pub fn build(&self) -> Result<Web, ConstructError> {
        let (half_width, half_height) = (self.half_extents.x, self.half_extents.y);
        if !(half_width.is_finite() && half_height.is_finite() && half_width > 0.0 && half_height > 0.0) {
            return Err(ConstructError::InvalidShape(format!(
                "soft box half extents must be positive, got {:?}",
                self.half_extents
            )));
        }

        let mut builder = Web::builder().with_shape(self.node.clone(), Pose2::identity());
        for (x, y) in CORNERS {
            builder = builder.with_shape(self.node.clone(), Pose2::from_translation(x * half_width, y * half_height));
        }

        for corner in 1..=CORNERS.len() {
            builder = builder.with_joint(WebJoint::new(0, corner).with_params(self.params));
        }
        for corner in 1..=CORNERS.len() {
            let next = corner % CORNERS.len() + 1;
            builder = builder.with_joint(WebJoint::new(corner, next).with_params(self.params));
        }

        builder.with_anchor(0).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let web = SoftBox::default().build().unwrap();

        assert_eq!(web.shapes().len(), 5);
        assert_eq!(web.joints().len(), 8);
        assert_eq!(web.anchor(), 0);
        assert_eq!(web.shapes()[1].placement, Pose2::from_translation(-5.0, -5.0));
        assert_eq!(web.shapes()[3].placement, Pose2::from_translation(5.0, 5.0));
    }

    #[test]
    fn test_spokes_and_ring() {
        let web = SoftBox::new(3.0, 4.0).build().unwrap();

        for spoke in 0..4 {
            assert_eq!(web.joints()[spoke].a, 0);
            assert!((web.rest_length(spoke).unwrap() - 5.0).abs() < 1e-5);
        }

        // Ring closes back on the first corner
        assert_eq!((web.joints()[7].a, web.joints()[7].b), (4, 1));
        assert!((web.rest_length(4).unwrap() - 8.0).abs() < 1e-5);
        assert!((web.rest_length(5).unwrap() - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_flat_box_is_rejected() {
        assert!(matches!(SoftBox::new(0.0, 2.0).build(), Err(ConstructError::InvalidShape(_))));
        assert!(matches!(SoftBox::new(2.0, f32::NAN).build(), Err(ConstructError::InvalidShape(_))));
    }

    #[test]
    fn test_params_reach_every_link() {
        let params = JointParams::new(90.0, 3.0);
        let web = SoftBox::default().with_params(params).build().unwrap();

        assert!(web.joints().iter().all(|joint| joint.params == params));
    }
}
