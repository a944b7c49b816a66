//! Constructs: the physical shape data of an entity
//!
//! A construct is pure description. The session turns it into bodies and
//! joints at spawn; afterwards only web joint params may be retuned, through
//! the owning entity.

pub mod shape;
pub mod soft_box;
pub mod web;

pub use shape::{Geometry, Material, ShapeDesc};
pub use soft_box::SoftBox;
pub use web::{JointParams, Web, WebBuilder, WebJoint, WebShape, MIN_JOINT_LENGTH};

use thiserror::Error;

use crate::foundation::math::Pose2;
use crate::physics::BodyKind;

/// Errors raised while validating a construct
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructError {
    /// A construct needs at least one shape
    #[error("Construct has no shapes")]
    Empty,

    /// Geometry, material or placement is unusable
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// A joint references a shape that does not exist
    #[error("Joint {joint} references shape {index}, but the web has {count} shapes")]
    JointIndex {
        /// Joint position in the web
        joint: usize,
        /// Offending shape index
        index: usize,
        /// Number of shapes in the web
        count: usize,
    },

    /// A joint connects a shape to itself
    #[error("Joint {joint} connects shape {index} to itself")]
    SelfJoint {
        /// Joint position in the web
        joint: usize,
        /// Shape index used on both ends
        index: usize,
    },

    /// The anchor shape does not exist
    #[error("Anchor shape {index} is out of range for {count} shapes")]
    AnchorIndex {
        /// Requested anchor
        index: usize,
        /// Number of shapes in the web
        count: usize,
    },

    /// Negative or non-finite joint spring
    #[error("Invalid joint params {0:?}")]
    InvalidJointParams(JointParams),

    /// A joint's anchors sit on top of each other
    #[error("Joint {joint} spans only {length}, too short for a spring")]
    DegenerateJoint {
        /// Joint position in the web
        joint: usize,
        /// Distance between its anchors at the shape placements
        length: f32,
    },
}

/// One shape attached to a single body
#[derive(Debug, Clone, PartialEq)]
pub struct SingleShape {
    shape: ShapeDesc,
    kind: BodyKind,
}

impl SingleShape {
    /// Validate a shape into a construct
    pub fn new(shape: ShapeDesc, kind: BodyKind) -> Result<Self, ConstructError> {
        shape.validate()?;
        Ok(Self { shape, kind })
    }

    /// The shape
    pub fn shape(&self) -> &ShapeDesc {
        &self.shape
    }

    /// Body kind
    pub fn kind(&self) -> BodyKind {
        self.kind
    }
}

/// Shape data of an entity
#[derive(Debug, Clone, PartialEq)]
pub enum Construct {
    /// One convex shape on one body
    Single(SingleShape),
    /// Linked shapes, one body each
    Web(Web),
}

impl Construct {
    /// Dynamic single shape construct
    pub fn dynamic(shape: ShapeDesc) -> Result<Self, ConstructError> {
        SingleShape::new(shape, BodyKind::Dynamic).map(Construct::Single)
    }

    /// Fixed single shape construct, for ground and walls
    pub fn fixed(shape: ShapeDesc) -> Result<Self, ConstructError> {
        SingleShape::new(shape, BodyKind::Fixed).map(Construct::Single)
    }

    /// Shapes with their body placement relative to the spawn pose
    pub fn shapes(&self) -> Vec<(&ShapeDesc, Pose2)> {
        match self {
            Construct::Single(single) => vec![(&single.shape, Pose2::identity())],
            Construct::Web(web) => web
                .shapes()
                .iter()
                .map(|web_shape| (&web_shape.shape, web_shape.placement))
                .collect(),
        }
    }

    /// Joints between shapes (always empty for single shapes)
    pub fn joints(&self) -> &[WebJoint] {
        match self {
            Construct::Single(_) => &[],
            Construct::Web(web) => web.joints(),
        }
    }

    /// Index of the shape whose body drives locomotion
    pub fn anchor(&self) -> usize {
        match self {
            Construct::Single(_) => 0,
            Construct::Web(web) => web.anchor(),
        }
    }

    /// Body kind of every shape
    pub fn kind(&self) -> BodyKind {
        match self {
            Construct::Single(single) => single.kind(),
            Construct::Web(web) => web.kind(),
        }
    }

    /// Number of shapes
    pub fn shape_count(&self) -> usize {
        match self {
            Construct::Single(_) => 1,
            Construct::Web(web) => web.shapes().len(),
        }
    }
}

impl From<SingleShape> for Construct {
    fn from(single: SingleShape) -> Self {
        Construct::Single(single)
    }
}

impl From<Web> for Construct {
    fn from(web: Web) -> Self {
        Construct::Web(web)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_shape_construct() {
        let construct = Construct::dynamic(ShapeDesc::cuboid(1.5, 1.5)).unwrap();

        assert_eq!(construct.shape_count(), 1);
        assert_eq!(construct.anchor(), 0);
        assert!(construct.joints().is_empty());
        assert_eq!(construct.shapes()[0].1, Pose2::identity());
    }

    #[test]
    fn test_single_shape_rejects_bad_shape() {
        assert!(Construct::fixed(ShapeDesc::cuboid(-1.0, 1.0)).is_err());
    }

    #[test]
    fn test_web_construct_exposes_placements() {
        let web = Web::builder()
            .with_shape(ShapeDesc::ball(0.5), Pose2::identity())
            .with_shape(ShapeDesc::ball(0.5), Pose2::from_translation(0.0, 2.0))
            .with_joint(WebJoint::new(0, 1))
            .with_anchor(1)
            .build()
            .unwrap();
        let construct = Construct::from(web);

        assert_eq!(construct.shape_count(), 2);
        assert_eq!(construct.anchor(), 1);
        assert_eq!(construct.joints().len(), 1);
        assert_eq!(construct.shapes()[1].1, Pose2::from_translation(0.0, 2.0));
    }
}
