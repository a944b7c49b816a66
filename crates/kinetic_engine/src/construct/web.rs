//! Web constructs: several shapes held together by spring links

use serde::{Deserialize, Serialize};

use std::f32::consts::TAU;

use crate::foundation::math::{Point2, Pose2};
use crate::physics::BodyKind;
use super::{ConstructError, ShapeDesc};

/// Shortest distance a web joint may span between its anchors
pub const MIN_JOINT_LENGTH: f32 = 0.005;

/// Linear spring of a web joint
///
/// Both values are per unit of mass. These are the only construct values
/// that may change after spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointParams {
    /// Pull back towards the rest length per unit of stretch
    pub stiffness: f32,
    /// Resistance per unit of stretching speed
    pub damping: f32,
}

impl Default for JointParams {
    /// A 4 Hz spring at half critical damping
    fn default() -> Self {
        Self::from_frequency(4.0, 0.5)
    }
}

impl JointParams {
    /// Create joint params
    pub fn new(stiffness: f32, damping: f32) -> Self {
        Self { stiffness, damping }
    }

    /// Spring oscillating at `frequency` Hz with the given damping ratio
    ///
    /// A ratio of 1 is critically damped.
    pub fn from_frequency(frequency: f32, damping_ratio: f32) -> Self {
        let omega = TAU * frequency;
        Self {
            stiffness: omega * omega,
            damping: 2.0 * damping_ratio * omega,
        }
    }

    /// Check the params are finite and non-negative
    pub fn validate(&self) -> Result<(), ConstructError> {
        if !self.stiffness.is_finite() || self.stiffness < 0.0 || !self.damping.is_finite() || self.damping < 0.0 {
            return Err(ConstructError::InvalidJointParams(*self));
        }
        Ok(())
    }
}

/// A joint between two shapes of the same web
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WebJoint {
    /// Index of the first shape
    pub a: usize,
    /// Index of the second shape
    pub b: usize,
    /// Link end in the first shape's body space
    pub anchor_a: Point2,
    /// Link end in the second shape's body space
    pub anchor_b: Point2,
    /// Spring params
    pub params: JointParams,
}

impl WebJoint {
    /// Joint linking the body origins of shapes `a` and `b`
    ///
    /// The spring rests at whatever distance the two shapes are placed apart.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            a,
            b,
            anchor_a: Point2::origin(),
            anchor_b: Point2::origin(),
            params: JointParams::default(),
        }
    }

    /// Set the local link ends
    pub fn with_anchors(mut self, anchor_a: Point2, anchor_b: Point2) -> Self {
        self.anchor_a = anchor_a;
        self.anchor_b = anchor_b;
        self
    }

    /// Set the spring params
    pub fn with_params(mut self, params: JointParams) -> Self {
        self.params = params;
        self
    }
}

/// A shape of a web and where its body sits relative to the web origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebShape {
    /// The shape
    pub shape: ShapeDesc,
    /// Body placement relative to the spawn pose
    pub placement: Pose2,
}

/// Validated composite construct
///
/// Every shape becomes its own body. The anchor shape is the one locomotion
/// drives and ground probing starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct Web {
    shapes: Vec<WebShape>,
    joints: Vec<WebJoint>,
    anchor: usize,
    kind: BodyKind,
}

impl Web {
    /// Start building a web
    pub fn builder() -> WebBuilder {
        WebBuilder::default()
    }

    /// Shapes in insertion order
    pub fn shapes(&self) -> &[WebShape] {
        &self.shapes
    }

    /// Joints in insertion order
    pub fn joints(&self) -> &[WebJoint] {
        &self.joints
    }

    /// Index of the anchor shape
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// Body kind shared by every shape
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// Distance the joint's spring holds its anchors apart
    pub fn rest_length(&self, index: usize) -> Option<f32> {
        let joint = self.joints.get(index)?;
        Some(joint_span(&self.shapes, joint))
    }

    /// Replace the params of a joint; out of range indices are ignored
    pub(crate) fn set_joint_params(&mut self, index: usize, params: JointParams) {
        if let Some(joint) = self.joints.get_mut(index) {
            joint.params = params;
        }
    }
}

/// Builder for [`Web`]
#[derive(Debug, Clone, Default)]
pub struct WebBuilder {
    shapes: Vec<WebShape>,
    joints: Vec<WebJoint>,
    anchor: usize,
    kind: BodyKind,
}

impl WebBuilder {
    /// Add a shape whose body sits at `placement` relative to the web origin
    pub fn with_shape(mut self, shape: ShapeDesc, placement: Pose2) -> Self {
        self.shapes.push(WebShape { shape, placement });
        self
    }

    /// Add a joint
    pub fn with_joint(mut self, joint: WebJoint) -> Self {
        self.joints.push(joint);
        self
    }

    /// Pick the anchor shape (the first shape by default)
    pub fn with_anchor(mut self, index: usize) -> Self {
        self.anchor = index;
        self
    }

    /// Set the body kind
    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<Web, ConstructError> {
        if self.shapes.is_empty() {
            return Err(ConstructError::Empty);
        }

        for web_shape in &self.shapes {
            web_shape.shape.validate()?;
            if !web_shape.placement.is_finite() {
                return Err(ConstructError::InvalidShape(format!(
                    "placement is not finite: {:?}",
                    web_shape.placement
                )));
            }
        }

        let count = self.shapes.len();
        for (joint, web_joint) in self.joints.iter().enumerate() {
            for index in [web_joint.a, web_joint.b] {
                if index >= count {
                    return Err(ConstructError::JointIndex { joint, index, count });
                }
            }
            if web_joint.a == web_joint.b {
                return Err(ConstructError::SelfJoint { joint, index: web_joint.a });
            }
            web_joint.params.validate()?;

            let length = joint_span(&self.shapes, web_joint);
            if !length.is_finite() || length < MIN_JOINT_LENGTH {
                return Err(ConstructError::DegenerateJoint { joint, length });
            }
        }

        if self.anchor >= count {
            return Err(ConstructError::AnchorIndex { index: self.anchor, count });
        }

        Ok(Web {
            shapes: self.shapes,
            joints: self.joints,
            anchor: self.anchor,
            kind: self.kind,
        })
    }
}

/// Distance between a joint's anchors with every shape at its placement
fn joint_span(shapes: &[WebShape], joint: &WebJoint) -> f32 {
    let a = shapes[joint.a].placement.transform_point(&joint.anchor_a);
    let b = shapes[joint.b].placement.transform_point(&joint.anchor_b);
    (b - a).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_boxes() -> WebBuilder {
        Web::builder()
            .with_shape(ShapeDesc::cuboid(0.5, 0.5), Pose2::from_translation(0.0, 0.0))
            .with_shape(ShapeDesc::cuboid(0.5, 0.5), Pose2::from_translation(1.5, 0.0))
    }

    #[test]
    fn test_joint_between_existing_shapes() {
        let web = two_boxes().with_joint(WebJoint::new(0, 1)).build().unwrap();

        assert_eq!(web.shapes().len(), 2);
        assert_eq!(web.joints().len(), 1);
        assert_eq!(web.anchor(), 0);
        assert_eq!(web.kind(), BodyKind::Dynamic);
    }

    #[test]
    fn test_joint_index_out_of_range() {
        let result = two_boxes().with_joint(WebJoint::new(0, 2)).build();

        assert_eq!(
            result,
            Err(ConstructError::JointIndex { joint: 0, index: 2, count: 2 })
        );
    }

    #[test]
    fn test_joint_to_itself_is_rejected() {
        let result = two_boxes().with_joint(WebJoint::new(1, 1)).build();
        assert_eq!(result, Err(ConstructError::SelfJoint { joint: 0, index: 1 }));
    }

    #[test]
    fn test_anchor_and_params_validation() {
        assert_eq!(
            two_boxes().with_anchor(5).build(),
            Err(ConstructError::AnchorIndex { index: 5, count: 2 })
        );

        let bad = JointParams::new(-1.0, 0.0);
        assert_eq!(
            two_boxes().with_joint(WebJoint::new(0, 1).with_params(bad)).build(),
            Err(ConstructError::InvalidJointParams(bad))
        );

        assert_eq!(Web::builder().build(), Err(ConstructError::Empty));
    }

    #[test]
    fn test_rest_length_follows_placements() {
        let web = two_boxes()
            .with_joint(WebJoint::new(0, 1))
            .with_joint(WebJoint::new(0, 1).with_anchors(Point2::new(0.5, 0.0), Point2::new(-0.5, 0.0)))
            .build()
            .unwrap();

        assert_eq!(web.rest_length(0), Some(1.5));
        assert_eq!(web.rest_length(1), Some(0.5));
        assert_eq!(web.rest_length(2), None);
    }

    #[test]
    fn test_coincident_anchors_are_rejected() {
        let result = two_boxes()
            .with_joint(WebJoint::new(0, 1).with_anchors(Point2::new(0.75, 0.0), Point2::new(-0.75, 0.0)))
            .build();

        assert!(matches!(result, Err(ConstructError::DegenerateJoint { joint: 0, .. })));
    }

    #[test]
    fn test_params_from_frequency() {
        let params = JointParams::from_frequency(1.0, 1.0);

        assert!((params.stiffness - TAU * TAU).abs() < 1e-3);
        assert!((params.damping - 2.0 * TAU).abs() < 1e-4);
        assert_eq!(JointParams::default(), JointParams::from_frequency(4.0, 0.5));
    }

    #[test]
    fn test_invalid_shape_fails_build() {
        let result = two_boxes()
            .with_shape(ShapeDesc::ball(0.0), Pose2::identity())
            .build();
        assert!(matches!(result, Err(ConstructError::InvalidShape(_))));
    }
}
