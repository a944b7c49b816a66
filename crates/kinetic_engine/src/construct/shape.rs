//! Shape descriptors
//!
//! A [`ShapeDesc`] is everything the physics world needs to build one collider:
//! geometry, placement on its body and surface material.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Point2, Pose2, Vec2};
use super::ConstructError;

/// Smallest polygon area accepted before a shape counts as degenerate
const MIN_POLYGON_AREA: f32 = 1e-6;

/// Surface and mass properties of a shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Mass per unit area
    pub density: f32,
    /// Coulomb friction coefficient
    pub friction: f32,
    /// Bounciness in `[0, 1]`
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.5,
            restitution: 0.0,
        }
    }
}

impl Material {
    /// Set density
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Set friction
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Set restitution
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    fn validate(&self) -> Result<(), String> {
        if !self.density.is_finite() || self.density < 0.0 {
            return Err(format!("density must be non-negative, got {}", self.density));
        }
        if !self.friction.is_finite() || self.friction < 0.0 {
            return Err(format!("friction must be non-negative, got {}", self.friction));
        }
        if !self.restitution.is_finite() || !(0.0..=1.0).contains(&self.restitution) {
            return Err(format!("restitution must be in [0, 1], got {}", self.restitution));
        }
        Ok(())
    }
}

/// Convex geometry of a single shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Axis aligned box given by its half extents
    Cuboid {
        /// Half width and half height
        half_extents: Vec2,
    },
    /// Circle
    Ball {
        /// Radius
        radius: f32,
    },
    /// Convex polygon; the hull of the given points is used
    ConvexPolygon {
        /// Polygon vertices in shape space
        points: Vec<Point2>,
    },
}

impl Geometry {
    fn validate(&self) -> Result<(), String> {
        match self {
            Geometry::Cuboid { half_extents } => {
                if !(half_extents.x.is_finite() && half_extents.y.is_finite())
                    || half_extents.x <= 0.0
                    || half_extents.y <= 0.0
                {
                    return Err(format!("box half extents must be positive, got {half_extents:?}"));
                }
            }
            Geometry::Ball { radius } => {
                if !radius.is_finite() || *radius <= 0.0 {
                    return Err(format!("ball radius must be positive, got {radius}"));
                }
            }
            Geometry::ConvexPolygon { points } => {
                if points.len() < 3 {
                    return Err(format!("polygon needs at least 3 points, got {}", points.len()));
                }
                if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
                    return Err("polygon has non-finite points".to_string());
                }
                if polygon_area(points).abs() < MIN_POLYGON_AREA {
                    return Err("polygon has no area".to_string());
                }
            }
        }
        Ok(())
    }
}

/// Shoelace area, signed by winding
fn polygon_area(points: &[Point2]) -> f32 {
    let twice_area: f32 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice_area * 0.5
}

/// One collider: geometry, local placement on its body, and material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDesc {
    /// Geometry of the shape
    pub geometry: Geometry,
    /// Placement of the shape relative to its body
    #[serde(default)]
    pub offset: Pose2,
    /// Surface material
    #[serde(default)]
    pub material: Material,
}

impl Default for ShapeDesc {
    fn default() -> Self {
        Self::cuboid(0.5, 0.5)
    }
}

impl ShapeDesc {
    /// Box with the given half extents
    pub fn cuboid(half_width: f32, half_height: f32) -> Self {
        Self {
            geometry: Geometry::Cuboid {
                half_extents: Vec2::new(half_width, half_height),
            },
            offset: Pose2::identity(),
            material: Material::default(),
        }
    }

    /// Circle with the given radius
    pub fn ball(radius: f32) -> Self {
        Self {
            geometry: Geometry::Ball { radius },
            offset: Pose2::identity(),
            material: Material::default(),
        }
    }

    /// Convex polygon, rejected if it has fewer than 3 points or no area
    pub fn polygon(points: Vec<Point2>) -> Result<Self, ConstructError> {
        let shape = Self {
            geometry: Geometry::ConvexPolygon { points },
            offset: Pose2::identity(),
            material: Material::default(),
        };
        shape.validate()?;
        Ok(shape)
    }

    /// Set the placement relative to the body
    pub fn with_offset(mut self, offset: Pose2) -> Self {
        self.offset = offset;
        self
    }

    /// Set the material
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Check geometry, offset and material
    pub fn validate(&self) -> Result<(), ConstructError> {
        self.geometry
            .validate()
            .and_then(|()| self.material.validate())
            .and_then(|()| {
                if self.offset.is_finite() {
                    Ok(())
                } else {
                    Err("shape offset is not finite".to_string())
                }
            })
            .map_err(ConstructError::InvalidShape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_valid_shapes() {
        assert!(ShapeDesc::cuboid(1.0, 2.0).validate().is_ok());
        assert!(ShapeDesc::ball(0.25).validate().is_ok());

        let triangle = ShapeDesc::polygon(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ]);
        assert!(triangle.is_ok());
    }

    #[test]
    fn test_degenerate_geometry_is_rejected() {
        assert!(ShapeDesc::cuboid(0.0, 1.0).validate().is_err());
        assert!(ShapeDesc::cuboid(1.0, f32::NAN).validate().is_err());
        assert!(ShapeDesc::ball(-1.0).validate().is_err());

        let collinear = ShapeDesc::polygon(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ]);
        assert!(matches!(collinear, Err(ConstructError::InvalidShape(_))));

        let too_few = ShapeDesc::polygon(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]);
        assert!(too_few.is_err());
    }

    #[test]
    fn test_bad_material_is_rejected() {
        let shape = ShapeDesc::ball(1.0).with_material(Material::default().with_restitution(1.5));
        assert!(shape.validate().is_err());

        let shape = ShapeDesc::ball(1.0).with_material(Material::default().with_friction(-0.1));
        assert!(shape.validate().is_err());
    }

    #[test]
    fn test_polygon_area_winding() {
        let square = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert_relative_eq!(polygon_area(&square), 4.0);

        let mut reversed = square;
        reversed.reverse();
        assert_relative_eq!(polygon_area(&reversed), -4.0);
    }
}
