//! Physics module
//!
//! Thin boundary around the rigid-body library. The simulation core only
//! creates and destroys bodies, pushes impulses and forces, steps the world
//! and asks ray queries; everything else stays inside [`PhysicsWorld`].

pub mod ray;
pub mod world;

pub use ray::{RayCastControl, RayHit};
pub use world::{BodyHandle, BodyKind, FixtureHandle, JointHandle, PhysicsError, PhysicsWorld};
