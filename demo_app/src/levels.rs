//! Demo levels
//!
//! A level fills a fresh session and returns the entity the player drives.

use kinetic_engine::prelude::*;
use kinetic_engine::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Something that can populate a session
pub trait Level {
    /// Name used on the command line
    fn name(&self) -> &'static str;

    /// Spawn everything and return the player's entity
    fn load(&self, session: &mut GameSession) -> Result<EntityHandle>;
}

/// Look a level up by its command line name
pub fn by_name(name: &str) -> Option<Box<dyn Level>> {
    match name {
        "hardbox" => Some(Box::new(HardBoxLevel::default())),
        "web" => Some(Box::new(WebLevel::default())),
        "softbox" => Some(Box::new(SoftBoxLevel::default())),
        _ => None,
    }
}

fn ground(session: &mut GameSession) -> Result<EntityHandle> {
    let slab = ShapeDesc::cuboid(50.0, 10.0).with_material(Material::default().with_friction(0.8));
    session.spawn_prop("ground", Construct::fixed(slab)?, Pose2::from_translation(0.0, -10.0))
}

/// A box character on a ground slab with crates raining down
pub struct HardBoxLevel {
    /// Number of falling crates
    pub crates: usize,
    /// Seed for crate placement
    pub seed: u64,
}

impl Default for HardBoxLevel {
    fn default() -> Self {
        Self { crates: 50, seed: 7 }
    }
}

impl Level for HardBoxLevel {
    fn name(&self) -> &'static str {
        "hardbox"
    }

    fn load(&self, session: &mut GameSession) -> Result<EntityHandle> {
        ground(session)?;

        let hero_shape = ShapeDesc::cuboid(1.5, 1.5).with_material(Material::default().with_friction(5.0));
        let hero = session.spawn("hero", Construct::dynamic(hero_shape)?, Pose2::from_translation(5.0, 5.0))?;
        session.set_render_color(hero, Color::rgb(0.2, 0.6, 1.0))?;

        // A second box walks back and forth on its own
        let drone = session.spawn(
            "drone",
            Construct::dynamic(ShapeDesc::cuboid(1.0, 1.0))?,
            Pose2::from_translation(-10.0, 3.0),
        )?;
        let right = CommandSet::new().with(Action::MoveHorizontal, Command::Axis(1.0));
        let left = CommandSet::new().with(Action::MoveHorizontal, Command::Axis(-1.0));
        let hop = CommandSet::new().with(Action::Jump, Command::Button(true));
        session.add_command_source(
            ScriptedCommands::new(drone)
                .hold(90, right)
                .hold(1, hop)
                .hold(90, left)
                .hold(30, CommandSet::new())
                .looping(true),
        )?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        for index in 0..self.crates {
            let half = rng.gen_range(0.3..1.0);
            let pose = Pose2::new(
                Vec2::new(rng.gen_range(-40.0..40.0), rng.gen_range(10.0..60.0)),
                rng.gen_range(0.0..std::f32::consts::PI),
            );
            session.spawn_prop(&format!("crate-{index}"), Construct::dynamic(ShapeDesc::cuboid(half, half))?, pose)?;
        }

        Ok(hero)
    }
}

/// A chain of four boxes linked face to face by loose springs
pub struct WebLevel {
    /// Spring of every joint at load
    pub joint: JointParams,
}

impl Default for WebLevel {
    fn default() -> Self {
        Self {
            joint: JointParams::from_frequency(1.0, 0.3),
        }
    }
}

impl Level for WebLevel {
    fn name(&self) -> &'static str {
        "web"
    }

    fn load(&self, session: &mut GameSession) -> Result<EntityHandle> {
        ground(session)?;

        let link = ShapeDesc::cuboid(0.5, 0.5);
        let mut builder = Web::builder();
        for index in 0..4u8 {
            builder = builder.with_shape(link.clone(), Pose2::from_translation(f32::from(index) * 1.5, 0.0));
        }
        for index in 0..3 {
            builder = builder.with_joint(
                WebJoint::new(index, index + 1)
                    .with_anchors(Point2::new(0.5, 0.0), Point2::new(-0.5, 0.0))
                    .with_params(self.joint),
            );
        }
        let web = builder.with_anchor(1).build()?;

        session.spawn("caterpillar", Construct::Web(web), Pose2::from_translation(-2.0, 4.0))
    }
}

/// A soft box the player pushes into a heavy block
#[derive(Default)]
pub struct SoftBoxLevel {
    /// Layout of the player's box
    pub soft_box: SoftBox,
}

impl Level for SoftBoxLevel {
    fn name(&self) -> &'static str {
        "softbox"
    }

    fn load(&self, session: &mut GameSession) -> Result<EntityHandle> {
        ground(session)?;

        let block = ShapeDesc::cuboid(3.0, 3.0).with_material(Material::default().with_friction(3.0));
        let block = session.spawn_prop("block", Construct::dynamic(block)?, Pose2::from_translation(5.0, 5.0))?;
        session.set_render_color(block, Color::rgb(0.8, 0.3, 0.2))?;

        // Bottom corners start just above the slab
        let player = session.spawn(
            "softbox",
            Construct::Web(self.soft_box.build()?),
            Pose2::from_translation(-10.0, 6.0),
        )?;
        session.set_render_color(player, Color::rgb(0.3, 0.9, 0.4))?;
        Ok(player)
    }
}
