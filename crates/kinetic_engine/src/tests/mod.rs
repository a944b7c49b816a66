//! End-to-end scenarios driving a full session


use crate::construct::{Construct, ShapeDesc};
use crate::core::SessionConfig;
use crate::entity::EntityHandle;
use crate::foundation::math::Pose2;
use crate::input::InputSource;
use crate::render::HeadlessSink;
use crate::GameSession;

/// Frame length used by every scenario
pub(crate) const DT: f32 = 1.0 / 60.0;

/// Session with a fixed ground slab whose top face is at `y = 0`
pub(crate) fn session_on_ground(config: SessionConfig, input: impl InputSource + 'static) -> (GameSession, EntityHandle) {
    crate::foundation::logging::try_init();

    let mut session = GameSession::new(config, input, HeadlessSink::new()).unwrap();
    let ground = session
        .spawn_prop(
            "ground",
            Construct::fixed(ShapeDesc::cuboid(50.0, 1.0)).unwrap(),
            Pose2::from_translation(0.0, -1.0),
        )
        .unwrap();
    (session, ground)
}
