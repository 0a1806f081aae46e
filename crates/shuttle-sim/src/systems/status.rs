//! Status effect timers.

use hecs::World;

use shuttle_core::components::StatusEffects;

/// Count down paralysis.
pub fn run(world: &mut World, dt: f32) {
    for (_entity, status) in world.query_mut::<&mut StatusEffects>() {
        if status.paralyzed_secs > 0.0 {
            status.paralyzed_secs = (status.paralyzed_secs - dt).max(0.0);
        }
    }
}
