use crate::core::node::NodeKind;
use crate::core::stage::Stage;
use crate::systems::rng::Rng;

/// Tick every particle emitter on the stage.
/// A free function to avoid borrow conflicts between the stage and the RNG.
/// Hidden emitters keep aging their particles but do not spawn new ones.
pub fn tick_emitters(stage: &mut Stage, rng: &mut Rng, dt_ms: f32) {
    for node in stage.iter_mut() {
        let visible = node.visible;
        if let NodeKind::Emitter(emitter) = &mut node.kind {
            let emitting = emitter.emitting;
            emitter.emitting = emitting && visible;
            emitter.tick(dt_ms, rng);
            emitter.emitting = emitting;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::emitter::EmitterConfig;
    use crate::core::node::Node;

    #[test]
    fn ticks_emitters_on_stage() {
        let mut stage = Stage::new();
        let mut rng = Rng::new(42);
        let id = stage.add(Node::emitter(EmitterConfig::new().with_frequency(10.0).with_quantity(2)));
        tick_emitters(&mut stage, &mut rng, 25.0);
        let count = stage.emitter_mut(id).map(|e| e.particles().len()).unwrap_or(0);
        assert_eq!(count, 4);
    }

    #[test]
    fn hidden_emitter_does_not_spawn() {
        let mut stage = Stage::new();
        let mut rng = Rng::new(42);
        let id = stage.add(Node::emitter(EmitterConfig::new().with_frequency(10.0)).with_visible(false));
        tick_emitters(&mut stage, &mut rng, 100.0);
        let e = stage.emitter_mut(id).unwrap();
        assert!(e.particles().is_empty());
        assert!(e.emitting);
    }
}
