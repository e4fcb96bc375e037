use std::f32::consts::TAU;
use serde::Deserialize;
use starhop_engine::{Easing, EngineContext, NodeId, Tween, TweenId, TweenLoop};
use crate::planet::PlanetBody;
use super::PlanetEffect;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    /// Milliseconds per full turn.
    pub period: f32,
    pub clockwise: bool,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self { period: 20_000.0, clockwise: true }
    }
}

/// Continuous rotation of the planet sprite. Surface effects without an
/// explicit axis read the sprite angle, so they tumble along with it.
pub struct Spin {
    tween: Option<TweenId>,
}

impl Spin {
    pub fn new(ctx: &mut EngineContext, body: &PlanetBody, config: &SpinConfig) -> Self {
        let tween = body.sprite.map(|sprite| {
            let from = ctx.stage.rotation(sprite).unwrap_or(0.0);
            let turn = if config.clockwise { TAU } else { -TAU };
            ctx.tween(
                sprite,
                Tween::rotation(from, from + turn, config.period.max(1.0), Easing::Linear).with_loop(TweenLoop::Loop),
            )
        });
        Self { tween }
    }
}

impl PlanetEffect for Spin {
    fn kind(&self) -> &'static str {
        "spin"
    }

    fn update(&mut self, _ctx: &mut EngineContext, _body: &PlanetBody, _time: f32, _delta: f32) {}

    fn set_visible(&mut self, ctx: &mut EngineContext, visible: bool) {
        if let Some(id) = self.tween {
            if visible {
                ctx.tweens.resume(id);
            } else {
                ctx.tweens.pause(id);
            }
        }
    }

    fn set_depth(&mut self, _ctx: &mut EngineContext, _depth: f32) {}

    fn depth(&self) -> f32 {
        0.0
    }

    fn visual_elements(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn destroy(&mut self, ctx: &mut EngineContext) {
        if let Some(id) = self.tween.take() {
            ctx.tweens.remove(id);
        }
    }
}
