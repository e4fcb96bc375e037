//! Intro overlay. Borrows a planet's live display objects, flies them to a
//! focal point above a typed-out narrative, then hands every object back
//! exactly as it was found.
//!
//! Flow: `show` → Entering (value tween, objects follow each tick) →
//! Typing → Waiting → `hide` → Leaving (tween back) → restore → Dismissed.
//! Borrow records are consumed once, on the Leaving completion.

use glam::Vec2;
use starhop_engine::{
    Color, Easing, EngineContext, Node, NodeId, NodeSnapshot, Signal, SignalEvent, TextLabel, Tween, TweenId,
};
use crate::container::Container;

pub const OVERLAY_DEPTH: f32 = 100.0;
/// Flight time to and from the focal point.
pub const MOVE_MS: f32 = 600.0;
pub const TYPE_MS_PER_CHAR: f32 = 30.0;
/// Focal point as a fraction of the viewport.
pub const FOCAL_X: f32 = 0.5;
pub const FOCAL_Y: f32 = 0.38;
pub const TEXT_Y: f32 = 0.68;
pub const FONT_SIZE: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Hidden,
    Entering(Signal),
    Typing { shown: usize, elapsed: f32 },
    Waiting,
    Leaving(Signal),
}

/// How to put one borrowed node back.
#[derive(Debug, Clone, Copy)]
struct BorrowRecord {
    node: NodeId,
    snapshot: NodeSnapshot,
    /// Position relative to the planet centre while borrowed.
    offset: Vec2,
    /// Effect nodes place themselves from the planet body each frame.
    from_effect: bool,
}

#[derive(Debug)]
struct Borrow {
    planet_id: String,
    records: Vec<BorrowRecord>,
    effect_depths: Vec<f32>,
    /// Screen-space planet centre when the borrow started.
    start: Vec2,
    /// Layer-space planet position when the borrow started.
    origin: Vec2,
    /// Layout position when the borrow started; a different one on the way
    /// back means the container was relaid out meanwhile.
    layout: Vec2,
    current: Vec2,
    tween: Option<TweenId>,
}

impl Borrow {
    /// Layer-space position the planet returns to.
    fn home(&self, container: &Container) -> Vec2 {
        match container.get_by_id(&self.planet_id).map(|p| container.layout_position(p)) {
            Some(layout) if layout != self.layout => layout,
            _ => self.origin,
        }
    }
}

/// Reported when the overlay has handed the planet back.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayOutcome {
    Dismissed { planet_id: String },
}

pub struct IntroOverlay {
    root: Option<NodeId>,
    label: Option<NodeId>,
    phase: Phase,
    borrow: Option<Borrow>,
    text: Vec<char>,
}

impl IntroOverlay {
    pub fn new() -> Self {
        Self { root: None, label: None, phase: Phase::Hidden, borrow: None, text: Vec::new() }
    }

    /// Whether the overlay currently holds a planet.
    pub fn is_visible(&self) -> bool {
        self.borrow.is_some()
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.phase, Phase::Typing { .. })
    }

    /// Text typed so far.
    pub fn visible_text(&self) -> String {
        match self.phase {
            Phase::Typing { shown, .. } => self.text[..shown].iter().collect(),
            Phase::Waiting => self.text.iter().collect(),
            _ => String::new(),
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Whether `signal` belongs to the flight in progress.
    pub fn owns(&self, signal: Signal) -> bool {
        matches!(self.phase, Phase::Entering(s) | Phase::Leaving(s) if s == signal)
    }

    fn ensure_root(&mut self, ctx: &mut EngineContext) -> (NodeId, NodeId) {
        // The root stays at the stage origin, so root space is screen space.
        let root = match self.root.filter(|&id| ctx.stage.contains(id)) {
            Some(id) => id,
            None => ctx.add(Node::container().with_tag("intro-overlay").with_depth(OVERLAY_DEPTH)),
        };
        let label = match self.label.filter(|&id| ctx.stage.contains(id)) {
            Some(id) => id,
            None => {
                let wrap = ctx.viewport.x * 0.8;
                ctx.add_to(
                    root,
                    Node::text(TextLabel::new("", FONT_SIZE).with_color(Color::WHITE).with_wrap(wrap))
                        .with_tag("intro-overlay:text")
                        .with_depth(10.0),
                )
            }
        };
        self.root = Some(root);
        self.label = Some(label);
        (root, label)
    }

    /// Borrow the planet's visuals and start the intro. Returns false if a
    /// borrow is already active or the planet is unknown.
    pub fn show(&mut self, ctx: &mut EngineContext, container: &mut Container, planet_id: &str, text: &str) -> bool {
        if self.borrow.is_some() {
            log::warn!("overlay: already showing, ignoring intro for {}", planet_id);
            return false;
        }
        let layer = container.layer();
        let Some(layout) = container.get_by_id(planet_id).map(|p| container.layout_position(p)) else {
            return false;
        };
        let Some(planet) = container.get_by_id_mut(planet_id) else { return false };
        let (root, label) = self.ensure_root(ctx);
        ctx.stage.set_visible(root, true);

        let origin = planet.body.pos;
        let start = ctx.stage.local_to_world(layer, origin);
        let mut records = Vec::new();
        let own = planet.own_nodes().into_iter().map(|id| (id, false));
        let effect_nodes: Vec<(NodeId, bool)> =
            planet.effects.iter().flat_map(|e| e.visual_elements()).map(|id| (id, true)).collect();
        for (node, from_effect) in own.chain(effect_nodes) {
            let (Some(snapshot), Some(world)) = (ctx.stage.snapshot(node), ctx.stage.world_position(node)) else {
                continue;
            };
            if !ctx.stage.set_parent(node, Some(root)) {
                continue;
            }
            ctx.stage.set_position(node, world);
            ctx.stage.set_visible(node, true);
            ctx.stage.set_alpha(node, 1.0);
            records.push(BorrowRecord { node, snapshot, offset: world - start, from_effect });
        }

        let mut effect_depths = Vec::with_capacity(planet.effects.len());
        for effect in &mut planet.effects {
            effect_depths.push(effect.depth());
            effect.set_depth(ctx, 0.0);
        }
        planet.body.hijacked = true;
        planet.body.pos = start;

        let focal = Vec2::new(ctx.viewport.x * FOCAL_X, ctx.viewport.y * FOCAL_Y);
        let signal = ctx.next_signal();
        let tween = ctx.tweens.add_free(
            Tween::value(start, focal, MOVE_MS, Easing::CubicOut).with_signal(signal).with_updates(),
        );

        ctx.stage.set_position(label, Vec2::new(ctx.viewport.x * 0.5, ctx.viewport.y * TEXT_Y));
        if let Some(l) = ctx.stage.text_mut(label) {
            l.text.clear();
        }
        self.text = text.chars().collect();
        self.phase = Phase::Entering(signal);
        log::debug!("overlay: borrowed {} objects of {}", records.len(), planet_id);
        self.borrow = Some(Borrow {
            planet_id: planet_id.to_owned(),
            records,
            effect_depths,
            start,
            origin,
            layout,
            current: start,
            tween: Some(tween),
        });
        true
    }

    /// Route a tween event. Returns `Dismissed` once the planet is handed back.
    pub fn handle_signal(
        &mut self,
        ctx: &mut EngineContext,
        container: &mut Container,
        event: &SignalEvent,
    ) -> Option<OverlayOutcome> {
        if !self.owns(event.signal()) {
            return None;
        }
        match *event {
            SignalEvent::Progress { value, .. } => {
                self.move_borrowed(ctx, container, value);
                None
            }
            SignalEvent::Fired(_) => match self.phase {
                Phase::Entering(_) => {
                    if let Some(b) = &mut self.borrow {
                        b.tween = None;
                    }
                    self.phase = Phase::Typing { shown: 0, elapsed: 0.0 };
                    None
                }
                Phase::Leaving(_) => self.restore(ctx, container),
                _ => None,
            },
        }
    }

    fn move_borrowed(&mut self, ctx: &mut EngineContext, container: &mut Container, value: Vec2) {
        let Some(borrow) = &mut self.borrow else { return };
        borrow.current = value;
        if let Some(planet) = container.get_by_id_mut(&borrow.planet_id) {
            planet.body.pos = value;
        }
        for record in borrow.records.iter().filter(|r| !r.from_effect) {
            ctx.stage.set_position(record.node, value + record.offset);
        }
    }

    /// Typewriter step. `delta` in milliseconds.
    pub fn update(&mut self, ctx: &mut EngineContext, delta: f32) {
        let Phase::Typing { shown, elapsed } = self.phase else { return };
        let elapsed = elapsed + delta;
        let target = ((elapsed / TYPE_MS_PER_CHAR) as usize).min(self.text.len());
        if target != shown {
            self.set_label(ctx, target);
        }
        self.phase = if target == self.text.len() { Phase::Waiting } else { Phase::Typing { shown: target, elapsed } };
    }

    fn set_label(&self, ctx: &mut EngineContext, chars: usize) {
        if let Some(l) = self.label.and_then(|id| ctx.stage.text_mut(id)) {
            l.text = self.text[..chars].iter().collect();
        }
    }

    /// Space or tap: finish the typing, or leave once it is finished.
    /// Returns whether the overlay took the input.
    pub fn advance(&mut self, ctx: &mut EngineContext, container: &Container) -> bool {
        match self.phase {
            Phase::Typing { .. } => {
                self.set_label(ctx, self.text.len());
                self.phase = Phase::Waiting;
                true
            }
            Phase::Waiting => self.hide(ctx, container),
            Phase::Entering(_) | Phase::Leaving(_) => self.borrow.is_some(),
            Phase::Hidden => false,
        }
    }

    /// Fly the planet back to where it was borrowed from, or to its new
    /// layout slot if the container was relaid out meanwhile. No-op without a borrow
    /// or while already leaving.
    pub fn hide(&mut self, ctx: &mut EngineContext, container: &Container) -> bool {
        if matches!(self.phase, Phase::Leaving(_)) {
            return false;
        }
        let Some(borrow) = &mut self.borrow else { return false };
        if let Some(id) = borrow.tween.take() {
            ctx.tweens.remove(id);
        }
        let home = ctx.stage.local_to_world(container.layer(), borrow.home(container));

        let signal = ctx.next_signal();
        borrow.tween = Some(ctx.tweens.add_free(
            Tween::value(borrow.current, home, MOVE_MS, Easing::CubicInOut).with_signal(signal).with_updates(),
        ));
        if let Some(l) = self.label.and_then(|id| ctx.stage.text_mut(id)) {
            l.text.clear();
        }
        self.phase = Phase::Leaving(signal);
        true
    }

    /// Put every borrowed object back and release the planet.
    fn restore(&mut self, ctx: &mut EngineContext, container: &mut Container) -> Option<OverlayOutcome> {
        let borrow = self.borrow.take()?;
        let home = borrow.home(container);
        if let Some(planet) = container.get_by_id_mut(&borrow.planet_id) {
            planet.body.pos = home;
            for (effect, &depth) in planet.effects.iter_mut().zip(&borrow.effect_depths) {
                effect.set_depth(ctx, depth);
            }
            planet.body.hijacked = false;
        }
        for record in &borrow.records {
            ctx.stage.restore(record.node, &record.snapshot);
        }
        if let Some(root) = self.root {
            ctx.stage.set_visible(root, false);
        }
        self.phase = Phase::Hidden;
        self.text.clear();
        log::debug!("overlay: returned {} objects to {}", borrow.records.len(), borrow.planet_id);
        Some(OverlayOutcome::Dismissed { planet_id: borrow.planet_id })
    }

    pub fn destroy(&mut self, ctx: &mut EngineContext) {
        if let Some(root) = self.root.take() {
            ctx.destroy(root);
        }
        self.label = None;
        self.borrow = None;
        self.phase = Phase::Hidden;
    }
}

impl Default for IntroOverlay {
    fn default() -> Self {
        Self::new()
    }
}
