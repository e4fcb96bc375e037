//! Ship travel between planets: lock gating, reveal on first arrival, intro
//! sequencing and the interaction panel.
//!
//! Each in-flight operation is a `NavState` holding the signal that ends it.
//! `handle_signal` matches completions against the current state, so a
//! signal from a replaced travel or cancelled timer is ignored.

use starhop_engine::{EngineContext, Signal, SignalEvent, TimerId};
use crate::container::Container;
use crate::interaction::InteractionPanel;
use crate::overlay::{IntroOverlay, OverlayOutcome};
use crate::progression::Progression;
use crate::ship::{anchor_for, ShipController};
use crate::visuals;

#[derive(Debug, Clone, PartialEq)]
pub enum NavState {
    Idle,
    /// Ship flying to `target`; `signal` fires on arrival.
    Traveling { target: String, signal: Signal },
    /// Parked with an intro scheduled after a delay.
    IntroPending { planet: String, signal: Signal },
    /// Intro overlay holds `planet`.
    Intro { planet: String },
}

pub struct PlanetNavigator {
    current_planet: Option<String>,
    controls_enabled: bool,
    state: NavState,
    pending_timer: Option<TimerId>,
    pub ship: ShipController,
    pub overlay: IntroOverlay,
    pub panel: InteractionPanel,
}

impl PlanetNavigator {
    pub fn new() -> Self {
        Self {
            current_planet: None,
            controls_enabled: true,
            state: NavState::Idle,
            pending_timer: None,
            ship: ShipController::new(),
            overlay: IntroOverlay::new(),
            panel: InteractionPanel::new(),
        }
    }

    pub fn current_planet(&self) -> Option<&str> {
        self.current_planet.as_deref()
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    /// Input is accepted only with controls on and no intro on screen.
    pub fn controls_active(&self) -> bool {
        self.controls_enabled && !self.overlay.is_visible()
    }

    pub fn is_planet_locked(&self, container: &Container, progression: &Progression, id: &str) -> bool {
        container
            .get_by_id(id)
            .is_some_and(|p| p.is_locked(progression.victories(&container.id)))
    }

    /// Click or tap on a planet.
    pub fn handle_planet_click(
        &mut self,
        ctx: &mut EngineContext,
        container: &mut Container,
        progression: &mut Progression,
        id: &str,
    ) {
        if !self.controls_active() || container.get_by_id(id).is_none() {
            return;
        }
        if self.is_planet_locked(container, progression, id) {
            log::debug!("navigator: {} is locked", id);
            return;
        }
        let parked_here = self.current_planet.as_deref() == Some(id) && self.state == NavState::Idle;
        if parked_here {
            self.show_interaction(ctx, container, id);
        } else {
            self.travel_to_planet(ctx, container, id);
        }
    }

    /// Fly to the planet's anchor. Replaces any travel in flight.
    pub fn travel_to_planet(&mut self, ctx: &mut EngineContext, container: &mut Container, id: &str) {
        let Some(planet) = container.get_by_id(id) else { return };
        let anchor = anchor_for(planet.pos());
        self.panel.hide(ctx);
        self.cancel_pending(ctx);

        let signal = ctx.next_signal();
        self.ship.rotate_and_move_to(ctx, anchor, signal);
        log::debug!("navigator: travelling to {}", id);
        self.state = NavState::Traveling { target: id.to_owned(), signal };
    }

    /// Ship reached `id`: reveal it if fogged, then the intro or the panel.
    pub fn arrive_at_planet(
        &mut self,
        ctx: &mut EngineContext,
        container: &mut Container,
        progression: &mut Progression,
        id: &str,
    ) {
        let Some(planet) = container.get_by_id(id) else { return };
        let hidden = planet.is_hidden();
        self.current_planet = Some(id.to_owned());
        self.state = NavState::Idle;
        log::debug!("navigator: arrived at {}", id);

        if hidden {
            self.reveal_planet(ctx, container, progression, id);
        }
        self.intro_or_panel(ctx, container, progression, id);
    }

    /// Lift the fog on `id` and persist the reveal. Returns false if the
    /// planet was already revealed or is unknown.
    pub fn reveal_planet(
        &mut self,
        ctx: &mut EngineContext,
        container: &mut Container,
        progression: &mut Progression,
        id: &str,
    ) -> bool {
        let container_id = container.id.clone();
        let layer = container.layer();
        let victories = progression.victories(&container_id);
        let Some(planet) = container.get_by_id_mut(id) else { return false };
        if !planet.body.hidden {
            return false;
        }
        planet.body.hidden = false;
        progression.reveal(&container_id, id);
        planet.destroy_emitter(ctx);
        if let Some(layer) = layer {
            visuals::refresh_planet(ctx, layer, planet, victories);
        }
        log::info!("navigator: revealed {}/{}", container_id, id);
        true
    }

    /// Show the intro if `id` has unseen intro text. Returns whether it did.
    pub fn check_and_show_intro(
        &mut self,
        ctx: &mut EngineContext,
        container: &mut Container,
        progression: &Progression,
        id: &str,
    ) -> bool {
        let Some(planet) = container.get_by_id(id) else { return false };
        if planet.intro.is_empty() || progression.is_intro_seen(&container.id, id) {
            return false;
        }
        let text = planet.intro.clone();
        if !self.overlay.show(ctx, container, id, &text) {
            return false;
        }
        self.panel.hide(ctx);
        self.state = NavState::Intro { planet: id.to_owned() };
        true
    }

    /// Park at `id` for scene start or a warp. With `instant` the ship jumps
    /// to the anchor; otherwise it travels. A pending intro waits
    /// `intro_delay` ms with controls off.
    pub fn move_to_planet(
        &mut self,
        ctx: &mut EngineContext,
        container: &mut Container,
        progression: &mut Progression,
        id: &str,
        instant: bool,
        intro_delay: f32,
    ) {
        let Some(planet) = container.get_by_id(id) else { return };
        let anchor = anchor_for(planet.pos());
        let needs_intro = !planet.intro.is_empty() && !progression.is_intro_seen(&container.id, id);
        if !instant {
            self.travel_to_planet(ctx, container, id);
            return;
        }

        self.cancel_pending(ctx);
        self.ship.place_at(ctx, anchor);
        self.current_planet = Some(id.to_owned());
        self.state = NavState::Idle;
        self.reveal_planet(ctx, container, progression, id);

        if needs_intro && intro_delay > 0.0 {
            self.controls_enabled = false;
            self.panel.hide(ctx);
            let signal = ctx.next_signal();
            self.pending_timer = Some(ctx.timers.delayed_call(intro_delay, signal));
            self.state = NavState::IntroPending { planet: id.to_owned(), signal };
        } else {
            self.intro_or_panel(ctx, container, progression, id);
        }
    }

    /// Keyboard travel toward `(dx, dy)`. Locked candidates block the move.
    pub fn navigate(
        &mut self,
        ctx: &mut EngineContext,
        container: &mut Container,
        progression: &Progression,
        dx: f32,
        dy: f32,
    ) {
        if !self.controls_active() {
            return;
        }
        let Some(from) = self.current_planet.as_deref() else { return };
        let Some(next) = container.find_nearest_neighbor(from, dx, dy).map(|p| p.id().to_owned()) else {
            return;
        };
        if self.is_planet_locked(container, progression, &next) {
            log::debug!("navigator: {} is locked", next);
            return;
        }
        self.travel_to_planet(ctx, container, &next);
    }

    /// Space or tap. Returns whether the intro overlay took it.
    pub fn advance(&mut self, ctx: &mut EngineContext, container: &Container) -> bool {
        self.overlay.advance(ctx, container)
    }

    /// Route a tween or timer event. Returns whether it belonged here.
    pub fn handle_signal(
        &mut self,
        ctx: &mut EngineContext,
        container: &mut Container,
        progression: &mut Progression,
        event: &SignalEvent,
    ) -> bool {
        let signal = event.signal();
        if self.overlay.owns(signal) {
            if let Some(OverlayOutcome::Dismissed { planet_id }) = self.overlay.handle_signal(ctx, container, event) {
                progression.mark_intro_seen(&container.id, &planet_id);
                self.state = NavState::Idle;
                self.show_interaction(ctx, container, &planet_id);
            }
            return true;
        }
        if !matches!(event, SignalEvent::Fired(_)) {
            return false;
        }

        match &self.state {
            NavState::Traveling { target, signal: s } if *s == signal => {
                let target = target.clone();
                self.arrive_at_planet(ctx, container, progression, &target);
                true
            }
            NavState::IntroPending { planet, signal: s } if *s == signal => {
                let planet = planet.clone();
                self.pending_timer = None;
                self.controls_enabled = true;
                self.state = NavState::Idle;
                self.intro_or_panel(ctx, container, progression, &planet);
                true
            }
            _ => false,
        }
    }

    /// Typewriter step, once per frame.
    pub fn update(&mut self, ctx: &mut EngineContext, delta: f32) {
        self.overlay.update(ctx, delta);
    }

    /// Re-park after a relayout. Travel in flight is re-aimed at the new position.
    pub fn repark(&mut self, ctx: &mut EngineContext, container: &mut Container) {
        if let NavState::Traveling { target, .. } = &self.state {
            let target = target.clone();
            self.travel_to_planet(ctx, container, &target);
            return;
        }
        if let Some(planet) = self.current_planet.as_deref().and_then(|id| container.get_by_id(id)) {
            self.ship.place_at(ctx, anchor_for(container.layout_position(planet)));
        }
    }

    /// Drop everything tied to the current container before a warp.
    pub fn reset(&mut self, ctx: &mut EngineContext) {
        self.cancel_pending(ctx);
        self.panel.hide(ctx);
        self.overlay.destroy(ctx);
        self.current_planet = None;
        self.controls_enabled = true;
        self.state = NavState::Idle;
    }

    fn intro_or_panel(&mut self, ctx: &mut EngineContext, container: &mut Container, progression: &Progression, id: &str) {
        if !self.check_and_show_intro(ctx, container, progression, id) {
            self.show_interaction(ctx, container, id);
        }
    }

    fn show_interaction(&mut self, ctx: &mut EngineContext, container: &Container, id: &str) {
        if let (Some(index), Some(planet)) = (container.index_of(id), container.get_by_id(id)) {
            self.panel.show(ctx, index, planet);
        }
    }

    fn cancel_pending(&mut self, ctx: &mut EngineContext) {
        if let Some(timer) = self.pending_timer.take() {
            ctx.timers.remove(timer);
            self.controls_enabled = true;
        }
    }
}

impl Default for PlanetNavigator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use crate::config::{ContainerConfig, PlanetConfig};

    struct World {
        ctx: EngineContext,
        container: Container,
        progression: Progression,
        nav: PlanetNavigator,
    }

    impl World {
        fn new(planets: Vec<PlanetConfig>) -> Self {
            let mut ctx = EngineContext::new();
            let mut progression = Progression::new();
            let config = ContainerConfig {
                id: "sol".into(),
                name: "Sol".into(),
                background: None,
                start_planet: Some("p0".into()),
                planets,
            };
            let mut container = Container::new(&config);
            container.init(&mut ctx, 800.0, 600.0, &mut progression);
            visuals::create_visuals(&mut ctx, &mut container, &progression);
            Self { ctx, container, progression, nav: PlanetNavigator::new() }
        }

        fn place(&mut self, id: &str, pos: Vec2) {
            self.container.get_by_id_mut(id).unwrap().body.pos = pos;
        }

        fn pump(&mut self, frames: usize) {
            for _ in 0..frames {
                self.ctx.advance(16.0);
                for event in self.ctx.drain_signals() {
                    self.nav.handle_signal(&mut self.ctx, &mut self.container, &mut self.progression, &event);
                }
                self.nav.update(&mut self.ctx, 16.0);
                let time = self.ctx.time();
                visuals::update(&mut self.ctx, &mut self.container, time, 16.0);
            }
        }

        fn ship(&self) -> Vec2 {
            self.nav.ship.position(&self.ctx).unwrap()
        }

        fn park(&mut self, id: &str) {
            self.nav.move_to_planet(&mut self.ctx, &mut self.container, &mut self.progression, id, true, 0.0);
        }
    }

    fn central(id: &str) -> PlanetConfig {
        PlanetConfig { central: true, ..PlanetConfig::new(id) }
    }

    #[test]
    fn locked_neighbor_blocks_navigation_until_victory() {
        let mut p1 = PlanetConfig::new("p1");
        p1.required_victories = 1;
        let mut w = World::new(vec![central("p0"), p1]);
        w.place("p1", Vec2::new(600.0, 300.0));
        w.park("p0");
        let parked = w.ship();

        w.nav.navigate(&mut w.ctx, &mut w.container, &w.progression, 1.0, 0.0);
        assert_eq!(w.nav.state(), &NavState::Idle);
        w.pump(10);
        assert_eq!(w.ship(), parked);

        w.progression.record_victory("sol");
        w.nav.navigate(&mut w.ctx, &mut w.container, &w.progression, 1.0, 0.0);
        assert!(matches!(w.nav.state(), NavState::Traveling { target, .. } if target == "p1"));
        w.pump(5);
        assert_ne!(w.ship(), parked);
    }

    #[test]
    fn arrival_reveals_then_intro_then_panel() {
        let mut p1 = PlanetConfig::new("p1");
        p1.intro = "Unknown signal.".into();
        let mut w = World::new(vec![central("p0"), p1]);
        w.place("p1", Vec2::new(600.0, 300.0));
        w.park("p0");
        assert_eq!(w.nav.panel.shown_count(), 1);
        let emitter = w.container.get_by_id("p1").unwrap().emitter.unwrap();

        w.nav.handle_planet_click(&mut w.ctx, &mut w.container, &mut w.progression, "p1");
        assert!(!w.nav.panel.is_open());
        w.pump(90);

        let p1 = w.container.get_by_id("p1").unwrap();
        assert!(!p1.is_hidden());
        assert!(p1.emitter.is_none());
        assert!(!w.ctx.stage.contains(emitter));
        assert!(w.progression.is_revealed("sol", "p1"));
        assert_eq!(w.nav.current_planet(), Some("p1"));
        assert!(w.nav.overlay.is_visible());
        assert_eq!(w.nav.state(), &NavState::Intro { planet: "p1".into() });
        assert_eq!(w.nav.panel.shown_count(), 1);

        // Tap twice: finish typing, then dismiss.
        w.nav.advance(&mut w.ctx, &w.container);
        w.nav.advance(&mut w.ctx, &w.container);
        w.pump(60);
        assert!(!w.nav.overlay.is_visible());
        assert_eq!(w.nav.panel.shown_count(), 2);
        assert_eq!(w.nav.panel.open_planet(), Some("p1"));
        assert!(w.progression.is_intro_seen("sol", "p1"));
        assert_eq!(w.nav.state(), &NavState::Idle);
    }

    #[test]
    fn hidden_planet_without_intro_opens_panel_once() {
        let mut w = World::new(vec![central("p0"), PlanetConfig::new("p1")]);
        w.place("p1", Vec2::new(600.0, 300.0));
        w.park("p0");
        assert_eq!(w.nav.panel.shown_count(), 1);

        w.nav.handle_planet_click(&mut w.ctx, &mut w.container, &mut w.progression, "p1");
        w.pump(90);

        assert!(w.progression.is_revealed("sol", "p1"));
        assert!(!w.nav.overlay.is_visible());
        assert!(w.nav.overlay.root().is_none());
        assert_eq!(w.nav.panel.shown_count(), 2);
        assert_eq!(w.nav.panel.open_planet(), Some("p1"));
        assert_eq!(w.nav.state(), &NavState::Idle);

        w.pump(30);
        assert_eq!(w.nav.panel.shown_count(), 2);
    }

    #[test]
    fn intro_shows_once() {
        let mut p0 = central("p0");
        p0.intro = "Home.".into();
        let mut w = World::new(vec![p0]);
        assert!(w.nav.check_and_show_intro(&mut w.ctx, &mut w.container, &w.progression, "p0"));
        w.pump(60);
        w.nav.advance(&mut w.ctx, &w.container);
        w.pump(60);
        assert!(w.progression.is_intro_seen("sol", "p0"));
        assert!(!w.nav.check_and_show_intro(&mut w.ctx, &mut w.container, &w.progression, "p0"));
        assert!(!w.nav.overlay.is_visible());
    }

    #[test]
    fn reveal_twice_is_harmless() {
        let mut w = World::new(vec![central("p0"), PlanetConfig::new("p1")]);
        let emitter = w.container.get_by_id("p1").unwrap().emitter.unwrap();
        assert!(w.nav.reveal_planet(&mut w.ctx, &mut w.container, &mut w.progression, "p1"));
        let nodes = w.ctx.stage.len();
        assert!(!w.nav.reveal_planet(&mut w.ctx, &mut w.container, &mut w.progression, "p1"));
        assert_eq!(w.ctx.stage.len(), nodes);
        assert!(!w.ctx.stage.contains(emitter));
        assert!(!w.nav.reveal_planet(&mut w.ctx, &mut w.container, &mut w.progression, "nope"));
    }

    #[test]
    fn retarget_during_travel_arrives_at_last_target() {
        let mut w = World::new(vec![central("p0"), PlanetConfig::new("p1"), PlanetConfig::new("p2")]);
        w.place("p1", Vec2::new(650.0, 300.0));
        w.place("p2", Vec2::new(400.0, 80.0));
        w.park("p0");
        w.nav.handle_planet_click(&mut w.ctx, &mut w.container, &mut w.progression, "p1");
        w.pump(10);
        w.nav.handle_planet_click(&mut w.ctx, &mut w.container, &mut w.progression, "p2");
        w.pump(150);
        assert_eq!(w.nav.current_planet(), Some("p2"));
        assert!(w.container.get_by_id("p1").unwrap().is_hidden());
        assert!(w.ship().distance(anchor_for(Vec2::new(400.0, 80.0))) < 1e-3);
    }

    #[test]
    fn click_on_current_planet_opens_panel() {
        let mut w = World::new(vec![central("p0")]);
        w.park("p0");
        w.nav.panel.hide(&mut w.ctx);
        w.nav.handle_planet_click(&mut w.ctx, &mut w.container, &mut w.progression, "p0");
        assert_eq!(w.nav.panel.open_planet(), Some("p0"));
        assert_eq!(w.nav.state(), &NavState::Idle);
    }

    #[test]
    fn delayed_intro_locks_controls() {
        let mut p0 = central("p0");
        p0.intro = "Welcome.".into();
        let mut w = World::new(vec![p0, PlanetConfig::new("p1")]);
        w.nav.move_to_planet(&mut w.ctx, &mut w.container, &mut w.progression, "p0", true, 500.0);
        assert!(!w.nav.controls_active());
        assert!(!w.nav.panel.is_open());

        w.nav.handle_planet_click(&mut w.ctx, &mut w.container, &mut w.progression, "p1");
        assert!(matches!(w.nav.state(), NavState::IntroPending { .. }));

        w.pump(40);
        assert!(w.nav.overlay.is_visible());
        assert!(!w.nav.controls_active());
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut w = World::new(vec![central("p0")]);
        w.nav.handle_planet_click(&mut w.ctx, &mut w.container, &mut w.progression, "ghost");
        w.nav.travel_to_planet(&mut w.ctx, &mut w.container, "ghost");
        w.nav.arrive_at_planet(&mut w.ctx, &mut w.container, &mut w.progression, "ghost");
        w.nav.move_to_planet(&mut w.ctx, &mut w.container, &mut w.progression, "ghost", true, 0.0);
        assert!(!w.nav.check_and_show_intro(&mut w.ctx, &mut w.container, &w.progression, "ghost"));
        assert!(!w.nav.is_planet_locked(&w.container, &w.progression, "ghost"));
        assert_eq!(w.nav.state(), &NavState::Idle);
        assert_eq!(w.nav.current_planet(), None);
    }
}
