//! Interaction panel shown when the ship parks at a planet. The panel
//! itself is browser UI; this side tracks which planet it belongs to and
//! tells the browser through game events.

use starhop_engine::{EngineContext, GameEvent};
use crate::config::InteractionDescriptor;
use crate::planet::PlanetData;

/// Game event kinds sent to the browser.
pub mod events {
    /// `a` = planet index, `b` = option flags.
    pub const PANEL_SHOW: u32 = 1;
    pub const PANEL_HIDE: u32 = 2;
    /// `a` = planet index. The browser starts the level bound to it.
    pub const LAUNCH_LEVEL: u32 = 3;
    /// `a` = index of the destination container in the catalog.
    pub const WARP: u32 = 4;
    /// `a` = planet index.
    pub const OPEN_SHIPYARD: u32 = 5;
}

/// Option flags packed into `GameEvent::b` for `PANEL_SHOW`.
pub mod flags {
    pub const LEVEL: u32 = 1;
    pub const WARP: u32 = 2;
    pub const SHIPYARD: u32 = 4;
    pub const SHOW_ALWAYS: u32 = 8;
}

pub fn option_flags(descriptor: Option<&InteractionDescriptor>) -> u32 {
    let Some(d) = descriptor else { return 0 };
    let mut bits = 0;
    if d.level_id.is_some() {
        bits |= flags::LEVEL;
    }
    if d.warp_container_id.is_some() {
        bits |= flags::WARP;
    }
    if d.has_shipyard {
        bits |= flags::SHIPYARD;
    }
    if d.show_always {
        bits |= flags::SHOW_ALWAYS;
    }
    bits
}

#[derive(Debug, Default)]
pub struct InteractionPanel {
    open: Option<String>,
    shown: u32,
}

impl InteractionPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the panel for `planet`, replacing whatever was open.
    pub fn show(&mut self, ctx: &mut EngineContext, index: usize, planet: &PlanetData) {
        self.open = Some(planet.id().to_owned());
        self.shown += 1;
        let bits = option_flags(planet.interaction.as_ref());
        ctx.emit_event(GameEvent::new(events::PANEL_SHOW, index as f32, bits as f32, 0.0));
        log::debug!("panel: {} (flags {:#b})", planet.id(), bits);
    }

    pub fn hide(&mut self, ctx: &mut EngineContext) {
        if self.open.take().is_some() {
            ctx.emit_event(GameEvent::new(events::PANEL_HIDE, 0.0, 0.0, 0.0));
        }
    }

    /// Planet the panel is open for.
    pub fn open_planet(&self) -> Option<&str> {
        self.open.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// How many times the panel has been opened.
    pub fn shown_count(&self) -> u32 {
        self.shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanetConfig;

    #[test]
    fn show_and_hide_emit_events() {
        let mut ctx = EngineContext::new();
        let mut panel = InteractionPanel::new();
        let mut config = PlanetConfig::new("dock");
        config.interaction = Some(InteractionDescriptor {
            level_id: Some("l1".into()),
            has_shipyard: true,
            ..Default::default()
        });
        let planet = PlanetData::from_config(&config);

        panel.show(&mut ctx, 2, &planet);
        assert_eq!(panel.open_planet(), Some("dock"));
        panel.hide(&mut ctx);
        panel.hide(&mut ctx);
        assert!(!panel.is_open());

        assert_eq!(
            ctx.events,
            vec![
                GameEvent::new(events::PANEL_SHOW, 2.0, (flags::LEVEL | flags::SHIPYARD) as f32, 0.0),
                GameEvent::new(events::PANEL_HIDE, 0.0, 0.0, 0.0),
            ]
        );
        assert_eq!(panel.shown_count(), 1);
    }

    #[test]
    fn no_descriptor_means_no_flags() {
        assert_eq!(option_flags(None), 0);
        let all = InteractionDescriptor {
            level_id: Some("l".into()),
            warp_container_id: Some("c".into()),
            has_shipyard: true,
            show_always: true,
        };
        assert_eq!(option_flags(Some(&all)), 15);
    }
}
