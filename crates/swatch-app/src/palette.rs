//! Activation events and the handlers that map them to colors.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use swatch_engine::paint::Color;

use crate::error::DemoError;

/// The four built-in activation events.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ColorEvent {
    Color1,
    Color2,
    Color3,
    Reset,
}

impl ColorEvent {
    pub const ALL: [ColorEvent; 4] = [
        ColorEvent::Color1,
        ColorEvent::Color2,
        ColorEvent::Color3,
        ColorEvent::Reset,
    ];

    /// Event identifier as delivered by the host.
    pub const fn id(self) -> &'static str {
        match self {
            ColorEvent::Color1 => "color1",
            ColorEvent::Color2 => "color2",
            ColorEvent::Color3 => "color3",
            ColorEvent::Reset => "colorReset",
        }
    }

    /// Color the event selects.
    ///
    /// `Reset` returns to the startup color, which is the same red as `Color1`.
    pub const fn color(self) -> Color {
        match self {
            ColorEvent::Color1 => Color::RED,
            ColorEvent::Color2 => Color::GREEN,
            ColorEvent::Color3 => Color::BLUE,
            ColorEvent::Reset => DEFAULT_COLOR,
        }
    }
}

/// Current color before any activation.
pub const DEFAULT_COLOR: Color = Color::RED;

impl fmt::Display for ColorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ColorEvent {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorEvent::ALL
            .into_iter()
            .find(|e| e.id() == s)
            .ok_or_else(|| DemoError::UnknownEvent(s.to_string()))
    }
}

/// Pure color transition run when an event fires: current color in, next color out.
pub type ColorHandler = Box<dyn Fn(Color) -> Color>;

/// Event id → handler registry.
pub struct HandlerTable {
    handlers: HashMap<String, ColorHandler>,
}

impl HandlerTable {
    /// Empty table; every event is unknown.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Table with one constant-color handler per [`ColorEvent`].
    pub fn with_defaults() -> Self {
        let mut table = Self::empty();
        for event in ColorEvent::ALL {
            let color = event.color();
            table.register(event.id(), move |_| color);
        }
        table
    }

    /// Adds or replaces the handler for `id`.
    pub fn register(&mut self, id: impl Into<String>, handler: impl Fn(Color) -> Color + 'static) {
        self.handlers.insert(id.into(), Box::new(handler));
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Runs the handler for `id` against `current`.
    pub fn apply(&self, id: &str, current: Color) -> Result<Color, DemoError> {
        let handler = self
            .handlers
            .get(id)
            .ok_or_else(|| DemoError::UnknownEvent(id.to_string()))?;
        Ok(handler(current))
    }
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable").field("ids", &self.ids()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_str() {
        for event in ColorEvent::ALL {
            assert_eq!(event.id().parse::<ColorEvent>().unwrap(), event);
        }
        assert!(matches!(
            "color4".parse::<ColorEvent>(),
            Err(DemoError::UnknownEvent(id)) if id == "color4"
        ));
    }

    #[test]
    fn default_handlers_select_fixed_colors() {
        let table = HandlerTable::with_defaults();
        let start = Color::rgba(0.3, 0.3, 0.3, 1.0);

        assert_eq!(table.apply("color1", start).unwrap(), Color::rgba(1.0, 0.0, 0.0, 1.0));
        assert_eq!(table.apply("color2", start).unwrap(), Color::rgba(0.0, 1.0, 0.0, 1.0));
        assert_eq!(table.apply("color3", start).unwrap(), Color::rgba(0.0, 0.0, 1.0, 1.0));
        assert_eq!(table.apply("colorReset", start).unwrap(), Color::rgba(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn reset_matches_color1() {
        assert_eq!(ColorEvent::Reset.color(), ColorEvent::Color1.color());
        assert_eq!(ColorEvent::Reset.color(), DEFAULT_COLOR);
    }

    #[test]
    fn only_palette_colors_are_reachable() {
        let table = HandlerTable::with_defaults();
        let palette = [Color::RED, Color::GREEN, Color::BLUE];

        let mut color = DEFAULT_COLOR;
        for id in ["color2", "colorReset", "color3", "color3", "color1", "color2"] {
            color = table.apply(id, color).unwrap();
            assert!(palette.contains(&color), "{color:?}");
        }
    }

    #[test]
    fn unknown_id_is_an_error() {
        let table = HandlerTable::with_defaults();
        let err = table.apply("colour1", Color::RED).unwrap_err();
        assert_eq!(err.to_string(), "unknown event `colour1`");
    }

    #[test]
    fn custom_handlers_receive_the_current_color() {
        let mut table = HandlerTable::empty();
        table.register("dim", |c: Color| Color::rgba(c.r * 0.5, c.g * 0.5, c.b * 0.5, c.a));

        let dimmed = table.apply("dim", Color::rgba(1.0, 0.5, 0.0, 1.0)).unwrap();
        assert_eq!(dimmed, Color::rgba(0.5, 0.25, 0.0, 1.0));
        assert_eq!(table.ids(), vec!["dim"]);
    }

    #[test]
    fn register_replaces_existing_handler() {
        let mut table = HandlerTable::with_defaults();
        table.register("color1", |_| Color::BLUE);
        assert_eq!(table.apply("color1", Color::RED).unwrap(), Color::BLUE);
        assert_eq!(table.ids().len(), 4);
    }
}
