/// Input tracker: drains crossterm events once per frame and records
/// which keys were freshly pressed.
///
/// Every game action is edge-triggered — one key press is one move
/// attempt — so only Press events are kept. Terminal key repeats and
/// Release events are dropped; the simulation's own animation gate is
/// what paces held-down arrow keys.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEventKind, KeyModifiers};

pub struct InputState {
    presses: Vec<KeyCode>,
    ctrl_c: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState { presses: Vec::with_capacity(8), ctrl_c: false }
    }

    /// Drain all pending terminal events.
    /// Call once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
                {
                    self.ctrl_c = true;
                }
                self.presses.push(key.code);
            }
        }
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }
}
