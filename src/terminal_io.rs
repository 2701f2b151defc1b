use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, error, info};

use crate::input::InputState;

/// Without release events a key counts as held this long after its first press.
/// Longer than the usual 500-660 ms delay before auto-repeat kicks in.
pub const KEY_FIRST_REPEAT_TIMEOUT: Duration = Duration::from_millis(700);
/// Once a key auto-repeats, this long without a repeat counts as released.
pub const KEY_HOLD_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Continue,
    Quit,
    Resize(u16, u16),
}

/// Turns crossterm key events into held-key flags.
///
/// Most terminals only report presses and auto-repeats. Until a real release
/// event shows up, a key is released after `KEY_FIRST_REPEAT_TIMEOUT` of
/// silence while waiting for its first repeat, then `KEY_HOLD_TIMEOUT`.
pub struct KeyboardDriver {
    held: HashMap<KeyCode, HeldKey>,
    releases_seen: bool,
}

#[derive(Debug, Clone, Copy)]
struct HeldKey {
    last_seen: Instant,
    repeating: bool,
}

impl HeldKey {
    fn timeout(&self) -> Duration {
        if self.repeating { KEY_HOLD_TIMEOUT } else { KEY_FIRST_REPEAT_TIMEOUT }
    }
}

impl KeyboardDriver {
    pub fn new() -> Self {
        KeyboardDriver { held: HashMap::new(), releases_seen: false }
    }

    pub fn apply(&mut self, event: Event, input: &mut InputState, now: Instant) -> HostCommand {
        match event {
            Event::Key(key) => self.apply_key(key, input, now),
            Event::Resize(width, height) => HostCommand::Resize(width, height),
            _ => HostCommand::Continue,
        }
    }

    fn apply_key(&mut self, key: KeyEvent, input: &mut InputState, now: Instant) -> HostCommand {
        let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
        if key.kind != KeyEventKind::Release
            && (ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc))
        {
            return HostCommand::Quit;
        }

        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if input.on_key_down(key.code) {
                    // Some terminals report repeats as plain presses
                    let repeating = key.kind == KeyEventKind::Repeat || self.held.contains_key(&key.code);
                    self.held.insert(key.code, HeldKey { last_seen: now, repeating });
                }
            }
            KeyEventKind::Release => {
                if !self.releases_seen {
                    info!("Terminal reports key releases, hold timeout disabled");
                    self.releases_seen = true;
                }
                input.on_key_up(key.code);
                self.held.remove(&key.code);
            }
        }
        HostCommand::Continue
    }

    /// Releases keys that have gone quiet, unless the terminal sends real releases.
    pub fn expire(&mut self, input: &mut InputState, now: Instant) {
        if self.releases_seen {
            return;
        }
        self.held.retain(|code, held| {
            let alive = now.duration_since(held.last_seen) < held.timeout();
            if !alive {
                input.on_key_up(*code);
            }
            alive
        });
    }

    /// Waits up to `timeout` for input, then drains everything queued.
    pub fn poll(&mut self, input: &mut InputState, timeout: Duration) -> io::Result<HostCommand> {
        let mut command = HostCommand::Continue;
        let mut wait = timeout;
        while event::poll(wait).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
            let ev = event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?;
            match self.apply(ev, input, Instant::now()) {
                HostCommand::Continue => {}
                other => command = other,
            }
            if command == HostCommand::Quit {
                break;
            }
            wait = Duration::ZERO;
        }
        self.expire(input, Instant::now());
        Ok(command)
    }
}

impl Default for KeyboardDriver {
    fn default() -> Self {
        Self::new()
    }
}

// --- SimulatedInput for debugging ---
pub struct SimulatedInput {
    events: HashMap<u64, Vec<Event>>,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        SimulatedInput { events }
    }

    /// Scripted session: fire, thrust, turn, jump, fire again.
    pub fn demo() -> Self {
        let mut script = SimulatedInput::new(HashMap::new());
        script.hold(1, 3, KeyCode::Char(' '));
        script.hold(10, 60, KeyCode::Up);
        script.hold(40, 90, KeyCode::Left);
        script.hold(95, 97, KeyCode::Char(' '));
        script.hold(120, 122, KeyCode::Down);
        script.hold(130, 200, KeyCode::Right);
        for frame in (210..600).step_by(20) {
            script.hold(frame, frame + 2, KeyCode::Char(' '));
        }
        script
    }

    /// Presses `code` on frame `from` and releases it on frame `until`.
    pub fn hold(&mut self, from: u64, until: u64, code: KeyCode) {
        let release = KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release);
        self.events.entry(from).or_default().push(Event::Key(code.into()));
        self.events.entry(until).or_default().push(Event::Key(release));
    }

    pub fn poll(&mut self, frame_count: u64) -> Vec<Event> {
        let events = self.events.remove(&frame_count).unwrap_or_default();
        if !events.is_empty() {
            debug!("Simulated input at frame {}: {:?}", frame_count, events);
        }
        events
    }
}
