use crossterm::event::KeyCode;

/// Held state of the five game controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Left,
    Right,
    Up,
    Down,
    Fire,
}

impl Control {
    pub fn from_key(code: KeyCode) -> Option<Control> {
        match code {
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Control::Left),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Control::Right),
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Control::Up),
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Control::Down),
            KeyCode::Char(' ') => Some(Control::Fire),
            _ => None,
        }
    }
}

impl InputState {
    fn flag(&mut self, control: Control) -> &mut bool {
        match control {
            Control::Left => &mut self.left,
            Control::Right => &mut self.right,
            Control::Up => &mut self.up,
            Control::Down => &mut self.down,
            Control::Fire => &mut self.fire,
        }
    }

    pub fn set(&mut self, control: Control, pressed: bool) {
        *self.flag(control) = pressed;
    }

    /// Returns false for keys that are not mapped to a control.
    pub fn on_key_down(&mut self, code: KeyCode) -> bool {
        match Control::from_key(code) {
            Some(control) => {
                self.set(control, true);
                true
            }
            None => false,
        }
    }

    pub fn on_key_up(&mut self, code: KeyCode) -> bool {
        match Control::from_key(code) {
            Some(control) => {
                self.set(control, false);
                true
            }
            None => false,
        }
    }

    pub fn fire_pressed(&self, previous: &InputState) -> bool {
        self.fire && !previous.fire
    }

    pub fn down_pressed(&self, previous: &InputState) -> bool {
        self.down && !previous.down
    }
}
