use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    execute,
};

use crate::audio::{AudioSink, SoundCue};
use crate::constants::*;
use crate::presentation::{DrawCommand, DrawShape, Presenter, Snapshot, build_draw_list};
use crate::types::Vector2D;

// --- ScreenBuffer for headless rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_char(&mut self, c: char) {
        if self.cursor_y < self.height && self.cursor_x < self.width {
            self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn row(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for y in 0..self.height {
            info!("{}", self.row(y));
        }
        info!("---------------------");
    }
}

impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.write_str(&s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            },
        }
    }

    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()), // Nothing to hide or clear in memory
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => sb.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(sb) => sb.flush(),
        }
    }
}

// --- GameGrid for geometric rendering ---
pub struct GameGrid {
    pub grid: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            grid: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
        }
    }

    pub fn set_char(&mut self, x: u16, y: u16, c: char) {
        if y < self.height && x < self.width {
            self.grid[y as usize][x as usize] = c;
        }
    }

    pub fn clear(&mut self) {
        for row in self.grid.iter_mut() {
            row.fill(' ');
        }
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", self.grid[y as usize].iter().collect::<String>())?;
        }
        Ok(())
    }
}

const CONTROLS_HINT: &str = "   [arrows/WASD] fly  [space] fire  [down] jump  [q] quit";

/// Maps the square world onto the terminal below the HUD row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin_x: u16,
    pub origin_y: u16,
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    pub fn fit(width: u16, height: u16) -> Self {
        let aspect = TERMINAL_ASPECT_RATIO_COMPENSATION;
        let rows = height.saturating_sub(1).min((width as f64 / aspect) as u16).max(1);
        let cols = ((rows as f64 * aspect) as u16).min(width).max(1);
        Viewport {
            origin_x: width.saturating_sub(cols) / 2,
            origin_y: 1,
            cols,
            rows,
        }
    }

    pub fn scale(&self) -> (f64, f64) {
        (self.cols as f64 / WORLD_SIZE, self.rows as f64 / WORLD_SIZE)
    }

    /// Cell for a world point; `None` outside the playfield.
    pub fn to_cell(&self, p: Vector2D) -> Option<(u16, u16)> {
        if !(0.0..WORLD_SIZE).contains(&p.x) || !(0.0..WORLD_SIZE).contains(&p.y) {
            return None;
        }
        let (sx, sy) = self.scale();
        let col = ((p.x * sx) as u16).min(self.cols - 1);
        let row = ((p.y * sy) as u16).min(self.rows - 1);
        Some((self.origin_x + col, self.origin_y + row))
    }
}

/// Crossterm renderer plus audio, the terminal side of the presentation boundary.
pub struct TerminalPresenter<A: AudioSink> {
    out: OutputTarget,
    grid: GameGrid,
    viewport: Viewport,
    audio: A,
    frames: u64,
    log_every: Option<u64>,
}

impl<A: AudioSink> TerminalPresenter<A> {
    pub fn new(out: OutputTarget, width: u16, height: u16, audio: A) -> Self {
        TerminalPresenter {
            out,
            grid: GameGrid::new(width, height),
            viewport: Viewport::fit(width, height),
            audio,
            frames: 0,
            log_every: None,
        }
    }

    /// Dump the screen buffer to the log every `frames` frames (headless runs).
    pub fn with_log_every(mut self, frames: u64) -> Self {
        self.log_every = Some(frames.max(1));
        self
    }

    pub fn output(&mut self) -> &mut OutputTarget {
        &mut self.out
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        info!("Terminal resized to {}x{}", width, height);
        self.grid = GameGrid::new(width, height);
        self.viewport = Viewport::fit(width, height);
    }

    fn plot(&mut self, p: Vector2D, c: char) {
        if let Some((x, y)) = self.viewport.to_cell(p) {
            self.grid.set_char(x, y, c);
        }
    }

    fn plot_line(&mut self, from: Vector2D, to: Vector2D, c: char) {
        let (sx, sy) = self.viewport.scale();
        let d = to.sub(from);
        let steps = ((d.x * sx).abs().max((d.y * sy).abs()).ceil() as usize).max(1);
        for i in 0..=steps {
            self.plot(from.add(d.scale(i as f64 / steps as f64)), c);
        }
    }

    fn draw(&mut self, command: &DrawCommand) {
        let o = command.offset;
        match command.shape {
            DrawShape::Asteroid { center, radius } => {
                let (sx, _) = self.viewport.scale();
                let c = if radius > ASTEROID_MIN_SPLIT_RADIUS * 2.0 { '@' } else { 'o' };
                let samples = ((radius * sx * 8.0) as usize).max(8);
                for i in 0..samples {
                    let theta = i as f64 / samples as f64 * std::f64::consts::TAU;
                    let rim = Vector2D::new(theta.cos(), theta.sin()).scale(radius);
                    self.plot(center.add(rim).add(o), c);
                }
            }
            DrawShape::Bullet { position } => self.plot(position.add(o), '*'),
            DrawShape::Ship { nose, left, right } => {
                let (nose, left, right) = (nose.add(o), left.add(o), right.add(o));
                self.plot_line(left, right, '.');
                self.plot_line(nose, left, '.');
                self.plot_line(nose, right, '.');
                self.plot(nose, nose_char(nose.sub(left.add(right).scale(0.5))));
            }
        }
    }

    fn write_centered(&mut self, y: u16, text: &str) -> io::Result<()> {
        let x = (self.grid.width / 2).saturating_sub(text.len() as u16 / 2);
        self.out.execute_move_to(MoveTo(x, y))?;
        write!(self.out, "{}", text)
    }
}

/// Arrow glyph for the heading; `forward` is in screen space.
pub fn nose_char(forward: Vector2D) -> char {
    if forward.x.abs() >= forward.y.abs() {
        if forward.x >= 0.0 { '>' } else { '<' }
    } else if forward.y >= 0.0 {
        'v'
    } else {
        '^'
    }
}

impl<A: AudioSink> AudioSink for TerminalPresenter<A> {
    fn play(&mut self, cue: SoundCue) {
        self.audio.play(cue);
    }
}

impl<A: AudioSink> Presenter for TerminalPresenter<A> {
    fn present(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        self.grid.clear();
        for command in build_draw_list(snapshot) {
            self.draw(&command);
        }
        self.grid.render(&mut self.out)?;

        let mut hud = format!("Score: {}  Lives: {}  Level: {}", snapshot.score, snapshot.lives, snapshot.level);
        if hud.len() + CONTROLS_HINT.len() <= self.grid.width as usize {
            hud.push_str(CONTROLS_HINT);
        }
        hud.truncate(self.grid.width as usize);
        self.out.execute_move_to(MoveTo(0, 0))?;
        write!(self.out, "{}", hud)?;

        if !snapshot.playing {
            let mid = self.grid.height / 2;
            self.write_centered(mid.saturating_sub(2), "GAME OVER!")?;
            self.write_centered(mid, &format!("Final Score: {}", snapshot.score))?;
            self.write_centered(mid + 2, "Press SPACE to restart, q to quit")?;
        }

        self.out.flush()?;

        self.frames += 1;
        if let (Some(every), OutputTarget::ScreenBuffer(sb)) = (self.log_every, &self.out) {
            if self.frames % every == 0 {
                sb.print_to_log();
            }
        }
        Ok(())
    }
}
