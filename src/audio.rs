use std::io::{self, Write};
use log::debug;

/// One-shot sound triggers raised by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Two asteroids bounced
    Bump,
    /// Bullet destroyed or split an asteroid
    Explosion,
    /// Asteroid hit the ship
    Explosion2,
    /// Bullet fired
    Laser,
}

/// Fire-and-forget audio output. Implementations must not block.
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Terminal "audio": the bell for ship damage, everything else only logged.
pub struct TerminalAudio {
    muted: bool,
}

impl TerminalAudio {
    pub fn new(muted: bool) -> Self {
        TerminalAudio { muted }
    }
}

impl AudioSink for TerminalAudio {
    fn play(&mut self, cue: SoundCue) {
        debug!("Sound cue: {:?}", cue);
        if !self.muted && cue == SoundCue::Explosion2 {
            ring_bell(&mut io::stdout());
        }
    }
}

/// Writes BEL. A missed bell never fails the frame, so errors only get logged.
pub fn ring_bell(out: &mut impl Write) -> bool {
    match out.write_all(b"\x07").and_then(|_| out.flush()) {
        Ok(()) => true,
        Err(e) => {
            debug!("Failed to ring terminal bell: {}", e);
            false
        }
    }
}

/// Sink used by headless runs and tests.
#[derive(Default)]
pub struct RecordingAudio {
    pub played: Vec<SoundCue>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: SoundCue) {
        debug!("Sound cue: {:?}", cue);
        self.played.push(cue);
    }
}
