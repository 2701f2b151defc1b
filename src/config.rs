use log::{LevelFilter, warn};

pub const DEFAULT_LOG_FILE: &str = "torus-asteroids.log";
pub const DEFAULT_DEBUG_WIDTH: u16 = 80;
pub const DEFAULT_DEBUG_HEIGHT: u16 = 24;
pub const DEFAULT_DEBUG_FRAMES: u64 = 600;

/// Host settings taken from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub debug: Option<DebugRun>,
    pub max_frames: Option<u64>,
    pub seed: Option<u64>,
    pub log_file: String,
    pub log_level: LevelFilter,
    pub muted: bool,
}

/// Headless run into a screen buffer with scripted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugRun {
    pub width: u16,
    pub height: u16,
    pub frames: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            debug: None,
            max_frames: None,
            seed: None,
            log_file: DEFAULT_LOG_FILE.to_string(),
            log_level: LevelFilter::Info,
            muted: false,
        }
    }
}

impl Config {
    /// Parses arguments, program name excluded. Bad values fall back to defaults.
    pub fn from_args(args: &[String]) -> Self {
        let mut config = Config::default();
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--debug" => {
                    // Optional positional WIDTH HEIGHT [FRAMES]
                    let positional: Vec<u64> = args[i + 1..]
                        .iter()
                        .take(3)
                        .map_while(|a| a.parse::<u64>().ok())
                        .collect();
                    let dimension = |v: Option<&u64>, fallback: u16| {
                        v.and_then(|&n| u16::try_from(n).ok()).filter(|&n| n > 0).unwrap_or(fallback)
                    };
                    let (width, height, frames) = if positional.len() >= 2 {
                        (
                            dimension(positional.first(), DEFAULT_DEBUG_WIDTH),
                            dimension(positional.get(1), DEFAULT_DEBUG_HEIGHT),
                            positional.get(2).copied().unwrap_or(DEFAULT_DEBUG_FRAMES),
                        )
                    } else {
                        (DEFAULT_DEBUG_WIDTH, DEFAULT_DEBUG_HEIGHT, DEFAULT_DEBUG_FRAMES)
                    };
                    i += if positional.len() >= 2 { positional.len() } else { 0 };
                    config.debug = Some(DebugRun { width, height, frames });
                }
                "--frames" => {
                    config.max_frames = parse_value(args.get(i + 1), "--frames");
                    i += 1;
                }
                "--seed" => {
                    config.seed = parse_value(args.get(i + 1), "--seed");
                    i += 1;
                }
                "--log" => {
                    match args.get(i + 1) {
                        Some(path) => config.log_file = path.clone(),
                        None => warn!("--log needs a file name, using {}", DEFAULT_LOG_FILE),
                    }
                    i += 1;
                }
                "--verbose" => config.log_level = LevelFilter::Debug,
                "--mute" => config.muted = true,
                other => warn!("Ignoring unknown argument {:?}", other),
            }
            i += 1;
        }
        config
    }
}

fn parse_value(value: Option<&String>, flag: &str) -> Option<u64> {
    let parsed = value.and_then(|v| v.parse::<u64>().ok());
    if parsed.is_none() {
        warn!("{} expects a number, got {:?}", flag, value);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_means_interactive_defaults() {
        assert_eq!(Config::from_args(&[]), Config::default());
    }

    #[test]
    fn debug_with_size_and_frames() {
        let config = Config::from_args(&args(&["--debug", "100", "30", "42", "--seed", "7"]));
        assert_eq!(config.debug, Some(DebugRun { width: 100, height: 30, frames: 42 }));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn bare_debug_uses_default_screen() {
        let config = Config::from_args(&args(&["--debug", "--mute"]));
        assert_eq!(
            config.debug,
            Some(DebugRun { width: DEFAULT_DEBUG_WIDTH, height: DEFAULT_DEBUG_HEIGHT, frames: DEFAULT_DEBUG_FRAMES })
        );
        assert!(config.muted);
    }

    #[test]
    fn malformed_values_fall_back() {
        let config = Config::from_args(&args(&["--frames", "lots", "--verbose", "--log", "run.log", "--bogus"]));
        assert_eq!(config.max_frames, None);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.log_file, "run.log");
    }
}
