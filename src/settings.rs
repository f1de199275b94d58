use std::path::PathBuf;

pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;
/// Keeps spawned targets away from the window edges
pub const TARGET_PADDING: f32 = 30.0;
/// Height of the status bar; targets never spawn underneath it
pub const TOP_BAR_HEIGHT: f32 = 50.0;
pub const LIVES: u32 = 3;
pub const SPAWN_INTERVAL_MS: u64 = 400;
pub const FRAME_RATE: u32 = 60;
pub const LABEL_FONT_SIZE: f32 = 24.0;

/// Points at a TTF/OTF file to use for the HUD labels
pub const FONT_ENV_VAR: &str = "AIM_TRAINER_FONT";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub window_width: u32,
    pub window_height: u32,
    pub target_padding: f32,
    pub top_bar_height: f32,
    pub lives: u32,
    pub spawn_interval: std::time::Duration,
    pub frame_rate: u32,
    pub label_font_size: f32,
    pub font_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            target_padding: TARGET_PADDING,
            top_bar_height: TOP_BAR_HEIGHT,
            lives: LIVES,
            spawn_interval: std::time::Duration::from_millis(SPAWN_INTERVAL_MS),
            frame_rate: FRAME_RATE,
            label_font_size: LABEL_FONT_SIZE,
            font_path: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::default().with_font_override(std::env::var_os(FONT_ENV_VAR).map(PathBuf::from))
    }

    fn with_font_override(mut self, font_path: Option<PathBuf>) -> Self {
        // An empty variable is treated the same as an unset one
        self.font_path = font_path.filter(|path| !path.as_os_str().is_empty());
        self
    }

    pub fn frame_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults_match_stock_game() {
        let settings = Settings::default();
        assert_eq!(settings.window_width, 800);
        assert_eq!(settings.window_height, 600);
        assert_eq!(settings.lives, 3);
        assert_eq!(settings.spawn_interval, Duration::from_millis(400));
        assert_eq!(settings.font_path, None);
    }

    #[test]
    fn frame_period_is_sixtieth_of_a_second() {
        let period = Settings::default().frame_period();
        assert_eq!(period, Duration::from_secs(1) / 60);
    }

    #[test]
    fn zero_frame_rate_does_not_divide_by_zero() {
        let settings = Settings {
            frame_rate: 0,
            ..Settings::default()
        };
        assert_eq!(settings.frame_period(), Duration::from_secs(1));
    }

    #[test]
    fn empty_font_override_is_ignored() {
        let settings = Settings::default().with_font_override(Some(PathBuf::new()));
        assert_eq!(settings.font_path, None);

        let settings =
            Settings::default().with_font_override(Some(PathBuf::from("/tmp/label.ttf")));
        assert_eq!(settings.font_path, Some(PathBuf::from("/tmp/label.ttf")));
    }
}
