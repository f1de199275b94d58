use std::path::{Path, PathBuf};

use wgpu_text::{
    glyph_brush::{
        ab_glyph::FontArc, BuiltInLineBreaker, HorizontalAlign, Layout, OwnedSection, Section,
        Text, VerticalAlign,
    },
    BrushBuilder, TextBrush,
};

use crate::session::Stats;

/// Fallback locations tried when no font path is configured
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// Status bar label x positions on the 800 px wide reference layout
const STATUS_COLUMNS: [f32; 4] = [5.0, 200.0, 450.0, 650.0];
const REFERENCE_WIDTH: f32 = 800.0;
const STATUS_TOP: f32 = 5.0;
/// End screen label y positions
const SUMMARY_ROWS: [f32; 4] = [100.0, 200.0, 300.0, 400.0];

const STATUS_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const SUMMARY_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// `MM:SS.t`, truncated to tenths.
pub fn format_time(secs: f32) -> String {
    let tenths = (secs.max(0.0) * 10.0).floor() as u64;
    let minutes = tenths / 600;
    let seconds = (tenths / 10) % 60;
    format!("{:02}:{:02}.{}", minutes, seconds, tenths % 10)
}

pub fn status_labels(stats: &Stats, lives_remaining: u32) -> [String; 4] {
    [
        format!("Time: {}", format_time(stats.elapsed.as_secs_f32())),
        format!("Speed: {:.1} t/s", stats.speed()),
        format!("Hits: {}", stats.hits),
        format!("Lives: {}", lives_remaining),
    ]
}

pub fn summary_labels(stats: &Stats) -> [String; 4] {
    [
        format!("Time: {}", format_time(stats.elapsed.as_secs_f32())),
        format!("Speed: {:.1} t/s", stats.speed()),
        format!("Hits: {}", stats.hits),
        format!("Accuracy: {:.1}%", stats.accuracy()),
    ]
}

/// Reads the configured font, or the first system font that parses.
pub fn load_font(configured: Option<&Path>) -> Option<FontArc> {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        match FontArc::try_from_vec(bytes) {
            Ok(font) => {
                log::info!("using font {}", path.display());
                return Some(font);
            }
            Err(err) => log::warn!("skipping font {}: {}", path.display(), err),
        }
    }
    None
}

fn label_section(
    color: [f32; 4],
    scale: f32,
    h_align: HorizontalAlign,
    width: f32,
    height: f32,
) -> OwnedSection {
    Section::default()
        .add_text(Text::new("").with_scale(scale).with_color(color))
        .with_bounds([width, height])
        .with_layout(
            Layout::default()
                .v_align(VerticalAlign::Top)
                .h_align(h_align)
                .line_breaker(BuiltInLineBreaker::AnyCharLineBreaker),
        )
        .to_owned()
}

/// On-screen text: four status bar labels while playing, four centred
/// summary labels once the session has ended.
pub struct Hud {
    brush: TextBrush<FontArc>,
    status: [OwnedSection; 4],
    summary: [OwnedSection; 4],
}

impl Hud {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        font: FontArc,
        font_size: f32,
    ) -> Self {
        let brush = BrushBuilder::using_font(font).build(
            device,
            config.width,
            config.height,
            config.format,
        );

        let (width, height) = (config.width as f32, config.height as f32);
        let status = std::array::from_fn(|_| {
            label_section(STATUS_COLOR, font_size, HorizontalAlign::Left, width, height)
        });
        let summary = std::array::from_fn(|_| {
            label_section(SUMMARY_COLOR, font_size, HorizontalAlign::Center, width, height)
        });

        let mut hud = Self {
            brush,
            status,
            summary,
        };
        hud.layout(width, height);
        hud
    }

    fn layout(&mut self, width: f32, height: f32) {
        // Without updating the bounds the text gets squished once the window is resized
        for (section, column) in self.status.iter_mut().zip(STATUS_COLUMNS) {
            section.bounds = (width, height);
            section.screen_position = (column / REFERENCE_WIDTH * width, STATUS_TOP);
        }
        for (section, row) in self.summary.iter_mut().zip(SUMMARY_ROWS) {
            section.bounds = (width, height);
            section.screen_position = (width / 2.0, row);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32, queue: &wgpu::Queue) {
        self.layout(width as f32, height as f32);
        self.brush.resize_view(width as f32, height as f32, queue);
    }

    pub fn set_status(&mut self, labels: [String; 4]) {
        set_labels(&mut self.status, labels);
    }

    pub fn set_summary(&mut self, labels: [String; 4]) {
        set_labels(&mut self.summary, labels);
    }

    /// Queues either the status bar or the summary for drawing.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, ended: bool) {
        let sections = if ended { &self.summary } else { &self.status };
        if let Err(err) = self
            .brush
            .queue(device, queue, sections.iter().collect::<Vec<_>>())
        {
            log::error!("failed to queue text: {:?}", err);
        }
    }

    pub fn draw<'pass>(&'pass self, render_pass: &mut wgpu::RenderPass<'pass>) {
        self.brush.draw(render_pass);
    }
}

fn set_labels(sections: &mut [OwnedSection; 4], labels: [String; 4]) {
    for (section, label) in sections.iter_mut().zip(labels) {
        // Every section is built with exactly one text element
        section.text[0].text = label;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn formats_minutes_seconds_and_tenths() {
        assert_eq!(format_time(0.0), "00:00.0");
        assert_eq!(format_time(5.25), "00:05.2");
        assert_eq!(format_time(59.99), "00:59.9");
        assert_eq!(format_time(61.5), "01:01.5");
        assert_eq!(format_time(600.0), "10:00.0");
    }

    #[test]
    fn negative_time_clamps_to_zero() {
        assert_eq!(format_time(-3.0), "00:00.0");
    }

    #[test]
    fn status_labels_show_time_speed_hits_and_lives() {
        let stats = Stats {
            elapsed: Duration::from_secs(5),
            hits: 10,
            clicks: 12,
            misses: 1,
        };
        assert_eq!(
            status_labels(&stats, 2),
            [
                "Time: 00:05.0".to_string(),
                "Speed: 2.0 t/s".to_string(),
                "Hits: 10".to_string(),
                "Lives: 2".to_string(),
            ]
        );
    }

    #[test]
    fn summary_labels_show_accuracy() {
        let stats = Stats {
            elapsed: Duration::from_secs(5),
            hits: 10,
            clicks: 12,
            misses: 3,
        };
        let labels = summary_labels(&stats);
        assert_eq!(labels[1], "Speed: 2.0 t/s");
        assert_eq!(labels[3], "Accuracy: 83.3%");
    }

    #[test]
    fn instant_quit_summary_has_no_nan() {
        let labels = summary_labels(&Stats::default());
        assert_eq!(labels[1], "Speed: 0.0 t/s");
        assert_eq!(labels[3], "Accuracy: 0.0%");
    }

    #[test]
    fn missing_font_path_falls_back_to_system_fonts() {
        let configured = load_font(Some(Path::new("/definitely/not/a/font.ttf")));
        assert_eq!(configured.is_some(), load_font(None).is_some());
    }

    #[test]
    fn unparsable_font_file_is_skipped() {
        let path = std::env::temp_dir()
            .join(format!("aim-trainer-bogus-font-{}.ttf", std::process::id()));
        std::fs::write(&path, b"this is not a font").unwrap();

        let configured = load_font(Some(&path));
        let fallback = load_font(None);
        std::fs::remove_file(&path).unwrap();

        // The bogus file never wins; the result is whatever the system list gives
        assert_eq!(configured.is_some(), fallback.is_some());
    }
}
