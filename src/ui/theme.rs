use crate::report::ColorScale;
use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for messages, tables and terminal charts
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    pub muted: Style,
    /// Bars of charts that carry no colour scale
    pub bar: Style,
    /// Cycled across pie slices and chart series
    pub series: Vec<Style>,
    colored: bool,
}

impl Theme {
    /// Plain output when stdout is not a terminal or `NO_COLOR` is set
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() || std::env::var_os("NO_COLOR").is_some() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().green().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().cyan(),
            dim: Style::new().white().dimmed(),
            muted: Style::new().bright_black(),
            bar: Style::new().bright_green(),
            series: vec![
                Style::new().bright_blue(),
                Style::new().bright_yellow(),
                Style::new().bright_green(),
                Style::new().bright_magenta(),
                Style::new().bright_cyan(),
                Style::new().bright_red(),
            ],
            colored: true,
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            muted: Style::new(),
            bar: Style::new(),
            series: vec![Style::new()],
            colored: false,
        }
    }

    /// Terminal colour closest to a chart's colour scale
    pub fn scale(&self, scale: ColorScale) -> Style {
        if !self.colored {
            return Style::new();
        }
        match scale {
            ColorScale::Blues => Style::new().blue(),
            ColorScale::Greens => Style::new().green(),
            ColorScale::Oranges => Style::new().yellow(),
            ColorScale::Purples => Style::new().magenta(),
            ColorScale::Reds => Style::new().red(),
            ColorScale::Viridis => Style::new().cyan(),
        }
    }

    /// Style of the `index`th slice or series, wrapping around the palette
    pub fn series_style(&self, index: usize) -> Style {
        match self.series.len() {
            0 => self.bar,
            n => self.series[index % n],
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
