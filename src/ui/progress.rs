use crate::report::CatalogQuery;
use crate::ui::{theme, Icons};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

fn visible(pb: ProgressBar) -> ProgressBar {
    if console::Term::stdout().is_term() && !crate::output::is_quiet() {
        pb
    } else {
        ProgressBar::hidden()
    }
}

/// Bar over the query catalog while `report --all` runs
pub struct CatalogProgress {
    pb: ProgressBar,
}

impl CatalogProgress {
    pub fn new(total: usize) -> Self {
        let pb = visible(ProgressBar::new(total as u64));
        if let Ok(style) = ProgressStyle::with_template("{bar:30.green/white} {pos}/{len} {msg}") {
            pb.set_style(style);
        }
        Self { pb }
    }

    pub fn start(&self, query: CatalogQuery) {
        self.pb.set_message(query.title().to_string());
    }

    pub fn inc(&self) {
        self.pb.inc(1);
    }

    pub fn finish_with_summary(&self, duration: Duration, succeeded: usize, failed: usize) {
        self.pb.finish_and_clear();
        println!(
            "{} {}",
            Icons::CHECK,
            format!("Ran {} queries in {}", succeeded + failed, HumanDuration(duration))
                .style(theme().success)
        );
        if failed > 0 {
            println!("  {} {} failed", Icons::WARN, failed.style(theme().warn));
        }
    }
}

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = visible(ProgressBar::new_spinner());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}
