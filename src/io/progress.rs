//! Progress display for batch decoding and export

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static DECODE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Decoding: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static EXPORT_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

/// Coordinates progress display for one run
///
/// All methods take `&self` so the display can be updated from decode
/// completions while the batch is still in flight.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    decode_bar: ProgressBar,
    export_bar: ProgressBar,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a progress manager with nothing displayed yet
    pub fn new() -> Self {
        let multi_progress = MultiProgress::new();
        let decode_bar = multi_progress.add(ProgressBar::new(0));
        decode_bar.set_style(DECODE_STYLE.clone());
        let export_bar = multi_progress.add(ProgressBar::new_spinner());
        export_bar.set_style(EXPORT_STYLE.clone());

        Self {
            multi_progress,
            decode_bar,
            export_bar,
        }
    }

    /// Size the decode bar for a batch
    pub fn initialize(&self, file_count: usize) {
        self.decode_bar.set_length(file_count as u64);
        self.decode_bar.set_position(0);
    }

    /// Record a settled decode
    pub fn complete_file(&self, path: &Path, succeeded: bool) {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        let mark = if succeeded { "✓" } else { "✗" };
        self.decode_bar.set_message(format!("{mark} {name}"));
        self.decode_bar.inc(1);
    }

    /// Show that compositing has started
    pub fn start_export(&self, cells: usize) {
        self.decode_bar.finish_with_message("done");
        self.export_bar
            .set_message(format!("Compositing {cells} cell(s)"));
        self.export_bar.enable_steady_tick(Duration::from_millis(100));
    }

    /// Show that compositing finished
    pub fn complete_export(&self, file_name: &str) {
        self.export_bar
            .finish_with_message(format!("Exported {file_name}"));
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if !self.decode_bar.is_finished() {
            self.decode_bar.finish_and_clear();
        }
        if !self.export_bar.is_finished() {
            self.export_bar.finish_and_clear();
        }
        let _ = self.multi_progress.clear();
    }
}
