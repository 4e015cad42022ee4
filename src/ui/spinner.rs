use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// 进度指示器（旋转动画）
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// 创建新的 spinner
    pub fn new(message: &str, colored: bool) -> Self {
        let template = if colored {
            "{spinner:.green} {msg}"
        } else {
            "{spinner} {msg}"
        };
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template(template)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        Self { pb }
    }

    /// 完成并清除
    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.pb.finish_and_clear();
    }
}
