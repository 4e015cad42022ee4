use colored::Colorize;

/// 显示成功消息（绿色 ✓）
pub fn success(msg: &str, colored: bool) {
    if colored {
        println!("{} {}", "✓".green().bold(), msg.green());
    } else {
        println!("✓ {}", msg);
    }
}

/// 显示错误消息（红色 ✗）
pub fn error(msg: &str, colored: bool) {
    if colored {
        eprintln!("{} {}", "✗".red().bold(), msg.red());
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// 显示警告消息（黄色 ⚠）
pub fn warning(msg: &str, colored: bool) {
    if colored {
        println!("{} {}", "⚠".yellow().bold(), msg.yellow());
    } else {
        println!("⚠ {}", msg);
    }
}

/// 显示信息消息（蓝色 ℹ）
pub fn info(msg: &str, colored: bool) -> String {
    if colored {
        format!("{} {}", "ℹ".blue().bold(), msg.blue())
    } else {
        format!("ℹ {}", msg)
    }
}

/// 显示步骤提示（灰色）
pub fn step(step: &str, msg: &str, colored: bool) {
    if colored {
        println!(
            "{} {}",
            format!("[{}]", step).bright_black().bold(),
            msg.bright_black()
        );
    } else {
        println!("[{}] {}", step, msg);
    }
}

/// 粗体标题
pub fn heading(msg: &str, colored: bool) -> String {
    if colored {
        msg.bold().to_string()
    } else {
        msg.to_string()
    }
}

/// 灰色的次要信息
pub fn dim(msg: &str, colored: bool) -> String {
    if colored {
        msg.bright_black().to_string()
    } else {
        msg.to_string()
    }
}

/// 评分星级：`★★★★☆`
pub fn format_rating(rating: u8, colored: bool) -> String {
    let filled = usize::from(rating.min(5));
    let stars = format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled));
    if colored {
        stars.yellow().to_string()
    } else {
        stars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rating_plain() {
        assert_eq!(format_rating(4, false), "★★★★☆");
        assert_eq!(format_rating(1, false), "★☆☆☆☆");
        assert_eq!(format_rating(9, false), "★★★★★");
    }

    #[test]
    fn test_plain_helpers_do_not_add_escape_codes() {
        assert_eq!(heading("Results", false), "Results");
        assert_eq!(dim("1851", false), "1851");
        assert_eq!(info("note", false), "ℹ note");
    }
}
