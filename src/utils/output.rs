//! # 终端输出工具
//!
//! 统一的状态前缀与标题样式。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 使用 `colored` crate

use colored::Colorize;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印跳过消息
pub fn print_skip(msg: &str) {
    println!("{} {}", "[SKIP]".dimmed(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印写出文件消息：`[OK] Fe (scan) -> cif_files/scan/Fe_scan.cif`
pub fn print_written(label: &str, path: &str) {
    println!(
        "{} {} {} {}",
        "[OK]".green().bold(),
        label.dimmed(),
        "->".cyan(),
        path
    );
}

/// 打印匹配判定
pub fn print_verdict(matched: bool, msg: &str) {
    if matched {
        println!("{} {}", "[MATCH]".green().bold(), msg);
    } else {
        println!("{} {}", "[DIFF]".magenta().bold(), msg);
    }
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}
