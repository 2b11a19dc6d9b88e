//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 reveal-runtime 覆盖率
//! - `choreo-check`: 检查编排文件（JSON 结构、元素引用、阈值、缓动）

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use walkdir::WalkDir;

use reveal_runtime::{Choreography, SequencerError};

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    match cmd.status() {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "reveal-runtime", "--html"]);
            run("cargo llvm-cov -p reveal-runtime --html", &mut cov)?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "choreo-check" => {
            let path = args.next();
            choreo_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 reveal-runtime 覆盖率报告
  choreo-check    检查编排文件

CHOREO-CHECK:
  cargo xtask choreo-check [path]

  不带参数：检查 reveal-runtime/presets/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - JSON 结构错误
    - 重复或未声明的元素 id
    - 无法解析的触发阈值与缓动名称
    - 负的时长、偏移、延迟

ALIASES (in .cargo/config.toml):
  cargo xtask         -> cargo run -p xtask --
"#
    );
}

//=============================================================================
// choreo-check 命令实现
//=============================================================================

const DEFAULT_CHOREO_DIR: &str = "reveal-runtime/presets";

/// 检查结果
#[derive(Default)]
struct ChoreoCheckResult {
    files_checked: usize,
    /// 无法读取或解析的文件
    load_errors: usize,
    /// (文件, 问题)
    problems: Vec<(String, SequencerError)>,
}

/// 执行编排检查
fn choreo_check(path: Option<&str>) -> anyhow::Result<()> {
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_choreo_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            let dir = Path::new(DEFAULT_CHOREO_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认编排目录不存在: {}\n请在 workspace 根目录运行，或指定编排路径",
                    dir.display()
                );
            }
            collect_choreo_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到编排文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个编排文件...\n", files.len());

    let mut result = ChoreoCheckResult::default();
    for file in &files {
        check_choreo_file(file, &mut result);
    }

    print_check_result(&result);

    if result.load_errors > 0 || !result.problems.is_empty() {
        anyhow::bail!("编排检查发现错误");
    }
    Ok(())
}

/// 收集目录下的所有编排文件
fn collect_choreo_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

fn check_choreo_file(file: &Path, result: &mut ChoreoCheckResult) {
    let id = file.display().to_string();
    result.files_checked += 1;

    let doc = match Choreography::load(file) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("[ERROR] {}: {}", id, e);
            result.load_errors += 1;
            return;
        }
    };

    for problem in doc.diagnostics() {
        result.problems.push((id.clone(), problem));
    }
}

fn print_check_result(result: &ChoreoCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个编排", result.files_checked);
    eprintln!();

    for (file, problem) in &result.problems {
        eprintln!("[ERROR] {}: {}", file, problem);
    }

    let error_count = result.load_errors + result.problems.len();
    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {} 个错误", error_count);
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
