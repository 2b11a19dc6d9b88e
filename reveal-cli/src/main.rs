//! # Reveal CLI
//!
//! 无界面宿主：在内存元素树上运行编排，按帧模拟滚动与指针，打印属性写入轨迹。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p reveal-cli -- presets
//! cargo run -p reveal-cli -- simulate --preset about
//! cargo run -p reveal-cli -- simulate --choreography page.json --frames 600 --json
//! cargo run -p reveal-cli -- simulate --preset cursor --config simulation.json
//! cargo run -p reveal-cli -- init-config simulation.json
//!
//! # 调整日志级别
//! RUST_LOG=reveal_runtime=debug cargo run -p reveal-cli -- simulate --preset hero
//! ```

mod config;
mod render;
mod simulation;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reveal_runtime::{Choreography, SequencerConfig, presets};

use crate::config::SimulationConfig;

#[derive(Parser)]
#[command(name = "reveal")]
#[command(about = "滚动/指针动画编排模拟器")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行一次模拟并输出轨迹
    Simulate {
        /// 内置预设名称
        #[arg(short, long, conflicts_with = "choreography", required_unless_present = "choreography")]
        preset: Option<String>,

        /// 编排 JSON 文件
        #[arg(short, long)]
        choreography: Option<PathBuf>,

        /// 覆盖模拟帧数
        #[arg(short, long)]
        frames: Option<usize>,

        /// 模拟配置文件
        #[arg(long)]
        config: Option<PathBuf>,

        /// 引擎配置文件（步骤默认值、帧参数）
        #[arg(long)]
        sequencer_config: Option<PathBuf>,

        /// 以 JSON 输出轨迹
        #[arg(long)]
        json: bool,
    },

    /// 列出内置预设
    Presets,

    /// 写出默认模拟配置
    InitConfig {
        /// 输出路径（默认：simulation.json）
        #[arg(default_value = "simulation.json")]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            preset,
            choreography,
            frames,
            config,
            sequencer_config,
            json,
        } => {
            let source = match (preset, choreography) {
                (Some(name), _) => Source::Preset(name),
                (None, Some(path)) => Source::File(path),
                (None, None) => {
                    eprintln!("❌ 需要 --preset 或 --choreography");
                    std::process::exit(2);
                }
            };
            let options = SimulateOptions {
                frames,
                config,
                sequencer_config,
                json,
            };
            if let Err(e) = simulate(&source, &options) {
                eprintln!("❌ 模拟失败: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Presets => list_presets(),
        Commands::InitConfig { output } => {
            if let Err(e) = SimulationConfig::default().save(&output) {
                eprintln!("❌ 写出配置失败: {:#}", e);
                std::process::exit(1);
            }
            println!("✅ 已写出 {}", output.display());
        }
    }
}

enum Source {
    Preset(String),
    File(PathBuf),
}

struct SimulateOptions {
    frames: Option<usize>,
    config: Option<PathBuf>,
    sequencer_config: Option<PathBuf>,
    json: bool,
}

fn load_choreography(source: &Source) -> anyhow::Result<Choreography> {
    let doc = match source {
        Source::Preset(name) => presets::load(name)?,
        Source::File(path) => Choreography::load(path)?,
    };
    let problems = doc.diagnostics();
    for problem in &problems {
        tracing::warn!(choreography = %doc.name, "{}", problem);
    }
    Ok(doc)
}

fn load_sequencer_config(path: Option<&Path>) -> anyhow::Result<SequencerConfig> {
    let config = match path {
        Some(path) => SequencerConfig::load(path),
        None => SequencerConfig::default(),
    };
    config.validate().context("引擎配置无效")?;
    Ok(config)
}

fn simulate(source: &Source, options: &SimulateOptions) -> anyhow::Result<()> {
    let doc = load_choreography(source)?;

    let mut config = match &options.config {
        Some(path) => SimulationConfig::load(path),
        None => SimulationConfig::default(),
    };
    if let Some(frames) = options.frames {
        config.frames = frames;
    }
    config.validate().context("模拟配置无效")?;
    let sequencer = load_sequencer_config(options.sequencer_config.as_deref())?;

    let trace = simulation::run(&doc, &config, sequencer)?;
    if options.json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
    } else {
        println!("{}", render::render_trace(&trace));
    }
    Ok(())
}

fn list_presets() {
    for preset in presets::all() {
        println!("{:<16}{}", preset.name, preset.description);
    }
}
