//! Push Bridge CLI
//!
//! 回放推送/生命周期脚本，观察投递核心的行为

use anyhow::Result;
use clap::{Parser, Subcommand};
use push_bridge::{
    cli::{ConfigArgs, SimulateArgs},
    BridgeConfig,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "push-bridge")]
#[command(about = "Push Bridge - 推送消息投递协调")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 回放 JSONL 脚本并打印消费者收到的调用
    Simulate(SimulateArgs),
    /// 打印生效的配置
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 通过 RUST_LOG 控制日志级别，其次是配置文件中的 log_filter，默认 info
    // 例如: RUST_LOG=debug push-bridge simulate script.jsonl
    let configured = match &cli.command {
        Commands::Simulate(args) => args.config.clone(),
        Commands::Config(args) => args.config.clone(),
    }
    .unwrap_or_else(BridgeConfig::default_path);
    let default_filter = BridgeConfig::load_from(&configured)
        .ok()
        .and_then(|c| c.log_filter)
        .unwrap_or_else(|| "push_bridge=info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    match cli.command {
        Commands::Simulate(args) => push_bridge::cli::handle_simulate(args)?,
        Commands::Config(args) => push_bridge::cli::handle_config(args)?,
    }

    Ok(())
}
