//! Config 命令 - 打印生效的配置

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::config::BridgeConfig;

/// Config 命令参数
#[derive(Args)]
pub struct ConfigArgs {
    /// 配置文件路径（默认 ~/.config/push-bridge/config.json）
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Config 命令输出
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub path: PathBuf,
    pub offline_store: PathBuf,
    pub config: BridgeConfig,
}

/// 处理 config 命令
pub fn handle_config(args: ConfigArgs) -> Result<()> {
    let path = args.config.unwrap_or_else(BridgeConfig::default_path);
    let config = BridgeConfig::load_from(&path)?;
    let output = ConfigOutput {
        path,
        offline_store: config.offline_store_path(),
        config,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
