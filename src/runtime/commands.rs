//! One-shot CLI commands

use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::api::jwt::JwtService;
use crate::config::AppConfig;

/// 生成 bearer token 并打印到 stdout
pub fn run_token(config: &AppConfig, user: &str, minutes: Option<u64>) -> Result<()> {
    if config.auth.jwt_secret.is_empty() {
        bail!("auth.jwt_secret is not configured; set it in the config file or SNAPLINK__AUTH__JWT_SECRET");
    }
    if user.trim().is_empty() {
        bail!("--user must not be empty");
    }

    let jwt = JwtService::new(&config.auth.jwt_secret, config.auth.access_token_minutes);
    let token = jwt
        .generate_access_token(user.trim(), minutes)
        .context("Failed to sign token")?;

    println!("{}", token);
    Ok(())
}

/// 写出示例配置文件
pub fn run_config_generate(output_path: Option<String>, force: bool) -> Result<()> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());

    if !force && Path::new(&path).exists() {
        bail!("File already exists: {} (use --force to overwrite)", path);
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.blue()
    );

    AppConfig::default()
        .save_to_file(&path)
        .map_err(|e| anyhow::anyhow!("Unable to write configuration file: {}", e))?;

    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    Ok(())
}
