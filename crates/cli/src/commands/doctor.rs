//! Doctor command - validate configuration and show status

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    provider: CheckResult,
    media_dir: CheckResult,
    limits: CheckResult,
    brand_voice: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        provider: CheckResult::error("Not checked"),
        media_dir: CheckResult::error("Not checked"),
        limits: CheckResult::error("Not checked"),
        brand_voice: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    match AppConfig::load(config_path.as_deref()) {
        Ok(config) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            report.provider = check_provider(&config);
            report.media_dir = check_media_dir(&config.general.media_dir);
            report.limits = check_limits(&config);
            report.brand_voice = check_brand_voice(&config);
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
        }
    }

    let checks = [
        &report.config,
        &report.provider,
        &report.media_dir,
        &report.limits,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_provider(config: &AppConfig) -> CheckResult {
    let provider = &config.provider;

    match provider.kind.as_str() {
        "stub" => return CheckResult::ok("Provider: stub (offline)"),
        "gemini" => {}
        other => return CheckResult::error(format!("Unknown provider kind: {}", other)),
    }

    let details = serde_json::json!({
        "base_url": provider.base_url,
        "text_model": provider.text_model,
        "image_model": provider.image_model,
        "image_edit_model": provider.image_edit_model,
        "video_model": provider.video_model,
    });

    if provider.api_key_env.is_empty() {
        return CheckResult::error("No API key env var configured for gemini");
    }

    // Never reveal the key itself
    match std::env::var(&provider.api_key_env) {
        Ok(val) if !val.trim().is_empty() => CheckResult::ok(format!(
            "Provider: gemini, Model: {}, API key: {} (set)",
            provider.text_model, provider.api_key_env
        ))
        .with_details(details),
        Ok(_) => CheckResult::error(format!(
            "Provider: gemini, API key: {} (empty)",
            provider.api_key_env
        )),
        Err(_) => CheckResult::warn(format!(
            "Provider: gemini, Model: {}, API key: {} (not set)",
            provider.text_model, provider.api_key_env
        ))
        .with_details(details),
    }
}

fn check_media_dir(dir: &Path) -> CheckResult {
    if !dir.exists() {
        return CheckResult::warn(format!(
            "Media directory does not exist yet (created on first video): {}",
            dir.display()
        ));
    }

    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => {
            CheckResult::ok(format!("Media directory: {}", dir.display()))
        }
        Ok(meta) if meta.is_dir() => {
            CheckResult::error(format!("Media directory is read-only: {}", dir.display()))
        }
        Ok(_) => CheckResult::error(format!("Media path is not a directory: {}", dir.display())),
        Err(e) => CheckResult::error(format!("Cannot inspect media directory: {}", e)),
    }
}

fn check_limits(config: &AppConfig) -> CheckResult {
    let limits = &config.limits;
    if limits.rate_limit_per_minute == 0 && limits.rate_limit_per_hour == 0 {
        return CheckResult::ok("Rate limiting disabled");
    }

    CheckResult::ok(format!(
        "Rate limits: {}/minute, {}/hour (0 = unlimited)",
        limits.rate_limit_per_minute, limits.rate_limit_per_hour
    ))
}

fn check_brand_voice(config: &AppConfig) -> CheckResult {
    if config.brand_voice.is_empty() {
        CheckResult::ok("No brand voice configured")
    } else {
        CheckResult::ok("Brand voice configured").with_details(serde_json::to_value(
            &config.brand_voice,
        )
        .unwrap_or_default())
    }
}

fn print_report(report: &DoctorReport) {
    println!("content-studio Doctor Report");
    println!("============================");
    println!();

    print_check("Config", &report.config);
    print_check("Provider", &report.provider);
    print_check("Media Directory", &report.media_dir);
    print_check("Rate Limits", &report.limits);
    print_check("Brand Voice", &report.brand_voice);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready! Try: content-studio tweet \"your topic\"");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
