//! Doctor command - verify configuration, episodes and API access.

use crate::cli::Output;
use crate::config::Settings;
use crate::library::Library;
use crate::transcript::discover_episode_files;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("clipcast doctor");
    println!();
    println!("Checking configuration and episodes...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    let api_checks = [
        check_api_key(&settings.generation.api_key_env),
        check_api_base(&settings.generation.api_base),
    ];
    for check in &api_checks {
        check.print();
    }
    checks.extend(api_checks);

    println!();

    println!("{}", style("Episodes").bold());
    let episode_checks = check_episodes(settings);
    for check in &episode_checks {
        check.print();
    }
    checks.extend(episode_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using clipcast.",
            errors
        ));
        anyhow::bail!("{} check(s) failed", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! clipcast is ready to use.");
    }

    Ok(())
}

/// Check that the API key variable named in the config is set.
fn check_api_key(var: &str) -> CheckResult {
    let hint = format!("Set with: export {}='...'", var);
    match std::env::var(var) {
        Ok(key) if key.trim().is_empty() => CheckResult::error(var, "empty", &hint),
        Ok(key) => CheckResult::ok(var, &format!("configured ({})", mask_key(&key))),
        Err(_) => CheckResult::error(var, "not set", &hint),
    }
}

/// Check that the completion endpoint is a usable URL.
fn check_api_base(api_base: &str) -> CheckResult {
    match url::Url::parse(api_base) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => CheckResult::ok("API base", api_base),
        Ok(url) => CheckResult::error(
            "API base",
            &format!("unsupported scheme '{}'", url.scheme()),
            "Use an http(s) URL: clipcast config set generation.api_base https://...",
        ),
        Err(e) => CheckResult::error(
            "API base",
            &format!("invalid URL: {}", e),
            "Set with: clipcast config set generation.api_base https://...",
        ),
    }
}

/// Check the episodes directory and that its files load.
fn check_episodes(settings: &Settings) -> Vec<CheckResult> {
    let dir = settings.episodes_dir();
    let files = match discover_episode_files(&dir) {
        Ok(files) => files,
        Err(_) => {
            return vec![CheckResult::error(
                "Episodes directory",
                &format!("{} (not found)", dir.display()),
                "Pass --episodes <dir> or set general.episodes_dir",
            )]
        }
    };

    if files.is_empty() {
        return vec![CheckResult::error(
            "Episodes directory",
            &format!("{} (no .md files)", dir.display()),
            "Add episode markdown files with transcript frontmatter",
        )];
    }

    let mut results = vec![CheckResult::ok(
        "Episodes directory",
        &format!("{} ({} files)", dir.display(), files.len()),
    )];

    match Library::load_from(&dir, settings.clone()) {
        Ok(library) => results.push(CheckResult::ok(
            "Transcripts",
            &format!(
                "{} episodes, {} segments",
                library.episodes().len(),
                library.index().len()
            ),
        )),
        Err(e) => results.push(CheckResult::error(
            "Transcripts",
            &e.to_string(),
            "Fix the file above or set chunking.on_missing_clip = \"skip\"",
        )),
    }

    results
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if !config_path.exists() {
        return CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: clipcast config edit",
        );
    }

    match Settings::load_from(Some(&config_path.to_path_buf())) {
        Ok(_) => CheckResult::ok("Config file", &config_path.display().to_string()),
        Err(e) => CheckResult::error(
            "Config file",
            &format!("{} ({})", config_path.display(), e),
            "Fix the file with: clipcast config edit",
        ),
    }
}

/// Show only the ends of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SAMPLE_EPISODE;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "****");
        assert_eq!(mask_key("sk-abcdefghijklmnop"), "sk-a...mnop");
    }

    #[test]
    fn test_check_api_base() {
        assert_eq!(check_api_base("https://api.openai.com/v1").status, CheckStatus::Ok);
        assert_eq!(check_api_base("ftp://example.com").status, CheckStatus::Error);
        assert_eq!(check_api_base("not a url").status, CheckStatus::Error);
    }

    #[test]
    fn test_check_episodes() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.episodes_dir = dir.path().display().to_string();

        let results = check_episodes(&settings);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, CheckStatus::Error);

        std::fs::write(dir.path().join("s8e4.md"), SAMPLE_EPISODE).unwrap();
        let results = check_episodes(&settings);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.status == CheckStatus::Ok));
        assert!(results[1].message.starts_with("1 episodes"));
    }

    #[test]
    fn test_check_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(check_config_file(&path).status, CheckStatus::Warning);

        std::fs::write(&path, "[retrieval]\ntop_k = 4\n").unwrap();
        assert_eq!(check_config_file(&path).status, CheckStatus::Ok);

        std::fs::write(&path, "[retrieval\n").unwrap();
        assert_eq!(check_config_file(&path).status, CheckStatus::Error);
    }
}
