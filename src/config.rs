use crate::cli::Args;
use crate::error::{ErrorContext, Result};
use crate::mutator::MutationSpec;
use crate::types::{AddressingStyle, BucketFinderError, ScanConfig};
use crate::utils::{read_lines, sanitize, sanitize_all};
use log::{debug, warn};
use serde::Deserialize;
use std::env;
use std::fs;
use std::io::{self, BufRead};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    scan: ScanSection,
    http: HttpSection,
    dns: DnsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScanSection {
    workers: Option<usize>,
    delay_ms: Option<u64>,
    output_dir: Option<PathBuf>,
    enumerate: Option<bool>,
    dns_only: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct HttpSection {
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    proxy: Option<String>,
    endpoint: Option<String>,
    path_style: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DnsSection {
    resolver: Option<String>,
    timeout_ms: Option<u64>,
}

/// Assemble the scan configuration: defaults, then the config file,
/// then environment, then command line.
pub fn load_config(args: &Args) -> Result<ScanConfig> {
    let mut config = ScanConfig::default();

    if let Some(path) = &args.config_path {
        let contents = fs::read_to_string(path)
            .config_context(|| format!("Failed to read config file {}", path.display()))?;
        apply_file_config(&mut config, &contents)?;
    }

    apply_env_overrides(&mut config, |key| env::var(key).ok());
    apply_args(&mut config, args);
    validate_config(&config)?;

    Ok(config)
}

fn apply_file_config(config: &mut ScanConfig, contents: &str) -> Result<()> {
    let file = toml::from_str::<FileConfig>(contents).config_context(|| "Failed to parse config file".to_string())?;

    let scan = file.scan;
    if let Some(workers) = scan.workers {
        config.workers = workers;
    }
    if let Some(delay_ms) = scan.delay_ms {
        config.delay = Duration::from_millis(delay_ms);
    }
    if let Some(output_dir) = scan.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(enumerate) = scan.enumerate {
        config.enumerate = enumerate;
    }
    if let Some(dns_only) = scan.dns_only {
        config.dns_only = dns_only;
    }

    let http = file.http;
    if let Some(timeout_secs) = http.timeout_secs {
        config.http.timeout = Duration::from_secs(timeout_secs);
    }
    if let Some(user_agent) = http.user_agent {
        config.http.user_agent = user_agent;
    }
    if http.proxy.is_some() {
        config.http.proxy = http.proxy;
    }
    if let Some(endpoint) = http.endpoint {
        config.http.endpoint = endpoint;
    }
    if let Some(path_style) = http.path_style {
        config.http.addressing = if path_style {
            AddressingStyle::Path
        } else {
            AddressingStyle::VirtualHost
        };
    }

    let dns = file.dns;
    if let Some(resolver) = dns.resolver {
        config.dns.resolver = resolver;
    }
    if let Some(timeout_ms) = dns.timeout_ms {
        config.dns.timeout = Duration::from_millis(timeout_ms);
    }

    Ok(())
}

fn apply_env_overrides<F>(config: &mut ScanConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(proxy) = lookup("BUCKETFINDER_PROXY") {
        config.http.proxy = Some(proxy);
    }
    if let Some(user_agent) = lookup("BUCKETFINDER_USER_AGENT") {
        config.http.user_agent = user_agent;
    }
    if let Some(resolver) = lookup("BUCKETFINDER_RESOLVER") {
        config.dns.resolver = resolver;
    }
}

fn apply_args(config: &mut ScanConfig, args: &Args) {
    if let Some(workers) = args.concurrency {
        config.workers = workers;
    }
    if let Some(delay) = args.delay {
        config.delay = Duration::from_millis(delay);
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.http.endpoint = endpoint.clone();
    }
    if args.path_style {
        config.http.addressing = AddressingStyle::Path;
    }
    config.resume = args.resume;
    config.skip = args.skip;
    config.dns_only |= args.dns_only;
    config.enumerate |= args.enumerate;
    config.output.silent = args.silent;
    config.output.color = !args.no_color;
    config.output.progress = !args.no_progress;
}

fn validate_config(config: &ScanConfig) -> Result<()> {
    if config.workers == 0 {
        return Err(BucketFinderError::ConfigError("Worker count must be at least 1".to_string()));
    }
    if config.http.timeout.is_zero() {
        return Err(BucketFinderError::ConfigError("HTTP timeout must be greater than 0".to_string()));
    }
    if config.dns.timeout.is_zero() {
        return Err(BucketFinderError::ConfigError("DNS timeout must be greater than 0".to_string()));
    }
    config
        .dns
        .resolver
        .parse::<SocketAddr>()
        .config_context(|| format!("Invalid resolver address {}", config.dns.resolver))?;
    Ok(())
}

/// Read a mutation list. No file, or a missing one, gives `[""]`.
pub fn load_list(path: Option<&Path>) -> Result<Vec<String>> {
    let Some(path) = path else {
        return Ok(vec![String::new()]);
    };

    match read_lines(path) {
        Ok(lines) => {
            debug!("Loaded {} entries from {}", lines.len(), path.display());
            Ok(sanitize_all(lines))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("{} not found, continuing without it", path.display());
            Ok(vec![String::new()])
        }
        Err(e) => Err(BucketFinderError::ConfigError(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Sanitize raw keywords, dropping the ones that end up empty.
pub fn clean_keywords<I, S>(raw: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut keywords = Vec::new();
    for keyword in raw {
        let cleaned = sanitize(keyword.as_ref());
        if cleaned.is_empty() {
            if !keyword.as_ref().trim().is_empty() {
                warn!("Keyword {:?} has no usable characters, skipping", keyword.as_ref());
            }
            continue;
        }
        keywords.push(cleaned);
    }

    if keywords.is_empty() {
        return Err(BucketFinderError::ConfigError("No keywords provided".to_string()));
    }
    Ok(keywords)
}

/// Keywords from the command line, or from stdin when none were given.
pub fn load_keywords(args: &Args) -> Result<Vec<String>> {
    if !args.use_stdin() {
        return clean_keywords(&args.keywords);
    }

    let stdin = io::stdin();
    let lines = stdin
        .lock()
        .lines()
        .collect::<io::Result<Vec<String>>>()
        .config_context(|| "Failed to read keywords from stdin".to_string())?;
    clean_keywords(lines)
}

pub fn load_mutation_spec(keywords: Vec<String>, args: &Args) -> Result<MutationSpec> {
    Ok(MutationSpec::new(
        keywords,
        load_list(args.wordlist.as_deref())?,
        load_list(args.prefixes.as_deref())?,
        load_list(args.suffixes.as_deref())?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    #[test]
    fn test_file_config_overrides_defaults() {
        let mut config = ScanConfig::default();
        let contents = r#"
            [scan]
            workers = 12
            delay_ms = 50
            output_dir = "results"
            enumerate = true

            [http]
            timeout_secs = 3
            endpoint = "http://127.0.0.1:9000"
            path_style = true

            [dns]
            resolver = "1.1.1.1:53"
        "#;

        apply_file_config(&mut config, contents).unwrap();

        assert_eq!(config.workers, 12);
        assert_eq!(config.delay, Duration::from_millis(50));
        assert_eq!(config.output_dir, PathBuf::from("results"));
        assert!(config.enumerate);
        assert!(!config.dns_only);
        assert_eq!(config.http.timeout, Duration::from_secs(3));
        assert_eq!(config.http.addressing, AddressingStyle::Path);
        assert_eq!(config.dns.resolver, "1.1.1.1:53");
        assert_eq!(config.dns.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_file_config_rejects_unknown_keys() {
        let mut config = ScanConfig::default();
        assert!(apply_file_config(&mut config, "[scan]\nthreads = 3\n").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [("BUCKETFINDER_RESOLVER", "9.9.9.9:53")].into_iter().collect();
        let mut config = ScanConfig::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.dns.resolver, "9.9.9.9:53");
        assert!(config.http.proxy.is_none());
    }

    #[test]
    fn test_args_override_everything() {
        let args = Args::try_parse_from(["bucketfinder", "-c", "1", "-d", "0", "--resume", "--dns", "acme"]).unwrap();
        let mut config = ScanConfig::default();
        config.workers = 8;
        apply_args(&mut config, &args);

        assert_eq!(config.workers, 1);
        assert_eq!(config.mode(), crate::types::DispatchMode::Sequential);
        assert!(config.delay.is_zero());
        assert!(config.resume);
        assert!(config.dns_only);
    }

    #[test]
    fn test_validate_config() {
        assert!(validate_config(&ScanConfig::default()).is_ok());

        let mut config = ScanConfig::default();
        config.workers = 0;
        assert!(validate_config(&config).is_err());

        let mut config = ScanConfig::default();
        config.dns.resolver = "dns.google".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_list_missing_file_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert_eq!(load_list(Some(&missing)).unwrap(), vec![""]);
        assert_eq!(load_list(None).unwrap(), vec![""]);
    }

    #[test]
    fn test_load_list_sanitizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "Dev\nPROD_01\n\nstaging!\n").unwrap();
        assert_eq!(load_list(Some(&path)).unwrap(), vec!["dev", "prod01", "", "staging"]);
    }

    #[test]
    fn test_load_list_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_list(Some(dir.path())).is_err());
    }

    #[test]
    fn test_clean_keywords() {
        assert_eq!(clean_keywords(["Acme", "??", "acme_corp"]).unwrap(), vec!["acme", "acmecorp"]);
        assert!(clean_keywords(["!!!", ""]).is_err());
        assert!(clean_keywords(Vec::<String>::new()).is_err());
    }
}
