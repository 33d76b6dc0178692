//! CLI configuration.

use anyhow::{bail, Context, Result};
use onec_odata_client::{ConnectionConfig, ProxyConfig};
use std::time::Duration;

/// Load connection settings from environment variables.
///
/// # Environment Variables
///
/// - `ONEC_ODATA_URL`: Root of the published OData interface
/// - `ONEC_ODATA_USERNAME`: 1C user name
/// - `ONEC_ODATA_PASSWORD`: Password
/// - `ONEC_ODATA_PROXY`: Proxy as `host:port`
/// - `ONEC_ODATA_PROXY_SECURED`: `true` to reach the proxy over HTTPS
/// - `ONEC_ODATA_TIMEOUT_SECS`: Request timeout in seconds
///
/// # Errors
///
/// Returns error if a variable is present but cannot be parsed.
pub fn from_env() -> Result<ConnectionConfig> {
    let mut config = ConnectionConfig::default();

    if let Ok(url) = std::env::var("ONEC_ODATA_URL") {
        config.base_url = url;
    }

    if let Ok(username) = std::env::var("ONEC_ODATA_USERNAME") {
        config.username = Some(username);
    }

    if let Ok(password) = std::env::var("ONEC_ODATA_PASSWORD") {
        config.password = Some(password);
    }

    if let Ok(proxy) = std::env::var("ONEC_ODATA_PROXY") {
        let secured = match std::env::var("ONEC_ODATA_PROXY_SECURED") {
            Ok(value) => parse_flag(&value).context("Invalid ONEC_ODATA_PROXY_SECURED")?,
            Err(_) => false,
        };
        config.proxy = Some(parse_proxy(&proxy, secured).context("Invalid ONEC_ODATA_PROXY")?);
    }

    if let Ok(secs) = std::env::var("ONEC_ODATA_TIMEOUT_SECS") {
        let secs: u64 = secs
            .trim()
            .parse()
            .context("Invalid ONEC_ODATA_TIMEOUT_SECS")?;
        config.timeout = Duration::from_secs(secs);
    }

    Ok(config)
}

fn parse_proxy(value: &str, secured: bool) -> Result<ProxyConfig> {
    let (host, port) = value
        .rsplit_once(':')
        .with_context(|| format!("expected host:port, got {value:?}"))?;
    if host.is_empty() {
        bail!("empty proxy host in {value:?}");
    }
    let port = port
        .parse()
        .with_context(|| format!("invalid proxy port {port:?}"))?;

    Ok(ProxyConfig {
        host: host.to_string(),
        port,
        secured,
    })
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => bail!("expected a boolean, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_host_and_port() {
        let proxy = parse_proxy("proxy.local:3128", true).unwrap();
        assert_eq!(proxy.host, "proxy.local");
        assert_eq!(proxy.port, 3128);
        assert!(proxy.secured);
    }

    #[test]
    fn proxy_rejects_bad_input() {
        assert!(parse_proxy("proxy.local", false).is_err());
        assert!(parse_proxy(":3128", false).is_err());
        assert!(parse_proxy("proxy.local:http", false).is_err());
        assert!(parse_proxy("proxy.local:70000", false).is_err());
    }

    #[test]
    fn flags() {
        assert!(parse_flag("true").unwrap());
        assert!(parse_flag("YES").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}
