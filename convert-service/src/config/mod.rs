use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub common: core_config::Config,
    pub media: MediaConfig,
    pub converter: ConverterConfig,
    pub http: HttpConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory holding `pdfs/` and `docx/`.
    pub root: PathBuf,
    /// Public prefix for stored media. Either a path (`/media/`) resolved
    /// against the request origin, or an absolute `http(s)://` base.
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub program: String,
    /// Arguments with `{input}` and `{output}` placeholders.
    pub args: Vec<String>,
    pub timeout: Duration,
    /// Echo the raw failure message in the `detail` field of error bodies.
    pub expose_error_detail: bool,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// `None` lifts the request body limit entirely.
    pub max_upload_bytes: Option<usize>,
    pub trust_forwarded_headers: bool,
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl ConvertConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Builds the service settings from an arbitrary variable source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").as_deref() == Some("prod");
        let get_env = |key: &str, default: Option<&str>| -> Result<String, AppError> {
            match lookup(key) {
                Some(val) => Ok(val),
                None if is_prod => Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                ))),
                None => default.map(str::to_string).ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!("{} is required but not set", key))
                }),
            }
        };

        let timeout_secs: u64 = parse_var(&lookup, "CONVERTER_TIMEOUT_SECS")?.unwrap_or(300);
        if timeout_secs == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "CONVERTER_TIMEOUT_SECS must be greater than zero"
            )));
        }

        let args = lookup("CONVERTER_ARGS").unwrap_or_else(|| "convert {input} {output}".to_string());

        Ok(ConvertConfig {
            common,
            media: MediaConfig {
                root: PathBuf::from(get_env("MEDIA_ROOT", Some("media"))?),
                url: normalize_media_url(&get_env("MEDIA_URL", Some("/media/"))?),
            },
            converter: ConverterConfig {
                program: lookup("CONVERTER_PROGRAM").unwrap_or_else(|| "pdf2docx".to_string()),
                args: args.split_whitespace().map(str::to_string).collect(),
                timeout: Duration::from_secs(timeout_secs),
                expose_error_detail: parse_bool(&lookup, "EXPOSE_ERROR_DETAIL")?.unwrap_or(true),
            },
            http: HttpConfig {
                max_upload_bytes: parse_var(&lookup, "UPLOAD_MAX_BYTES")?,
                trust_forwarded_headers: parse_bool(&lookup, "TRUST_FORWARDED_HEADERS")?
                    .unwrap_or(false),
            },
            observability: ObservabilityConfig {
                log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|s| !s.is_empty()),
            },
        })
    }
}

/// Ensures a path prefix starts and ends with `/`; absolute URLs only get
/// the trailing slash.
pub fn normalize_media_url(raw: &str) -> String {
    let raw = raw.trim();
    let mut url = if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{}", raw)
    };
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid value for {}: {}", key, e))
            })
        })
        .transpose()
}

fn parse_bool<F>(lookup: &F, key: &str) -> Result<Option<bool>, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Invalid boolean for {}: {}",
                key,
                other
            ))),
        })
        .transpose()
}
