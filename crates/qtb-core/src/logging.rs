use crate::{errors::Error, Result};

/// Initialize tracing for the bot.
///
/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to
/// line-delimited JSON output for log shippers.
pub fn init(service_name: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    // Default: info for our crates, warn for everything else.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,qtb=info,qtb_core=info,qtb_telegram=info,qtb_quran=info,qtb_jsonbin=info,{}=info",
            service_name.replace('-', "_")
        ))
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = fmt().with_env_filter(filter).with_target(false);
    let res = if json {
        builder.json().try_init()
    } else {
        builder.with_ansi(true).try_init()
    };

    res.map_err(|e| Error::Config(format!("failed to install tracing subscriber: {e}")))
}
