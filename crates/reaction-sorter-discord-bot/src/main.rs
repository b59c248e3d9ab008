use dotenvy::dotenv;
use reaction_sorter_core::config::SorterSettings;
use reaction_sorter_transport_discord::config::{BotSettings, DiscordSettings};
use reaction_sorter_transport_discord::runner::run_bot;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Discord credentials masked in every log line, applied in order
const REDACTION_RULES: [(&str, &str); 3] = [
    (r"DISCORD_TOKEN=[^\s&]+", "DISCORD_TOKEN=[MASKED]"),
    (r"(Bot )[A-Za-z0-9._-]{20,}", "${1}[DISCORD_TOKEN]"),
    (
        r"[MNO][A-Za-z0-9_-]{23,27}\.[A-Za-z0-9_-]{6}\.[A-Za-z0-9_-]{27,40}",
        "[DISCORD_TOKEN]",
    ),
];

/// Compiled [`REDACTION_RULES`]
struct TokenRedactor {
    rules: Vec<(Regex, &'static str)>,
}

impl TokenRedactor {
    /// # Errors
    ///
    /// Returns an error if any rule fails to compile
    fn new() -> Result<Self, regex::Error> {
        let rules = REDACTION_RULES
            .iter()
            .map(|(pattern, replacement)| Ok((Regex::new(pattern)?, *replacement)))
            .collect::<Result<_, regex::Error>>()?;
        Ok(Self { rules })
    }

    fn redact(&self, input: &str) -> String {
        self.rules
            .iter()
            .fold(input.to_string(), |line, (regex, replacement)| {
                regex.replace_all(&line, *replacement).into_owned()
            })
    }
}

/// Writer that masks credentials before forwarding to `inner`
struct RedactingWriter<W: Write> {
    inner: W,
    redactor: Arc<TokenRedactor>,
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let line = String::from_utf8_lossy(buf);
        self.inner
            .write_all(self.redactor.redact(&line).as_bytes())?;
        // Callers track progress against their own buffer
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Before logging, so nothing is ever written unredacted
    let redactor = Arc::new(TokenRedactor::new().map_err(|e| {
        eprintln!("Failed to compile redaction rules: {e}");
        e
    })?);

    init_logging(redactor);

    info!("Starting reaction sorter Discord bot...");

    let settings = init_settings();

    if let Err(e) = run_bot(settings).await {
        error!("Discord client stopped with error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(redactor: Arc<TokenRedactor>) {
    let make_writer = move || RedactingWriter {
        inner: io::stderr(),
        redactor: redactor.clone(),
    };

    let debug_mode = std::env::var("DEBUG_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let filter = if debug_mode {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "reaction_sorter_core=info,reaction_sorter_transport_discord=info,reaction_sorter_discord_bot=info,serenity=warn,hyper=warn,h2=error,reqwest=warn,tungstenite=warn,tokio=warn",
            )
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Arc<BotSettings> {
    let sorter_settings = match SorterSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load sorter configuration: {}", e);
            std::process::exit(1);
        }
    };
    let discord_settings = match DiscordSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load discord configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        prefix = %sorter_settings.command_prefix,
        destination = %sorter_settings.sorted_channel_name,
        "Configuration loaded successfully."
    );
    Arc::new(BotSettings::new(sorter_settings, discord_settings))
}
