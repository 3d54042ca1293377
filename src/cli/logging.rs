use anyhow::Result;
use colored::*;
use std::io::{self, IsTerminal};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default filter directive for the given verbosity
pub fn log_directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }

    match verbosity {
        0 => "lora_convert=info,warn",
        1 => "lora_convert=debug,info",
        2 => "lora_convert=trace,debug",
        _ => "trace",
    }
}

pub fn init_logging(verbosity: u8, quiet: bool, json_output: bool) -> Result<()> {
    // RUST_LOG wins unless the user asked for silence
    let env_filter = if quiet {
        EnvFilter::new(log_directive(verbosity, quiet))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_directive(verbosity, quiet)))
    };

    if json_output {
        // JSON output for machine parsing
        let json_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(io::stderr)
            .with_filter(env_filter);

        tracing_subscriber::registry().with(json_layer).try_init()?;
    } else if io::stderr().is_terminal() {
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_ansi(true)
            .with_writer(io::stderr)
            .event_format(ColoredFormatter)
            .with_filter(env_filter);

        tracing_subscriber::registry().with(fmt_layer).try_init()?;
    } else {
        // Plain output when redirected
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .without_time()
            .with_writer(io::stderr)
            .with_filter(env_filter);

        tracing_subscriber::registry().with(fmt_layer).try_init()?;
    }

    Ok(())
}

/// Custom formatter for colored terminal output
struct ColoredFormatter;

impl<S, N> fmt::FormatEvent<S, N> for ColoredFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(writer, "{} ", now.format("%H:%M:%S").to_string().dimmed())?;

        let level_str = match *event.metadata().level() {
            Level::ERROR => "ERROR".red().bold(),
            Level::WARN => "WARN".yellow().bold(),
            Level::INFO => "INFO".green().bold(),
            Level::DEBUG => "DEBUG".blue().bold(),
            Level::TRACE => "TRACE".purple().bold(),
        };
        write!(writer, "{} ", level_str)?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Log a success message with green checkmark
pub fn success(message: &str) {
    if io::stdout().is_terminal() {
        println!("{} {}", "✓".green().bold(), message);
    } else {
        println!("SUCCESS: {}", message);
    }
}

/// Log an info message with blue info icon
pub fn info(message: &str) {
    if io::stdout().is_terminal() {
        println!("{} {}", "ℹ".blue().bold(), message);
    } else {
        println!("INFO: {}", message);
    }
}

/// Log a warning message with yellow warning icon
pub fn warning(message: &str) {
    if io::stdout().is_terminal() {
        eprintln!("{} {}", "⚠".yellow().bold(), message);
    } else {
        eprintln!("WARNING: {}", message);
    }
}
