//! Tracing subscriber setup: unit scopes, console formatter, file layer.
//!
//! The executor runs each unit inside a `unit` span. [`UnitScopeLayer`]
//! remembers the span's unit name so both outputs can prefix the messages
//! emitted while that unit runs.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::span;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::{LookupSpan, Scope};

use super::utils::{log_file_path, strip_ansi};

/// Target used for stage headers.
pub(super) const STAGE_TARGET: &str = "carthage::stage";

/// Target used for dry-run action messages.
pub(super) const DRY_RUN_TARGET: &str = "carthage::dry_run";

/// Span field carrying the unit name.
const UNIT_FIELD: &str = "unit";

/// Run context written at the top of the log file.
#[derive(Debug, Clone, Copy)]
pub struct RunHeader<'a> {
    /// Subcommand name; also names the log file.
    pub command: &'a str,
    /// Configuration file, if one was given.
    pub config: Option<&'a Path>,
    /// Directory units are applied beneath.
    pub sys_root: &'a Path,
}

impl RunHeader<'_> {
    fn render(&self) -> String {
        let version =
            option_env!("CARTHAGE_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let config = self
            .config
            .map_or_else(|| "(none)".to_string(), |p| p.display().to_string());
        format!(
            "==========================================\n\
             Carthage {version} {}\n\
             command:  {}\n\
             config:   {config}\n\
             sys-root: {}\n\
             ==========================================\n",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"),
            self.command,
            self.sys_root.display(),
        )
    }
}

/// Pulls a single named field out of an event or span.
struct FieldExtractor {
    field: &'static str,
    value: Option<String>,
}

impl FieldExtractor {
    const fn new(field: &'static str) -> Self {
        Self { field, value: None }
    }

    fn message(event: &tracing::Event<'_>) -> String {
        let mut extractor = Self::new("message");
        event.record(&mut extractor);
        extractor.value.unwrap_or_default()
    }
}

impl tracing::field::Visit for FieldExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == self.field {
            self.value = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == self.field {
            self.value = Some(value.to_string());
        }
    }
}

/// Unit name stored in the extensions of a `unit` span.
struct UnitScope(String);

/// Records the `unit` field of new spans so formatters can find it.
#[derive(Debug)]
pub(super) struct UnitScopeLayer;

impl<S> Layer<S> for UnitScopeLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let mut unit = FieldExtractor::new(UNIT_FIELD);
        attrs.record(&mut unit);
        if let Some(name) = unit.value
            && let Some(span) = ctx.span(id)
        {
            span.extensions_mut().insert(UnitScope(name));
        }
    }
}

/// Name of the innermost unit the event was emitted under.
fn scoped_unit<S>(scope: Option<Scope<'_, S>>) -> Option<String>
where
    S: for<'a> LookupSpan<'a>,
{
    scope?.find_map(|span| {
        let extensions = span.extensions();
        extensions.get::<UnitScope>().map(|unit| unit.0.clone())
    })
}

/// Prefix `msg` with the unit it belongs to.
fn with_unit(unit: Option<&str>, msg: &str) -> String {
    unit.map_or_else(|| msg.to_string(), |unit| format!("{unit}: {msg}"))
}

/// Appends every event to the per-command log file, timestamped, tagged
/// with its unit, and with ANSI codes stripped.
///
/// Captures `DEBUG` and above regardless of console verbosity.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Create the log directory, truncate the log file for `header.command`
    /// and write the run header.
    ///
    /// Returns `None` if the directory or file cannot be created.
    pub(super) fn new(header: &RunHeader<'_>) -> Option<Self> {
        let path = log_file_path(header.command);
        fs::create_dir_all(path.parent()?).ok()?;
        fs::write(&path, header.render()).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S> Layer<S> for FileLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let unit = scoped_unit(ctx.event_scope(event));
        let msg = with_unit(unit.as_deref(), &strip_ansi(&FieldExtractor::message(event)));
        let ts = chrono::Utc::now().format("%H:%M:%S");

        let line = match (*metadata.level(), metadata.target()) {
            (tracing::Level::INFO, STAGE_TARGET) => format!("[{ts}] ==> {msg}"),
            (tracing::Level::INFO, DRY_RUN_TARGET) => format!("[{ts}]     [dry run] {msg}"),
            (tracing::Level::ERROR, _) => format!("[{ts}]     [error] {msg}"),
            (tracing::Level::WARN, _) => format!("[{ts}]     [warn] {msg}"),
            (tracing::Level::DEBUG | tracing::Level::TRACE, _) => {
                format!("[{ts}]     [debug] {msg}")
            }
            _ => format!("[{ts}]     {msg}"),
        };

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// Console output: stage banners, indented messages, unit-tagged lines.
struct CarthageFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for CarthageFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let unit = scoped_unit(ctx.event_scope());
        let msg = with_unit(unit.as_deref(), &FieldExtractor::message(event));

        match *metadata.level() {
            tracing::Level::ERROR => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            tracing::Level::WARN => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            tracing::Level::INFO => match metadata.target() {
                STAGE_TARGET => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
                DRY_RUN_TARGET => writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
                _ => writeln!(writer, "  {msg}"),
            },
            _ => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output goes to stderr so that command results printed on
/// stdout (plan order, rendered tree) stay pipeable. Every event, including
/// `debug`, is also written to `$XDG_CACHE_HOME/carthage/<command>.log`
/// below `header`. Must be called once at program startup, before any
/// logging.
pub fn init_subscriber(verbose: bool, header: &RunHeader<'_>) {
    use tracing_subscriber::{
        filter::LevelFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let console_layer = fmt::layer()
        .event_format(CarthageFormatter)
        .with_writer(std::io::stderr)
        .with_filter(console_level);

    let file_layer = FileLayer::new(header).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(UnitScopeLayer)
        .with(console_layer)
        .with(file_layer)
        .init();
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn header_names_command_config_and_sys_root() {
        let header = RunHeader {
            command: "apply",
            config: Some(Path::new("/etc/carthage/units.json")),
            sys_root: Path::new("/tmp/carthage"),
        };
        let text = header.render();
        assert!(text.contains("Carthage "));
        assert!(text.contains("command:  apply\n"));
        assert!(text.contains("config:   /etc/carthage/units.json\n"));
        assert!(text.contains("sys-root: /tmp/carthage\n"));
    }

    #[test]
    fn header_without_config() {
        let header = RunHeader {
            command: "plan",
            config: None,
            sys_root: Path::new("/"),
        };
        assert!(header.render().contains("config:   (none)\n"));
    }

    #[test]
    fn with_unit_prefixes_scoped_messages() {
        assert_eq!(with_unit(Some("conf"), "wrote 6 bytes"), "conf: wrote 6 bytes");
        assert_eq!(with_unit(None, "loaded 3 units"), "loaded 3 units");
    }
}
