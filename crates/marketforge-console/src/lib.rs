//! Colorful console output for allocation runs.
//!
//! Provides a custom `tracing` layer that formats allocator events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (run/phase start and end, mover rounds, validation)
//! - **DEBUG**: Individual allocations, expansions and rejections
//! - **WARN**: Equipment violations found during validation
//! - **ERROR**: Broken bookkeeping invariants

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static RUN_START_NANOS: AtomicU64 = AtomicU64::new(0);

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Filter used when `RUST_LOG` is unset. Covers every `marketforge*` target.
const DEFAULT_DIRECTIVE: &str = "marketforge=info";

/// Initializes console output with the banner.
///
/// Safe to call multiple times - only the first call has effect.
pub fn init() {
    init_with(true);
}

/// Initializes console output, optionally skipping the banner.
///
/// The filter defaults to `marketforge=info` and honours `RUST_LOG`.
pub fn init_with(banner: bool) {
    INIT.get_or_init(|| {
        if banner {
            print_banner();
        }

        let filter = EnvFilter::builder()
            .with_default_directive(
                DEFAULT_DIRECTIVE
                    .parse()
                    .unwrap_or_else(|_| LevelFilter::INFO.into()),
            )
            .from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(AllocationConsoleLayer)
            .try_init();
    });
}

fn mark_run_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    RUN_START_NANOS.store(nanos, Ordering::Relaxed);
}

fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = RUN_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
 __  __            _        _   _____
|  \/  | __ _ _ __| | _____| |_|  ___|__  _ __ __ _  ___
| |\/| |/ _` | '__| |/ / _ \ __| |_ / _ \| '__/ _` |/ _ \
| |  | | (_| | |  |   <  __/ |_|  _| (_) | | | (_| |  __/
|_|  |_|\__,_|_|  |_|\_\___|\__|_|  \___/|_|  \__, |\___|
                                              |___/
"#;

    let version_line = format!("                   v{} - Market Stand Allocation\n", VERSION);

    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{}", banner.bright_cyan());
    let _ = writeln!(stderr, "{}", version_line.bright_white().bold());
    let _ = stderr.flush();
}

/// A tracing layer that formats allocator events with colors.
///
/// Output goes to stderr so that JSON written to stdout stays parseable.
pub struct AllocationConsoleLayer;

impl<S: Subscriber> Layer<S> for AllocationConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("marketforge") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stderr(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    phase: Option<String>,
    market: Option<String>,
    date: Option<String>,
    merchant: Option<String>,
    stand: Option<String>,
    stands_list: Option<String>,
    reason: Option<String>,
    error: Option<String>,
    phase_index: Option<u64>,
    duration_ms: Option<u64>,
    merchants: Option<u64>,
    stands: Option<u64>,
    queued: Option<u64>,
    available: Option<u64>,
    allocated: Option<u64>,
    rejected: Option<u64>,
    supply: Option<u64>,
    demand: Option<u64>,
    moved: Option<u64>,
    traded: Option<u64>,
    stayed: Option<u64>,
    rounds: Option<u64>,
    equipment_violations: Option<u64>,
    reclaimed: Option<u64>,
    corrected: Option<u64>,
    short: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value).trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "phase" => self.phase = Some(s),
            "market" => self.market = Some(s),
            "date" => self.date = Some(s),
            "merchant" => self.merchant = Some(s),
            "stand" => self.stand = Some(s),
            "stands" => self.stands_list = Some(s),
            "reason" => self.reason = Some(s),
            "error" => self.error = Some(s),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "phase_index" => self.phase_index = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "merchants" => self.merchants = Some(value),
            "stands" => self.stands = Some(value),
            "queued" => self.queued = Some(value),
            "available" => self.available = Some(value),
            "allocated" => self.allocated = Some(value),
            "rejected" => self.rejected = Some(value),
            "supply" => self.supply = Some(value),
            "demand" => self.demand = Some(value),
            "moved" => self.moved = Some(value),
            "traded" => self.traded = Some(value),
            "stayed" => self.stayed = Some(value),
            "rounds" => self.rounds = Some(value),
            "equipment_violations" => self.equipment_violations = Some(value),
            "reclaimed" => self.reclaimed = Some(value),
            "corrected" => self.corrected = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "short" {
            self.short = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_debug(field, &value);
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    match v.event.as_deref().unwrap_or("") {
        "run_start" => format_run_start(v),
        "run_end" => format_run_end(v),
        "phase_start" => format_phase_start(v),
        "phase_end" => format_phase_end(v),
        "market_analysis" => format_analysis(v),
        "movers_resolved" => format_movers(v),
        "validation" => format_validation(v),
        "allocation" | "expansion" if level >= Level::DEBUG => format_allocation(v),
        "rejection" if level >= Level::DEBUG => format_rejection(v),
        "equipment_violation" => format_equipment_violation(v),
        "invariant_violation" => format_invariant_violation(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn count(n: Option<u64>) -> String {
    n.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_run_start(v: &EventVisitor) -> String {
    mark_run_start();
    format!(
        "{} {} Allocating {} on {} │ {} merchants │ {} stands",
        format_elapsed(),
        "▶".bright_green().bold(),
        v.market.as_deref().unwrap_or("?").white().bold(),
        v.date.as_deref().unwrap_or("?"),
        count(v.merchants).bright_yellow(),
        count(v.stands).bright_yellow(),
    )
}

fn format_run_end(v: &EventVisitor) -> String {
    let allocated = v.allocated.unwrap_or(0);
    let rejected = v.rejected.unwrap_or(0);
    let mut output = format!(
        "{} {} Allocation complete │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
    );

    let inner_width: usize = 58;
    let border = "═".repeat(inner_width);
    output.push_str("\n\n");
    output.push_str(&format!("╔{}╗", border).bright_cyan().to_string());
    output.push('\n');
    for (label, value) in [
        ("Allocated merchants:", allocated),
        ("Allocated stands:", v.stands.unwrap_or(0)),
        ("Rejected merchants:", rejected),
    ] {
        output.push_str(&format!(
            "{}  {:<22}{:>32}  {}",
            "║".bright_cyan(),
            label,
            value.to_formatted_string(&Locale::en),
            "║".bright_cyan()
        ));
        output.push('\n');
    }
    output.push_str(&format!("╚{}╝", border).bright_cyan().to_string());
    output.push('\n');
    output
}

fn format_phase_start(v: &EventVisitor) -> String {
    format!(
        "{} {} {} started │ {} queued │ {} free",
        format_elapsed(),
        "▶".bright_blue(),
        v.phase.as_deref().unwrap_or("unknown").white().bold(),
        count(v.queued).bright_yellow(),
        count(v.available).bright_yellow(),
    )
}

fn format_phase_end(v: &EventVisitor) -> String {
    format!(
        "{} {} {} ended │ {} │ {} allocated │ {} queued",
        format_elapsed(),
        "◀".bright_blue(),
        v.phase.as_deref().unwrap_or("unknown").white().bold(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        count(v.allocated).bright_green(),
        count(v.queued).bright_yellow(),
    )
}

fn format_analysis(v: &EventVisitor) -> String {
    let verdict = if v.short.unwrap_or(false) {
        "short".bright_red().bold().to_string()
    } else {
        "sufficient".bright_green().to_string()
    };
    format!(
        "{} {} supply {} │ demand {} │ {}",
        format_elapsed(),
        "≡".bright_magenta(),
        count(v.supply).bright_yellow(),
        count(v.demand).bright_yellow(),
        verdict,
    )
}

fn format_movers(v: &EventVisitor) -> String {
    format!(
        "{} {} {} moved │ {} traded │ {} stayed │ {} rounds",
        format_elapsed(),
        "⇄".bright_cyan(),
        count(v.moved).bright_green(),
        count(v.traded).bright_green(),
        count(v.stayed).white(),
        count(v.rounds).bright_black(),
    )
}

fn format_validation(v: &EventVisitor) -> String {
    let violations = v.equipment_violations.unwrap_or(0);
    let violations = if violations > 0 {
        violations.bright_red().to_string()
    } else {
        violations.bright_green().to_string()
    };
    format!(
        "{} {} {} equipment violations │ {} reclaimed │ {} corrected",
        format_elapsed(),
        "✓".bright_green(),
        violations,
        count(v.reclaimed).yellow(),
        count(v.corrected).bright_green(),
    )
}

fn format_allocation(v: &EventVisitor) -> String {
    format!(
        "{} {} {} → {} ({})",
        format_elapsed(),
        "+".bright_green(),
        v.merchant.as_deref().unwrap_or("?").white(),
        v.stands_list.as_deref().unwrap_or("[]").bright_black(),
        v.phase.as_deref().unwrap_or("").bright_black(),
    )
}

fn format_rejection(v: &EventVisitor) -> String {
    format!(
        "{} {} {} rejected: {}",
        format_elapsed(),
        "✗".bright_red(),
        v.merchant.as_deref().unwrap_or("?").white(),
        v.reason.as_deref().unwrap_or("unknown").yellow(),
    )
}

fn format_equipment_violation(v: &EventVisitor) -> String {
    format!(
        "{} {} {} holds {} without equipment",
        format_elapsed(),
        "!".yellow().bold(),
        v.merchant.as_deref().unwrap_or("?").white(),
        v.stand.as_deref().unwrap_or("?").yellow(),
    )
}

fn format_invariant_violation(v: &EventVisitor) -> String {
    format!(
        "{} {} invariant violated in {}: {}",
        format_elapsed(),
        "✗".bright_red().bold(),
        v.phase.as_deref().unwrap_or("?").white().bold(),
        v.error.as_deref().unwrap_or("").bright_red(),
    )
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}
