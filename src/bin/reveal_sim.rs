use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

use spark_reveal::{MAX_WAIT_MS, Page, PageConfig, Step};

#[derive(Parser, Debug)]
#[command(name = "reveal-sim", version, about = "Replay a scroll script against a page description")]
struct Cli {
    /// Page description (TOML).
    page: PathBuf,

    /// Comma-separated steps: `400`, `scroll:400`, `by:-120`, `resize:600`, `wait:250`, `detach:id`.
    #[arg(long, default_value = "0")]
    scroll: String,

    /// Timer time elapsed after every step, in milliseconds.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u64).range(0..=MAX_WAIT_MS))]
    tick_ms: u64,

    /// Only print the final state.
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = PageConfig::load(&cli.page)
        .with_context(|| format!("failed to load page `{}`", cli.page.display()))?;
    let steps = Step::parse_script(&cli.scroll).context("invalid scroll script")?;

    let mut page = Page::mount(&config).context("failed to mount page")?;
    if !cli.quiet {
        print_state(&page, "mount");
    }

    for step in &steps {
        step.apply(&page)
            .with_context(|| format!("step `{step}` failed"))?;
        if cli.tick_ms > 0 {
            page.advance(cli.tick_ms);
        }
        if !cli.quiet {
            print_state(&page, &step.to_string());
        }
    }

    if cli.quiet {
        print_state(&page, "final");
    }

    page.unmount();
    Ok(())
}

fn print_state(page: &Page, label: &str) {
    let metrics = page.viewport().metrics();
    println!(
        "== {label} (scroll_y={:.0}, viewport={:.0}, t={}ms)",
        metrics.scroll_y,
        metrics.height,
        page.scheduler().now_ms()
    );
    for report in page.snapshot() {
        println!("  {report}");
    }
}
