//! Runs every walkthrough step in order and prints what it reports.

use tracing_subscriber::{fmt, EnvFilter};

use meterkit::tour;

fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run() {
        tracing::error!(error = %e, code = e.code().as_str(), "tour failed");
        std::process::exit(1);
    }
}

fn run() -> meterkit::core::Result<()> {
    println!("SimpleMeterRegistry - employees {:.1}", tour::simple_registry()?);
    println!(
        "CompositeRegistry (increments before add) - employees {:.1}",
        tour::composite_before_member()?
    );
    println!(
        "CompositeRegistry (increments after add) - employees {:.1}",
        tour::composite_after_member()?
    );
    println!("GlobalRegistry - employees {:.1}", tour::global_registry()?);
    println!("CounterBuilder - students {:.1}", tour::counter_builder()?);

    let (count, ms) = tour::timer()?;
    println!("Timer - {count} event(s), {ms} ms");

    let (before, after) = tour::gauge_builder()?;
    println!("GaugeBuilder - {before} elements");
    println!("GaugeBuilder - {after} elements");

    Ok(())
}
