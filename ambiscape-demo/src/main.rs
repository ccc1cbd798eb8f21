mod scene;
mod session;

use anyhow::{Context, Result, bail};

const DEFAULT_SECONDS: f32 = 30.0;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();

    // Optional: `--seconds <n>`
    let args: Vec<String> = std::env::args().collect();
    let seconds = match args.get(1).map(String::as_str) {
        None => DEFAULT_SECONDS,
        Some("--seconds") => {
            let value = args.get(2).context("--seconds needs a value")?;
            value
                .parse::<f32>()
                .with_context(|| format!("invalid duration '{}'", value))?
        }
        Some(other) => bail!("unknown argument '{}', expected --seconds <n>", other),
    };
    if seconds.is_nan() || seconds <= 0.0 {
        bail!("duration must be positive");
    }

    session::run_session(seconds)
}
