use clap::Args;
use clocktimer_core::timer::{format_clock, parse_duration};
use clocktimer_core::Config;

#[derive(Args)]
pub struct FormatArgs {
    /// Duration such as 45s, 5m or 2h5m
    duration: String,
    /// Print H:MM:SS instead of a phrase
    #[arg(long)]
    clock: bool,
}

pub fn run(args: FormatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let duration = parse_duration(&args.duration)?;
    if args.clock {
        println!("{}", format_clock(duration));
        return Ok(());
    }

    let config = Config::load()?;
    // parse_duration never yields a negative value
    let phrase = config.phrases.format_remaining(duration).unwrap_or_default();
    println!("{phrase}");
    Ok(())
}
