#[cfg(not(target_arch = "wasm32"))]
mod terminal {
    use std::time::Duration;

    use log::{debug, info, warn};

    use levenshtein_viz::levenshtein::unit_distance;
    use levenshtein_viz::playback::Highlight;
    use levenshtein_viz::presets::{self, PRESET_PAIRS};
    use levenshtein_viz::ticker::ThreadTicker;
    use levenshtein_viz::view::MatrixView;
    use levenshtein_viz::{
        Granularity, PlaybackState, Session, TickScheduler, VisualizerConfig, VisualizerError,
    };

    const USAGE: &str = "Usage: levenshtein_viz [--preset N | <source> <target>] [--interval-ms MS] [--grapheme]";

    enum Inputs {
        Preset(usize),
        Pair(String, String),
    }

    struct Args {
        inputs: Inputs,
        config: VisualizerConfig,
    }

    fn parse_args() -> Result<Args, String> {
        let mut args = std::env::args();
        args.next();

        let mut config = VisualizerConfig::default();
        let mut preset = None;
        let mut positional = Vec::new();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--preset" => {
                    let value = args.next().ok_or_else(|| format!("--preset needs a value\n{}", USAGE))?;
                    preset = Some(value.parse::<usize>().map_err(|e| format!("bad preset index '{}': {}", value, e))?);
                }
                "--interval-ms" => {
                    let value = args.next().ok_or_else(|| format!("--interval-ms needs a value\n{}", USAGE))?;
                    config.tick_interval_ms = value.parse().map_err(|e| format!("bad interval '{}': {}", value, e))?;
                }
                "--grapheme" => config.engine.granularity = Granularity::Grapheme,
                "-h" | "--help" => return Err(USAGE.to_string()),
                _ => positional.push(arg),
            }
        }

        let inputs = match (preset, positional.len()) {
            (Some(index), 0) => Inputs::Preset(index),
            (None, 0) => Inputs::Preset(0),
            (None, 2) => {
                let target = positional.pop().unwrap_or_default();
                let source = positional.pop().unwrap_or_default();
                Inputs::Pair(source, target)
            }
            _ => return Err(USAGE.to_string()),
        };
        Ok(Args { inputs, config })
    }

    fn render_table(view: &MatrixView) -> String {
        let mut out = String::from("          ");
        for label in &view.column_labels {
            out.push_str(&format!("{:>5}", label));
        }
        out.push('\n');
        for row in &view.rows {
            let label = row.label.as_deref().unwrap_or("");
            out.push_str(&format!("{:>3} {:>3}  ", label, row.index));
            for cell in &row.cells {
                let text = match cell.highlight {
                    Highlight::Current => format!("[{}]", cell.value),
                    Highlight::Related => format!("({})", cell.value),
                    Highlight::None => cell.value.to_string(),
                };
                out.push_str(&format!("{:>5}", text));
            }
            out.push('\n');
        }
        out
    }

    fn print_status<S: TickScheduler>(session: &Session<S>) {
        let status = session.status();
        println!("{}: {}", status.label, status.description.unwrap_or_default());
        for line in status.details {
            println!("    {}", line);
        }
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let args = parse_args()?;
        let (ticker, ticks) = ThreadTicker::new();
        let mut session = Session::new(args.config, ticker)?;
        match args.inputs {
            Inputs::Preset(index) => {
                let pair = presets::preset(index).map_err(|e| {
                    format!("{} (there are {} presets)", e, PRESET_PAIRS.len())
                })?;
                println!("{}", pair.label);
                session.select_preset(index)?;
            }
            Inputs::Pair(source, target) => match session.set_inputs(&source, &target) {
                Ok(()) => {}
                Err(err @ VisualizerError::InputTooLarge { .. }) => {
                    warn!("{}; printing the distance without a replay", err);
                    let granularity = session.config().engine.granularity;
                    println!(
                        "Levenshtein distance: {}",
                        unit_distance(&source, &target, granularity)
                    );
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            },
        }

        println!("Levenshtein distance: {}", session.distance());
        println!("{}", render_table(&session.matrix_view()));

        if !session.start() {
            return Err("could not start the replay".into());
        }
        print_status(&session);
        let timeout = session.config().tick_interval() * 2 + Duration::from_secs(1);
        while session.state() == PlaybackState::Running {
            let token = ticks.recv_timeout(timeout)?;
            if session.tick(token) {
                print_status(&session);
            } else {
                debug!("dropped tick of generation {}", token.generation());
            }
        }

        println!();
        println!("{}", render_table(&session.matrix_view()));
        info!("replayed {} steps", session.playback().len());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    terminal::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
