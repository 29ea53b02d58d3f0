//! Govorun entry point
//!
//! Subcommands:
//! - `clone`    run the full pipeline against the configured engine
//! - `annotate` print the annotated form of a text
//! - `split`    print the engine-sized segments of a text
//! - `speak`    read a text aloud with the system voice for comparison

use govorun::config::Config;
use govorun::pipeline::{Pipeline, PipelineRequest};
use govorun::synth::create_engine;
use govorun::synth::preview::SystemVoice;
use govorun::text::{markup, segment, StressAnnotator};
use govorun::{GovorunError, Result};
use log::{error, info};
use std::io::Read;
use std::path::PathBuf;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");

    // Initialize logger
    if debug_mode {
        // Debug mode: write to govorun.log file
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("govorun.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open govorun.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "govorun version {} starting (debug mode, logging to govorun.log)",
            govorun::VERSION
        );
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Warn)
            .init();
    }

    let args: Vec<String> = args
        .into_iter()
        .filter(|arg| arg != "--debug" && arg != "-d")
        .collect();

    if let Err(e) = run(&args) {
        error!("Fatal error: {}", e);
        eprintln!("Error ({:?} stage): {}", e.stage(), e);
        if let Some(segment) = e.segment_index() {
            eprintln!("Failing segment: {}", segment);
        }
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let command = match args.first() {
        Some(c) => c.as_str(),
        None => {
            print_usage();
            return Ok(());
        }
    };

    match command {
        "clone" => cmd_clone(&args[1..]),
        "annotate" => cmd_annotate(&args[1..]),
        "split" => cmd_split(&args[1..]),
        "speak" => cmd_speak(&args[1..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            process::exit(2);
        }
    }
}

fn print_usage() {
    eprintln!(
        "govorun {} - voice-cloning TTS pipeline

Usage:
  govorun clone --voice <sample.wav> [--text <text> | --file <path>]
                [--out <out.wav>] [--language <code>] [--speed <mult>]
  govorun annotate [--text <text> | --file <path>]
  govorun split [--text <text> | --file <path>] [--max-length <chars>]
  govorun speak [--text <text> | --file <path>] [--speed <mult>]

With neither --text nor --file, text is read from stdin.
Global flags: --debug (log to govorun.log)

Stress markers: '+' before/after a vowel strengthens it (зам+ок),
'-' weakens it. Emphasis: *word*. Pause: ... or <break time=\"300ms\"/>.
Configuration lives in ~/.govorun.cfg",
        govorun::VERSION
    );
}

/// Run the full cloning pipeline on a worker thread, relaying progress
fn cmd_clone(args: &[String]) -> Result<()> {
    let voice = flag_value(args, "--voice")
        .ok_or_else(|| GovorunError::Config("clone requires --voice <sample>".to_string()))?;
    let text = read_text(args)?;
    let output = flag_value(args, "--out").unwrap_or_else(|| "cloned.wav".to_string());
    let language = flag_value(args, "--language");
    let speed = parse_flag::<f32>(args, "--speed")?;

    let config = Config::load()?;
    let pipeline = Pipeline::from_config(&config)?;
    let engine = create_engine(&config)?;

    let request = PipelineRequest {
        text,
        speaker_wav: PathBuf::from(voice),
        output: PathBuf::from(&output),
        language,
        speed,
    };

    let (handle, progress) = pipeline.run_in_thread(engine, request);
    for event in progress {
        eprintln!("[{}/{}] {}", event.current, event.total, event.status);
    }

    let result = handle
        .join()
        .map_err(|_| GovorunError::Other("Pipeline thread panicked".to_string()))??;

    println!(
        "Wrote {:?}: {:.1}s at {} Hz ({} segments)",
        result.path, result.duration_secs, result.sample_rate, result.segments
    );
    Ok(())
}

fn cmd_annotate(args: &[String]) -> Result<()> {
    let text = read_text(args)?;
    let config = Config::load()?;
    let annotator = StressAnnotator::with_exceptions(config.load_stress_exceptions()?);
    println!("{}", markup::normalize(&annotator.annotate(&text)));
    Ok(())
}

fn cmd_split(args: &[String]) -> Result<()> {
    let text = read_text(args)?;
    let config = Config::load()?;
    let max_length = parse_flag::<usize>(args, "--max-length")?
        .unwrap_or_else(|| config.max_segment_length());

    let annotator = StressAnnotator::with_exceptions(config.load_stress_exceptions()?);
    let annotated = markup::normalize(&annotator.annotate(&text));

    for (i, seg) in segment::segment_text(&annotated, max_length).iter().enumerate() {
        println!("{:3}. [{:3}] {}", i + 1, seg.chars().count(), seg);
    }
    Ok(())
}

fn cmd_speak(args: &[String]) -> Result<()> {
    let text = read_text(args)?;
    let config = Config::load()?;
    let annotator = StressAnnotator::with_exceptions(config.load_stress_exceptions()?);
    let annotated = markup::normalize(&annotator.annotate(&text));

    let mut voice = SystemVoice::new()?;
    let speed = parse_flag::<f32>(args, "--speed")?.unwrap_or_else(|| config.speed());
    voice.set_speed(speed)?;
    voice.speak(&annotated)
}

/// Value of `--name <value>`, if present
fn flag_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// Parsed value of `--name <value>`; an unparsable value is an error,
/// a missing flag is None
fn parse_flag<T: std::str::FromStr>(args: &[String], name: &str) -> Result<Option<T>> {
    match flag_value(args, name) {
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
            GovorunError::Config(format!("Invalid value for {}: {}", name, raw))
        }),
        None => Ok(None),
    }
}

/// Text from --text, --file, or stdin (in that priority order)
fn read_text(args: &[String]) -> Result<String> {
    if let Some(text) = flag_value(args, "--text") {
        return Ok(text);
    }
    if let Some(path) = flag_value(args, "--file") {
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}
