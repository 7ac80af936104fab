//! Orbit playback CLI - render trajectory data into an animation file.

use std::fs;
use std::path::{Path, PathBuf};

use orbit_playback::{
    animation::{AnimationPlayer, AnimationRecorder, RecorderConfig},
    playback::{PlaybackSession, TrajectoryStore},
    render::SceneBuffer,
    schema::{PlaybackConfig, TrajectoryFile},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--example" {
        print_example_config();
        return;
    }

    if args.len() > 2 && args[1] == "--inspect" {
        inspect(&PathBuf::from(&args[2]));
        return;
    }

    if args.len() < 3 {
        eprintln!("Usage: {} <config.json> <trajectories.json> [output.orba]", args[0]);
        eprintln!("       {} --inspect <animation.orba>", args[0]);
        eprintln!("       {} --example", args[0]);
        eprintln!();
        eprintln!("Animate precomputed orbital trajectories.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json        Playback configuration");
        eprintln!("  trajectories.json  Per-body position arrays");
        eprintln!("  output.orba        Output animation (default: solar.orba)");
        std::process::exit(1);
    }

    let config_path = PathBuf::from(&args[1]);
    let data_path = PathBuf::from(&args[2]);
    let output_path = PathBuf::from(args.get(3).map(String::as_str).unwrap_or("solar.orba"));

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: PlaybackConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    // Load trajectories
    let data_str = fs::read_to_string(&data_path).unwrap_or_else(|e| {
        eprintln!("Error reading trajectory file: {}", e);
        std::process::exit(1);
    });

    let data: TrajectoryFile = serde_json::from_str(&data_str).unwrap_or_else(|e| {
        eprintln!("Error parsing trajectories: {}", e);
        std::process::exit(1);
    });

    let store = TrajectoryStore::load(&data).unwrap_or_else(|e| {
        eprintln!("Error loading trajectories: {}", e);
        std::process::exit(1);
    });

    println!("Orbit Playback");
    println!("==============");
    println!("Title: {}", config.title);
    println!("Bodies: {}", config.bodies.len());
    println!("Samples per body: {}", store.total_frames());
    println!(
        "Ticks: {} every {}ms",
        config.timing.total_ticks, config.timing.tick_interval_ms
    );
    println!("Output: {}", output_path.display());
    println!();

    let mut session = PlaybackSession::setup(&config, store, SceneBuffer::new())
        .unwrap_or_else(|e| {
            eprintln!("Error setting up scene: {}", e);
            std::process::exit(1);
        });

    let mut recorder =
        AnimationRecorder::new(&output_path, RecorderConfig::from_playback(&config))
            .unwrap_or_else(|e| {
                eprintln!("Error creating output file: {}", e);
                std::process::exit(1);
            });

    let mut driver = session.driver(&config);
    match driver.run(
        config.timing.total_ticks,
        config.timing.tick_interval(),
        &mut session,
        &mut recorder,
    ) {
        Ok(report) => {
            println!(
                "Exported {} in {:.2}s",
                report.stats,
                report.elapsed.as_secs_f32()
            );
        }
        Err(e) => {
            eprintln!(
                "Playback failed after {} frames: {}",
                driver.frames_exported(),
                e
            );
            std::process::exit(1);
        }
    }

    if let Err(e) = session.close() {
        eprintln!("Error releasing scene: {}", e);
        std::process::exit(1);
    }
}

fn inspect(path: &Path) {
    let mut player = AnimationPlayer::open(path).unwrap_or_else(|e| {
        eprintln!("Error opening animation: {}", e);
        std::process::exit(1);
    });

    let header = player.header().clone();
    println!("Animation: {}", path.display());
    println!(
        "  Frames: {} at {} fps, {} kbit/s",
        header.frame_count, header.fps, header.bitrate
    );
    println!("  Tick interval: {}ms", header.tick_interval_ms);
    println!("  Compression: {:?}", header.flags.compression);
    println!("  Artist: {}", player.layout().artist);
    for trail in &player.layout().trails {
        println!("  Trail '{}' {}", trail.label, trail.color);
    }

    let step = (header.frame_count / 10).max(1);
    for (i, frame) in player.frames().enumerate() {
        let frame = frame.unwrap_or_else(|e| {
            eprintln!("Error reading frame {}: {}", i, e);
            std::process::exit(1);
        });
        if (i as u64 + 1) % step == 0 {
            println!("  Frame {}: {} trail points", i, frame.trail_points());
        }
    }
}

fn print_example_config() {
    const SAMPLES: usize = 4;

    let mut config = PlaybackConfig::default();
    config.timing.total_ticks = SAMPLES;
    let keys: Vec<&str> = config.bodies.iter().map(|b| b.key.as_str()).collect();
    let data = TrajectoryFile::synthetic(&keys, SAMPLES);

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
    println!();
    println!("Example trajectories (trajectories.json):");
    match serde_json::to_string_pretty(&data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing trajectories: {}", e),
    }
}
