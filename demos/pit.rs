//! Headless pit simulation.
//!
//! Usage: `cargo run --example pit -- [SPHERE_FILE] [--config FILE.ron] [--frames N] [--record FILE]`
//!
//! Steps the world at a fixed 60 frames per second of wall clock time and prints
//! what happens. With `--record`, the starting spheres are written out for replay.

use spherepit::{Config, World};

use std::path::PathBuf;

const FRAME_TIME: f64 = 1.0 / 60.0;

#[derive(Default)]
struct Args {
    sphere_file: Option<PathBuf>,
    config: Option<PathBuf>,
    record: Option<PathBuf>,
    frames: Option<usize>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config = Some(iter.next().ok_or("--config needs a file")?.into()),
            "--record" => args.record = Some(iter.next().ok_or("--record needs a file")?.into()),
            "--frames" => {
                let n = iter.next().ok_or("--frames needs a number")?;
                args.frames = Some(n.parse().map_err(|_| format!("invalid frame count {n}"))?);
            }
            _ if args.sphere_file.is_none() => args.sphere_file = Some(arg.into()),
            _ => return Err(format!("unexpected argument {arg}")),
        }
    }
    Ok(args)
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(2);
        }
    };

    let config = match &args.config {
        Some(path) => match std::fs::File::open(path).map_err(Into::into).and_then(Config::read_from_file) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to load config {}: {}", path.display(), err);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    let mut world = match World::from_scene(
        config.world.clone(),
        args.sphere_file.as_deref(),
        &config.generation,
    ) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };
    println!(
        "{} spheres, {} rectangles",
        world.spheres().len(),
        world.rectangles().len()
    );

    if let Some(path) = &args.record {
        let written = std::fs::File::create(path).and_then(|mut file| {
            spherepit::scene::write_spheres(&mut file, &world.sphere_defs())
        });
        if let Err(err) = written {
            eprintln!("Failed to record spheres to {}: {}", path.display(), err);
        }
    }

    let frames = args.frames.unwrap_or(600);
    let started = instant::Instant::now();
    let mut sim_time = 0.0;
    let mut collisions = 0;
    for frame in 0..frames {
        let report = world.tick(FRAME_TIME);
        sim_time += report.simulated;
        collisions += report.collisions;
        if report.removed > 0 {
            println!("frame {}: {} spheres fell out", frame, report.removed);
        }
        if frame % 60 == 59 {
            let resting = world.spheres().iter().filter(|s| s.is_constrained()).count();
            println!(
                "t = {:6.3}s  spheres {:3}  resting {:3}  collisions {:5}",
                sim_time,
                world.spheres().len(),
                resting,
                collisions
            );
        }
    }

    println!(
        "Simulated {:.3}s in {:.3}s of real time",
        sim_time,
        started.elapsed().as_secs_f64()
    );
    for (i, s) in world.spheres().iter().enumerate() {
        let p = s.state.position();
        println!("s{:02} r={:.3} at ({:.3}, {:.3}, {:.3})", i, s.radius, p.x, p.y, p.z);
    }
}
