// Copyright 2020 TwoCookingMice

use cherenkov::core::config::Config;
use cherenkov::core::detector::Detector;
use cherenkov::core::rng::LcgRng;
use cherenkov::core::shower::{Shower, ShowerParams};
use cherenkov::core::shower_generator::ShowerGenerator;
use cherenkov::optics::telescope::Telescope;
use cherenkov::reconstruction::analysis::{largest_cluster, triggered_pixels};
use cherenkov::reconstruction::reconstructor::Reconstructor;

use std::env;
use std::error::Error;

struct Options {
    config_path: String,
    seed: Option<u64>,
    transparent: bool,
    noise: bool,
}

fn parse_args(args: &[String]) -> Option<Options> {
    let config_path = args.get(1)?.clone();
    let mut options = Options { config_path, seed: None, transparent: false, noise: true };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                options.seed = args.get(i).and_then(|v| v.parse::<u64>().ok());
            }
            "--transparent" => options.transparent = true,
            "--no-noise" => options.noise = false,
            other => log::warn!("Ignoring unknown argument {}.", other),
        }
        i += 1;
    }
    Some(options)
}

fn run(options: &Options) -> Result<(), Box<dyn Error>> {
    let mut config = Config::from_file(&options.config_path)?;
    if options.transparent {
        config.set("camera_transparent", "true");
    }
    let seed = match options.seed {
        Some(seed) => seed,
        None => config.u64_or("seed", 0)?,
    };

    let telescope = Telescope::from_config(&config)?;
    let generator = ShowerGenerator::from_config(&config)?;
    let shower: Shower = generator.shower_at(ShowerParams::from_config(&config)?,
                                             config.float("impact_param")?,
                                             config.float("impact_angle")?,
                                             config.float_or("sdp_tilt", 0.0)?);
    match shower.e_thresh() {
        Ok(threshold) => log::info!("Shower starts at depth {:.1} g/cm^2, Cherenkov threshold {:.2} MeV.",
                                    shower.depth(), threshold),
        Err(err) => log::warn!("{}", err),
    }

    let detections = telescope.view_shower(&shower,
                                           config.float("time_delay")?,
                                           config.usize("photons_per_step")?,
                                           seed);
    let mut data = telescope.count_photons(&detections, config.float("time_bin")?);
    if options.noise {
        let rate = config.float_or("noise_rate", 0.0)?;
        let mut rng = LcgRng::for_task(seed, u64::from(u32::MAX));
        let added = data.add_noise_all(rate, &mut rng);
        log::info!("Injected {} noise photons.", added);
    }

    let threshold = config.u32_or("trigger_threshold", 1)?;
    let cluster = largest_cluster(&triggered_pixels(&data, threshold));
    log::info!("Largest triggered cluster has {} pixels.", cluster);

    let reconstructor = Reconstructor::new(*telescope.ground_plane(), telescope.rotation())
        .with_trigger_threshold(threshold);

    println!("{},detections,fit_impact_param,fit_angle,sdp_x,sdp_y,sdp_z", Shower::header());
    match reconstructor.reconstruct(&data) {
        Ok(fit) => println!("{},{},{},{},{},{},{}",
                            shower.to_record(), detections.len(),
                            fit.impact_param, fit.shower_angle,
                            fit.sdp_normal.x, fit.sdp_normal.y, fit.sdp_normal.z),
        Err(err) => {
            log::warn!("Reconstruction failed: {}", err);
            println!("{},{},NaN,NaN,NaN,NaN,NaN", shower.to_record(), detections.len());
        }
    }
    Ok(())
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Some(options) => options,
        None => {
            let program = args.get(0).map(|s| s.as_str()).unwrap_or("cherenkov");
            eprintln!("Usage: {} <config.xml> [--seed N] [--transparent] [--no-noise]", program);
            std::process::exit(1);
        }
    };

    if let Err(err) = run(&options) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
