//! Offline training job for the parameter optimizer
//!
//! Builds a batch environment from labeled sample images, seeds the replay
//! buffer with the named starting actions plus any feedback history, then
//! pretrains, trains, evaluates and writes a policy snapshot.
//!
//! Usage:
//!   train_agent [--timesteps N] [--episodes N] [--db FILE] [--out FILE] IMAGE...
//!
//! Ground truth is taken from each image's parent directory: `authentic/`
//! and `fake/` are labeled, anything else trains unlabeled.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use artauth_core::config::EngineConfig;
use artauth_core::features::extract;
use artauth_core::feedback::SqliteFeedbackStore;
use artauth_core::rl::{ArtworkSample, BatchAuthEnv, Environment, RlfdAgent};

const DEFAULT_TIMESTEPS: usize = 1_000;
const DEFAULT_EVAL_EPISODES: usize = 10;

struct Args {
    images: Vec<PathBuf>,
    timesteps: usize,
    eval_episodes: usize,
    db_path: Option<PathBuf>,
    out_path: Option<PathBuf>,
}

fn parse_args(raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args {
        images: Vec::new(),
        timesteps: DEFAULT_TIMESTEPS,
        eval_episodes: DEFAULT_EVAL_EPISODES,
        db_path: None,
        out_path: None,
    };

    let mut raw = raw.peekable();
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--timesteps" => {
                let value = raw.next().ok_or("--timesteps needs a value")?;
                args.timesteps = value.parse().map_err(|_| "invalid --timesteps value")?;
            }
            "--episodes" => {
                let value = raw.next().ok_or("--episodes needs a value")?;
                args.eval_episodes = value.parse().map_err(|_| "invalid --episodes value")?;
            }
            "--db" => {
                args.db_path = Some(PathBuf::from(raw.next().ok_or("--db needs a value")?));
            }
            "--out" => {
                args.out_path = Some(PathBuf::from(raw.next().ok_or("--out needs a value")?));
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag {}", flag)),
            _ => args.images.push(PathBuf::from(arg)),
        }
    }

    if args.images.is_empty() {
        return Err("no sample images given".to_string());
    }
    Ok(args)
}

/// authentic/ and fake/ directories carry the label; anything else is
/// unlabeled and trains on the exploration reward only
fn ground_truth_from_path(path: &PathBuf) -> Option<bool> {
    let parent = path.parent()?.file_name()?.to_str()?;
    match parent {
        "authentic" => Some(true),
        "fake" => Some(false),
        _ => None,
    }
}

fn load_samples(images: &[PathBuf]) -> Vec<ArtworkSample> {
    let mut samples = Vec::with_capacity(images.len());
    for path in images {
        let img = match image::open(path) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let report = extract(&img);
        if !report.status.is_ok() {
            log::warn!("skipping {}: extraction failed", path.display());
            continue;
        }
        samples.push(ArtworkSample::new(report.vector, ground_truth_from_path(path)));
    }
    samples
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = EngineConfig::from_env();

    let samples = load_samples(&args.images);
    if samples.is_empty() {
        return Err("no usable sample images".into());
    }
    let labeled = samples.iter().filter(|s| s.ground_truth.is_some()).count();
    log::info!("training on {} samples ({} labeled)", samples.len(), labeled);

    let mut env = BatchAuthEnv::new(samples);
    let mut agent = RlfdAgent::new(env.state_dim(), config.rl.clone());

    agent.seed_named_demonstrations(&mut env);
    if let Some(db_path) = &args.db_path {
        let store = SqliteFeedbackStore::open(db_path)?;
        agent.load_demonstrations_from_feedback(&store)?;
    }
    log::info!("seeded {} demonstrations", agent.demonstration_count());

    agent.pretrain();
    agent.train(&mut env, args.timesteps, None);

    let summary = agent.evaluate(&mut env, args.eval_episodes);
    log::info!(
        "evaluation over {} episodes: mean reward {:.3}, std {:.3}",
        summary.episodes,
        summary.mean_reward,
        summary.std_reward
    );

    let out_path = args.out_path.unwrap_or(config.snapshot_path);
    agent.save(&out_path)?;
    println!(
        "policy saved to {} (mean reward {:.3})",
        out_path.display(),
        summary.mean_reward
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("train_agent: {}", message);
            eprintln!("usage: train_agent [--timesteps N] [--episodes N] [--db FILE] [--out FILE] IMAGE...");
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("training failed: {}", e);
            eprintln!("train_agent: {}", e);
            ExitCode::FAILURE
        }
    }
}
