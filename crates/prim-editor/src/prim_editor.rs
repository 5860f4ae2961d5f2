mod cli;
mod config;
mod render;
mod session;

use anyhow::{Context, Result};
use log::info;
use stage::InMemoryStage;

use cli::Command;
use config::EditorConfig;
use session::Session;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let invocation = cli::from_matches(&cli::app().get_matches())?;
    let config = match &invocation.config {
        Some(path) => EditorConfig::load(path),
        None => EditorConfig::load_default(),
    };

    let stage = InMemoryStage::open(&invocation.stage)
        .with_context(|| format!("Failed to open {}", invocation.stage.display()))?;
    let mut session = Session::new(config);
    session.bind(stage)?;

    match invocation.command {
        Command::Outline { depth } => {
            let depth = depth.unwrap_or(session.config().max_expanded_depth);
            session.expand_to_depth(depth)?;
            println!("{}", session.outline());
        }
        Command::Attributes(path) => {
            println!("{}", render::properties(&session.attributes(&path)?));
        }
        Command::Samples(path) => {
            println!("{}", render::time_samples(&session.time_samples(&path)?));
        }
        Command::Edit(edit) => {
            session.edit(edit)?;
            session.save(&invocation.stage)?;
            info!("Saved {}", invocation.stage.display());

            session.expand_to_depth(session.config().max_expanded_depth)?;
            println!("{}", session.outline());
        }
    }

    session.close();
    Ok(())
}
