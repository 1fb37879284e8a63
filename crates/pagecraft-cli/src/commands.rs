use anyhow::Result;
use pagecraft_cli::{classify, replay};
use pagecraft_store::Settings;
use tracing::{info, info_span};

use crate::cli::{ClassifyArgs, ReplayArgs};

pub fn run_classify(args: &ClassifyArgs) -> Result<()> {
    let span = info_span!("classify", file = %args.file.display());
    let _guard = span.enter();

    let blocks = classify::load_blocks(&args.file)?;
    let rows = classify::classify(&blocks);
    println!("{}", classify::render_table(&rows));
    info!(blocks = rows.len(), "classified");
    Ok(())
}

pub fn run_replay(args: &ReplayArgs, settings: &Settings) -> Result<()> {
    let span = info_span!("replay", file = %args.file.display());
    let _guard = span.enter();

    let script = replay::Script::load(&args.file)?;
    let result = replay::run(&script, settings);
    if args.plain {
        println!("{}", result.timeline_text());
    } else {
        println!("{}", replay::render_table(&result));
    }
    println!("Open popups: {}", list_or_dash(&result.open_popups));
    println!("Open menus: {}", list_or_dash(&result.open_menus));
    info!(events = result.timeline.len(), "replayed");
    Ok(())
}

fn list_or_dash(ids: &[String]) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.join(", ")
    }
}
