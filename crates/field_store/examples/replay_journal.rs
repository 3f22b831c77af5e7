//! Dispatch a JSON array of intents into a journaled store, then replay the
//! journal onto an empty store and print the resulting snapshot.
//!
//! ```bash
//! cargo run --example replay_journal -- store.yaml intents.json [Log|Compact|Json|None]
//! ```
//!
//! `store.yaml` must configure a `journal`. Without `intents.json` the
//! existing journal is replayed as is.

use std::path::PathBuf;

use field_store::*;
use field_store_trace::Output;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let config_path: PathBuf = args.next().ok_or("usage: replay_journal <config> [intents]")?.into();
    let intents_path = args.next().map(PathBuf::from);
    let output: Output = args.next().as_deref().unwrap_or("Log").parse()?;

    let config = StoreConfig::load_yaml(&config_path)?;
    field_store_trace::init_fmt(output, config.tracing_override.as_deref())?;

    let journal = config
        .journal
        .as_ref()
        .ok_or("the config has no `journal` section")?;

    if let Some(intents_path) = intents_path {
        let intents: Vec<FieldIntent> =
            serde_json::from_str(&std::fs::read_to_string(&intents_path)?)?;
        let mut store = FieldStore::from_config(&config)
            .record(FileCassette::from(journal))?
            .store_effects(config.effect_capacity);
        for intent in intents {
            store.transition(intent);
        }
        for diagnostic in store.effects().iter().flatten() {
            tracing::info!(%diagnostic, "no-op while recording");
        }
    }

    let mut replayed = FieldStore::from_config(&config);
    let effects = FileCassette::from(journal).playback_actions(&mut replayed)?;
    tracing::info!(
        intents = effects.len(),
        noops = effects.iter().flatten().count(),
        "journal replayed"
    );

    println!("{}", serde_json::to_string_pretty(&replayed.snapshot())?);
    Ok(())
}
