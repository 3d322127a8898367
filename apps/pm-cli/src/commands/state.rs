// state.rs — State subcommands: show, reset.

use clap::Subcommand;
use pm_monitor::MonitorConfig;
use pm_snapshot::LabeledValues;
use pm_state::StateStore;

#[derive(Subcommand)]
pub enum StateCommands {
    /// Show the stored snapshot and the values extracted from it.
    Show,
    /// Delete the stored snapshot; the next run records a new baseline.
    Reset,
}

pub fn execute(cmd: &StateCommands, config: &MonitorConfig) -> anyhow::Result<()> {
    let store = StateStore::new(&config.state_dir);
    match cmd {
        StateCommands::Show => show(&store, config),
        StateCommands::Reset => {
            if store.clear()? {
                println!("Removed {}", store.path().display());
            } else {
                println!("No state file at {}", store.path().display());
            }
            Ok(())
        }
    }
}

fn show(store: &StateStore, config: &MonitorConfig) -> anyhow::Result<()> {
    let Some(state) = store.read()? else {
        println!("No state file at {}", store.path().display());
        return Ok(());
    };

    println!("State file: {}", store.path().display());
    println!("Saved at:   {}", state.saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Rows:       {}", state.rows.row_count());
    println!();

    let values = LabeledValues::extract(&state.rows, &config.layout);
    println!("{:<24} VALUE", "LABEL");
    println!("{}", "-".repeat(40));
    for (label, value) in values.iter() {
        println!("{:<24} {}", label, value);
    }
    if let Some(total) = config.layout.total(&state.rows) {
        println!("{:<24} {}", pm_snapshot::TOTAL_LABEL, total);
    }
    Ok(())
}
