use clap::Subcommand;

use wonder_core::Notifier;

use crate::common;

#[derive(Subcommand)]
pub enum DataAction {
    /// List stored keys
    Keys,
    /// Dump every stored key and value as JSON
    Dump,
    /// Delete all stored data and armed notifications
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(action: DataAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = common::open_store()?;

    match action {
        DataAction::Keys => {
            for key in store.all_keys().await {
                println!("{key}");
            }
        }
        DataAction::Dump => {
            println!("{}", serde_json::to_string_pretty(&store.dump().await)?);
        }
        DataAction::Reset { yes } => {
            if !yes {
                return Err("pass --yes to confirm deleting all data".into());
            }
            let notifier = common::open_notifier()?;
            notifier.cancel_all().await?;
            if !store.clear().await {
                return Err("clearing stored data failed".into());
            }
            println!("All data cleared.");
        }
    }
    Ok(())
}
