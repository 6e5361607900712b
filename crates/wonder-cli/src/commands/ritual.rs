use std::sync::Arc;

use clap::Subcommand;

use crate::common;

#[derive(Subcommand)]
pub enum RitualAction {
    /// Request permission and arm tomorrow's notification
    Init,
    /// Set the preferred notification time
    Time { hour: u32, minute: u32 },
    /// List armed notifications
    Pending {
        #[arg(long)]
        json: bool,
    },
    /// Deliver (print and drop) the notifications that have come due
    Due,
}

pub async fn run(action: RitualAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RitualAction::Init => {
            let store = common::open_store()?;
            let ritual = common::build_ritual(Arc::clone(&store))?;
            if ritual.initialize(common::now_local()).await {
                let time = store.morning_ritual_time().await;
                println!(
                    "Morning ritual armed for {:02}:{:02} tomorrow.",
                    time.hour, time.minute
                );
            } else {
                println!("Notifications are disabled; enable them in config.toml.");
            }
        }
        RitualAction::Time { hour, minute } => {
            let store = common::open_store()?;
            let ritual = common::build_ritual(Arc::clone(&store))?;
            if !ritual.set_preferred_time(common::now_local(), hour, minute).await {
                return Err(format!("invalid time {hour:02}:{minute:02}").into());
            }
            println!("Preferred time set to {hour:02}:{minute:02}; rescheduled.");
        }
        RitualAction::Pending { json } => {
            let notifier = common::open_notifier()?;
            let pending = notifier.pending();
            if json {
                println!("{}", serde_json::to_string_pretty(&pending)?);
            } else if pending.is_empty() {
                println!("Nothing armed.");
            } else {
                for entry in &pending {
                    println!(
                        "{}  {}",
                        entry.fire_at.format("%Y-%m-%d %H:%M"),
                        entry.request.title
                    );
                }
            }
        }
        RitualAction::Due => {
            let notifier = common::open_notifier()?;
            let due = notifier.take_due(common::now_local());
            if due.is_empty() {
                println!("Nothing due.");
            } else {
                for entry in &due {
                    println!("{}", entry.request.title);
                    println!("  {}", entry.request.body);
                }
            }
        }
    }
    Ok(())
}
