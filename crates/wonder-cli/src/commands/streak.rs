use clap::Subcommand;
use serde_json::json;

use crate::common;

#[derive(Subcommand)]
pub enum StreakAction {
    /// Current streak, last open date and latest milestone
    Show {
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: StreakAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = common::open_store()?;

    match action {
        StreakAction::Show { json } => {
            let streak = store.streak_count().await;
            let last_open = store.last_open_date().await;
            let milestone = store.latest_milestone().await;

            if json {
                let payload = json!({
                    "streakCount": streak,
                    "lastOpenDate": last_open.map(|d| d.format("%Y-%m-%d").to_string()),
                    "latestMilestone": milestone,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Streak: {streak} day(s)");
                match last_open {
                    Some(date) => println!("Last open: {date}"),
                    None => println!("Last open: never"),
                }
                if let Some(milestone) = milestone {
                    println!("Latest milestone: {milestone}");
                }
            }
        }
    }
    Ok(())
}
