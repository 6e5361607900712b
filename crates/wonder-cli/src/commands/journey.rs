use clap::Subcommand;
use chrono::Utc;

use wonder_core::content::{self, UNLOCK_SECONDS};
use wonder_core::JourneyProgress;

use crate::common;

#[derive(Subcommand)]
pub enum JourneyAction {
    /// List journeys and your progress through them
    List,
    /// Show a journey's depth levels and unlock state
    Show { id: String },
    /// Move to an already-unlocked depth level
    Enter { id: String, depth: u32 },
    /// Unlock the next depth level after enough pondering time
    Unlock {
        id: String,
        #[arg(long)]
        engaged_secs: u32,
    },
}

pub async fn run(action: JourneyAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = common::open_store()?;

    match action {
        JourneyAction::List => {
            let progress = store.journey_progress().await;
            for journey in content::journeys() {
                let (depth, unlocked) = progress
                    .get(&journey.id)
                    .map(|p| (p.current_depth, p.unlocked_levels))
                    .unwrap_or((1, 1));
                println!(
                    "{:<8}  {:<24}  depth {}/{} (unlocked {})",
                    journey.id,
                    journey.title,
                    depth,
                    journey.levels.len(),
                    unlocked
                );
            }
        }
        JourneyAction::Show { id } => {
            let journey = content::journey(&id)
                .ok_or_else(|| format!("unknown journey '{id}'"))?;
            let progress = store
                .journey_progress_for(&id)
                .await
                .unwrap_or_else(|| JourneyProgress::new(1, 1, Utc::now()));

            println!("{} ({})", journey.title, journey.theme);
            for (index, level) in journey.levels.iter().enumerate() {
                let number = index as u32 + 1;
                let marker = if number == progress.current_depth {
                    ">"
                } else if number <= progress.unlocked_levels {
                    "o"
                } else {
                    "."
                };
                println!("  {marker} Level {number}: {}", level.title);
                if number <= progress.unlocked_levels {
                    for question in &level.questions {
                        println!("      {}", question.main);
                    }
                }
            }
        }
        JourneyAction::Enter { id, depth } => {
            let journey = content::journey(&id)
                .ok_or_else(|| format!("unknown journey '{id}'"))?;
            let progress = store
                .journey_progress_for(&id)
                .await
                .unwrap_or_else(|| JourneyProgress::new(1, 1, Utc::now()));

            if depth as usize > journey.levels.len() {
                return Err(format!(
                    "journey '{id}' has {} level(s)",
                    journey.levels.len()
                )
                .into());
            }
            if depth > progress.unlocked_levels {
                return Err(format!(
                    "level {depth} is still locked (unlocked: {})",
                    progress.unlocked_levels
                )
                .into());
            }

            store
                .update_journey_progress(&id, depth, progress.unlocked_levels)
                .await;
            let level = &journey.levels[depth as usize - 1];
            println!("Level {depth}: {}", level.title);
            for question in &level.questions {
                println!();
                println!("  {}", question.main);
                println!("  {}", question.context);
                println!("  To go deeper: {}", question.follow_up);
            }
        }
        JourneyAction::Unlock { id, engaged_secs } => {
            let journey = content::journey(&id)
                .ok_or_else(|| format!("unknown journey '{id}'"))?;
            let progress = store
                .journey_progress_for(&id)
                .await
                .unwrap_or_else(|| JourneyProgress::new(1, 1, Utc::now()));
            let total = journey.levels.len() as u32;

            if !content::can_unlock(
                engaged_secs,
                progress.current_depth,
                progress.unlocked_levels,
                total,
            ) {
                return Err(format!(
                    "nothing to unlock: ponder level {} for at least {UNLOCK_SECONDS}s \
                     (you reported {engaged_secs}s, unlocked {}/{total})",
                    progress.current_depth, progress.unlocked_levels
                )
                .into());
            }

            let unlocked = (progress.unlocked_levels + 1).min(total);
            store
                .update_journey_progress(&id, progress.current_depth, unlocked)
                .await;
            let level = &journey.levels[unlocked as usize - 1];
            println!("Unlocked level {unlocked}: {}", level.title);
        }
    }
    Ok(())
}
