use std::sync::Arc;

use clap::Subcommand;

use crate::common;

#[derive(Subcommand)]
pub enum DailyAction {
    /// Open today's question: advances the cycle, records engagement and
    /// updates the streak
    Show,
    /// Print one question of the 30-day cycle as JSON
    Question {
        #[arg(long)]
        day: u32,
    },
}

pub async fn run(action: DailyAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DailyAction::Show => {
            let store = common::open_store()?;
            let ritual = common::build_ritual(Arc::clone(&store))?;
            let now = common::now_local();

            let day = wonder_core::daily::advance_day(&store, now.date()).await;
            ritual.record_engagement(now).await;
            let streak = ritual.update_streak(now.date()).await;

            let question = wonder_core::content::question_for_day(day)
                .ok_or_else(|| format!("no question for day {day}"))?;

            println!("Day {day} of 30");
            println!();
            println!("  {}", question.question);
            println!();
            println!("  {}", question.story);
            println!("      -- {}", question.thinker);
            println!();
            println!("  To go deeper: {}", question.follow_up);
            println!();
            println!("Streak: {streak} day(s)");
        }
        DailyAction::Question { day } => {
            let question = wonder_core::content::question_for_day(day)
                .ok_or_else(|| format!("day must be within 1..=30, got {day}"))?;
            println!("{}", serde_json::to_string_pretty(question)?);
        }
    }
    Ok(())
}
