use clap::Subcommand;
use chrono::Utc;

use wonder_core::Thought;

use crate::common;

#[derive(Subcommand)]
pub enum ThoughtAction {
    /// Capture a thought on a daily question (defaults to the current day)
    Add {
        text: String,
        #[arg(long)]
        day: Option<u32>,
    },
    /// List captured thoughts
    List {
        #[arg(long)]
        day: Option<u32>,
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: ThoughtAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = common::open_store()?;

    match action {
        ThoughtAction::Add { text, day } => {
            let day = match day {
                Some(day) => day,
                None => store.current_day().await,
            };
            let question = wonder_core::content::question_for_day(day)
                .ok_or_else(|| format!("day must be within 1..=30, got {day}"))?;

            let thought = Thought::new(&day.to_string(), &question.question, &text, Utc::now())?;
            let thoughts = store.save_thought(thought).await;
            println!(
                "Captured. {} thought(s) on day {day}.",
                thoughts.len()
            );
            if let Some(milestone) = store.latest_milestone().await {
                println!("{milestone}");
            }
        }
        ThoughtAction::List { day, json } => {
            let thoughts = match day {
                Some(day) => store.thoughts_for_question(&day.to_string()).await,
                None => store.all_thoughts().await,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&thoughts)?);
            } else if thoughts.is_empty() {
                println!("No thoughts captured yet.");
            } else {
                for thought in &thoughts {
                    println!(
                        "{}  [{}]  {}",
                        thought.timestamp.format("%Y-%m-%d %H:%M"),
                        thought.question_id,
                        thought.text
                    );
                }
            }
        }
    }
    Ok(())
}
