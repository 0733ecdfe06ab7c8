//! Interactive plan editor (`config` command).

use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};

use crate::error::ServiceResult;
use crate::store::Action;
use crate::time_utils::MinuteOfDay;
use crate::types::{Medication, Plan, PlanItem, Section};

fn prompt_time(theme: &ColorfulTheme, prompt: &str, current: MinuteOfDay) -> ServiceResult<MinuteOfDay> {
    let raw: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .with_initial_text(current.to_string())
        .validate_with(|input: &String| -> Result<(), String> {
            input.parse::<MinuteOfDay>().map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;
    Ok(raw.parse()?)
}

fn prompt_hours(theme: &ColorfulTheme, med: Medication, current: u32) -> ServiceResult<u32> {
    let (min, max) = med.interval_range();
    let hours: u32 = Input::with_theme(theme)
        .with_prompt(format!("{} every N hours ({min}-{max})", med.title()))
        .with_initial_text(current.to_string())
        .validate_with(move |hours: &u32| -> Result<(), String> {
            med.check_interval(*hours).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;
    Ok(hours)
}

fn edit_med(theme: &ColorfulTheme, plan: &Plan, med: Medication) -> ServiceResult<Vec<Action>> {
    let cfg = plan.med(med);
    let enabled = Confirm::with_theme(theme)
        .with_prompt(format!("Remind me about {}?", med.title()))
        .default(cfg.enabled)
        .interact()?;
    let mut actions = vec![Action::SetEnabled {
        item: PlanItem::Med(med),
        enabled,
    }];
    if enabled {
        actions.push(Action::SetEveryHours {
            med,
            hours: prompt_hours(theme, med, cfg.every_hours)?,
        });
        actions.push(Action::SetStart {
            med,
            start: prompt_time(theme, "First dose at", cfg.start)?,
        });
    }
    Ok(actions)
}

fn edit_task(theme: &ColorfulTheme, plan: &Plan, section: Section) -> ServiceResult<Vec<Action>> {
    let task = plan.task(section);
    let enabled = Confirm::with_theme(theme)
        .with_prompt(format!("Remind me about {}?", section.title()))
        .default(task.enabled)
        .interact()?;
    let mut actions = vec![Action::SetEnabled {
        item: PlanItem::Task(section),
        enabled,
    }];
    if enabled {
        for (index, &current) in task.times.iter().enumerate() {
            let time = prompt_time(theme, &format!("{} slot {}", section.title(), index + 1), current)?;
            actions.push(Action::SetSlot {
                section,
                index,
                time,
            });
        }
    }
    Ok(actions)
}

/// Walks the user through the plan and returns the edits to apply.
/// Nothing is returned until the user picks "Save".
pub fn run(plan: &Plan) -> ServiceResult<Vec<Action>> {
    let theme = ColorfulTheme::default();
    let mut staged: Vec<Action> = Vec::new();

    let entries = [
        "Names",
        "Paracetamol",
        "Ibuprofen",
        "Salt rinse",
        "Corsodyl",
        "Save",
        "Discard",
    ];

    loop {
        let choice = Select::with_theme(&theme)
            .with_prompt("Edit which part of the plan?")
            .items(&entries)
            .default(0)
            .interact()?;

        match entries[choice] {
            "Names" => {
                let friend: String = Input::with_theme(&theme)
                    .with_prompt("Your name")
                    .with_initial_text(plan.friend_name.clone())
                    .interact_text()?;
                let mascot: String = Input::with_theme(&theme)
                    .with_prompt("Mascot name")
                    .with_initial_text(plan.character_name.clone())
                    .interact_text()?;
                staged.push(Action::SetFriendName(friend));
                staged.push(Action::SetCharacterName(mascot));
            }
            "Paracetamol" => staged.extend(edit_med(&theme, plan, Medication::Paracetamol)?),
            "Ibuprofen" => staged.extend(edit_med(&theme, plan, Medication::Ibuprofen)?),
            "Salt rinse" => staged.extend(edit_task(&theme, plan, Section::Rinse)?),
            "Corsodyl" => staged.extend(edit_task(&theme, plan, Section::Corsodyl)?),
            "Save" => return Ok(staged),
            _ => return Ok(Vec::new()),
        }
    }
}
