//! Terminal presentation of the plan and its derived schedule.

use colored::{Color, Colorize};
use std::fmt::Write;

use crate::notify::NotificationPermission;
use crate::schedule::{Mood, badge, mood};
use crate::time_utils::pretty_in;
use crate::types::{Plan, ScheduleItem};

/// Rows shown by `status`.
pub const MAX_ROWS: usize = 10;

const SAFETY_NOTE: &str =
    "Reminders only. If swelling/fever/pus or trouble opening mouth: urgent dentist.";

struct Palette {
    accent: Color,
    now: Color,
    soon: Color,
    ok: Color,
    muted: Color,
}

impl Palette {
    fn for_plan(plan: &Plan) -> Self {
        if plan.dark_mode {
            Palette {
                accent: Color::BrightMagenta,
                now: Color::BrightRed,
                soon: Color::BrightYellow,
                ok: Color::BrightCyan,
                muted: Color::BrightBlack,
            }
        } else {
            Palette {
                accent: Color::Magenta,
                now: Color::Red,
                soon: Color::Yellow,
                ok: Color::Green,
                muted: Color::White,
            }
        }
    }

    fn badge(&self, mins: i64) -> Color {
        match badge(mins) {
            "NOW" => self.now,
            "SOON" => self.soon,
            _ => self.ok,
        }
    }
}

pub fn mascot_face(mood: Mood) -> &'static str {
    match mood {
        Mood::Chill => "(•‿•)",
        Mood::Proud => "(^‿^)",
        Mood::Ouch => "(>﹏<)",
    }
}

/// One schedule row: badge, countdown, time, title, subtitle.
pub fn schedule_row(item: &ScheduleItem) -> String {
    format!(
        "{:<4} {:<8} {}  {:<12} {}",
        badge(item.mins),
        pretty_in(item.mins),
        item.when,
        item.title,
        item.subtitle
    )
}

pub fn headline(plan: &Plan, schedule: &[ScheduleItem]) -> String {
    let top = schedule.first();
    let face = mascot_face(mood(top));
    match top {
        Some(item) => format!(
            "{} {face} Next: {} at {} ({})",
            plan.character_name,
            item.title,
            item.when,
            pretty_in(item.mins)
        ),
        None => format!("{} {face} Nothing scheduled. Enjoy the quiet!", plan.character_name),
    }
}

pub fn status(plan: &Plan, schedule: &[ScheduleItem], permission: NotificationPermission) -> String {
    let palette = Palette::for_plan(plan);
    let mut out = String::new();

    let notifs = if permission == NotificationPermission::Granted {
        "NOTIFS OK".to_string()
    } else {
        format!("ENABLE NOTIFS ({permission})")
    };
    let theme = if plan.dark_mode { "🌙 NIGHT" } else { "☀ DAY" };
    let _ = writeln!(
        out,
        "{}  streak {}  ·  {}  ·  {}",
        "★ TOOTH TIME".color(palette.accent).bold(),
        plan.streak,
        notifs,
        theme
    );

    if !plan.intro_seen {
        let _ = writeln!(out, "{}", intro(plan, 1).color(palette.accent));
    }

    let _ = writeln!(out, "{}", headline(plan, schedule).bold());
    let _ = writeln!(out);
    for item in schedule.iter().take(MAX_ROWS) {
        let row = schedule_row(item);
        let row = if item.is_done() {
            row.color(palette.muted).dimmed()
        } else {
            row.color(palette.badge(item.mins))
        };
        let _ = writeln!(out, "  {row}");
    }
    let _ = writeln!(out);
    let _ = write!(out, "{}", SAFETY_NOTE.color(palette.muted).italic());
    out
}

/// Onboarding screens; step 1 greets, step 2 explains the quest list.
pub fn intro(plan: &Plan, step: u8) -> String {
    match step {
        1 => format!(
            "{} CHECK-IN\nHeyyy {} 💗\nI'm here to guard your tooth era 🦷✨\nWe keep pain away like a pro, okay? 🌸",
            plan.character_name.to_uppercase(),
            plan.friend_name
        ),
        _ => "TODAY'S QUESTS\nToday's quest list. Mark each one DONE ✅ when it's handled.".to_string(),
    }
}
