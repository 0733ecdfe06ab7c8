//! The user action surface: each command loads the plan, applies one
//! transition through the store and reports back.

use crate::cli::{SetCommand, StatusArguments};
use crate::clock::Clock;
use crate::error::{InputError, ServiceResult};
use crate::notify::NotificationPermission;
use crate::render;
use crate::schedule::derive;
use crate::settings::AppConfig;
use crate::storage::Storage;
use crate::store::{Action, PlanStore};
use crate::time_utils::MinuteOfDay;
use crate::types::{Medication, Section, done_key};

pub struct App<C> {
    config: AppConfig,
    store: PlanStore,
    clock: C,
}

impl<C: Clock> App<C> {
    pub fn open(config: AppConfig, clock: C) -> Self {
        let store = PlanStore::open(Storage::in_dir(&config.data_dir));
        Self {
            config,
            store,
            clock,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &PlanStore {
        &self.store
    }

    pub fn into_parts(self) -> (AppConfig, PlanStore, C) {
        (self.config, self.store, self.clock)
    }

    pub fn permission(&self) -> NotificationPermission {
        self.config.settings.notifications.effective()
    }

    pub fn status(&self, args: &StatusArguments) -> ServiceResult<String> {
        let now = self.clock.now();
        let plan = self.store.plan();
        let schedule = derive(plan, &now);
        if args.json {
            return Ok(serde_json::to_string_pretty(&schedule)?);
        }
        Ok(render::status(plan, &schedule, self.permission()))
    }

    pub fn take(&mut self, med: Medication) -> String {
        let now = self.clock.now();
        let plan = self.store.dispatch(Action::MarkTaken(med), &now);
        format!("DONE ✅ {} taken at {} (streak {})", med.title(), now.minute, plan.streak)
    }

    pub fn done(&mut self, section: Section, time: MinuteOfDay) -> ServiceResult<String> {
        if !self.store.plan().task(section).times.contains(&time) {
            return Err(InputError::NoSuchSlot {
                section: section.key().to_string(),
                time: time.to_string(),
            }
            .into());
        }
        let now = self.clock.now();
        let key = done_key(now.today, time);
        if self.store.plan().task(section).is_done(&key) {
            return Ok(format!("{} at {time} is already done today", section.title()));
        }
        let plan = self.store.dispatch(Action::MarkDone { section, done_key: key }, &now);
        Ok(format!("DONE ✅ {} at {time} (streak {})", section.title(), plan.streak))
    }

    pub fn set(&mut self, command: SetCommand) -> ServiceResult<String> {
        let action = command.into_action()?;
        self.apply(vec![action]);
        Ok("Saved.".to_string())
    }

    /// Apply edits collected elsewhere, e.g. by the interactive editor.
    pub fn apply(&mut self, actions: Vec<Action>) {
        let now = self.clock.now();
        for action in actions {
            self.store.dispatch(action, &now);
        }
    }

    pub fn toggle_theme(&mut self) -> String {
        let now = self.clock.now();
        let plan = self.store.dispatch(Action::ToggleDarkMode, &now);
        if plan.dark_mode {
            "🌙 NIGHT mode on".to_string()
        } else {
            "☀ DAY mode on".to_string()
        }
    }

    /// Both onboarding screens; marks onboarding as seen.
    pub fn intro(&mut self) -> String {
        let now = self.clock.now();
        let text = format!(
            "{}\n\n{}",
            render::intro(self.store.plan(), 1),
            render::intro(self.store.plan(), 2)
        );
        self.store.dispatch(Action::DismissIntro, &now);
        text
    }

    pub fn reset(&mut self) -> String {
        self.store.reset_all();
        "All data cleared. Default plan restored.".to_string()
    }

    /// Record the answer to a permission request.
    pub fn set_permission(&mut self, granted: bool) -> ServiceResult<NotificationPermission> {
        if self.permission() == NotificationPermission::Unsupported {
            return Ok(NotificationPermission::Unsupported);
        }
        self.config.settings.notifications = if granted {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Denied
        };
        self.config.save_settings()?;
        Ok(self.permission())
    }

    pub fn revoke_permission(&mut self) -> ServiceResult<NotificationPermission> {
        self.config.settings.notifications = NotificationPermission::Default;
        self.config.save_settings()?;
        Ok(self.permission())
    }
}
