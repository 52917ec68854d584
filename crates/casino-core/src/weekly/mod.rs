//! Weekly phase orchestration.
//!
//! [`WeeklyFlow`] ties the spin clock, the reveal sampler and the store
//! together for one acting user. Nothing is cached between calls: every
//! operation reads what it needs and the phase is recomputed from scratch.

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result, ValidationError};
use crate::sampler::{select_random_tasks, spin_wheel, SamplerConfig, TaskSampler};
use crate::spin::{Side, SpinClaim, SpinStatus, VetoRequest, WeeklySpin};
use crate::storage::CasinoStore;
use crate::task::{Task, TaskStatus};
use crate::user::Session;
use crate::week::{current_month, days_remaining, SpinSchedule};

/// Where the acting user stands in the weekly cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Not spin day: wait for the next threshold.
    Countdown,
    /// Spin day before the threshold and last week's results are not both in.
    VerificationPending,
    /// Spin day before the threshold, both partners have verified.
    VerificationComplete,
    /// Spinning is open for this user.
    ReadyToSpin,
    /// This user already has an assignment for the week.
    SpinComplete,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Countdown => "countdown",
            Phase::VerificationPending => "verification_pending",
            Phase::VerificationComplete => "verification_complete",
            Phase::ReadyToSpin => "ready_to_spin",
            Phase::SpinComplete => "spin_complete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a full spin: what was revealed and where the wheel landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub revealed: Vec<Task>,
    pub landed: Task,
    pub spin: WeeklySpin,
}

/// The acting user's view of the current week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentWeekView {
    pub spin_id: String,
    pub week_start: NaiveDate,
    pub days_remaining: i64,
    /// Task the acting user has to do.
    pub my_task: Option<Task>,
    /// Task the partner has to do.
    pub partner_task: Option<Task>,
    pub my_completed: bool,
    pub partner_completed: bool,
    pub veto_available: bool,
    pub vetoed_by_me: bool,
    pub vetoed_by_partner: bool,
}

/// Weekly workflow for the user in `session`.
pub struct WeeklyFlow<'a, S: CasinoStore + ?Sized> {
    store: &'a S,
    session: &'a Session,
    schedule: SpinSchedule,
    sampler: TaskSampler,
}

impl<'a, S: CasinoStore + ?Sized> WeeklyFlow<'a, S> {
    pub fn new(store: &'a S, session: &'a Session) -> Self {
        Self {
            store,
            session,
            schedule: SpinSchedule::default(),
            sampler: TaskSampler::new(),
        }
    }

    pub fn with_schedule(mut self, schedule: SpinSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_sampler(mut self, config: SamplerConfig) -> Self {
        self.sampler = TaskSampler::with_config(config);
        self
    }

    pub fn schedule(&self) -> &SpinSchedule {
        &self.schedule
    }

    pub fn sampler(&self) -> &TaskSampler {
        &self.sampler
    }

    fn user_id(&self) -> &str {
        self.session.user_id()
    }

    pub fn phase<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Phase> {
        let phase = if !self.schedule.is_spin_day(now) {
            Phase::Countdown
        } else if self.schedule.is_past_threshold(now) {
            let week = self.schedule.current_week_start(now);
            match self.store.find_spin(self.user_id(), week)? {
                Some(spin) if self.own_task_id(&spin).is_some() => Phase::SpinComplete,
                _ => Phase::ReadyToSpin,
            }
        } else {
            let week = self.schedule.previous_week_start(now);
            match self.store.find_spin(self.user_id(), week)? {
                None => Phase::ReadyToSpin,
                Some(spin) if spin.both_verified() => Phase::VerificationComplete,
                Some(_) => Phase::VerificationPending,
            }
        };
        tracing::debug!(user_id = %self.user_id(), %phase, "phase derived");
        Ok(phase)
    }

    fn own_task_id<'s>(&self, spin: &'s WeeklySpin) -> Option<&'s str> {
        spin.side_of(self.user_id()).and_then(|side| spin.task_id(side))
    }

    /// Reveal a random subset of the partner's available tasks.
    ///
    /// # Errors
    /// `PartnerNotLinked` without a partner, `InsufficientTasks` when the
    /// partner's available pool is smaller than the reveal count.
    pub fn reveal<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Task>> {
        let partner = self.session.partner()?;
        let pool = self
            .store
            .list_tasks(&partner.id, Some(TaskStatus::Available))?;
        let required = self.sampler.config().reveal_count;
        if pool.len() < required {
            tracing::warn!(
                user_id = %self.user_id(),
                available = pool.len(),
                required,
                "partner pool too small to reveal"
            );
            return Err(CoreError::InsufficientTasks {
                available: pool.len(),
                required,
            });
        }
        Ok(select_random_tasks(&pool, required, rng))
    }

    /// Record `task_id` as the acting user's assignment for the current week.
    pub fn confirm_spin<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        task_id: &str,
    ) -> Result<WeeklySpin> {
        let partner = self.session.partner()?;
        let week_start = self.schedule.current_week_start(now);

        if let Some(existing) = self.store.find_spin(self.user_id(), week_start)? {
            if self.own_task_id(&existing).is_some() {
                tracing::warn!(user_id = %self.user_id(), %week_start, "second spin rejected");
                return Err(CoreError::AlreadySpun { week_start });
            }
        }

        let task = self
            .store
            .get_task(task_id)?
            .ok_or_else(|| CoreError::not_found("task", task_id))?;
        if task.user_id != partner.id {
            return Err(ValidationError::TaskNotEligible {
                task_id: task.id,
                reason: "it is not one of your partner's tasks".into(),
            }
            .into());
        }
        if !task.is_available() {
            return Err(ValidationError::TaskNotEligible {
                task_id: task.id,
                reason: format!("it is {}", task.status),
            }
            .into());
        }

        let spin = self.store.claim_spin(&SpinClaim {
            week_start,
            user_id: self.user_id().to_string(),
            partner_id: partner.id.clone(),
            task_id: task.id.clone(),
        })?;
        tracing::info!(
            user_id = %self.user_id(),
            spin_id = %spin.id,
            task_id = %task.id,
            %week_start,
            "spin recorded"
        );
        Ok(spin)
    }

    /// Reveal, spin the wheel and confirm where it landed.
    pub fn spin<Tz: TimeZone, R: Rng + ?Sized>(
        &self,
        now: &DateTime<Tz>,
        rng: &mut R,
    ) -> Result<SpinOutcome> {
        let revealed = self.reveal(rng)?;
        let landed = spin_wheel(&revealed, rng)
            .cloned()
            .ok_or(CoreError::InsufficientTasks {
                available: 0,
                required: self.sampler.config().reveal_count,
            })?;
        let spin = self.confirm_spin(now, &landed.id)?;
        Ok(SpinOutcome {
            revealed,
            landed,
            spin,
        })
    }

    /// Record whether the partner completed last week's task.
    ///
    /// The verified record is the one for the week before the current one.
    /// Writes the partner's `verified_by_partner` flag; submitting again
    /// overwrites the earlier answer.
    pub fn verify<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        partner_completed: bool,
    ) -> Result<WeeklySpin> {
        let week_start = self.schedule.previous_week_start(now);
        let spin = self
            .store
            .find_spin(self.user_id(), week_start)?
            .ok_or(CoreError::NoSpinForWeek { week_start })?;
        let side = self.side_in(&spin)?;

        let spin = self
            .store
            .set_verification(&spin.id, side.other(), partner_completed)?;
        tracing::info!(
            user_id = %self.user_id(),
            partner_id = %spin.user_id(side.other()),
            spin_id = %spin.id,
            partner_completed,
            "verification recorded"
        );
        Ok(spin)
    }

    /// Mark the acting user's assigned task for the current week as done.
    pub fn complete_assignment<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<WeeklySpin> {
        let week_start = self.schedule.current_week_start(now);
        let spin = self
            .store
            .find_spin(self.user_id(), week_start)?
            .ok_or(CoreError::NoSpinForWeek { week_start })?;
        let side = self.side_in(&spin)?;
        let task_id = spin
            .task_id(side)
            .ok_or(CoreError::NoSpinForWeek { week_start })?;

        let mut task = self
            .store
            .get_task(task_id)?
            .ok_or_else(|| CoreError::not_found("task", task_id))?;
        task.mark_completed(now.with_timezone(&Utc));
        self.store.update_task(&task)?;

        let spin = self.store.set_completion(&spin.id, side, true)?;
        tracing::info!(
            user_id = %self.user_id(),
            spin_id = %spin.id,
            task_id = %task.id,
            "assignment completed"
        );
        Ok(spin)
    }

    pub fn vetoes_used_this_month<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<usize> {
        Ok(self
            .store
            .veto_usages(self.user_id(), &current_month(now))?
            .len())
    }

    pub fn veto_available<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<bool> {
        Ok(self.vetoes_used_this_month(now)? == 0)
    }

    /// Swap both partners' tasks on a spin, once per calendar month.
    ///
    /// Without `spin_id` the current week's spin is used.
    pub fn veto<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        spin_id: Option<&str>,
    ) -> Result<WeeklySpin> {
        let month = current_month(now);
        if !self.veto_available(now)? {
            tracing::warn!(user_id = %self.user_id(), %month, "veto already used");
            return Err(CoreError::VetoUnavailable { month });
        }

        let spin_id = match spin_id {
            Some(id) => id.to_string(),
            None => {
                let week_start = self.schedule.current_week_start(now);
                self.store
                    .find_spin(self.user_id(), week_start)?
                    .ok_or(CoreError::NoSpinForWeek { week_start })?
                    .id
            }
        };

        let spin = self.store.apply_veto(&VetoRequest {
            spin_id,
            user_id: self.user_id().to_string(),
            month,
            used_on: now.date_naive(),
        })?;
        tracing::info!(
            user_id = %self.user_id(),
            spin_id = %spin.id,
            "veto applied, tasks swapped"
        );
        Ok(spin)
    }

    /// The current week's assignments as seen by the acting user.
    pub fn current_week<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<Option<CurrentWeekView>> {
        let week_start = self.schedule.current_week_start(now);
        let Some(spin) = self.store.find_spin(self.user_id(), week_start)? else {
            return Ok(None);
        };
        let side = self.side_in(&spin)?;

        let ids: Vec<String> = [spin.task_id(side), spin.task_id(side.other())]
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        let tasks = self.store.tasks_by_ids(&ids)?;
        let pick = |id: Option<&str>| -> Option<Task> {
            let id = id?;
            tasks.iter().find(|task| task.id == id).cloned()
        };

        Ok(Some(CurrentWeekView {
            week_start,
            days_remaining: days_remaining(week_start, now),
            my_task: pick(spin.task_id(side)),
            partner_task: pick(spin.task_id(side.other())),
            my_completed: spin.completed(side).unwrap_or(false),
            partner_completed: spin.completed(side.other()).unwrap_or(false),
            veto_available: self.veto_available(now)?,
            vetoed_by_me: spin.vetoed(side),
            vetoed_by_partner: spin.vetoed(side.other()),
            spin_id: spin.id,
        }))
    }

    /// Which sides of a spin have an assignment.
    pub fn spin_status(&self, spin_id: &str) -> Result<SpinStatus> {
        let spin = self
            .store
            .get_spin(spin_id)?
            .ok_or_else(|| CoreError::not_found("weekly spin", spin_id))?;
        Ok(spin.status())
    }

    fn side_in(&self, spin: &WeeklySpin) -> Result<Side> {
        spin.side_of(self.user_id())
            .ok_or_else(|| CoreError::NotParticipant {
                user_id: self.user_id().to_string(),
                spin_id: spin.id.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::storage::CasinoDb;
    use crate::user::{register, User};
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    // 2026-10-11, 2026-10-18 and 2026-11-01 are Sundays.
    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Couple {
        db: CasinoDb,
        alex: Session,
        sam: Session,
    }

    fn add_tasks(db: &CasinoDb, owner: &User, n: usize) -> Vec<Task> {
        (0..n)
            .map(|i| {
                let task = Task::new(&owner.id, &format!("{} task {i}", owner.name), None).unwrap();
                db.insert_task(&task).unwrap();
                task
            })
            .collect()
    }

    fn couple(tasks_each: usize) -> Couple {
        let db = CasinoDb::open_memory().unwrap();
        let alex = register(&db, "Alex", "alex@example.com", None).unwrap();
        let sam = register(&db, "Sam", "sam@example.com", Some("alex@example.com")).unwrap();
        add_tasks(&db, &alex, tasks_each);
        add_tasks(&db, &sam, tasks_each);
        let alex = Session::load(&db, "alex@example.com").unwrap();
        let sam = Session::load(&db, &sam.email).unwrap();
        Couple { db, alex, sam }
    }

    fn rng(seed: u64) -> Mcg128Xsl64 {
        Mcg128Xsl64::seed_from_u64(seed)
    }

    #[test]
    fn countdown_on_any_other_day() {
        let c = couple(6);
        let flow = WeeklyFlow::new(&c.db, &c.alex);
        assert_eq!(flow.phase(&at(2026, 10, 20, 12, 0)).unwrap(), Phase::Countdown);
        assert_eq!(flow.phase(&at(2026, 10, 17, 23, 30)).unwrap(), Phase::Countdown);
    }

    #[test]
    fn spin_day_without_history_is_ready_to_spin() {
        let c = couple(6);
        let flow = WeeklyFlow::new(&c.db, &c.alex);
        assert_eq!(flow.phase(&at(2026, 10, 18, 10, 0)).unwrap(), Phase::ReadyToSpin);
        assert_eq!(flow.phase(&at(2026, 10, 18, 23, 0)).unwrap(), Phase::ReadyToSpin);
    }

    #[test]
    fn spinning_moves_each_partner_to_spin_complete() {
        let c = couple(8);
        let now = at(2026, 10, 18, 23, 15);
        let alex = WeeklyFlow::new(&c.db, &c.alex);
        let sam = WeeklyFlow::new(&c.db, &c.sam);

        let outcome = alex.spin(&now, &mut rng(1)).unwrap();
        assert_eq!(outcome.revealed.len(), 6);
        assert!(outcome.revealed.contains(&outcome.landed));
        assert_eq!(outcome.landed.user_id, c.sam.user.id);
        assert_eq!(outcome.spin.week_start_date, date(2026, 10, 18));

        assert_eq!(alex.phase(&now).unwrap(), Phase::SpinComplete);
        assert_eq!(sam.phase(&now).unwrap(), Phase::ReadyToSpin);

        let spin = sam.spin(&now, &mut rng(2)).unwrap().spin;
        assert_eq!(spin.id, outcome.spin.id);
        assert!(spin.status().both_spun);
        assert_eq!(sam.phase(&now).unwrap(), Phase::SpinComplete);
        // recomputing changes nothing
        assert_eq!(sam.phase(&now).unwrap(), Phase::SpinComplete);

        let landed = c.db.get_task(&outcome.landed.id).unwrap().unwrap();
        assert_eq!(landed.status, TaskStatus::InProgress);
    }

    #[test]
    fn second_spin_in_same_week_is_rejected() {
        let c = couple(8);
        let now = at(2026, 10, 18, 23, 15);
        let flow = WeeklyFlow::new(&c.db, &c.alex);
        flow.spin(&now, &mut rng(1)).unwrap();

        let err = flow.spin(&at(2026, 10, 21, 9, 0), &mut rng(2)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::AlreadySpun { week_start } if week_start == date(2026, 10, 18)
        ));
        assert_eq!(err.kind(), ErrorKind::Precondition);
        let in_progress = c
            .db
            .list_tasks(&c.sam.user.id, Some(TaskStatus::InProgress))
            .unwrap();
        assert_eq!(in_progress.len(), 1);
    }

    #[test]
    fn small_partner_pool_blocks_reveal() {
        let c = couple(5);
        let flow = WeeklyFlow::new(&c.db, &c.alex);
        let err = flow.reveal(&mut rng(1)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientTasks {
                available: 5,
                required: 6
            }
        ));
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
        assert_eq!(
            err.to_string(),
            "Your partner needs at least 6 available tasks. They currently have 5."
        );
    }

    #[test]
    fn reveal_count_follows_sampler_config() {
        let c = couple(5);
        let flow = WeeklyFlow::new(&c.db, &c.alex).with_sampler(SamplerConfig {
            reveal_count: 4,
            seed: None,
        });
        assert_eq!(flow.reveal(&mut rng(1)).unwrap().len(), 4);
    }

    #[test]
    fn reveal_needs_a_partner() {
        let db = CasinoDb::open_memory().unwrap();
        register(&db, "Solo", "solo@example.com", None).unwrap();
        let session = Session::load(&db, "solo@example.com").unwrap();
        let flow = WeeklyFlow::new(&db, &session);
        assert!(matches!(flow.reveal(&mut rng(1)), Err(CoreError::PartnerNotLinked)));
    }

    #[test]
    fn confirm_rejects_tasks_that_are_not_the_partners() {
        let c = couple(6);
        let now = at(2026, 10, 18, 23, 15);
        let flow = WeeklyFlow::new(&c.db, &c.alex);
        let own = c.db.list_tasks(&c.alex.user.id, None).unwrap();
        let err = flow.confirm_spin(&now, &own[0].id).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::TaskNotEligible { .. })
        ));
        assert!(flow.confirm_spin(&now, "missing").is_err());
        assert!(c.db.find_spin(&c.alex.user.id, date(2026, 10, 18)).unwrap().is_none());
    }

    fn spin_both(c: &Couple, now: &DateTime<Utc>) -> WeeklySpin {
        WeeklyFlow::new(&c.db, &c.alex).spin(now, &mut rng(3)).unwrap();
        WeeklyFlow::new(&c.db, &c.sam).spin(now, &mut rng(4)).unwrap().spin
    }

    #[test]
    fn verification_reads_the_week_before_the_current_one() {
        let c = couple(8);
        let spin = spin_both(&c, &at(2026, 10, 11, 23, 30));
        let alex = WeeklyFlow::new(&c.db, &c.alex);
        let sam = WeeklyFlow::new(&c.db, &c.sam);
        // current week 2026-10-18, previous week 2026-10-11
        let sunday_morning = at(2026, 10, 25, 10, 0);

        assert_eq!(alex.phase(&sunday_morning).unwrap(), Phase::VerificationPending);
        assert_eq!(sam.phase(&sunday_morning).unwrap(), Phase::VerificationPending);

        // Alex spun first, so Alex is side A and verifies Sam (side B).
        let after_alex = alex.verify(&sunday_morning, true).unwrap();
        assert_eq!(after_alex.id, spin.id);
        assert_eq!(after_alex.user_b_verified_by_partner, Some(true));
        assert_eq!(after_alex.user_a_verified_by_partner, None);
        assert_eq!(alex.phase(&sunday_morning).unwrap(), Phase::VerificationPending);
        assert_eq!(sam.phase(&sunday_morning).unwrap(), Phase::VerificationPending);

        sam.verify(&sunday_morning, false).unwrap();
        assert_eq!(alex.phase(&sunday_morning).unwrap(), Phase::VerificationComplete);
        assert_eq!(sam.phase(&sunday_morning).unwrap(), Phase::VerificationComplete);

        // at the threshold the new week opens
        assert_eq!(alex.phase(&at(2026, 10, 25, 23, 0)).unwrap(), Phase::ReadyToSpin);
    }

    #[test]
    fn spin_day_morning_ignores_the_week_still_open() {
        let c = couple(8);
        spin_both(&c, &at(2026, 10, 11, 23, 30));
        let alex = WeeklyFlow::new(&c.db, &c.alex);
        // the 2026-10-11 record is the current week here, not the previous one
        let morning = at(2026, 10, 18, 10, 0);
        assert_eq!(alex.phase(&morning).unwrap(), Phase::ReadyToSpin);
        let err = alex.verify(&morning, true).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NoSpinForWeek { week_start } if week_start == date(2026, 10, 4)
        ));
    }

    #[test]
    fn re_verification_overwrites() {
        let c = couple(8);
        spin_both(&c, &at(2026, 10, 11, 23, 30));
        let alex = WeeklyFlow::new(&c.db, &c.alex);
        let morning = at(2026, 10, 25, 10, 0);
        alex.verify(&morning, true).unwrap();
        let spin = alex.verify(&morning, false).unwrap();
        assert_eq!(spin.user_b_verified_by_partner, Some(false));
    }

    #[test]
    fn verify_without_history_fails() {
        let c = couple(6);
        let flow = WeeklyFlow::new(&c.db, &c.alex);
        let err = flow.verify(&at(2026, 10, 25, 10, 0), true).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NoSpinForWeek { week_start } if week_start == date(2026, 10, 11)
        ));
    }

    #[test]
    fn completing_marks_task_and_flag() {
        let c = couple(8);
        let spin = spin_both(&c, &at(2026, 10, 18, 23, 30));
        let alex = WeeklyFlow::new(&c.db, &c.alex);
        let now = at(2026, 10, 21, 19, 0);

        let updated = alex.complete_assignment(&now).unwrap();
        assert_eq!(updated.user_a_completed, Some(true));
        assert_eq!(updated.user_b_completed, None);

        let task_id = spin.user_a_task_id.unwrap();
        let task = c.db.get_task(&task_id).unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.completed_at, Some(now));
    }

    #[test]
    fn veto_once_per_month() {
        let c = couple(10);
        let spin = spin_both(&c, &at(2026, 10, 18, 23, 30));
        let alex = WeeklyFlow::new(&c.db, &c.alex);
        let now = at(2026, 10, 19, 8, 0);

        assert!(alex.veto_available(&now).unwrap());
        let swapped = alex.veto(&now, None).unwrap();
        assert_eq!(swapped.user_a_task_id, spin.user_b_task_id);
        assert_eq!(swapped.user_b_task_id, spin.user_a_task_id);
        assert!(swapped.user_a_vetoed);
        assert!(!swapped.user_b_vetoed);
        assert!(!alex.veto_available(&now).unwrap());
        assert_eq!(alex.vetoes_used_this_month(&now).unwrap(), 1);

        let err = alex.veto(&now, Some(&spin.id)).unwrap_err();
        assert!(matches!(err, CoreError::VetoUnavailable { ref month } if month == "2026-10"));
        assert_eq!(c.db.get_spin(&spin.id).unwrap().unwrap(), swapped);

        // Sam still has a veto of their own.
        assert!(WeeklyFlow::new(&c.db, &c.sam).veto_available(&now).unwrap());

        let november = at(2026, 11, 1, 23, 30);
        spin_both(&c, &november);
        assert!(alex.veto_available(&november).unwrap());
        alex.veto(&november, None).unwrap();
    }

    #[test]
    fn veto_before_partner_spins_is_rejected() {
        let c = couple(8);
        let now = at(2026, 10, 18, 23, 30);
        let alex = WeeklyFlow::new(&c.db, &c.alex);
        alex.spin(&now, &mut rng(1)).unwrap();
        assert!(matches!(alex.veto(&now, None), Err(CoreError::SpinIncomplete)));
        assert!(alex.veto_available(&now).unwrap());
    }

    #[test]
    fn current_week_view() {
        let c = couple(8);
        let alex = WeeklyFlow::new(&c.db, &c.alex);
        let now = at(2026, 10, 19, 12, 0);
        assert!(alex.current_week(&now).unwrap().is_none());

        let outcome = alex.spin(&at(2026, 10, 18, 23, 30), &mut rng(5)).unwrap();
        let view = alex.current_week(&now).unwrap().unwrap();
        assert_eq!(view.spin_id, outcome.spin.id);
        assert_eq!(view.week_start, date(2026, 10, 18));
        assert_eq!(view.days_remaining, 6);
        assert_eq!(view.my_task.as_ref().map(|t| t.id.as_str()), Some(outcome.landed.id.as_str()));
        assert!(view.partner_task.is_none());
        assert!(view.veto_available);
        assert!(!view.my_completed);

        let status = alex.spin_status(&view.spin_id).unwrap();
        assert!(status.user_a_spun);
        assert!(!status.user_b_spun);
        assert!(!status.both_spun);
    }

    #[test]
    fn current_week_view_loads_both_assignments() {
        let c = couple(8);
        let spin = spin_both(&c, &at(2026, 10, 18, 23, 30));
        let view = WeeklyFlow::new(&c.db, &c.sam)
            .current_week(&at(2026, 10, 20, 9, 0))
            .unwrap()
            .unwrap();
        // Sam is side B
        assert_eq!(view.my_task.map(|t| t.id), spin.user_b_task_id);
        assert_eq!(view.partner_task.map(|t| t.id), spin.user_a_task_id);
        assert_eq!(view.days_remaining, 5);
    }

    #[test]
    fn custom_schedule_changes_phase_boundaries() {
        let c = couple(6);
        let flow = WeeklyFlow::new(&c.db, &c.alex)
            .with_schedule(SpinSchedule::new(chrono::Weekday::Fri, 18).unwrap());
        // 2026-10-23 is a Friday.
        assert_eq!(flow.phase(&at(2026, 10, 18, 23, 30)).unwrap(), Phase::Countdown);
        assert_eq!(flow.phase(&at(2026, 10, 23, 18, 0)).unwrap(), Phase::ReadyToSpin);
    }
}
