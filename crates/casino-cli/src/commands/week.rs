//! Weekly spin commands.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Instant;

use casino_core::week::{run_countdown, DEFAULT_TICK};
use casino_core::{CasinoDb, Config, Session, SpinSchedule, WeeklyFlow};
use chrono::{DateTime, Local};
use clap::{Subcommand, ValueEnum};

use super::{print_json, CliResult, Context};

#[derive(Clone, Copy, ValueEnum)]
pub enum Answer {
    Yes,
    No,
}

#[derive(Subcommand)]
pub enum WeekAction {
    /// Current phase and time until the next spin
    Status,
    /// Time until the next spin threshold
    Countdown {
        /// Keep printing once per second until Ctrl-C
        #[arg(long)]
        watch: bool,
        /// Stop watching after this many updates
        #[arg(long, requires = "watch")]
        ticks: Option<u64>,
    },
    /// Reveal a random subset of your partner's tasks
    Reveal {
        /// Seed for a reproducible reveal
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Reveal, spin the wheel and record where it lands
    Spin {
        /// Seed for a reproducible spin
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Record a specific revealed task as your assignment
    Confirm {
        /// Task ID
        task_id: String,
    },
    /// Did your partner complete last week's task?
    Verify {
        #[arg(value_enum)]
        answer: Answer,
    },
    /// Mark your assignment for this week as done
    Complete,
    /// Swap this week's tasks (once per month)
    Veto {
        /// Spin ID (defaults to this week's)
        #[arg(long)]
        spin_id: Option<String>,
    },
    /// This week's assignments
    Current,
}

pub fn run(ctx: &Context, action: WeekAction) -> CliResult {
    let config = Config::load()?;

    if let WeekAction::Countdown { watch, ticks } = action {
        return countdown(ctx, config.schedule(), watch, ticks);
    }

    let db = CasinoDb::open()?;
    let session = ctx.session(&db, &config)?;
    let now = ctx.now();

    let mut sampler = config.sampler.clone();
    if let WeekAction::Reveal { seed: Some(seed) } | WeekAction::Spin { seed: Some(seed) } =
        action
    {
        sampler.seed = Some(seed);
    }
    let flow = WeeklyFlow::new(&db, &session)
        .with_schedule(config.schedule())
        .with_sampler(sampler);

    match action {
        WeekAction::Status => status(&flow, &session, &now)?,
        WeekAction::Countdown { .. } => {}
        WeekAction::Reveal { .. } => {
            let revealed = flow.reveal(&mut flow.sampler().rng())?;
            print_json(&revealed)?;
        }
        WeekAction::Spin { .. } => {
            let outcome = flow.spin(&now, &mut flow.sampler().rng())?;
            println!("The wheel landed on: {}", outcome.landed.text);
            print_json(&outcome.spin)?;
        }
        WeekAction::Confirm { task_id } => {
            let spin = flow.confirm_spin(&now, &task_id)?;
            print_json(&spin)?;
        }
        WeekAction::Verify { answer } => {
            let spin = flow.verify(&now, matches!(answer, Answer::Yes))?;
            print_json(&spin)?;
        }
        WeekAction::Complete => {
            let spin = flow.complete_assignment(&now)?;
            print_json(&spin)?;
        }
        WeekAction::Veto { spin_id } => {
            let spin = flow.veto(&now, spin_id.as_deref())?;
            println!("Veto used: tasks swapped");
            print_json(&spin)?;
        }
        WeekAction::Current => match flow.current_week(&now)? {
            Some(view) => print_json(&view)?,
            None => println!("No spin yet this week"),
        },
    }
    Ok(())
}

fn status(flow: &WeeklyFlow<'_, CasinoDb>, session: &Session, now: &DateTime<Local>) -> CliResult {
    let schedule = flow.schedule();
    let countdown = schedule.time_until_next_threshold(now);
    print_json(&serde_json::json!({
        "user": session.user.email,
        "partner": session.partner.as_ref().map(|p| &p.email),
        "phase": flow.phase(now)?,
        "week_start": schedule.current_week_start(now),
        "next_threshold": schedule.next_threshold(now).to_rfc3339(),
        "countdown": countdown.to_string(),
        "veto_available": flow.veto_available(now)?,
    }))
}

fn countdown(ctx: &Context, schedule: SpinSchedule, watch: bool, ticks: Option<u64>) -> CliResult {
    if !watch {
        println!("{}", schedule.time_until_next_threshold(&ctx.now()));
        return Ok(());
    }

    // With --at the clock starts at that instant and advances in real time.
    let started = Instant::now();
    let base = ctx.fixed_time();
    let clock = move || match base {
        Some(at) => {
            at + chrono::Duration::from_std(started.elapsed())
                .unwrap_or(chrono::Duration::zero())
        }
        None => Local::now(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let limit = ticks.unwrap_or(u64::MAX);
    let mut delivered = 0u64;
    runtime.block_on(run_countdown(
        schedule,
        clock,
        DEFAULT_TICK,
        until_interrupted(tokio::signal::ctrl_c()),
        |countdown| {
            println!("{countdown}");
            delivered += 1;
            if delivered >= limit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        },
    ));
    Ok(())
}

/// Resolves when `signal` fires. If the handler could not be installed the
/// watch keeps running until its tick limit instead of stopping at once.
async fn until_interrupted<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn interrupt_resolves_on_signal() {
        let signal = async { Ok(()) };
        let done = tokio::time::timeout(Duration::from_secs(1), until_interrupted(signal));
        assert!(done.await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_signal_handler_never_resolves() {
        let failing = async { Err(std::io::Error::other("no signal driver")) };
        let done = tokio::time::timeout(Duration::from_secs(60), until_interrupted(failing));
        assert!(done.await.is_err());
    }
}
