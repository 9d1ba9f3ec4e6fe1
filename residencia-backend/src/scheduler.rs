//! Runs the notification jobs on their cron schedules, off the request path.

use core::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use cron::Schedule;
use residencia_config::{ConfigError, NotificationConfig};
use residencia_database::Pool;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::mail::Mailer;
use crate::notifications;

/// Parses a standard five-field cron expression (minute precision). Numeric weekdays
/// count from Sunday as 0 (7 is Sunday too); names like `MON-FRI` also work.
pub fn parse_cron(expression: &str) -> Result<Schedule, AppError> {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    let &[minute, hour, day, month, weekday] = fields.as_slice() else {
        return Err(invalid_cron(expression, "expected five fields"));
    };
    let weekday = weekday_field(weekday).ok_or_else(|| invalid_cron(expression, "bad weekday"))?;
    // the cron crate wants a seconds field in front
    Ok(format!("0 {minute} {hour} {day} {month} {weekday}").parse::<Schedule>()?)
}

fn invalid_cron(expression: &str, problem: &str) -> AppError {
    ConfigError::Invalid(format!("cron expression `{expression}`: {problem}")).into()
}

/// Rewrites numeric weekdays to the cron crate's numbering, where Sunday is 1.
fn weekday_field(field: &str) -> Option<String> {
    let items = field
        .split(',')
        .map(|item| {
            let (range, step) = match item.split_once('/') {
                Some((range, step)) => (range, Some(step)),
                None => (item, None),
            };
            let range = weekday_range(range, step.is_some())?;
            Some(match step {
                Some(step) => format!("{range}/{step}"),
                None => range,
            })
        })
        .collect::<Option<Vec<String>>>()?;
    Some(items.join(","))
}

fn weekday_range(range: &str, stepped: bool) -> Option<String> {
    if range == "*" || range.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Some(range.to_owned());
    }
    let number = |value: &str| value.parse::<u8>().ok().filter(|day| *day <= 7);
    match range.split_once('-') {
        None => Some(crate_weekday(number(range)?).to_string()),
        Some((start, end)) => {
            let (start, end) = (number(start)?, number(end)?);
            if start > end {
                return None;
            }
            match (start, end) {
                (0, 7) => Some("1-7".to_owned()),
                // a range ending on Sunday wraps around to the crate's day 1
                (7, 7) => Some("1".to_owned()),
                (6, 7) if !stepped => Some("7,1".to_owned()),
                (_, 7) if !stepped => Some(format!("{}-7,1", start + 1)),
                (_, 7) => None,
                _ => Some(format!("{}-{}", start + 1, end + 1)),
            }
        }
    }
}

const fn crate_weekday(day: u8) -> u8 {
    if day == 7 { 1 } else { day + 1 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    StockCheck,
    DailySummary,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StockCheck => "stock check",
            Self::DailySummary => "daily medication summary",
        })
    }
}

pub struct Scheduler {
    pool: Pool,
    mailer: Arc<dyn Mailer>,
    config: NotificationConfig,
    jobs: Vec<(Task, Schedule)>,
}

impl Scheduler {
    pub fn new(
        pool: Pool,
        mailer: Arc<dyn Mailer>,
        config: NotificationConfig,
    ) -> Result<Self, AppError> {
        let jobs = vec![
            (Task::StockCheck, parse_cron(&config.stock_check_cron)?),
            (Task::DailySummary, parse_cron(&config.daily_summary_cron)?),
        ];
        Ok(Self {
            pool,
            mailer,
            config,
            jobs,
        })
    }

    /// The earliest run strictly after `after`, with every task scheduled for it.
    #[must_use]
    pub fn next_due(&self, after: DateTime<Local>) -> Option<(DateTime<Local>, Vec<Task>)> {
        next_due(&self.jobs, after)
    }

    /// Runs until `shutdown` changes or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(jobs = self.jobs.len(), "scheduler started");
        let mut last = Local::now();
        loop {
            let Some((at, tasks)) = self.next_due(last) else {
                warn!("no upcoming scheduled run, scheduler stopped");
                return;
            };
            let wait = (at - Local::now()).to_std().unwrap_or_default();
            tokio::select! {
                () = tokio::time::sleep(wait) => {
                    for task in tasks {
                        self.execute(task).await;
                    }
                    last = at;
                }
                _ = shutdown.changed() => {
                    info!("scheduler stopped");
                    return;
                }
            }
        }
    }

    async fn execute(&self, task: Task) {
        info!(%task, "running scheduled job");
        let result = match task {
            Task::StockCheck => {
                notifications::check_stock_and_notify(&self.pool, self.mailer.as_ref(), &self.config)
                    .await
            }
            Task::DailySummary => {
                notifications::send_daily_medication_summary(
                    &self.pool,
                    self.mailer.as_ref(),
                    &self.config,
                )
                .await
            }
        };
        match result {
            Ok(sent) => info!(%task, sent, "scheduled job finished"),
            Err(err) => error!(%task, "scheduled job failed: {err}"),
        }
    }
}

fn next_due(
    jobs: &[(Task, Schedule)],
    after: DateTime<Local>,
) -> Option<(DateTime<Local>, Vec<Task>)> {
    let upcoming: Vec<(Task, DateTime<Local>)> = jobs
        .iter()
        .filter_map(|(task, schedule)| schedule.after(&after).next().map(|at| (*task, at)))
        .collect();
    let at = upcoming.iter().map(|(_, at)| *at).min()?;
    let tasks = upcoming
        .into_iter()
        .filter(|(_, time)| *time == at)
        .map(|(task, _)| task)
        .collect();
    Some((at, tasks))
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone, Timelike, Weekday};

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 4, hour, minute, 0)
            .single()
            .unwrap()
    }

    #[test]
    fn five_field_expressions_parse() {
        assert!(parse_cron("0 6 * * *").is_ok());
        assert!(parse_cron("*/15 8-20 * * 1-5").is_ok());
        assert!(matches!(parse_cron("every morning"), Err(AppError::Config(_))));
        assert!(matches!(parse_cron("61 6 * * *"), Err(AppError::Schedule(_))));
        assert!(matches!(parse_cron("0 6 * * 8"), Err(AppError::Config(_))));
    }

    #[test]
    fn weekdays_count_from_sunday_as_zero() {
        assert_eq!(weekday_field("1-5").as_deref(), Some("2-6"));
        assert_eq!(weekday_field("0").as_deref(), Some("1"));
        assert_eq!(weekday_field("7").as_deref(), Some("1"));
        assert_eq!(weekday_field("5-7").as_deref(), Some("6-7,1"));
        assert_eq!(weekday_field("6-7").as_deref(), Some("7,1"));
        assert_eq!(weekday_field("0-6").as_deref(), Some("1-7"));
        assert_eq!(weekday_field("0,3/2").as_deref(), Some("1,4/2"));
        assert_eq!(weekday_field("MON-FRI").as_deref(), Some("MON-FRI"));
        assert_eq!(weekday_field("*").as_deref(), Some("*"));
        assert_eq!(weekday_field("5-2"), None);
    }

    #[test]
    fn workday_jobs_skip_the_weekend() {
        let jobs = vec![(Task::StockCheck, parse_cron("0 8 * * 1-5").unwrap())];
        // Saturday 2 March 2024
        let saturday = Local
            .with_ymd_and_hms(2024, 3, 2, 9, 0, 0)
            .single()
            .unwrap();
        let (time, _) = next_due(&jobs, saturday).unwrap();
        assert_eq!(time.weekday(), Weekday::Mon);
        assert_eq!((time.day(), time.hour()), (4, 8));

        let sundays = vec![(Task::DailySummary, parse_cron("30 7 * * 0").unwrap())];
        let (time, _) = next_due(&sundays, saturday).unwrap();
        assert_eq!(time.weekday(), Weekday::Sun);

        let weekend = vec![(Task::DailySummary, parse_cron("0 10 * * 6-7").unwrap())];
        let (time, _) = next_due(&weekend, saturday).unwrap();
        assert_eq!((time.weekday(), time.hour()), (Weekday::Sat, 10));
        let (time, _) = next_due(&weekend, time).unwrap();
        assert_eq!(time.weekday(), Weekday::Sun);
        let (time, _) = next_due(&weekend, time).unwrap();
        assert_eq!(time.weekday(), Weekday::Sat);
    }

    #[test]
    fn jobs_on_the_same_minute_run_together() {
        let jobs = vec![
            (Task::StockCheck, parse_cron("0 6 * * *").unwrap()),
            (Task::DailySummary, parse_cron("0 6 * * *").unwrap()),
        ];
        let (time, tasks) = next_due(&jobs, at(5, 0)).unwrap();
        assert_eq!((time.hour(), time.minute()), (6, 0));
        assert_eq!(tasks, vec![Task::StockCheck, Task::DailySummary]);
    }

    #[test]
    fn earliest_job_wins() {
        let jobs = vec![
            (Task::StockCheck, parse_cron("30 7 * * *").unwrap()),
            (Task::DailySummary, parse_cron("0 7 * * *").unwrap()),
        ];
        let (time, tasks) = next_due(&jobs, at(6, 0)).unwrap();
        assert_eq!((time.hour(), time.minute()), (7, 0));
        assert_eq!(tasks, vec![Task::DailySummary]);

        let (time, tasks) = next_due(&jobs, time).unwrap();
        assert_eq!((time.hour(), time.minute()), (7, 30));
        assert_eq!(tasks, vec![Task::StockCheck]);
    }
}
