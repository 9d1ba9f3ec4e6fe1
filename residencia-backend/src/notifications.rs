//! Low-stock alerts and the daily medication summary. Both run from the scheduler
//! and from the manual trigger endpoints.

use core::fmt::Write as _;
use core::time::Duration;

use residencia_config::NotificationConfig;
use residencia_database::models::{Medication, ScheduledDose};
use residencia_database::repositories::{medications, staff, treatments};
use residencia_database::Pool;
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::mail::{Email, Mailer};

pub const STOCK_SUBJECT: &str = "Low medication stock";
pub const SUMMARY_SUBJECT: &str = "Medication scheduled for today";

#[must_use]
pub fn stock_alert_body(low: &[Medication]) -> String {
    let mut body = String::from("The following medications are below their minimum stock:\n\n");
    for medication in low {
        let _ = writeln!(
            body,
            "- {}: {} units (minimum {})",
            medication.name, medication.stock, medication.minimum_stock
        );
    }
    body.push_str("\nPlease restock them.\n");
    body
}

/// Doses of one resident, in query order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySummary {
    pub resident_name: String,
    pub email: String,
    pub doses: Vec<ScheduledDose>,
}

/// Groups consecutive doses by resident. The query orders them by resident.
#[must_use]
pub fn group_by_resident(doses: Vec<ScheduledDose>) -> Vec<DailySummary> {
    let mut summaries: Vec<(i32, DailySummary)> = Vec::new();
    for dose in doses {
        match summaries.last_mut() {
            Some((resident_id, summary)) if *resident_id == dose.resident_id => {
                summary.doses.push(dose);
            }
            _ => summaries.push((
                dose.resident_id,
                DailySummary {
                    resident_name: dose.resident_name.clone(),
                    email: dose.resident_email.clone(),
                    doses: vec![dose],
                },
            )),
        }
    }
    summaries.into_iter().map(|(_, summary)| summary).collect()
}

#[must_use]
pub fn summary_body(summary: &DailySummary) -> String {
    let mut body = format!(
        "Hello {},\n\nThese are your medications for today:\n\n",
        summary.resident_name
    );
    for dose in &summary.doses {
        let _ = writeln!(
            body,
            "- {}: {}, {}, {}",
            dose.medication, dose.dose, dose.frequency, dose.route
        );
    }
    body.push_str("\nHave a good day.\n");
    body
}

async fn send_to_all(
    mailer: &dyn Mailer,
    recipients: impl Iterator<Item = String> + Send,
    subject: &str,
    body: &str,
) -> Result<usize, AppError> {
    let mut sent = 0;
    for to in recipients {
        mailer
            .send(Email {
                to,
                subject: subject.to_owned(),
                body: body.to_owned(),
            })
            .await?;
        sent += 1;
    }
    Ok(sent)
}

/// Emails every reachable staff member of the alert category when a medication is
/// below its minimum. Returns the number of emails sent.
#[instrument(skip_all)]
pub async fn check_stock_and_notify(
    pool: &Pool,
    mailer: &dyn Mailer,
    config: &NotificationConfig,
) -> Result<usize, AppError> {
    let mut connection = pool.get().await?;
    let low = medications::below_minimum(&mut connection).await?;
    if low.is_empty() {
        info!("no medication below minimum stock");
        return Ok(0);
    }
    let recipients =
        staff::reachable_in_category(&mut connection, &config.stock_alert_category).await?;
    drop(connection);
    if recipients.is_empty() {
        warn!(
            category = config.stock_alert_category,
            "medications below minimum stock but nobody to notify"
        );
        return Ok(0);
    }
    let recipients = recipients.into_iter().filter_map(|member| member.email);
    let sent = send_to_all(mailer, recipients, STOCK_SUBJECT, &stock_alert_body(&low)).await?;
    info!(low = low.len(), sent, "stock alert sent");
    Ok(sent)
}

/// Sends every active resident their active treatments. A failed delivery is logged
/// and skipped. Returns the number of emails sent.
#[instrument(skip_all)]
pub async fn send_daily_medication_summary(
    pool: &Pool,
    mailer: &dyn Mailer,
    config: &NotificationConfig,
) -> Result<usize, AppError> {
    let doses = {
        let mut connection = pool.get().await?;
        treatments::scheduled_doses(&mut connection).await?
    };
    let pause = Duration::from_millis(config.summary_pause_ms);
    let mut sent = 0;
    for (index, summary) in group_by_resident(doses).iter().enumerate() {
        if index > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        let email = Email {
            to: summary.email.clone(),
            subject: SUMMARY_SUBJECT.to_owned(),
            body: summary_body(summary),
        };
        match mailer.send(email).await {
            Ok(()) => sent += 1,
            Err(err) => warn!(to = summary.email, "medication summary not delivered: {err}"),
        }
    }
    info!(sent, "daily medication summary sent");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::testing::RecordingMailer;

    fn dose(resident_id: i32, medication: &str) -> ScheduledDose {
        ScheduledDose {
            resident_id,
            resident_name: format!("Resident {resident_id}"),
            resident_email: format!("resident{resident_id}@example.com"),
            medication: medication.to_owned(),
            dose: "500 mg".to_owned(),
            frequency: "every 8 hours".to_owned(),
            route: "oral".to_owned(),
        }
    }

    #[test]
    fn doses_are_grouped_per_resident() {
        let summaries = group_by_resident(vec![
            dose(1, "Metformina"),
            dose(1, "Omeprazol"),
            dose(2, "Paracetamol"),
        ]);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].doses.len(), 2);
        assert_eq!(summaries[1].email, "resident2@example.com");
    }

    #[test]
    fn summary_lists_every_dose() {
        let summaries = group_by_resident(vec![dose(3, "Metformina"), dose(3, "Omeprazol")]);
        let body = summary_body(&summaries[0]);
        assert!(body.starts_with("Hello Resident 3,"));
        assert!(body.contains("- Metformina: 500 mg, every 8 hours, oral"));
        assert!(body.contains("- Omeprazol: 500 mg, every 8 hours, oral"));
    }

    #[tokio::test]
    async fn stock_alert_goes_to_every_recipient() {
        let mailer = RecordingMailer::default();
        let recipients = ["ana@residencia.com", "luis@residencia.com"].map(str::to_owned);
        let sent = send_to_all(&mailer, recipients.into_iter(), STOCK_SUBJECT, "body")
            .await
            .unwrap();
        assert_eq!(sent, 2);
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent[1].to, "luis@residencia.com");
        assert_eq!(sent[0].subject, STOCK_SUBJECT);
    }

    #[test]
    fn stock_alert_lists_stock_and_minimum() {
        let body = stock_alert_body(&[Medication {
            id: 1,
            name: "Insulina".to_owned(),
            description: None,
            kind: None,
            contraindications: None,
            stock: 2,
            minimum_stock: 10,
        }]);
        assert!(body.contains("- Insulina: 2 units (minimum 10)"));
    }
}
