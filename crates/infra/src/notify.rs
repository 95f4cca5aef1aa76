//! Application-received notification: template and enqueue helper.

use chrono::Utc;
use tracing::warn;

use crate::mailer::OutboundEmail;
use crate::tasks::{ApplicationNotice, NotificationTask, TaskQueue};

/// Render the fixed employer notification for a new application.
pub fn application_received_email(notice: &ApplicationNotice) -> OutboundEmail {
    let subject = format!("New Application: {}", notice.job_title);

    let text_body = format!(
        "Hi! A new candidate ({}) has applied for your position: {}.",
        notice.candidate_email, notice.job_title
    );

    let html_body = format!(
        "<h3>New Application Received!</h3>\
         <p>You have a new applicant for <strong>{}</strong>.</p>\
         <p><strong>Candidate Email:</strong> {}</p>\
         <p>Log in to your dashboard to review their cover letter and profile.</p>\
         <br>\
         <p>Best regards,<br>Talent Bridge Team</p>",
        notice.job_title, notice.candidate_email
    );

    OutboundEmail {
        to: notice.employer_email.clone(),
        subject,
        text_body,
        html_body,
    }
}

/// Enqueue the notification for a fresh application.
///
/// Never propagates an error: the application write is already committed,
/// and notification delivery is decoupled from it. A broken queue is logged
/// and the request proceeds.
pub fn enqueue_application_notice(queue: &dyn TaskQueue, notice: ApplicationNotice) {
    let task = NotificationTask::new(notice, Utc::now());
    if let Err(error) = queue.enqueue(task) {
        warn!(%error, "failed to enqueue application notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::InMemoryTaskQueue;

    fn notice() -> ApplicationNotice {
        ApplicationNotice {
            employer_email: "employer@acme.com".to_string(),
            job_title: "Backend Engineer".to_string(),
            candidate_email: "candidate@example.com".to_string(),
        }
    }

    #[test]
    fn template_names_job_and_candidate() {
        let email = application_received_email(&notice());
        assert_eq!(email.to, "employer@acme.com");
        assert_eq!(email.subject, "New Application: Backend Engineer");
        assert!(email.text_body.contains("candidate@example.com"));
        assert!(email.html_body.contains("<strong>Backend Engineer</strong>"));
        assert!(email.html_body.contains("candidate@example.com"));
    }

    #[test]
    fn enqueue_puts_a_pending_task_on_the_queue() {
        let queue = InMemoryTaskQueue::new();
        enqueue_application_notice(&queue, notice());

        let claimed = queue.claim_next(Utc::now()).unwrap();
        assert!(claimed.is_some());
        assert_eq!(claimed.unwrap().notice.job_title, "Backend Engineer");
    }
}
