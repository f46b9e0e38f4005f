use booking::{BookingManager, SpecialEvents};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tokio::sync::mpsc::UnboundedReceiver;

use abi::{format_date, format_time_or_na, MailConfig};

const SUBJECT: &str = "Conferma Prenotazione - La Tavola";
const RESTAURANT_NAME: &str = "La Tavola";
const RESTAURANT_FOOTER: &str = "La Tavola | Via del Porto Antico 12, 16128 Genova GE";

/// One unit of work for the mail worker: a booking that was just committed.
#[derive(Debug)]
pub struct MailJob {
    pub booking: abi::Booking,
}

/// Confirmation-mail worker.
///
/// Consumes jobs from the channel until it closes. Owns its own manager
/// handle and builds a fresh SMTP transport per message; nothing here touches
/// the request scope that produced the booking, and nothing that fails here
/// reaches the guest who already got a 200.
pub struct Mailer {
    config: Option<MailConfig>,
    frontend_url: String,
    manager: BookingManager,
}

impl Mailer {
    pub fn new(config: Option<MailConfig>, frontend_url: String, manager: BookingManager) -> Self {
        Self {
            config,
            frontend_url,
            manager,
        }
    }

    pub async fn run(self, mut rx: UnboundedReceiver<MailJob>) {
        tracing::info!("confirmation mail worker started");
        while let Some(job) = rx.recv().await {
            if let Err(e) = self.send_confirmation(&job.booking).await {
                tracing::warn!(
                    booking_id = job.booking.id,
                    email = %job.booking.email,
                    error = %e,
                    "confirmation mail failed"
                );
            }
        }
        tracing::info!("mail channel closed, worker stopping");
    }

    async fn send_confirmation(&self, booking: &abi::Booking) -> Result<(), anyhow::Error> {
        let Some(mail) = &self.config else {
            anyhow::bail!("mail transport not configured, dropping confirmation");
        };

        let event_name = match booking.event_id {
            Some(id) => self
                .manager
                .get_event(id)
                .await
                .ok()
                .map(|e| e.display_name),
            None => Some(format!("Brunch del {}", format_date(booking.booking_date))),
        };
        let html = confirmation_body(booking, event_name.as_deref(), &self.frontend_url);

        let message = Message::builder()
            .from(mail.from.parse()?)
            .to(booking.email.parse()?)
            .subject(SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(html)?;

        let transport = SmtpTransport::starttls_relay(&mail.server)?
            .port(mail.port)
            .credentials(Credentials::new(
                mail.username.clone(),
                mail.password.clone(),
            ))
            .build();

        // lettre's blocking transport, sent off the async runtime
        tokio::task::spawn_blocking(move || transport.send(&message)).await??;
        tracing::info!(booking_id = booking.id, "confirmation mail sent");
        Ok(())
    }
}

fn confirmation_body(booking: &abi::Booking, event_name: Option<&str>, frontend_url: &str) -> String {
    let date = format_date(booking.booking_date);
    let time = format_time_or_na(booking.booking_time);
    let cancellation_link = format!(
        "{}/cancellazione.html?token={}",
        frontend_url, booking.cancellation_token
    );

    let event_row = match event_name {
        Some(name) => format!(
            r#"<tr style="border-bottom: 1px solid #eee;">
    <td style="padding: 10px 0; font-size: 16px;"><strong>Evento:</strong></td>
    <td style="padding: 10px 0; font-size: 16px; text-align: right;">{name}</td>
</tr>"#
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="it">
<head>
    <meta charset="UTF-8">
    <title>{SUBJECT}</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f5f2e8; color: #333;">
    <table align="center" border="0" cellpadding="0" cellspacing="0" width="100%" style="max-width: 600px; margin: 20px auto; border-collapse: collapse; background-color: #ffffff; border: 1px solid #ddd;">
        <tr>
            <td align="center" style="padding: 20px 0; background-color: #8c2f1b;">
                <h1 style="color: #f5f2e8; margin: 0;">{RESTAURANT_NAME}</h1>
            </td>
        </tr>
        <tr>
            <td style="padding: 40px 30px;">
                <h2 style="color: #333333; margin-top: 0;">Ciao {name},</h2>
                <p style="font-size: 16px; line-height: 1.5;">La tua prenotazione da {RESTAURANT_NAME} è confermata. Ecco i dettagli:</p>
                <table border="0" cellpadding="5" cellspacing="0" width="100%" style="margin-top: 20px; border-collapse: collapse;">
                    {event_row}
                    <tr style="border-bottom: 1px solid #eee;">
                        <td style="padding: 10px 0; font-size: 16px;"><strong>Data:</strong></td>
                        <td style="padding: 10px 0; font-size: 16px; text-align: right;">{date}</td>
                    </tr>
                    <tr style="border-bottom: 1px solid #eee;">
                        <td style="padding: 10px 0; font-size: 16px;"><strong>Ora:</strong></td>
                        <td style="padding: 10px 0; font-size: 16px; text-align: right;">{time}</td>
                    </tr>
                    <tr>
                        <td style="padding: 10px 0; font-size: 16px;"><strong>Persone:</strong></td>
                        <td style="padding: 10px 0; font-size: 16px; text-align: right;">{guests}</td>
                    </tr>
                </table>
                <p style="font-size: 16px; line-height: 1.5; margin-top: 30px;">Grazie per aver scelto {RESTAURANT_NAME}. Non vediamo l'ora di accoglierti.</p>
                <p style="font-size: 14px; color: #888; margin-top: 25px;">Se hai bisogno di cancellare la tua prenotazione, puoi farlo cliccando sul seguente link: <a href="{cancellation_link}" style="color: #8c2f1b;">Cancella prenotazione</a>.</p>
            </td>
        </tr>
        <tr>
            <td align="center" style="padding: 20px; background-color: #f4f4f4; font-size: 12px; color: #777;">
                <p style="margin: 0;">{RESTAURANT_FOOTER}</p>
                <p style="margin: 5px 0 0 0;">Questa è un'email generata automaticamente, per favore non rispondere.</p>
            </td>
        </tr>
    </table>
</body>
</html>"#,
        name = booking.name,
        guests = booking.guests,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use uuid::Uuid;

    fn booking(event_id: Option<i64>, time: Option<NaiveTime>) -> abi::Booking {
        abi::Booking {
            id: 42,
            event_id,
            name: "Mario Rossi".to_string(),
            email: "mario@example.com".to_string(),
            phone: "3331234567".to_string(),
            booking_date: NaiveDate::from_ymd_opt(2026, 8, 9).unwrap(),
            booking_time: time,
            guests: 4,
            cancellation_token: Uuid::nil(),
            notes: None,
        }
    }

    #[test]
    fn body_carries_the_cancellation_link() {
        let b = booking(None, NaiveTime::from_hms_opt(12, 0, 0));
        let html = confirmation_body(&b, Some("Brunch del 09/08/2026"), "https://latavola.example");
        assert!(html.contains(
            "https://latavola.example/cancellazione.html?token=00000000-0000-0000-0000-000000000000"
        ));
        assert!(html.contains("Ciao Mario Rossi"));
        assert!(html.contains("09/08/2026"));
        assert!(html.contains("12:00"));
    }

    #[test]
    fn event_row_only_renders_when_known() {
        let b = booking(Some(7), None);
        let with_event = confirmation_body(&b, Some("Serata Jazz"), "http://localhost");
        assert!(with_event.contains("Serata Jazz"));
        assert!(with_event.contains("<strong>Evento:</strong>"));
        assert!(with_event.contains("N/D"));

        let without = confirmation_body(&b, None, "http://localhost");
        assert!(!without.contains("<strong>Evento:</strong>"));
    }
}
