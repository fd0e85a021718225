//! Message catalogue for email copy.
//!
//! Subjects carry `{param}` placeholders and are translated by handlers.
//! Body strings are plain and reach templates through the `t` context map.

use serde_json::{Map, Value};

pub const FALLBACK_LOCALE: &str = "en";

const EN: &[(&str, &str)] = &[
    ("greeting", "Hi"),
    ("view_in_dashboard", "View in dashboard"),
    ("footer_member", "You received this email because you are a member of"),
    ("footer_customer", "This email was sent to you on behalf of"),
    ("footer_preferences", "Manage notification preferences"),
    ("transactions_created_subject", "You have {count} new transactions"),
    ("transactions_created_intro", "New transactions were imported from your connected accounts:"),
    ("transactions_exported_subject", "{team} shared {count} transactions with you"),
    ("transactions_exported_intro", "An export of transactions is ready for download."),
    ("transactions_exported_download", "Download export"),
    ("inbox_new_subject", "{count} new documents in your inbox"),
    ("inbox_new_intro", "New documents arrived in your inbox and are waiting to be matched."),
    ("invoice_paid_subject", "Invoice {number} has been paid"),
    ("invoice_paid_intro", "Good news, the following invoice has been marked as paid:"),
    ("invoice_overdue_subject", "Invoice {number} is overdue"),
    ("invoice_overdue_intro", "The following invoice is past its due date:"),
    ("invoice_sent_subject", "Invoice {number} from {team}"),
    ("invoice_sent_intro", "You have received a new invoice."),
    ("invoice_view", "View invoice"),
    ("invoice_reminder_subject", "Reminder: invoice {number} from {team}"),
    ("invoice_reminder_intro", "This is a friendly reminder that the following invoice is still open."),
    ("recurring_upcoming_subject", "{count} recurring invoices will be sent tomorrow"),
    ("recurring_upcoming_intro", "These invoices are scheduled to be generated and sent soon:"),
    ("recurring_paused_subject", "A recurring invoice series was paused"),
    ("recurring_paused_intro", "A recurring invoice series was paused after repeated failures."),
    ("insight_ready_subject", "Your {period} insights are ready"),
    ("insight_ready_intro", "A new summary of your business is available."),
    ("invoice_number", "Invoice"),
    ("customer", "Customer"),
    ("amount", "Amount"),
    ("due_date", "Due date"),
];

const DE: &[(&str, &str)] = &[
    ("greeting", "Hallo"),
    ("view_in_dashboard", "Im Dashboard ansehen"),
    ("footer_member", "Sie erhalten diese E-Mail als Mitglied von"),
    ("footer_customer", "Diese E-Mail wurde Ihnen im Auftrag gesendet von"),
    ("footer_preferences", "Benachrichtigungen verwalten"),
    ("transactions_created_subject", "Sie haben {count} neue Transaktionen"),
    ("transactions_created_intro", "Aus Ihren verbundenen Konten wurden neue Transaktionen importiert:"),
    ("transactions_exported_subject", "{team} hat {count} Transaktionen mit Ihnen geteilt"),
    ("transactions_exported_intro", "Ein Export von Transaktionen steht zum Download bereit."),
    ("transactions_exported_download", "Export herunterladen"),
    ("inbox_new_subject", "{count} neue Dokumente im Posteingang"),
    ("inbox_new_intro", "Neue Dokumente sind eingegangen und warten auf eine Zuordnung."),
    ("invoice_paid_subject", "Rechnung {number} wurde bezahlt"),
    ("invoice_paid_intro", "Gute Nachrichten, folgende Rechnung wurde als bezahlt markiert:"),
    ("invoice_overdue_subject", "Rechnung {number} ist überfällig"),
    ("invoice_overdue_intro", "Folgende Rechnung hat das Fälligkeitsdatum überschritten:"),
    ("invoice_sent_subject", "Rechnung {number} von {team}"),
    ("invoice_sent_intro", "Sie haben eine neue Rechnung erhalten."),
    ("invoice_view", "Rechnung ansehen"),
    ("invoice_reminder_subject", "Erinnerung: Rechnung {number} von {team}"),
    ("invoice_reminder_intro", "Wir möchten Sie freundlich daran erinnern, dass folgende Rechnung noch offen ist."),
    ("recurring_upcoming_subject", "{count} wiederkehrende Rechnungen werden morgen versendet"),
    ("recurring_upcoming_intro", "Diese Rechnungen werden in Kürze erstellt und versendet:"),
    ("recurring_paused_subject", "Eine wiederkehrende Rechnungsserie wurde pausiert"),
    ("recurring_paused_intro", "Eine wiederkehrende Rechnungsserie wurde nach wiederholten Fehlern pausiert."),
    ("insight_ready_subject", "Ihre Auswertung für {period} ist bereit"),
    ("insight_ready_intro", "Eine neue Zusammenfassung Ihres Geschäfts ist verfügbar."),
    ("invoice_number", "Rechnung"),
    ("customer", "Kunde"),
    ("amount", "Betrag"),
    ("due_date", "Fällig am"),
];

fn catalogue(locale: &str) -> &'static [(&'static str, &'static str)] {
    match normalize(locale).as_str() {
        "de" => DE,
        _ => EN,
    }
}

/// Reduce `de-AT` / `de_AT` / `DE` to the language part.
pub fn normalize(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or(FALLBACK_LOCALE)
        .trim()
        .to_ascii_lowercase()
}

fn lookup(locale: &str, key: &str) -> Option<&'static str> {
    let find = |table: &'static [(&'static str, &'static str)]| {
        table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    };
    find(catalogue(locale)).or_else(|| find(EN))
}

/// Translate `key` for `locale`, substituting `{name}` placeholders.
///
/// Unknown keys come back unchanged so a missing entry is visible in the
/// rendered email instead of failing the send.
pub fn translate(locale: &str, key: &str, params: &[(&str, &str)]) -> String {
    let mut message = lookup(locale, key).unwrap_or(key).to_string();
    for (name, value) in params {
        message = message.replace(&format!("{{{}}}", name), value);
    }
    message
}

/// All strings for a locale, english entries filling the gaps.
pub fn messages(locale: &str) -> Value {
    let mut map = Map::new();
    for (key, value) in EN {
        map.insert((*key).to_string(), Value::String((*value).to_string()));
    }
    for (key, value) in catalogue(locale) {
        map.insert((*key).to_string(), Value::String((*value).to_string()));
    }
    Value::Object(map)
}
