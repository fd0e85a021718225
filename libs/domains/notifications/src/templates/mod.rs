//! Email template rendering engine.
//!
//! Handlebars templates, one HTML and one plain text body per
//! [`EmailTemplate`], sharing `header` and `footer` partials. Copy comes from
//! the [`i18n`] catalogue for the recipient locale, exposed as `t`.

pub mod i18n;

use crate::error::{NotificationError, NotifyResult};
use crate::models::EmailTemplate;
use handlebars::Handlebars;
use serde_json::Value;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::debug;

/// Rendered email bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub html: String,
    pub text: String,
}

/// Template engine for notification emails.
#[derive(Clone)]
pub struct TemplateEngine {
    handlebars: Arc<Handlebars<'static>>,
}

impl TemplateEngine {
    /// Create a template engine with every template registered.
    pub fn new() -> NotifyResult<Self> {
        let mut handlebars = Handlebars::new();

        handlebars
            .register_partial("header", HEADER_PARTIAL)
            .map_err(|e| NotificationError::Template(format!("Failed to register header: {}", e)))?;
        handlebars
            .register_partial("footer", FOOTER_PARTIAL)
            .map_err(|e| NotificationError::Template(format!("Failed to register footer: {}", e)))?;

        for template in EmailTemplate::iter() {
            let (html, text) = sources(template);
            handlebars
                .register_template_string(&html_name(template), html)
                .map_err(|e| {
                    NotificationError::Template(format!("Failed to register {}_html: {}", template, e))
                })?;
            handlebars
                .register_template_string(&text_name(template), text)
                .map_err(|e| {
                    NotificationError::Template(format!("Failed to register {}_text: {}", template, e))
                })?;
        }

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }

    /// Render `template` for a recipient locale.
    ///
    /// `context` must be a JSON object; the locale's messages are added to it
    /// under `t`.
    pub fn render(
        &self,
        template: EmailTemplate,
        locale: &str,
        context: &Value,
    ) -> NotifyResult<RenderedEmail> {
        let mut context = match context {
            Value::Object(map) => map.clone(),
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(NotificationError::Template(format!(
                    "Template context for {} must be an object, got {}",
                    template, other
                )));
            }
        };
        context.insert("t".to_string(), i18n::messages(locale));
        let context = Value::Object(context);

        debug!(template = %template, locale = %locale, "Rendering email template");

        let html = self.handlebars.render(&html_name(template), &context)?;
        let text = self.handlebars.render(&text_name(template), &context)?;

        Ok(RenderedEmail { html, text })
    }

    pub fn has_template(&self, template: EmailTemplate) -> bool {
        self.handlebars.has_template(&html_name(template))
            && self.handlebars.has_template(&text_name(template))
    }
}

fn html_name(template: EmailTemplate) -> String {
    format!("{}_html", template)
}

fn text_name(template: EmailTemplate) -> String {
    format!("{}_text", template)
}

fn sources(template: EmailTemplate) -> (&'static str, &'static str) {
    match template {
        EmailTemplate::TransactionsCreated => {
            (TRANSACTIONS_CREATED_HTML, TRANSACTIONS_CREATED_TEXT)
        }
        EmailTemplate::TransactionsExported => {
            (TRANSACTIONS_EXPORTED_HTML, TRANSACTIONS_EXPORTED_TEXT)
        }
        EmailTemplate::InboxNew => (INBOX_NEW_HTML, INBOX_NEW_TEXT),
        EmailTemplate::InvoicePaid => (INVOICE_PAID_HTML, INVOICE_PAID_TEXT),
        EmailTemplate::InvoiceOverdue => (INVOICE_OVERDUE_HTML, INVOICE_OVERDUE_TEXT),
        EmailTemplate::InvoiceSent => (INVOICE_SENT_HTML, INVOICE_SENT_TEXT),
        EmailTemplate::InvoiceReminder => (INVOICE_REMINDER_HTML, INVOICE_REMINDER_TEXT),
        EmailTemplate::RecurringInvoiceUpcoming => {
            (RECURRING_UPCOMING_HTML, RECURRING_UPCOMING_TEXT)
        }
        EmailTemplate::RecurringSeriesPaused => (RECURRING_PAUSED_HTML, RECURRING_PAUSED_TEXT),
        EmailTemplate::InsightReady => (INSIGHT_READY_HTML, INSIGHT_READY_TEXT),
    }
}

// ============================================================================
// Partials
// ============================================================================

const HEADER_PARTIAL: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background-color: #f4f4f5;">
  <table role="presentation" width="100%" cellspacing="0" cellpadding="0" style="max-width: 600px; margin: 0 auto; padding: 40px 20px;">
    <tr>
      <td style="background-color: #ffffff; border-radius: 8px; padding: 40px;">
        <p style="color: #18181b; font-size: 16px; margin: 0 0 16px 0;">{{t.greeting}}{{#if user.first_name}} {{user.first_name}}{{/if}},</p>
"#;

const FOOTER_PARTIAL: &str = r#"        <table width="100%" cellspacing="0" cellpadding="0" style="border-top: 1px solid #e4e4e7; margin-top: 32px; padding-top: 16px;">
          <tr>
            <td style="color: #a1a1aa; font-size: 12px; line-height: 18px;">
              {{#if is_customer}}
              {{t.footer_customer}} {{team_name}}.
              {{else}}
              {{t.footer_member}} {{team_name}}.
              <a href="{{app_url}}/settings/notifications" style="color: #71717a;">{{t.footer_preferences}}</a>
              {{/if}}
            </td>
          </tr>
        </table>
      </td>
    </tr>
  </table>
</body>
</html>
"#;

// ============================================================================
// Templates
// ============================================================================

const TRANSACTIONS_CREATED_HTML: &str = r#"{{> header}}
        <p style="color: #52525b; font-size: 16px; line-height: 24px;">{{t.transactions_created_intro}}</p>
        <table width="100%" cellspacing="0" cellpadding="6" style="font-size: 14px; color: #18181b;">
          {{#each transactions}}
          <tr>
            <td>{{date}}</td>
            <td>{{name}}</td>
            <td style="text-align: right;">{{amount}} {{currency}}</td>
          </tr>
          {{/each}}
        </table>
        <p><a href="{{app_url}}/transactions" style="color: #2563eb;">{{t.view_in_dashboard}}</a></p>
{{> footer}}"#;

const TRANSACTIONS_CREATED_TEXT: &str = r#"{{t.greeting}} {{user.first_name}},

{{t.transactions_created_intro}}
{{#each transactions}}
- {{date}} {{name}} {{amount}} {{currency}}
{{/each}}

{{t.view_in_dashboard}}: {{app_url}}/transactions
"#;

const TRANSACTIONS_EXPORTED_HTML: &str = r#"{{> header}}
        <p style="color: #52525b; font-size: 16px; line-height: 24px;">{{t.transactions_exported_intro}} ({{count}})</p>
        {{#if download_link}}
        <p><a href="{{download_link}}" style="display: inline-block; background-color: #18181b; color: #ffffff; padding: 12px 32px; text-decoration: none; border-radius: 6px;">{{t.transactions_exported_download}}</a></p>
        {{/if}}
{{> footer}}"#;

const TRANSACTIONS_EXPORTED_TEXT: &str = r#"{{t.greeting}},

{{t.transactions_exported_intro}} ({{count}})
{{#if download_link}}
{{t.transactions_exported_download}}: {{download_link}}
{{/if}}
"#;

const INBOX_NEW_HTML: &str = r#"{{> header}}
        <p style="color: #52525b; font-size: 16px; line-height: 24px;">{{t.inbox_new_intro}}</p>
        <p style="color: #18181b; font-size: 32px; font-weight: 600; margin: 8px 0;">{{count}}</p>
        <p><a href="{{app_url}}/inbox" style="color: #2563eb;">{{t.view_in_dashboard}}</a></p>
{{> footer}}"#;

const INBOX_NEW_TEXT: &str = r#"{{t.greeting}} {{user.first_name}},

{{t.inbox_new_intro}} ({{count}})

{{t.view_in_dashboard}}: {{app_url}}/inbox
"#;

const INVOICE_PAID_HTML: &str = r#"{{> header}}
        <p style="color: #52525b; font-size: 16px; line-height: 24px;">{{t.invoice_paid_intro}}</p>
        <p style="color: #18181b; font-size: 14px;">{{t.invoice_number}} <strong>{{invoice_number}}</strong>{{#if customer_name}} · {{t.customer}}: {{customer_name}}{{/if}}</p>
        <p><a href="{{app_url}}/invoices?invoiceId={{invoice_id}}&type=details" style="color: #2563eb;">{{t.view_in_dashboard}}</a></p>
{{> footer}}"#;

const INVOICE_PAID_TEXT: &str = r#"{{t.greeting}} {{user.first_name}},

{{t.invoice_paid_intro}}
{{t.invoice_number}} {{invoice_number}}{{#if customer_name}} ({{customer_name}}){{/if}}

{{t.view_in_dashboard}}: {{app_url}}/invoices?invoiceId={{invoice_id}}&type=details
"#;

const INVOICE_OVERDUE_HTML: &str = r#"{{> header}}
        <p style="color: #52525b; font-size: 16px; line-height: 24px;">{{t.invoice_overdue_intro}}</p>
        <p style="color: #18181b; font-size: 14px;">{{t.invoice_number}} <strong>{{invoice_number}}</strong> · {{t.customer}}: {{customer_name}}</p>
        <p><a href="{{app_url}}/invoices?invoiceId={{invoice_id}}&type=details" style="color: #2563eb;">{{t.view_in_dashboard}}</a></p>
{{> footer}}"#;

const INVOICE_OVERDUE_TEXT: &str = r#"{{t.greeting}} {{user.first_name}},

{{t.invoice_overdue_intro}}
{{t.invoice_number}} {{invoice_number}} ({{customer_name}})

{{t.view_in_dashboard}}: {{app_url}}/invoices?invoiceId={{invoice_id}}&type=details
"#;

const INVOICE_SENT_HTML: &str = r#"{{> header}}
        <p style="color: #52525b; font-size: 16px; line-height: 24px;">{{t.invoice_sent_intro}}</p>
        <p style="color: #18181b; font-size: 14px;">{{t.invoice_number}} <strong>{{invoice_number}}</strong> · {{team_name}}</p>
        <p><a href="{{app_url}}/i/{{token}}" style="display: inline-block; background-color: #18181b; color: #ffffff; padding: 12px 32px; text-decoration: none; border-radius: 6px;">{{t.invoice_view}}</a></p>
{{> footer}}"#;

const INVOICE_SENT_TEXT: &str = r#"{{t.greeting}},

{{t.invoice_sent_intro}}
{{t.invoice_number}} {{invoice_number}} ({{team_name}})

{{t.invoice_view}}: {{app_url}}/i/{{token}}
"#;

const INVOICE_REMINDER_HTML: &str = r#"{{> header}}
        <p style="color: #52525b; font-size: 16px; line-height: 24px;">{{t.invoice_reminder_intro}}</p>
        <p style="color: #18181b; font-size: 14px;">{{t.invoice_number}} <strong>{{invoice_number}}</strong> · {{team_name}}</p>
        <p><a href="{{app_url}}/i/{{token}}" style="display: inline-block; background-color: #18181b; color: #ffffff; padding: 12px 32px; text-decoration: none; border-radius: 6px;">{{t.invoice_view}}</a></p>
{{> footer}}"#;

const INVOICE_REMINDER_TEXT: &str = r#"{{t.greeting}},

{{t.invoice_reminder_intro}}
{{t.invoice_number}} {{invoice_number}} ({{team_name}})

{{t.invoice_view}}: {{app_url}}/i/{{token}}
"#;

const RECURRING_UPCOMING_HTML: &str = r#"{{> header}}
        <p style="color: #52525b; font-size: 16px; line-height: 24px;">{{t.recurring_upcoming_intro}}</p>
        <table width="100%" cellspacing="0" cellpadding="6" style="font-size: 14px; color: #18181b;">
          {{#each invoices}}
          <tr>
            <td>{{#if customer_name}}{{customer_name}}{{else}}-{{/if}}</td>
            <td>{{scheduled_at}}</td>
            <td style="text-align: right;">{{#if amount}}{{amount}} {{currency}}{{/if}}</td>
          </tr>
          {{/each}}
        </table>
        <p><a href="{{app_url}}/invoices" style="color: #2563eb;">{{t.view_in_dashboard}}</a></p>
{{> footer}}"#;

const RECURRING_UPCOMING_TEXT: &str = r#"{{t.greeting}} {{user.first_name}},

{{t.recurring_upcoming_intro}}
{{#each invoices}}
- {{customer_name}} {{scheduled_at}} {{amount}} {{currency}}
{{/each}}

{{t.view_in_dashboard}}: {{app_url}}/invoices
"#;

const RECURRING_PAUSED_HTML: &str = r#"{{> header}}
        <p style="color: #52525b; font-size: 16px; line-height: 24px;">{{t.recurring_paused_intro}}</p>
        <p style="color: #18181b; font-size: 14px;">{{#if customer_name}}{{t.customer}}: {{customer_name}}{{/if}}{{#if failure_count}} ({{failure_count}}){{/if}}</p>
        <p><a href="{{app_url}}/invoices?recurringId={{recurring_id}}" style="color: #2563eb;">{{t.view_in_dashboard}}</a></p>
{{> footer}}"#;

const RECURRING_PAUSED_TEXT: &str = r#"{{t.greeting}} {{user.first_name}},

{{t.recurring_paused_intro}}
{{#if customer_name}}{{t.customer}}: {{customer_name}}{{/if}}

{{t.view_in_dashboard}}: {{app_url}}/invoices?recurringId={{recurring_id}}
"#;

const INSIGHT_READY_HTML: &str = r#"{{> header}}
        <p style="color: #52525b; font-size: 16px; line-height: 24px;">{{t.insight_ready_intro}}</p>
        <p style="color: #18181b; font-size: 18px; font-weight: 600;">{{period_label}}</p>
        {{#if title}}<p style="color: #52525b; font-size: 14px;">{{title}}</p>{{/if}}
        <p><a href="{{app_url}}/?insight={{insight_id}}" style="color: #2563eb;">{{t.view_in_dashboard}}</a></p>
{{> footer}}"#;

const INSIGHT_READY_TEXT: &str = r#"{{t.greeting}} {{user.first_name}},

{{t.insight_ready_intro}}
{{period_label}}

{{t.view_in_dashboard}}: {{app_url}}/?insight={{insight_id}}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> Value {
        json!({
            "user": { "first_name": "Ada" },
            "team_name": "Acme",
            "app_url": "https://app.example.com",
            "is_customer": false,
            "invoice_id": "0b7c1f5e-8d1a-4d8e-9f61-0d0c7e0f1a2b",
            "invoice_number": "INV-042",
            "customer_name": "Globex",
        })
    }

    #[test]
    fn test_every_template_is_registered() {
        let engine = TemplateEngine::new().unwrap();
        for template in EmailTemplate::iter() {
            assert!(engine.has_template(template), "{} missing", template);
        }
    }

    #[test]
    fn test_render_invoice_paid_english() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine
            .render(EmailTemplate::InvoicePaid, "en", &context())
            .unwrap();

        assert!(rendered.html.contains("Hi Ada,"));
        assert!(rendered.html.contains("INV-042"));
        assert!(rendered.html.contains("Globex"));
        assert!(rendered.html.contains("settings/notifications"));
        assert!(rendered.text.contains("Invoice INV-042 (Globex)"));
    }

    #[test]
    fn test_render_uses_recipient_locale() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine
            .render(EmailTemplate::InvoicePaid, "de", &context())
            .unwrap();

        assert!(rendered.html.contains("Hallo Ada,"));
        assert!(rendered.html.contains("Benachrichtigungen verwalten"));
    }

    #[test]
    fn test_customer_footer_hides_preferences_link() {
        let engine = TemplateEngine::new().unwrap();
        let mut ctx = context();
        ctx["is_customer"] = json!(true);
        ctx["token"] = json!("tok_123");

        let rendered = engine.render(EmailTemplate::InvoiceSent, "en", &ctx).unwrap();
        assert!(rendered.html.contains("/i/tok_123"));
        assert!(rendered.html.contains("on behalf of Acme"));
        assert!(!rendered.html.contains("settings/notifications"));
    }

    #[test]
    fn test_render_rejects_non_object_context() {
        let engine = TemplateEngine::new().unwrap();
        let result = engine.render(EmailTemplate::InboxNew, "en", &json!([1, 2]));
        assert!(matches!(result, Err(NotificationError::Template(_))));
    }
}
