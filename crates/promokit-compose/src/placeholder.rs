//! Placeholder token resolution.
//!
//! Pure substitution over `{token}` occurrences; total for any body. A
//! token whose context value is missing, and any unrecognized token, is
//! replaced with a generic fallback — raw tokens never survive into the
//! output.
//!
//! The context (including the clock) is caller-supplied per call, so
//! staleness of promotional links is the caller's concern, not hidden
//! process state.

use chrono::{DateTime, Local, Timelike};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Values available for substitution in one resolve call.
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// Promotional URL for `{url}` / `{link}`.
    pub url: Option<String>,
    /// Contact line for `{contact}`.
    pub contact: Option<String>,
    /// Phone number for `{phone}`.
    pub phone: Option<String>,
    /// Addressee for `{name}`.
    pub name: Option<String>,
    /// Caller-defined extra tokens.
    pub custom: HashMap<String, String>,
    /// Clock override for `{time}` / `{day}` / `{greeting}`; `None` reads
    /// the local clock.
    pub now: Option<DateTime<Local>>,
    /// Substitution for unrecognized tokens.
    pub default_fill: String,
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self {
            url: None,
            contact: None,
            phone: None,
            name: None,
            custom: HashMap::new(),
            now: None,
            default_fill: "our page".to_string(),
        }
    }
}

impl ResolveContext {
    fn now(&self) -> DateTime<Local> {
        self.now.unwrap_or_else(Local::now)
    }
}

/// Replace every `{token}` occurrence in `body`.
pub fn resolve(body: &str, ctx: &ResolveContext) -> String {
    TOKEN_RE
        .replace_all(body, |caps: &Captures| resolve_token(&caps[1], ctx))
        .into_owned()
}

fn resolve_token(token: &str, ctx: &ResolveContext) -> String {
    match token.to_lowercase().as_str() {
        "url" | "link" => ctx
            .url
            .clone()
            .unwrap_or_else(|| "our page".to_string()),
        "contact" => ctx
            .contact
            .clone()
            .unwrap_or_else(|| "send us a message".to_string()),
        "phone" => ctx
            .phone
            .clone()
            .or_else(|| ctx.contact.clone())
            .unwrap_or_else(|| "send us a message".to_string()),
        "name" => ctx.name.clone().unwrap_or_else(|| "there".to_string()),
        "time" => time_of_day(ctx.now()).to_string(),
        "day" => ctx.now().format("%A").to_string(),
        "greeting" => format!("Good {}", time_of_day(ctx.now())),
        other => ctx
            .custom
            .get(other)
            .cloned()
            .unwrap_or_else(|| ctx.default_fill.clone()),
    }
}

fn time_of_day(now: DateTime<Local>) -> &'static str {
    match now.hour() {
        0..=11 => "morning",
        12..=16 => "afternoon",
        _ => "evening",
    }
}
