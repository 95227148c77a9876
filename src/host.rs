//! Host orchestration
//!
//! One pass per process: `AwaitingRequest -> (Scraping) -> ShowingForm ->
//! Appending -> Responding -> Exit`. The form runs inside the GUI event
//! loop, so the pass is split around it: [`prepare`] turns the request into
//! an [`EntryDraft`], [`complete`] turns the draft plus the form outcome into
//! a stored row and the browser reply.

use std::fmt;
use std::io::Write;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::config::{Config, DEFAULT_PLACEHOLDER_TITLE};
use crate::error::Result;
use crate::popup_form::{FormOutcome, FormRequest};
use crate::protocol::{send_response, Request, Response};
use crate::scraper::{scrape, PageFetcher, SiteProfile};
use crate::spreadsheet::{Row, RowSink};

pub const PROMPT_EPISODES: &str = "Folgen";
pub const PROMPT_FSMIRROR: &str = "FSMirror";
pub const HEADING_NETFLIX: &str = "Netflix-Eintrag";
pub const HEADING_FSMIRROR: &str = "FSMirror-Eintrag";

/// Orchestration states, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitingRequest,
    Scraping,
    ShowingForm,
    Appending,
    Responding,
    Exit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingRequest => "awaiting_request",
            Self::Scraping => "scraping",
            Self::ShowingForm => "showing_form",
            Self::Appending => "appending",
            Self::Responding => "responding",
            Self::Exit => "exit",
        };
        f.write_str(name)
    }
}

/// Which branch a request takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Netflix,
    FsMirror,
    Text,
    Blank,
}

impl Route {
    pub fn of(request: Option<&Request>) -> Self {
        let Some(request) = request else {
            return Self::Blank;
        };
        let has_url = !request.url().is_empty();
        if request.is_netflix() && has_url {
            Self::Netflix
        } else if request.is_fsmirror() && has_url {
            Self::FsMirror
        } else if request.text().is_some() {
            Self::Text
        } else {
            Self::Blank
        }
    }
}

/// Everything known before the form opens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub route: Route,
    pub form: FormRequest,
    pub url: String,
    pub cover: String,
    pub date: String,
    /// A browser request arrived and expects a reply
    pub respond: bool,
}

impl EntryDraft {
    pub fn into_row(self, outcome: FormOutcome) -> Row {
        Row {
            title: outcome.title,
            episode: outcome.episode,
            date: self.date,
            url: self.url,
            more: outcome.more,
            cover: self.cover,
        }
    }
}

fn or_placeholder(title: Option<&str>) -> String {
    match title {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => DEFAULT_PLACEHOLDER_TITLE.to_string(),
    }
}

/// Route the request, scrape when the route needs it and build the form
#[instrument(skip_all, fields(has_request = request.is_some()))]
pub fn prepare(
    request: Option<&Request>,
    config: &Config,
    fetcher: &dyn PageFetcher,
    today: NaiveDate,
) -> EntryDraft {
    let route = Route::of(request);
    let url = request.map(|r| r.url().to_string()).unwrap_or_default();
    let fallback = config.fallback_cover.as_str();

    let (form, cover) = match route {
        Route::Netflix | Route::FsMirror => {
            let profile = if route == Route::Netflix {
                SiteProfile::Netflix
            } else {
                SiteProfile::FsMirror
            };
            info!(stage = %Stage::Scraping, ?profile, url = %url, "Scraping source page");
            let meta = scrape(fetcher, profile, &url);

            let hint = request
                .and_then(|r| r.title())
                .filter(|_| route == Route::Netflix)
                .filter(|t| !t.is_empty());
            let title = hint
                .or(meta.title.as_deref())
                .unwrap_or_default()
                .to_string();
            let cover = meta.image.unwrap_or_else(|| fallback.to_string());

            let (prompt, heading) = if route == Route::Netflix {
                (PROMPT_EPISODES, HEADING_NETFLIX)
            } else {
                (PROMPT_FSMIRROR, HEADING_FSMIRROR)
            };
            let form = FormRequest::new(prompt, title)
                .with_heading(heading)
                .with_preview(cover.clone());
            (form, cover)
        }
        Route::Text => {
            let title = or_placeholder(request.and_then(|r| r.text()));
            let cover = request.map(|r| r.image_src().to_string()).unwrap_or_default();
            let preview = if cover.is_empty() { fallback } else { cover.as_str() };
            let form = FormRequest::new(PROMPT_EPISODES, title).with_preview(preview);
            (form, cover)
        }
        Route::Blank => {
            let form = FormRequest::new(PROMPT_EPISODES, DEFAULT_PLACEHOLDER_TITLE)
                .with_preview(fallback);
            (form, String::new())
        }
    };

    info!(
        stage = %Stage::ShowingForm,
        route = ?route,
        default_title = %form.default_title,
        "Prepared entry draft"
    );

    EntryDraft {
        route,
        form,
        url,
        cover,
        date: config.date_stamp(today),
        respond: request.is_some(),
    }
}

/// How the pass ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The browser got `{"result":"OK"}`
    Responded,
    /// No browser on the other end; the message goes to the console
    Manual(String),
}

/// Store the row and answer the browser
#[instrument(skip_all, fields(route = ?draft.route))]
pub fn complete<W: Write>(
    draft: EntryDraft,
    outcome: FormOutcome,
    sink: &dyn RowSink,
    writer: &mut W,
    config: &Config,
) -> Result<Completion> {
    let respond = draft.respond;
    let row = draft.into_row(outcome);

    info!(stage = %Stage::Appending, "Appending row");
    sink.append(&row)?;

    let completion = if respond {
        info!(stage = %Stage::Responding, "Sending reply");
        send_response(writer, &Response::ok())?;
        Completion::Responded
    } else {
        Completion::Manual(config.manual_confirmation.clone())
    };

    info!(stage = %Stage::Exit, ?completion, "Host pass complete");
    Ok(completion)
}
