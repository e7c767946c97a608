//! Request dispatch for the settings page
//!
//! GET renders. POST is one of export (download), import (file upload) or save
//! (fields under the option name); the latter two answer with a redirect back
//! to the tab so their notices show on the next GET.

use super::SettingsManager;
use crate::auth::TokenAction;
use crate::error::{Error, Result};
use crate::http::{EXPORT_FLAG, Method, Request, Response};
use crate::notices::Notice;
use crate::store::OptionStore;
use log::{debug, warn};

/// What a POST asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PostAction {
    Export,
    Import,
    Save,
    Nothing,
}

impl PostAction {
    fn of(request: &Request, option_name: &str) -> Self {
        if request.form.contains(EXPORT_FLAG) {
            PostAction::Export
        } else if request.attached_upload().is_some() {
            PostAction::Import
        } else if request.form.contains(option_name) {
            PostAction::Save
        } else {
            PostAction::Nothing
        }
    }

    fn token_action(self) -> TokenAction {
        match self {
            PostAction::Export => TokenAction::Export,
            PostAction::Import => TokenAction::Import,
            PostAction::Save | PostAction::Nothing => TokenAction::Save,
        }
    }
}

impl<B: OptionStore> SettingsManager<B> {
    /// Handle one request to the settings page
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for a POST from a caller without the
    /// capability and `InvalidToken` for a POST with a missing or stale token.
    /// Both abort the request with nothing written. Import validation failures
    /// are not errors: they become notices and the response is a redirect.
    pub fn handle(&self, request: &Request) -> Result<Response> {
        match request.method {
            Method::Get => Ok(self.handle_get(request)),
            Method::Post => self.handle_post(request),
        }
    }

    fn handle_get(&self, request: &Request) -> Response {
        match self.render(&request.caller, request.tab()) {
            Some(html) => Response::html(html),
            None => Response::forbidden(),
        }
    }

    fn handle_post(&self, request: &Request) -> Result<Response> {
        let action = PostAction::of(request, &self.config.option_name);
        let caller = &request.caller;
        if !caller.can(&self.config.capability) {
            warn!(
                "User {} denied {} on settings '{}'",
                caller.user_id,
                action.token_action(),
                self.config.option_name
            );
            return Err(Error::PermissionDenied {
                action: action.token_action().to_string(),
            });
        }

        let token = request
            .form
            .get_str(action.token_action().field_name())
            .unwrap_or_default();
        let back = Response::redirect(
            self.renderer()
                .tab_url(&self.renderer().active_section(request.tab()).key),
        );

        let notices = match action {
            PostAction::Export => {
                let file = self.export(caller, token)?;
                return Ok(Response::attachment(file));
            }
            PostAction::Import => {
                let Some(upload) = request.attached_upload() else {
                    return Ok(back);
                };
                match self.import(caller, token, upload) {
                    Ok(report) => {
                        let mut notices =
                            vec![Notice::success("import_success", "Settings imported successfully.")];
                        notices.extend(report.notices);
                        notices
                    }
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!("Import of '{}' failed: {e}", upload.file_name);
                        vec![Notice::from(&e)]
                    }
                }
            }
            PostAction::Save => {
                let raw = request
                    .form
                    .get(&self.config.option_name)
                    .cloned()
                    .unwrap_or_default();
                let sanitized = self.save(caller, token, &raw)?;
                let mut notices = vec![Notice::success("settings_updated", "Settings saved.")];
                notices.extend(sanitized.notices);
                notices
            }
            PostAction::Nothing => {
                debug!("POST without a recognized action, redirecting");
                Vec::new()
            }
        };

        self.notices().push_all(notices)?;
        Ok(back)
    }
}
