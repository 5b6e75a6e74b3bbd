use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, Headers, HtmlSelectElement, RequestInit, Response, Window};

use pixelwall_shared::protocol::Envelope;
use pixelwall_shared::saves::{
    error_message, SaveCreated, SaveListing, SaveRequest, SaveSummary, SnapshotBody,
};

use crate::dom::{render_save_options, set_status};
use crate::net::{save_url, SAVES_URL};
use crate::state::Session;
use crate::ws::WsSender;

const UNREACHABLE_MSG: &str = "Unable to reach the save service";

/// The DOM handles every snapshot operation reports through. Operations
/// overwrite the shared status indicator as they complete; there is no
/// queue, and a slow completion may land after a newer one.
#[derive(Clone)]
pub struct SavesUi {
    pub window: Window,
    pub document: Document,
    pub select: HtmlSelectElement,
    pub status_el: Element,
    pub status_text: Element,
}

pub fn refresh(ui: SavesUi, session: Rc<RefCell<Session>>) {
    spawn_local(async move {
        refresh_listing(&ui, &session).await;
    });
}

pub fn save(ui: SavesUi, session: Rc<RefCell<Session>>, name: &str) {
    let name = name.trim().to_string();
    if name.is_empty() {
        set_status(
            &ui.status_el,
            &ui.status_text,
            "error",
            "Enter a name before saving",
        );
        return;
    }
    let pixels = session.borrow().board.grid().snapshot_pixels();
    set_status(
        &ui.status_el,
        &ui.status_text,
        "info",
        &format!("Saving \"{name}\"..."),
    );
    spawn_local(async move {
        let request = SaveRequest {
            name: name.clone(),
            pixels,
        };
        let Ok(body) = serde_json::to_string(&request) else {
            set_status(
                &ui.status_el,
                &ui.status_text,
                "error",
                "Unable to encode the board",
            );
            return;
        };
        match http_post_json(&ui.window, SAVES_URL, &body).await {
            Ok((true, body)) => {
                let confirmed = serde_json::from_str::<SaveCreated>(&body)
                    .map(|created| created.save.name)
                    .unwrap_or(name);
                refresh_listing(&ui, &session).await;
                set_status(
                    &ui.status_el,
                    &ui.status_text,
                    "success",
                    &format!("Saved \"{confirmed}\""),
                );
            }
            Ok((false, body)) => set_status(
                &ui.status_el,
                &ui.status_text,
                "error",
                &error_message(&body, "Unable to save the board"),
            ),
            Err(_) => set_status(&ui.status_el, &ui.status_text, "error", UNREACHABLE_MSG),
        }
    });
}

pub fn load(ui: SavesUi, session: Rc<RefCell<Session>>, sender: Rc<WsSender>, slug: &str) {
    let slug = slug.to_string();
    if slug.is_empty() {
        set_status(
            &ui.status_el,
            &ui.status_text,
            "error",
            "Choose a saved state to load",
        );
        return;
    }
    set_status(
        &ui.status_el,
        &ui.status_text,
        "info",
        "Loading saved state...",
    );
    spawn_local(async move {
        match http_get(&ui.window, &save_url(&slug)).await {
            Ok((true, body)) => match serde_json::from_str::<SnapshotBody>(&body) {
                Ok(snapshot) => {
                    // Two effects per cell: the optimistic local apply and a
                    // Pixel broadcast so peers converge to the loaded state.
                    let mut applied = 0usize;
                    {
                        let mut session = session.borrow_mut();
                        for (coord, color) in snapshot.cells() {
                            session.board.set_cell(coord, color);
                            sender.send(&Envelope::Pixel { coord, color });
                            applied += 1;
                        }
                    }
                    set_status(
                        &ui.status_el,
                        &ui.status_text,
                        "success",
                        &format!("Loaded \"{}\" ({applied} pixels)", snapshot.name),
                    );
                }
                Err(_) => {
                    let label = {
                        let session = session.borrow();
                        cached_name(&session.saves, &slug)
                            .unwrap_or(slug.as_str())
                            .to_string()
                    };
                    set_status(
                        &ui.status_el,
                        &ui.status_text,
                        "error",
                        &format!("Saved state \"{label}\" is malformed"),
                    );
                }
            },
            Ok((false, body)) => set_status(
                &ui.status_el,
                &ui.status_text,
                "error",
                &error_message(&body, "Unable to load the saved state"),
            ),
            Err(_) => set_status(&ui.status_el, &ui.status_text, "error", UNREACHABLE_MSG),
        }
    });
}

async fn refresh_listing(ui: &SavesUi, session: &Rc<RefCell<Session>>) {
    match http_get(&ui.window, SAVES_URL).await {
        Ok((true, body)) => match serde_json::from_str::<SaveListing>(&body) {
            Ok(listing) => {
                let count = listing.saves.len();
                render_save_options(&ui.document, &ui.select, &listing.saves);
                session.borrow_mut().saves = listing.saves;
                let text = if count == 0 {
                    "No saved states yet".to_string()
                } else if count == 1 {
                    "1 saved state".to_string()
                } else {
                    format!("{count} saved states")
                };
                set_status(&ui.status_el, &ui.status_text, "info", &text);
            }
            // A garbled listing leaves the cached one untouched.
            Err(error) => {
                web_sys::console::warn_1(&format!("Save listing parse error: {error}").into());
                set_status(
                    &ui.status_el,
                    &ui.status_text,
                    "error",
                    "Save listing was malformed",
                );
            }
        },
        Ok((false, body)) => set_status(
            &ui.status_el,
            &ui.status_text,
            "error",
            &error_message(&body, "Unable to list saved states"),
        ),
        Err(_) => set_status(&ui.status_el, &ui.status_text, "error", UNREACHABLE_MSG),
    }
}

/// Display name for a slug from the cached listing.
fn cached_name<'a>(saves: &'a [SaveSummary], slug: &str) -> Option<&'a str> {
    saves
        .iter()
        .find(|save| save.slug == slug)
        .map(|save| save.name.as_str())
}

async fn http_get(window: &Window, url: &str) -> Result<(bool, String), JsValue> {
    let response = JsFuture::from(window.fetch_with_str(url)).await?;
    read_response(response).await
}

async fn http_post_json(window: &Window, url: &str, body: &str) -> Result<(bool, String), JsValue> {
    let init = RequestInit::new();
    init.set_method("POST");
    let headers = Headers::new()?;
    headers.append("content-type", "application/json")?;
    init.set_headers(headers.as_ref());
    init.set_body(&JsValue::from_str(body));
    let response = JsFuture::from(window.fetch_with_str_and_init(url, &init)).await?;
    read_response(response).await
}

async fn read_response(response: JsValue) -> Result<(bool, String), JsValue> {
    let response: Response = response.dyn_into()?;
    let ok = response.ok();
    let text = JsFuture::from(response.text()?).await?;
    Ok((ok, text.as_string().unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::cached_name;
    use pixelwall_shared::saves::SaveSummary;

    #[test]
    fn cached_listing_resolves_display_names() {
        let saves = vec![
            SaveSummary {
                slug: "sunset-wall".to_string(),
                name: "Sunset Wall".to_string(),
                saved_at: None,
            },
            SaveSummary {
                slug: "demo".to_string(),
                name: "Demo".to_string(),
                saved_at: Some("2024-01-01T00:00:00+00:00".to_string()),
            },
        ];
        assert_eq!(cached_name(&saves, "sunset-wall"), Some("Sunset Wall"));
        assert_eq!(cached_name(&saves, "demo"), Some("Demo"));
        assert_eq!(cached_name(&saves, "missing"), None);
        assert_eq!(cached_name(&[], "demo"), None);
    }
}
