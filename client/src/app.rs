use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlSelectElement,
    KeyboardEvent, PointerEvent,
};

use pixelwall_shared::protocol::{Envelope, Inbound};
use pixelwall_shared::{parse_channel, Color, Coord};

use crate::board::{cell_coord, BoardView};
use crate::dom::{append_chat_line, get_element, set_status, ChannelInputs};
use crate::saves::{self, SavesUi};
use crate::state::Session;
use crate::ws::{connect_ws, WsEvent, WsSender};

const ANIMATION_NAME: &str = "anim1";

fn document_ready_state(document: &Document) -> Option<String> {
    js_sys::Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()?
        .as_string()
}

fn event_cell_coord(event: &Event) -> Option<Coord> {
    let target = event.target()?;
    let element = target.dyn_into::<Element>().ok()?;
    let cell = element.closest(".cell").ok()??;
    cell_coord(&cell)
}

/// One cell of a paint stroke: dedup gate, optimistic local apply, one
/// outbound Pixel.
fn paint_cell(session: &mut Session, sender: &WsSender, channels: &ChannelInputs, coord: Coord) {
    if !session.stroke.try_visit(coord) {
        return;
    }
    let color = channels.color();
    session.board.set_cell(coord, color);
    sender.send(&Envelope::Pixel { coord, color });
}

fn frame_number(input: &HtmlInputElement) -> u32 {
    input.value().trim().parse().unwrap_or(0)
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready_state(&document).as_deref() == Some("complete") {
        started.set(true);
        return start_app();
    }

    let onload_started = started.clone();
    let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onload_started.replace(true) {
            return;
        }
        if let Err(err) = start_app() {
            web_sys::console::error_1(&err);
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();

    Ok(())
}

fn start_app() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let grid: HtmlElement = get_element(&document, "grid")?;
    let channels = ChannelInputs {
        red: get_element(&document, "redBox")?,
        green: get_element(&document, "greenBox")?,
        blue: get_element(&document, "blueBox")?,
    };
    let brushes: HtmlElement = get_element(&document, "brushes")?;
    let chat_input: HtmlInputElement = get_element(&document, "chatInput")?;
    let send_button: HtmlButtonElement = get_element(&document, "sendButton")?;
    let messages: Element = get_element(&document, "messages")?;
    let save_name: HtmlInputElement = get_element(&document, "saveName")?;
    let save_button: HtmlButtonElement = get_element(&document, "saveButton")?;
    let saves_select: HtmlSelectElement = get_element(&document, "savesSelect")?;
    let load_button: HtmlButtonElement = get_element(&document, "loadButton")?;
    let frame_input: HtmlInputElement = get_element(&document, "frameNum")?;
    let frame_prev: HtmlButtonElement = get_element(&document, "framePrev")?;
    let frame_next: HtmlButtonElement = get_element(&document, "frameNext")?;
    let frame_load: HtmlButtonElement = get_element(&document, "loadFrameButton")?;
    let frame_save: HtmlButtonElement = get_element(&document, "saveFrameButton")?;
    let frame_animate: HtmlButtonElement = get_element(&document, "animateButton")?;
    let status_el = document
        .get_element_by_id("status")
        .ok_or_else(|| JsValue::from_str("Missing status element"))?;
    let status_text = document
        .get_element_by_id("statusText")
        .ok_or_else(|| JsValue::from_str("Missing status text"))?;

    let session = Rc::new(RefCell::new(Session::new(BoardView::from_document(
        &document,
    )?)));

    set_status(&status_el, &status_text, "connecting", "Connecting...");

    let sender = {
        let session = session.clone();
        let document = document.clone();
        let messages = messages.clone();
        let status_el = status_el.clone();
        let status_text = status_text.clone();
        connect_ws(&window, move |sender: &WsSender, event: WsEvent| {
            match event {
                WsEvent::Open => {
                    set_status(&status_el, &status_text, "open", "Live connection");
                    // Ask the server to replay the full current board.
                    sender.send(&Envelope::Update);
                }
                WsEvent::Close => {
                    set_status(&status_el, &status_text, "closed", "Connection closed");
                }
                WsEvent::Error => {
                    set_status(&status_el, &status_text, "error", "Connection error");
                }
                WsEvent::Message(inbound) => match inbound {
                    Inbound::Pixel { x, y, color } => {
                        if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
                            session.borrow_mut().board.set_cell(Coord::new(x, y), color);
                        }
                    }
                    Inbound::Chat(text) => append_chat_line(&document, &messages, &text),
                    Inbound::System(text) => {
                        web_sys::console::log_1(&format!("System message: {text}").into());
                    }
                    Inbound::Unknown { kind } => {
                        web_sys::console::warn_1(
                            &format!("Ignoring unknown message type {kind:?}").into(),
                        );
                    }
                },
            }
        })?
    };

    {
        let session = session.clone();
        let sender = sender.clone();
        let channels = channels.clone();
        let onpointerdown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            let Some(coord) = event_cell_coord(&event) else {
                return;
            };
            let mut session = session.borrow_mut();
            session.stroke.begin();
            paint_cell(&mut session, &sender, &channels, coord);
        });
        grid.add_event_listener_with_callback("pointerdown", onpointerdown.as_ref().unchecked_ref())?;
        onpointerdown.forget();
    }

    {
        let session = session.clone();
        let sender = sender.clone();
        let channels = channels.clone();
        let onpointerover = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            // Hovering without a held button is not a stroke.
            if !session.borrow().stroke.is_painting() {
                return;
            }
            let Some(coord) = event_cell_coord(&event) else {
                return;
            };
            let mut session = session.borrow_mut();
            paint_cell(&mut session, &sender, &channels, coord);
        });
        grid.add_event_listener_with_callback("pointerover", onpointerover.as_ref().unchecked_ref())?;
        onpointerover.forget();
    }

    for event_name in ["pointerup", "pointercancel"] {
        let session = session.clone();
        let onend = Closure::<dyn FnMut(PointerEvent)>::new(move |_| {
            session.borrow_mut().stroke.end();
        });
        window.add_event_listener_with_callback(event_name, onend.as_ref().unchecked_ref())?;
        onend.forget();
    }

    {
        let session = session.clone();
        let onleave = Closure::<dyn FnMut(PointerEvent)>::new(move |_| {
            session.borrow_mut().stroke.end();
        });
        grid.add_event_listener_with_callback("pointerleave", onleave.as_ref().unchecked_ref())?;
        onleave.forget();
    }

    {
        let session = session.clone();
        let sender = sender.clone();
        let channels = channels.clone();
        let onkeydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let key = event.key();
            if key != "Enter" && key != " " {
                return;
            }
            let Some(coord) = event_cell_coord(&event) else {
                return;
            };
            event.prevent_default();
            // A key press is a one-cell stroke.
            let mut session = session.borrow_mut();
            session.stroke.begin();
            paint_cell(&mut session, &sender, &channels, coord);
            session.stroke.end();
        });
        grid.add_event_listener_with_callback("keydown", onkeydown.as_ref().unchecked_ref())?;
        onkeydown.forget();
    }

    {
        let document = document.clone();
        let channels = channels.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(target) = event.target() else {
                return;
            };
            let Ok(element) = target.dyn_into::<Element>() else {
                return;
            };
            let Ok(Some(brush)) = element.closest(".brush") else {
                return;
            };
            if let Ok(all) = document.query_selector_all(".brush") {
                for index in 0..all.length() {
                    let Some(node) = all.get(index) else {
                        continue;
                    };
                    if let Ok(other) = node.dyn_into::<Element>() {
                        let _ = other.set_attribute("data-active", "false");
                    }
                }
            }
            let _ = brush.set_attribute("data-active", "true");
            let color = Color::new(
                parse_channel(&brush.get_attribute("data-r").unwrap_or_default()),
                parse_channel(&brush.get_attribute("data-g").unwrap_or_default()),
                parse_channel(&brush.get_attribute("data-b").unwrap_or_default()),
            );
            channels.set(color);
        });
        brushes.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let sender = sender.clone();
        let chat_input = chat_input.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let content = chat_input.value();
            sender.send(&Envelope::Chat(content));
            chat_input.set_value("");
        });
        send_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let frame_input = frame_input.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let frame = frame_number(&frame_input).saturating_sub(1);
            frame_input.set_value(&frame.to_string());
        });
        frame_prev.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let frame_input = frame_input.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let frame = frame_number(&frame_input).saturating_add(1);
            frame_input.set_value(&frame.to_string());
        });
        frame_next.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    for (button, build) in [
        (
            &frame_load,
            (|animation, frame| Envelope::LoadFrame { animation, frame })
                as fn(String, u32) -> Envelope,
        ),
        (&frame_save, |animation, frame| Envelope::SaveFrame {
            animation,
            frame,
        }),
        (&frame_animate, |animation, frame| Envelope::Animate {
            animation,
            frame,
        }),
    ] {
        let sender = sender.clone();
        let frame_input = frame_input.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let envelope = build(ANIMATION_NAME.to_string(), frame_number(&frame_input));
            sender.send(&envelope);
        });
        button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    let saves_ui = SavesUi {
        window: window.clone(),
        document: document.clone(),
        select: saves_select.clone(),
        status_el: status_el.clone(),
        status_text: status_text.clone(),
    };

    {
        let saves_ui = saves_ui.clone();
        let session = session.clone();
        let save_name = save_name.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            saves::save(saves_ui.clone(), session.clone(), &save_name.value());
        });
        save_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let saves_ui = saves_ui.clone();
        let session = session.clone();
        let sender = sender.clone();
        let saves_select = saves_select.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            saves::load(
                saves_ui.clone(),
                session.clone(),
                sender.clone(),
                &saves_select.value(),
            );
        });
        load_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    saves::refresh(saves_ui, session);

    Ok(())
}
