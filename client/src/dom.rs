use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, HtmlSelectElement};

use pixelwall_shared::parse_channel;
use pixelwall_shared::saves::SaveSummary;
use pixelwall_shared::Color;

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn set_status(status_el: &Element, status_text: &Element, state: &str, text: &str) {
    let _ = status_el.set_attribute("data-state", state);
    status_text.set_text_content(Some(text));
}

/// The three brush channel boxes. Values are read fresh at paint time so a
/// mid-stroke edit takes effect on the next cell.
#[derive(Clone)]
pub struct ChannelInputs {
    pub red: HtmlInputElement,
    pub green: HtmlInputElement,
    pub blue: HtmlInputElement,
}

impl ChannelInputs {
    pub fn color(&self) -> Color {
        Color::new(
            parse_channel(&self.red.value()),
            parse_channel(&self.green.value()),
            parse_channel(&self.blue.value()),
        )
    }

    pub fn set(&self, color: Color) {
        self.red.set_value(&color.r.to_string());
        self.green.set_value(&color.g.to_string());
        self.blue.set_value(&color.b.to_string());
    }
}

pub fn append_chat_line(document: &Document, list: &Element, text: &str) {
    let Ok(item) = document.create_element("li") else {
        return;
    };
    item.set_text_content(Some(&format!("Received: {text}")));
    let _ = list.append_child(&item);
}

pub fn render_save_options(
    document: &Document,
    select: &HtmlSelectElement,
    saves: &[SaveSummary],
) {
    let previous = select.value();
    select.set_inner_html("");
    if let Ok(placeholder) = document.create_element("option") {
        let _ = placeholder.set_attribute("value", "");
        placeholder.set_text_content(Some("Select a saved state"));
        let _ = select.append_child(&placeholder);
    }
    for save in saves {
        let Ok(option) = document.create_element("option") else {
            continue;
        };
        let _ = option.set_attribute("value", &save.slug);
        let label = match &save.saved_at {
            Some(saved_at) => format!("{} ({saved_at})", save.name),
            None => save.name.clone(),
        };
        option.set_text_content(Some(&label));
        let _ = select.append_child(&option);
    }
    if saves.iter().any(|save| save.slug == previous) {
        select.set_value(&previous);
    }
}
