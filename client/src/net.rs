use wasm_bindgen::JsValue;
use web_sys::Window;

pub const SAVES_URL: &str = "/api/saves";

pub fn websocket_url(window: &Window) -> Result<String, JsValue> {
    let location = window.location();
    let protocol = location.protocol()?;
    let host = location.host()?;
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    Ok(format!("{scheme}://{host}/ws"))
}

pub fn save_url(slug: &str) -> String {
    format!("{SAVES_URL}/{slug}")
}
