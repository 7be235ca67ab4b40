//! W3C WebDriver wire details: element references, error envelopes, key
//! codes and input-action payloads.

use serde_json::{json, Value};

use crate::error::SurfaceError;

/// JSON key under which W3C drivers return web element ids.
pub(crate) const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Error codes that mean the browser session itself is gone.
const SESSION_ERRORS: [&str; 2] = ["invalid session id", "session not created"];

/// Reference to an element in the driver's current browsing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    pub(crate) fn to_json(&self) -> Value {
        json!({ ELEMENT_KEY: self.0 })
    }

    pub(crate) fn from_json(value: &Value) -> Option<Self> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(Self::new)
    }
}

/// Parses the `value` of a find-elements response.
pub(crate) fn element_list(value: &Value) -> Result<Vec<ElementRef>, SurfaceError> {
    let items = value
        .as_array()
        .ok_or_else(|| SurfaceError::Operation(format!("expected element list, got {value}")))?;
    items
        .iter()
        .map(|item| {
            ElementRef::from_json(item)
                .ok_or_else(|| SurfaceError::Operation(format!("malformed element reference: {item}")))
        })
        .collect()
}

/// Maps a WebDriver error envelope onto the surface error classes.
///
/// Returns `None` when `body` is not an error envelope.
pub(crate) fn classify_error(body: &Value) -> Option<SurfaceError> {
    let value = body.get("value")?;
    let code = value.get("error")?.as_str()?;
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let detail = if message.is_empty() {
        code.to_string()
    } else {
        format!("{code}: {message}")
    };
    if SESSION_ERRORS.contains(&code) {
        Some(SurfaceError::Session(detail))
    } else {
        Some(SurfaceError::Operation(detail))
    }
}

/// Translates a key name into the code point WebDriver expects.
///
/// Single characters pass through unchanged.
pub(crate) fn key_code(name: &str) -> Result<String, SurfaceError> {
    let code = match name {
        "Enter" => "\u{E007}",
        "Tab" => "\u{E004}",
        "Escape" => "\u{E00C}",
        "PageDown" => "\u{E00F}",
        "End" => "\u{E010}",
        "Home" => "\u{E011}",
        "ArrowDown" => "\u{E015}",
        other if other.chars().count() == 1 => other,
        other => {
            return Err(SurfaceError::Operation(format!("unsupported key: {other}")));
        }
    };
    Ok(code.to_string())
}

pub(crate) fn key_press(code: &str) -> Value {
    json!({
        "actions": [{
            "type": "key",
            "id": "keyboard",
            "actions": [
                { "type": "keyDown", "value": code },
                { "type": "keyUp", "value": code },
            ],
        }]
    })
}

/// Centre of an element rect (`{x, y, width, height}`), clamped to the
/// positive quadrant.
///
/// Rects are document-relative; the maps page keeps its document unscrolled
/// and scrolls the results feed instead, so this is also a viewport point.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn rect_centre(rect: &Value) -> Option<(i64, i64)> {
    let field = |name: &str| rect.get(name).and_then(Value::as_f64);
    let x = field("x")? + field("width")? / 2.0;
    let y = field("y")? + field("height")? / 2.0;
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some((x.max(0.0).round() as i64, y.max(0.0).round() as i64))
}

/// Wheel scroll from a fixed viewport point (the top-left corner without
/// one).
pub(crate) fn wheel_scroll(position: Option<(i64, i64)>, delta_x: i64, delta_y: i64) -> Value {
    let (x, y) = position.unwrap_or((0, 0));
    json!({
        "actions": [{
            "type": "wheel",
            "id": "wheel",
            "actions": [{
                "type": "scroll",
                "x": x,
                "y": y,
                "deltaX": delta_x,
                "deltaY": delta_y,
                "duration": 0,
                "origin": "viewport",
            }],
        }]
    })
}

pub(crate) fn pointer_move(target: &ElementRef) -> Value {
    json!({
        "actions": [{
            "type": "pointer",
            "id": "mouse",
            "parameters": { "pointerType": "mouse" },
            "actions": [{
                "type": "pointerMove",
                "duration": 0,
                "x": 0,
                "y": 0,
                "origin": target.to_json(),
            }],
        }]
    })
}

pub(crate) fn new_session(headless: bool) -> Value {
    let mut args = Vec::new();
    if headless {
        args.push("--headless=new");
    }
    args.push("--window-size=1280,1024");
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args },
            }
        }
    })
}
