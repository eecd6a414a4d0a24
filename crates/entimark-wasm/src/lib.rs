use entimark_core::{Entity, LineBreakMode, RenderOptions, Syntax, registry};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsRenderOptions {
    paragraphs: Option<bool>,
    sanitize: Option<bool>,
}

/// Renders `text` with an array of `{type, offset, length, attributes}`
/// entities into the named syntax.
#[wasm_bindgen]
pub fn render(text: &str, entities: JsValue, syntax: &str) -> Result<String, JsValue> {
    render_with_options(text, entities, syntax, JsValue::UNDEFINED)
}

#[wasm_bindgen]
pub fn render_with_options(
    text: &str,
    entities: JsValue,
    syntax: &str,
    options: JsValue,
) -> Result<String, JsValue> {
    let syntax: Syntax = syntax.parse().map_err(to_js_error)?;
    let entities = entities_from_js(entities)?;
    let options = options_from_js(options)?;
    let registry = registry::global();
    entimark_core::render_with(text, &entities, syntax, &registry, &options).map_err(to_js_error)
}

/// Names accepted by `render`, canonical spelling only.
#[wasm_bindgen]
pub fn syntaxes() -> Vec<String> {
    Syntax::ALL.iter().map(|syntax| syntax.name().to_string()).collect()
}

fn entities_from_js(value: JsValue) -> Result<Vec<Entity>, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(Vec::new());
    }
    serde_wasm_bindgen::from_value(value).map_err(to_js_error)
}

fn options_from_js(value: JsValue) -> Result<RenderOptions, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(RenderOptions::default());
    }
    let parsed: JsRenderOptions = serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
    let mut out = RenderOptions::default();
    if let Some(true) = parsed.paragraphs {
        out.line_breaks = LineBreakMode::Paragraphs;
    }
    if let Some(sanitize) = parsed.sanitize {
        out.sanitize = sanitize;
    }
    Ok(out)
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
