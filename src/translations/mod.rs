use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tera::{Context as TeraContext, Tera};

const TRANSLATE_PROMPT: &str = include_str!("prompts/translate.tera");
const FILL_EMPTY_PROMPT: &str = include_str!("prompts/fill_empty.tera");

/// Processing strategy selected by the request's `mode` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Translate every value.
    Translate,
    /// Translate only empty values, keep the rest.
    FillEmpty,
}

impl Mode {
    /// Anything other than `fillEmpty` selects `Translate`.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "fillEmpty" => Mode::FillEmpty,
            _ => Mode::Translate,
        }
    }

    pub fn is_known(value: &str) -> bool {
        matches!(value, "fillEmpty" | "translate")
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Translate => "translate",
            Mode::FillEmpty => "fillEmpty",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub input_language: String,
    pub output_language: String,
}

/// The two ordered messages sent to the completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptEnvelope {
    pub system: String,
    pub user: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslatePayload<'a> {
    input_language: &'a str,
    output_language: &'a str,
    data: &'a Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FillEmptyPayload<'a> {
    key_language: &'a str,
    output_language: &'a str,
    keys: &'a Value,
}

pub fn build_prompt(mode: Mode, options: &TranslateOptions, data: &Value) -> Result<PromptEnvelope> {
    match mode {
        Mode::Translate => build_translate_prompt(options, data),
        Mode::FillEmpty => build_fill_empty_prompt(options, data),
    }
}

pub fn build_translate_prompt(options: &TranslateOptions, data: &Value) -> Result<PromptEnvelope> {
    let system = render_system_prompt(Mode::Translate, options)?;
    let user = serde_json::to_string(&TranslatePayload {
        input_language: &options.input_language,
        output_language: &options.output_language,
        data,
    })
    .with_context(|| "failed to encode translate payload")?;
    Ok(PromptEnvelope { system, user })
}

pub fn build_fill_empty_prompt(options: &TranslateOptions, data: &Value) -> Result<PromptEnvelope> {
    let system = render_system_prompt(Mode::FillEmpty, options)?;
    let user = serde_json::to_string(&FillEmptyPayload {
        key_language: &options.input_language,
        output_language: &options.output_language,
        keys: data,
    })
    .with_context(|| "failed to encode fillEmpty payload")?;
    Ok(PromptEnvelope { system, user })
}

pub fn render_system_prompt(mode: Mode, options: &TranslateOptions) -> Result<String> {
    let template = match mode {
        Mode::Translate => TRANSLATE_PROMPT,
        Mode::FillEmpty => FILL_EMPTY_PROMPT,
    };
    let mut context = TeraContext::new();
    context.insert("input_language", options.input_language.as_str());
    context.insert("output_language", options.output_language.as_str());
    let rendered = Tera::one_off(template, &context, false)
        .with_context(|| format!("failed to render {} system prompt", mode.as_str()))?;
    Ok(rendered.trim().to_string())
}
