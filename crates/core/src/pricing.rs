use serde::{Deserialize, Serialize};

/// USD price per one million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPrice {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Exact,
    Partial,
    Family,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResolution {
    pub price: ModelPrice,
    pub source: PriceSource,
    pub resolved_model: String,
}

const fn price(input_per_million: f64, output_per_million: f64) -> ModelPrice {
    ModelPrice {
        input_per_million,
        output_per_million,
    }
}

const MODEL_PRICES: &[(&str, ModelPrice)] = &[
    ("claude-opus-4-1", price(15.0, 75.0)),
    ("claude-opus-4", price(15.0, 75.0)),
    ("claude-sonnet-4-5", price(3.0, 15.0)),
    ("claude-sonnet-4", price(3.0, 15.0)),
    ("claude-haiku-4-5", price(1.0, 5.0)),
    ("claude-3-7-sonnet", price(3.0, 15.0)),
    ("claude-3-5-sonnet", price(3.0, 15.0)),
    ("claude-3-5-haiku", price(0.8, 4.0)),
    ("claude-3-opus", price(15.0, 75.0)),
    ("claude-3-haiku", price(0.25, 1.25)),
    ("gpt-5", price(1.25, 10.0)),
    ("gpt-5-codex", price(1.25, 10.0)),
    ("gpt-5-mini", price(0.25, 2.0)),
    ("gpt-5-nano", price(0.05, 0.4)),
    ("gpt-4.1", price(2.0, 8.0)),
    ("gpt-4.1-mini", price(0.4, 1.6)),
    ("gpt-4o", price(2.5, 10.0)),
    ("gpt-4o-mini", price(0.15, 0.6)),
    ("o3", price(2.0, 8.0)),
    ("o4-mini", price(1.1, 4.4)),
    ("codex-mini-latest", price(1.5, 6.0)),
    ("gemini-2.5-pro", price(1.25, 10.0)),
    ("gemini-2.5-flash", price(0.3, 2.5)),
    ("gemini-2.5-flash-lite", price(0.1, 0.4)),
    ("gemini-2.0-flash", price(0.1, 0.4)),
];

const DEFAULT_MODEL: &str = "claude-sonnet-4";

fn lookup(model: &str) -> Option<ModelPrice> {
    MODEL_PRICES
        .iter()
        .find(|(key, _)| *key == model)
        .map(|(_, price)| *price)
}

fn partial_match(model: &str) -> Option<&'static str> {
    let mut keys: Vec<&'static str> = MODEL_PRICES.iter().map(|(key, _)| *key).collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    if let Some(key) = keys.iter().find(|key| model.contains(**key)) {
        return Some(key);
    }
    if model.len() < 2 {
        return None;
    }
    keys.into_iter().find(|key| key.starts_with(model))
}

fn family_match(model: &str) -> Option<&'static str> {
    if model.contains("opus") {
        return Some("claude-opus-4");
    }
    if model.contains("sonnet") {
        return Some("claude-sonnet-4");
    }
    if model.contains("haiku") {
        return Some("claude-3-5-haiku");
    }
    if model.contains("gemini") {
        if model.contains("flash") {
            return Some("gemini-2.5-flash");
        }
        return Some("gemini-2.5-pro");
    }
    if model.contains("mini") {
        return Some("gpt-5-mini");
    }
    if model.contains("gpt") || model.contains("codex") {
        return Some("gpt-5");
    }
    None
}

/// Resolves a model name to a price, reporting which lookup step matched.
pub fn price_resolution(model: &str) -> PriceResolution {
    let key = model.trim().to_ascii_lowercase();
    if let Some(price) = lookup(&key) {
        return PriceResolution {
            price,
            source: PriceSource::Exact,
            resolved_model: key,
        };
    }
    let (resolved, source) = if let Some(found) = partial_match(&key) {
        (found, PriceSource::Partial)
    } else if let Some(found) = family_match(&key) {
        (found, PriceSource::Family)
    } else {
        (DEFAULT_MODEL, PriceSource::Default)
    };
    let price = lookup(resolved).unwrap_or(price(3.0, 15.0));
    PriceResolution {
        price,
        source,
        resolved_model: resolved.to_string(),
    }
}

pub fn price_for(model: &str) -> ModelPrice {
    price_resolution(model).price
}

/// Cost in USD for the given token counts. `None` prices at the global default.
pub fn cost_for(input_tokens: u64, output_tokens: u64, model: Option<&str>) -> f64 {
    let price = price_for(model.unwrap_or(DEFAULT_MODEL));
    (input_tokens as f64 / 1_000_000.0) * price.input_per_million
        + (output_tokens as f64 / 1_000_000.0) * price.output_per_million
}
