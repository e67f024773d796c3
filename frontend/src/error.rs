use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("document has no body")]
    NoBody,
    #[error("nothing matches `{0}`")]
    MissingElement(String),
    #[error("javascript error: {0}")]
    Js(String),
    #[error("invalid enhancer config: {0}")]
    Config(#[from] serde_json::Error),
}

impl EnhanceError {
    pub fn missing(selector: impl Into<String>) -> Self {
        Self::MissingElement(selector.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MissingElement(_))
    }
}

impl From<JsValue> for EnhanceError {
    fn from(value: JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_element_is_flagged_as_skippable() {
        let err = EnhanceError::missing(".counter[data-target]");
        assert!(err.is_missing());
        assert_eq!(err.to_string(), "nothing matches `.counter[data-target]`");
        assert!(!EnhanceError::NoBody.is_missing());
    }

    #[test]
    fn config_errors_convert_from_serde() {
        let parse = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: EnhanceError = parse.into();
        assert!(matches!(err, EnhanceError::Config(_)));
    }
}
