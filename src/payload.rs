use serde::Serialize;

/// Body of a `POST /translate` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct TranslateRequest<'a> {
    pub text: &'a str,
    pub source_lang: &'a str,
    pub target_lang: &'a str,
}

pub(crate) fn build_payload<'a>(
    text: &'a str,
    source_lang: &'a str,
    target_lang: &'a str,
) -> TranslateRequest<'a> {
    TranslateRequest {
        text,
        source_lang,
        target_lang,
    }
}
