use crate::error::ProcessError;

/// Language of user-facing error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    English,
    Turkish,
}

impl Locale {
    /// Unknown codes fall back to English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "tr" | "tur" | "turkish" => Locale::Turkish,
            _ => Locale::English,
        }
    }

    pub fn message(self, error: &ProcessError) -> &'static str {
        match (self, error) {
            (Locale::English, ProcessError::MissingParameter) => {
                "Please provide all required parameters"
            }
            (Locale::English, ProcessError::MissingCredential) => {
                "Please provide an OpenAI API key"
            }
            (Locale::English, ProcessError::InvalidJson(_)) => "Invalid JSON format",
            (Locale::English, ProcessError::MalformedBody(_)) => "Invalid request body",
            (Locale::English, ProcessError::ProviderFailure(_)) => {
                "The request could not be processed. The API key may be invalid."
            }
            (Locale::Turkish, ProcessError::MissingParameter) => {
                "Lütfen gerekli tüm parametreleri sağlayın"
            }
            (Locale::Turkish, ProcessError::MissingCredential) => {
                "Lütfen bir OpenAI API anahtarı sağlayın"
            }
            (Locale::Turkish, ProcessError::InvalidJson(_)) => "Geçersiz JSON formatı",
            (Locale::Turkish, ProcessError::MalformedBody(_)) => "Geçersiz istek gövdesi",
            (Locale::Turkish, ProcessError::ProviderFailure(_)) => {
                "İstek işlenemedi. API anahtarı geçersiz olabilir."
            }
        }
    }
}
