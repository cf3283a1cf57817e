// SPDX-License-Identifier: MIT

//! Localized user-facing failure messages.
//!
//! The dashboard sends the caller's locale with each analysis request.
//! Unknown locales fall back to English.

/// Keys for the messages a caller can see on a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    ConversionFailed,
    AnalysisFailed,
    UnsupportedFormat,
    FileTooLarge,
}

/// Look up a message for a locale, falling back to English.
pub fn localized(locale: &str, message: Message) -> &'static str {
    let lang = locale.split(['-', '_']).next().unwrap_or("en");
    match lang {
        "ar" => match message {
            Message::ConversionFailed => "فشل تحويل الصورة. حاول مرة أخرى.",
            Message::AnalysisFailed => "فشل تحليل الصورة. حاول مرة أخرى.",
            Message::UnsupportedFormat => "تنسيق الصورة غير مدعوم.",
            Message::FileTooLarge => "حجم الملف كبير جدًا.",
        },
        "fr" => match message {
            Message::ConversionFailed => "Échec de la conversion de l'image. Veuillez réessayer.",
            Message::AnalysisFailed => "Échec de l'analyse de l'image. Veuillez réessayer.",
            Message::UnsupportedFormat => "Format d'image non pris en charge.",
            Message::FileTooLarge => "Le fichier est trop volumineux.",
        },
        "es" => match message {
            Message::ConversionFailed => "Error al convertir la imagen. Inténtalo de nuevo.",
            Message::AnalysisFailed => "Error al analizar la imagen. Inténtalo de nuevo.",
            Message::UnsupportedFormat => "Formato de imagen no compatible.",
            Message::FileTooLarge => "El archivo es demasiado grande.",
        },
        _ => match message {
            Message::ConversionFailed => "Image conversion failed. Please try again.",
            Message::AnalysisFailed => "Image analysis failed. Please try again.",
            Message::UnsupportedFormat => "Unsupported image format.",
            Message::FileTooLarge => "File is too large.",
        },
    }
}
