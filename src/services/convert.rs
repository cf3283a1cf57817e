// SPDX-License-Identifier: MIT

//! Image intake and normalization.
//!
//! Validates declared MIME type and size, then normalizes everything to
//! JPEG before analysis. Non-JPEG rasters go through ImageMagick; EPS goes
//! through Ghostscript. Conversions run in a scoped temp directory that is
//! removed on every exit path.

use crate::config::Config;
use crate::error::AppError;
use crate::i18n::{localized, Message};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Accepted upload formats, classified from the declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Bmp,
    Tiff,
    Webp,
    Gif,
    Svg,
    Eps,
}

impl ImageFormat {
    /// Classify a declared MIME type. Unknown types are rejected upstream.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/bmp" => Some(Self::Bmp),
            "image/tiff" => Some(Self::Tiff),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            "image/svg+xml" => Some(Self::Svg),
            "image/x-eps" | "application/postscript" => Some(Self::Eps),
            _ => None,
        }
    }

    /// Input file extension for the converter invocation.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Svg => "svg",
            Self::Eps => "eps",
        }
    }
}

/// A normalized (JPEG) image ready for analysis.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

/// Shells out to external converters for format normalization.
#[derive(Clone)]
pub struct ImageConverter {
    convert_bin: String,
    ghostscript_bin: String,
    timeout: Duration,
    max_upload_bytes: usize,
    enable_svg: bool,
    enable_eps: bool,
}

impl ImageConverter {
    pub fn from_config(config: &Config) -> Self {
        Self {
            convert_bin: config.convert_bin.clone(),
            ghostscript_bin: config.ghostscript_bin.clone(),
            timeout: Duration::from_secs(config.convert_timeout_secs),
            max_upload_bytes: config.max_upload_bytes,
            enable_svg: config.enable_svg,
            enable_eps: config.enable_eps,
        }
    }

    /// Whether a format is currently accepted. SVG and EPS are capability
    /// toggles; the dashboard checks `GET /formats` before offering them.
    pub fn is_enabled(&self, format: ImageFormat) -> bool {
        match format {
            ImageFormat::Svg => self.enable_svg,
            ImageFormat::Eps => self.enable_eps,
            _ => true,
        }
    }

    /// MIME types currently accepted by this deployment.
    pub fn accepted_mime_types(&self) -> Vec<&'static str> {
        let mut types = vec![
            "image/jpeg",
            "image/png",
            "image/bmp",
            "image/tiff",
            "image/webp",
            "image/gif",
        ];
        if self.enable_svg {
            types.push("image/svg+xml");
        }
        if self.enable_eps {
            types.push("image/x-eps");
            types.push("application/postscript");
        }
        types
    }

    /// Validate and normalize an upload to JPEG.
    ///
    /// JPEG passes through unchanged. Rejections (unknown type, disabled
    /// format, oversized payload) happen before any processing; converter
    /// failures and timeouts surface as `ConversionFailed` localized to the
    /// caller's locale.
    pub async fn normalize(
        &self,
        bytes: &[u8],
        mime_type: &str,
        locale: &str,
    ) -> Result<NormalizedImage, AppError> {
        let format = ImageFormat::from_mime(mime_type).ok_or_else(|| {
            AppError::BadRequest(localized(locale, Message::UnsupportedFormat).to_string())
        })?;

        if !self.is_enabled(format) {
            return Err(AppError::BadRequest(
                localized(locale, Message::UnsupportedFormat).to_string(),
            ));
        }

        if bytes.len() > self.max_upload_bytes {
            return Err(AppError::BadRequest(
                localized(locale, Message::FileTooLarge).to_string(),
            ));
        }

        if format == ImageFormat::Jpeg {
            return Ok(NormalizedImage {
                bytes: bytes.to_vec(),
                mime_type: "image/jpeg",
            });
        }

        // Scoped workspace: removed on drop, success or failure
        let workdir = tempfile::tempdir()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("tempdir: {}", e)))?;
        let input = workdir.path().join(format!("input.{}", format.extension()));
        let output = workdir.path().join("output.jpg");

        tokio::fs::write(&input, bytes)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("write temp input: {}", e)))?;

        let mut command = self.build_command(format, &input, &output);

        let run = async {
            command
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await
        };

        let result = tokio::time::timeout(self.timeout, run).await;

        match result {
            Err(_) => {
                tracing::error!(mime_type, "Converter timed out");
                Err(AppError::ConversionFailed(
                    localized(locale, Message::ConversionFailed).to_string(),
                ))
            }
            Ok(Err(e)) => {
                tracing::error!(mime_type, error = %e, "Failed to spawn converter");
                Err(AppError::ConversionFailed(
                    localized(locale, Message::ConversionFailed).to_string(),
                ))
            }
            Ok(Ok(out)) if !out.status.success() => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                tracing::error!(
                    mime_type,
                    exit = ?out.status.code(),
                    stderr = %stderr,
                    "Converter exited non-zero"
                );
                Err(AppError::ConversionFailed(
                    localized(locale, Message::ConversionFailed).to_string(),
                ))
            }
            Ok(Ok(_)) => {
                let bytes = tokio::fs::read(&output).await.map_err(|e| {
                    tracing::error!(mime_type, error = %e, "Converter produced no output file");
                    AppError::ConversionFailed(
                        localized(locale, Message::ConversionFailed).to_string(),
                    )
                })?;
                Ok(NormalizedImage {
                    bytes,
                    mime_type: "image/jpeg",
                })
            }
        }
    }

    fn build_command(&self, format: ImageFormat, input: &Path, output: &Path) -> Command {
        match format {
            ImageFormat::Eps => {
                let mut cmd = Command::new(&self.ghostscript_bin);
                cmd.arg("-dSAFER")
                    .arg("-dBATCH")
                    .arg("-dNOPAUSE")
                    .arg("-dEPSCrop")
                    .arg("-r300")
                    .arg("-sDEVICE=jpeg")
                    .arg("-dJPEGQ=90")
                    .arg(format!("-sOutputFile={}", output.display()))
                    .arg(input);
                cmd
            }
            _ => {
                let mut cmd = Command::new(&self.convert_bin);
                // First frame only for animated inputs
                let input_arg = if format == ImageFormat::Gif {
                    format!("{}[0]", input.display())
                } else {
                    input.display().to_string()
                };
                cmd.arg(input_arg)
                    .arg("-background")
                    .arg("white")
                    .arg("-flatten")
                    .arg(format!("jpg:{}", output.display()));
                cmd
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter(enable_svg: bool, enable_eps: bool) -> ImageConverter {
        let mut config = Config::test_default();
        config.enable_svg = enable_svg;
        config.enable_eps = enable_eps;
        config.max_upload_bytes = 1024;
        ImageConverter::from_config(&config)
    }

    #[test]
    fn test_format_from_mime() {
        assert_eq!(ImageFormat::from_mime("image/jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime("image/webp"), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::from_mime("image/x-eps"), Some(ImageFormat::Eps));
        assert_eq!(
            ImageFormat::from_mime("application/postscript"),
            Some(ImageFormat::Eps)
        );
        assert_eq!(ImageFormat::from_mime("application/pdf"), None);
        assert_eq!(ImageFormat::from_mime("text/plain"), None);
    }

    #[test]
    fn test_capability_toggles() {
        let c = converter(false, false);
        assert!(c.is_enabled(ImageFormat::Png));
        assert!(!c.is_enabled(ImageFormat::Svg));
        assert!(!c.is_enabled(ImageFormat::Eps));
        assert!(!c.accepted_mime_types().contains(&"image/svg+xml"));

        let c = converter(true, true);
        assert!(c.is_enabled(ImageFormat::Svg));
        assert!(c.accepted_mime_types().contains(&"application/postscript"));
    }

    #[tokio::test]
    async fn test_jpeg_passthrough() {
        let c = converter(false, false);
        let out = c.normalize(b"\xFF\xD8\xFF\xE0jpeg", "image/jpeg", "en").await.unwrap();
        assert_eq!(out.mime_type, "image/jpeg");
        assert_eq!(out.bytes, b"\xFF\xD8\xFF\xE0jpeg");
    }

    #[tokio::test]
    async fn test_unknown_mime_rejected() {
        let c = converter(false, false);
        let err = c.normalize(b"data", "application/pdf", "en").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_disabled_format_rejected() {
        let c = converter(false, false);
        let err = c.normalize(b"<svg/>", "image/svg+xml", "en").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_oversized_rejected_before_processing() {
        let c = converter(false, false);
        let big = vec![0u8; 2048];
        let err = c.normalize(&big, "image/jpeg", "en").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
