// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use image::ImageFormat;
use thiserror::Error;

/// 上传图片校验错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("Uploaded file is empty")]
    Empty,
    #[error("Unsupported image format: only JPEG and PNG are accepted")]
    UnsupportedFormat,
    #[error("Image could not be decoded: {0}")]
    Malformed(String),
}

/// 通过校验的图片，保留原始字节供模型调用
#[derive(Debug, Clone)]
pub struct ValidatedImage {
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// 校验上传内容是否为可解码的 JPEG 或 PNG
///
/// 先按文件头识别格式，再完整解码一次，截断或损坏的文件在这里被拒绝。
/// 解码是 CPU 密集操作，异步上下文中应放到 `spawn_blocking` 里调用。
pub fn validate_image(bytes: Vec<u8>) -> Result<ValidatedImage, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }

    let format = image::guess_format(&bytes).map_err(|_| ImageError::UnsupportedFormat)?;
    let mime_type = match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        _ => return Err(ImageError::UnsupportedFormat),
    };

    let decoded = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| ImageError::Malformed(e.to_string()))?;

    Ok(ValidatedImage {
        mime_type,
        width: decoded.width(),
        height: decoded.height(),
        bytes,
    })
}
