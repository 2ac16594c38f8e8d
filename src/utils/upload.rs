use bytes::Bytes;

use crate::error::{Error, Result};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Png,
    Jpeg,
    Webp,
    Pdf,
}

impl FileKind {
    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Png => "png",
            FileKind::Jpeg => "jpg",
            FileKind::Webp => "webp",
            FileKind::Pdf => "pdf",
        }
    }

    /// Detects the file type from its leading bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some(FileKind::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(FileKind::Jpeg)
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(FileKind::Webp)
        } else if data.starts_with(b"%PDF") {
            Some(FileKind::Pdf)
        } else {
            None
        }
    }
}

/// A file received in a multipart field, held in memory until stored.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub kind: FileKind,
    pub data: Bytes,
}

fn accept(data: Bytes, allowed: &[FileKind], message: &str) -> Result<UploadedFile> {
    if data.is_empty() || data.len() > MAX_UPLOAD_BYTES {
        return Err(Error::BadRequest(message.to_string()));
    }
    match FileKind::sniff(&data) {
        Some(kind) if allowed.contains(&kind) => Ok(UploadedFile { kind, data }),
        _ => Err(Error::BadRequest(message.to_string())),
    }
}

pub fn accept_image(data: Bytes) -> Result<UploadedFile> {
    accept(
        data,
        &[FileKind::Png, FileKind::Jpeg, FileKind::Webp],
        "Image must be a PNG, JPEG or WEBP file under 5MB",
    )
}

pub fn accept_resume(data: Bytes) -> Result<UploadedFile> {
    accept(data, &[FileKind::Pdf], "Resume must be a PDF and under 5MB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_is_accepted_as_resume_but_not_as_image() {
        let pdf = Bytes::from_static(b"%PDF-1.7\n...");
        assert_eq!(accept_resume(pdf.clone()).unwrap().kind, FileKind::Pdf);
        assert!(accept_image(pdf).is_err());
    }

    #[test]
    fn webp_header_is_recognised() {
        let mut webp = b"RIFF\x00\x00\x00\x00WEBPVP8 ".to_vec();
        webp.extend_from_slice(&[0u8; 16]);
        assert_eq!(accept_image(Bytes::from(webp)).unwrap().kind, FileKind::Webp);
    }

    #[test]
    fn oversized_resume_is_rejected() {
        let mut data = b"%PDF".to_vec();
        data.resize(MAX_UPLOAD_BYTES + 1, 0);
        let err = accept_resume(Bytes::from(data)).unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "Resume must be a PDF and under 5MB"));
    }
}
