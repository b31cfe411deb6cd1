use crate::domains::attachment::PendingUpload;
use crate::errors::UploadError;
use bytes::Bytes;
use std::collections::HashMap;
use std::convert::Infallible;

/// Decodes a `multipart/form-data` body into text fields and file parts.
/// The whole body is already buffered in memory by the front server, so the
/// stream `multer` wants is just that one chunk (spec.md §4.7).
pub async fn decode(
    content_type: &str,
    body: Vec<u8>,
) -> Result<(HashMap<String, String>, HashMap<String, PendingUpload>), UploadError> {
    let boundary = multer::parse_boundary(content_type).map_err(|e| UploadError::Malformed(e.to_string()))?;

    let stream = tokio_stream::once(Ok::<Bytes, Infallible>(Bytes::from(body)));
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut fields = HashMap::new();
    let mut files = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| UploadError::Malformed(e.to_string()))? {
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };

        if let Some(file_name) = field.file_name().map(|s| s.to_string()) {
            let data = field.bytes().await.map_err(|e| UploadError::Malformed(e.to_string()))?;
            files.insert(name, PendingUpload { original_filename: file_name, data: data.to_vec() });
        } else {
            let text = field.text().await.map_err(|e| UploadError::Malformed(e.to_string()))?;
            fields.insert(name, text);
        }
    }

    Ok((fields, files))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multipart_body(boundary: &str, field_name: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n").as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        body
    }

    #[tokio::test]
    async fn decodes_a_single_file_field() {
        let boundary = "FEDERATION_TEST_BOUNDARY";
        let body = multipart_body(boundary, "file", "evidence.bin", b"hello world");
        let content_type = format!("multipart/form-data; boundary={boundary}");

        let (fields, files) = decode(&content_type, body).await.unwrap();
        assert!(fields.is_empty());
        let upload = files.get("file").expect("file field present");
        assert_eq!(upload.original_filename, "evidence.bin");
        assert_eq!(upload.data, b"hello world");
    }

    #[tokio::test]
    async fn rejects_a_content_type_without_a_boundary() {
        assert!(decode("multipart/form-data", Vec::new()).await.is_err());
    }
}
