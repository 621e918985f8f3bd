//! Decoding and encoding helpers around the `image` crate.

use std::io::Cursor;

use bytes::Bytes;

/// Decodes image bytes on the calling thread.
///
/// # Errors
/// Returns a description of the decode failure.
pub fn decode_image(bytes: &[u8]) -> Result<image::DynamicImage, String> {
    image::load_from_memory(bytes).map_err(|e| format!("Failed to decode image: {e}"))
}

/// Decodes image bytes on the blocking thread pool.
///
/// # Errors
/// Returns a description of the decode failure or of a panicked task.
pub async fn decode_image_blocking_pool(
    bytes: impl AsRef<[u8]> + Send + 'static,
) -> Result<image::DynamicImage, String> {
    tokio::task::spawn_blocking(move || decode_image(bytes.as_ref()))
        .await
        .map_err(|e| format!("Decode task panicked: {e}"))?
}

/// Encodes an image as PNG.
///
/// # Errors
/// Returns error if encoding fails.
pub fn encode_png(image: &image::DynamicImage) -> image::ImageResult<Bytes> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, image::ImageFormat::Png)?;
    Ok(Bytes::from(buf.into_inner()))
}
