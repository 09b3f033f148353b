//! Image link normalisation. Links are handed to the catalog as `src` URLs;
//! the catalog fetches them itself.

use reqwest::Url;
use tracing::warn;

use crate::catalog::ImageSource;

const DRIVE_HOST: &str = "drive.google.com";

/// Turns a Google Drive share link into a direct download link.
/// Other URLs pass through unchanged. `None` for a Drive link with no file id,
/// or for text that is not an absolute URL.
pub fn direct_image_url(link: &str) -> Option<String> {
    let link = link.trim();
    let url = Url::parse(link).ok()?;
    if url.host_str() != Some(DRIVE_HOST) {
        return Some(link.to_string());
    }

    drive_file_id(&url).map(|id| format!("https://{DRIVE_HOST}/uc?export=download&id={id}"))
}

/// `/file/d/<id>/view` or `?id=<id>`.
fn drive_file_id(url: &Url) -> Option<String> {
    let from_path = url.path_segments().and_then(|mut segments| {
        segments.find(|segment| *segment == "d")?;
        segments.next().filter(|id| !id.is_empty()).map(str::to_string)
    });

    from_path.or_else(|| {
        url.query_pairs()
            .find(|(key, _)| key == "id")
            .map(|(_, id)| id.into_owned())
            .filter(|id| !id.is_empty())
    })
}

/// Splits a comma-separated cell into image sources, dropping links that cannot be used.
pub fn image_sources(cell: &str) -> Vec<ImageSource> {
    cell.split(',')
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .filter_map(|link| match direct_image_url(link) {
            Some(src) => Some(ImageSource { src }),
            None => {
                warn!("Unusable image link skipped: {link}");
                None
            }
        })
        .collect()
}
