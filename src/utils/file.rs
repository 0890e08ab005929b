const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

const DOCUMENT_EXTENSIONS: [&str; 9] = [
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "hwp",
];

/// Default upload allow-list: every image and document type.
pub fn default_allowed_extensions() -> Vec<String> {
    IMAGE_EXTENSIONS
        .iter()
        .chain(DOCUMENT_EXTENSIONS.iter())
        .map(|ext| ext.to_string())
        .collect()
}

/// Human readable size with at most one decimal, e.g. `1 KB`, `1.5 MB`.
pub fn format_file_size(size: u64) -> String {
    if size == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0;
    let mut value = size as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.1}");
    let rounded = rounded.strip_suffix(".0").unwrap_or(&rounded);
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Lower-cased extension without the dot. Empty when there is none.
pub fn file_extension(filename: &str) -> String {
    match filename.rfind('.') {
        Some(idx) if idx + 1 < filename.len() => filename[idx + 1..].to_lowercase(),
        _ => String::new(),
    }
}

const MAX_DISPLAY_NAME_CHARS: usize = 200;

/// The name the client gave the file, without any directory part and capped
/// in length. This is what downloads hand back.
pub fn display_filename(filename: &str) -> String {
    // Browsers on Windows may send the full client path.
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() {
        return "unnamed_file".to_string();
    }

    name.chars().take(MAX_DISPLAY_NAME_CHARS).collect()
}

const MAX_DISK_NAME_BYTES: usize = 200;

/// Filesystem-safe variant of `display_filename`, short enough in bytes to
/// take a uuid prefix.
pub fn sanitize_filename(filename: &str) -> String {
    let mut sanitized = String::new();
    for c in display_filename(filename).chars() {
        let c = if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '_'
        };
        if sanitized.len() + c.len_utf8() > MAX_DISK_NAME_BYTES {
            break;
        }
        sanitized.push(c);
    }
    sanitized
}

pub fn is_image_file(filename: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&file_extension(filename).as_str())
}

pub fn is_document_file(filename: &str) -> bool {
    DOCUMENT_EXTENSIONS.contains(&file_extension(filename).as_str())
}
